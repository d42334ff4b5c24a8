// Test doubles: a scriptable render surface and a capturing log sink.

use anyhow::{Result, bail};
use log::{Level, Log, Metadata, Record};
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::{Arc, Mutex};

use crate::intercept::{NavigationInterceptor, ResourceInterceptor};
use crate::surface::{RenderSurface, SurfaceSettings};

// ---------------------------------------------------------------------------
// MockSurface
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SurfaceCall {
    Configure,
    SetNavigationInterceptor,
    SetResourceInterceptor,
    Load(String),
    CanGoBack,
    GoBack,
    Start,
    Resume,
    Pause,
    Destroy,
    EnableDebugInspection(bool),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SurfaceOp {
    Configure,
    SetNavigationInterceptor,
    SetResourceInterceptor,
    Load,
    CanGoBack,
    GoBack,
    Start,
    Resume,
    Pause,
    Destroy,
    EnableDebugInspection,
}

impl SurfaceCall {
    pub fn op(&self) -> SurfaceOp {
        match self {
            SurfaceCall::Configure => SurfaceOp::Configure,
            SurfaceCall::SetNavigationInterceptor => SurfaceOp::SetNavigationInterceptor,
            SurfaceCall::SetResourceInterceptor => SurfaceOp::SetResourceInterceptor,
            SurfaceCall::Load(_) => SurfaceOp::Load,
            SurfaceCall::CanGoBack => SurfaceOp::CanGoBack,
            SurfaceCall::GoBack => SurfaceOp::GoBack,
            SurfaceCall::Start => SurfaceOp::Start,
            SurfaceCall::Resume => SurfaceOp::Resume,
            SurfaceCall::Pause => SurfaceOp::Pause,
            SurfaceCall::Destroy => SurfaceOp::Destroy,
            SurfaceCall::EnableDebugInspection(_) => SurfaceOp::EnableDebugInspection,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fault {
    Error,
    Panic,
}

#[derive(Default)]
struct MockState {
    calls: Vec<SurfaceCall>,
    faults: HashMap<SurfaceOp, Fault>,
    settings: Option<SurfaceSettings>,
    history: Vec<String>,
    navigation: Option<Arc<dyn NavigationInterceptor>>,
    resources: Option<Arc<dyn ResourceInterceptor>>,
}

/// In-memory render surface. Clones share state, so a test keeps one clone
/// for inspection while the host owns another.
#[derive(Clone, Default)]
pub struct MockSurface {
    state: Rc<RefCell<MockState>>,
}

impl MockSurface {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every future call of `op` fail in the given way.
    pub fn fail_on(&self, op: SurfaceOp, fault: Fault) {
        self.state.borrow_mut().faults.insert(op, fault);
    }

    pub fn clear_faults(&self) {
        self.state.borrow_mut().faults.clear();
    }

    pub fn calls(&self) -> Vec<SurfaceCall> {
        self.state.borrow().calls.clone()
    }

    pub fn count(&self, op: SurfaceOp) -> usize {
        self.state
            .borrow()
            .calls
            .iter()
            .filter(|c| c.op() == op)
            .count()
    }

    pub fn settings(&self) -> Option<SurfaceSettings> {
        self.state.borrow().settings.clone()
    }

    pub fn history(&self) -> Vec<String> {
        self.state.borrow().history.clone()
    }

    /// Simulate an in-page navigation that adds a history entry.
    pub fn navigate(&self, uri: &str) {
        self.state.borrow_mut().history.push(uri.to_string());
    }

    pub fn navigation_interceptor(&self) -> Option<Arc<dyn NavigationInterceptor>> {
        self.state.borrow().navigation.clone()
    }

    pub fn resource_interceptor(&self) -> Option<Arc<dyn ResourceInterceptor>> {
        self.state.borrow().resources.clone()
    }

    fn record(&self, call: SurfaceCall) -> Result<()> {
        let op = call.op();
        let fault = {
            let mut state = self.state.borrow_mut();
            state.calls.push(call);
            state.faults.get(&op).copied()
        };
        match fault {
            None => Ok(()),
            Some(Fault::Error) => bail!("{:?} failed", op),
            Some(Fault::Panic) => panic!("{:?} panicked", op),
        }
    }
}

impl RenderSurface for MockSurface {
    fn configure(&mut self, settings: &SurfaceSettings) -> Result<()> {
        self.record(SurfaceCall::Configure)?;
        self.state.borrow_mut().settings = Some(settings.clone());
        Ok(())
    }

    fn set_navigation_interceptor(
        &mut self,
        interceptor: Arc<dyn NavigationInterceptor>,
    ) -> Result<()> {
        self.record(SurfaceCall::SetNavigationInterceptor)?;
        self.state.borrow_mut().navigation = Some(interceptor);
        Ok(())
    }

    fn set_resource_interceptor(
        &mut self,
        interceptor: Arc<dyn ResourceInterceptor>,
    ) -> Result<()> {
        self.record(SurfaceCall::SetResourceInterceptor)?;
        self.state.borrow_mut().resources = Some(interceptor);
        Ok(())
    }

    fn load(&mut self, uri: &str) -> Result<()> {
        self.record(SurfaceCall::Load(uri.to_string()))?;
        self.state.borrow_mut().history.push(uri.to_string());
        Ok(())
    }

    fn can_go_back(&self) -> Result<bool> {
        self.record(SurfaceCall::CanGoBack)?;
        Ok(self.state.borrow().history.len() > 1)
    }

    fn go_back(&mut self) -> Result<()> {
        self.record(SurfaceCall::GoBack)?;
        self.state.borrow_mut().history.pop();
        Ok(())
    }

    fn on_start(&mut self) -> Result<()> {
        self.record(SurfaceCall::Start)
    }

    fn on_resume(&mut self) -> Result<()> {
        self.record(SurfaceCall::Resume)
    }

    fn on_pause(&mut self) -> Result<()> {
        self.record(SurfaceCall::Pause)
    }

    fn destroy(&mut self) -> Result<()> {
        self.record(SurfaceCall::Destroy)
    }

    fn enable_debug_inspection(&mut self, enabled: bool) -> Result<()> {
        self.record(SurfaceCall::EnableDebugInspection(enabled))
    }
}

// ---------------------------------------------------------------------------
// CapturingLog
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapturedRecord {
    pub level: Level,
    pub target: String,
    pub message: String,
}

/// `log::Log` sink that keeps every record in memory.
#[derive(Default)]
pub struct CapturingLog {
    records: Mutex<Vec<CapturedRecord>>,
}

impl CapturingLog {
    pub fn records(&self) -> Vec<CapturedRecord> {
        self.records.lock().unwrap().clone()
    }

    /// Whether any record at `level` contains `needle`.
    pub fn contains(&self, level: Level, needle: &str) -> bool {
        self.records
            .lock()
            .unwrap()
            .iter()
            .any(|r| r.level == level && r.message.contains(needle))
    }
}

impl Log for CapturingLog {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn log(&self, record: &Record<'_>) {
        self.records.lock().unwrap().push(CapturedRecord {
            level: record.level(),
            target: record.target().to_string(),
            message: record.args().to_string(),
        });
    }

    fn flush(&self) {}
}
