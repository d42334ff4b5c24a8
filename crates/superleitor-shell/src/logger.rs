// Host-scoped logger.
//
// Each `ShellHost` logs through its own `HostLogger`, which wraps any
// `log::Log` sink and stamps records with the host's tag. The default sink
// forwards to whatever global logger the platform installed.

use log::{Level, Log, Metadata, Record};
use std::fmt;
use std::sync::Arc;

#[derive(Clone)]
pub struct HostLogger {
    sink: Arc<dyn Log>,
    tag: String,
}

impl HostLogger {
    pub fn new(sink: Arc<dyn Log>, tag: impl Into<String>) -> Self {
        Self {
            sink,
            tag: tag.into(),
        }
    }

    /// Logger that forwards to the process-wide `log` backend.
    pub fn global(tag: impl Into<String>) -> Self {
        Self::new(Arc::new(GlobalLog), tag)
    }

    pub fn log(&self, level: Level, args: fmt::Arguments<'_>) {
        let metadata = Metadata::builder().level(level).target(&self.tag).build();
        if !self.sink.enabled(&metadata) {
            return;
        }
        self.sink.log(
            &Record::builder()
                .metadata(metadata)
                .args(args)
                .module_path(Some(module_path!()))
                .build(),
        );
    }

    pub fn error(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Error, args);
    }

    pub fn warn(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Warn, args);
    }

    pub fn info(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Info, args);
    }

    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Level::Debug, args);
    }
}

impl fmt::Debug for HostLogger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HostLogger").field("tag", &self.tag).finish()
    }
}

struct GlobalLog;

impl Log for GlobalLog {
    fn enabled(&self, metadata: &Metadata<'_>) -> bool {
        metadata.level() <= log::max_level() && log::logger().enabled(metadata)
    }

    fn log(&self, record: &Record<'_>) {
        log::logger().log(record);
    }

    fn flush(&self) {
        log::logger().flush();
    }
}
