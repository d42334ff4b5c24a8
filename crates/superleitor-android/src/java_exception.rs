//! Failed JNI calls
//!
//! A native method that returns while a Java exception is pending rethrows it
//! in its Java caller. Every failed call therefore clears the exception before
//! its error is propagated, so an error the host logs and swallows stays
//! swallowed, and later JNI calls on the same thread remain legal.

use anyhow::Result;

/// The calling thread's pending Java exception
pub trait ExceptionSlot {
    /// Clear the pending exception, returning its description if one was set
    fn take(&mut self) -> Option<String>;
}

/// Convert a failed JNI call into an error, clearing the exception it left pending
pub fn call_failed<E>(slot: &mut impl ExceptionSlot, what: &str, err: E) -> anyhow::Error
where
    E: std::error::Error + Send + Sync + 'static,
{
    match slot.take() {
        Some(exception) => anyhow::Error::new(err).context(format!("{} threw {}", what, exception)),
        None => anyhow::Error::new(err).context(what.to_string()),
    }
}

pub trait JniResultExt<T> {
    /// Like `anyhow::Context::context`, but clears any pending Java exception first
    fn or_clear(self, slot: &mut impl ExceptionSlot, what: &str) -> Result<T>;
}

impl<T, E> JniResultExt<T> for std::result::Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn or_clear(self, slot: &mut impl ExceptionSlot, what: &str) -> Result<T> {
        self.map_err(|err| call_failed(slot, what, err))
    }
}
