//! Reporter trait for dependency injection
//!
//! Lets orchestration report progress without being coupled to a specific
//! console implementation. The CLI provides the real reporter; library
//! consumers and tests use [`NullReporter`].

/// Progress and status sink for one orchestration run.
pub trait Reporter: Send + Sync {
    /// A new phase has started (e.g. "Checking dependencies", "Building").
    fn section(&self, title: &str);

    /// An install step is about to run.
    fn step_started(&self, index: usize, total: usize, line: &str);

    /// The step at `index` exited successfully.
    fn step_finished(&self, index: usize, total: usize);

    /// The step at `index` failed; `reason` is a short human summary.
    fn step_failed(&self, index: usize, reason: &str);

    /// Log an informational message.
    fn info(&self, msg: &str);

    /// Log a success message.
    fn success(&self, msg: &str);

    /// Log a warning message.
    fn warning(&self, msg: &str);

    /// Log an error message.
    fn error(&self, msg: &str);
}

impl<T: Reporter + ?Sized> Reporter for std::sync::Arc<T> {
    fn section(&self, title: &str) {
        (**self).section(title);
    }
    fn step_started(&self, index: usize, total: usize, line: &str) {
        (**self).step_started(index, total, line);
    }
    fn step_finished(&self, index: usize, total: usize) {
        (**self).step_finished(index, total);
    }
    fn step_failed(&self, index: usize, reason: &str) {
        (**self).step_failed(index, reason);
    }
    fn info(&self, msg: &str) {
        (**self).info(msg);
    }
    fn success(&self, msg: &str) {
        (**self).success(msg);
    }
    fn warning(&self, msg: &str) {
        (**self).warning(msg);
    }
    fn error(&self, msg: &str) {
        (**self).error(msg);
    }
}

/// A no-op reporter for silent operations (e.g. library use, testing).
#[derive(Debug, Clone, Copy)]
pub struct NullReporter;

impl Reporter for NullReporter {
    fn section(&self, _: &str) {}
    fn step_started(&self, _: usize, _: usize, _: &str) {}
    fn step_finished(&self, _: usize, _: usize) {}
    fn step_failed(&self, _: usize, _: &str) {}
    fn info(&self, _: &str) {}
    fn success(&self, _: &str) {}
    fn warning(&self, _: &str) {}
    fn error(&self, _: &str) {}
}
