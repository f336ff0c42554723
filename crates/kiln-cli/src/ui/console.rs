//! Terminal implementation of the core [`Reporter`] trait.

use kiln_core::Reporter;

/// Prints orchestration progress to stdout/stderr.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleReporter {
    verbose: bool,
}

impl ConsoleReporter {
    /// Create a reporter; `verbose` adds per-step completion marks.
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl Reporter for ConsoleReporter {
    fn section(&self, title: &str) {
        println!("==> {title}");
    }

    fn step_started(&self, index: usize, total: usize, line: &str) {
        println!("  [{index}/{total}] {line}");
    }

    fn step_finished(&self, index: usize, total: usize) {
        if self.verbose {
            println!("  [{index}/{total}] done");
        }
    }

    fn step_failed(&self, index: usize, reason: &str) {
        eprintln!("  ✗ step {index} {reason}");
    }

    fn info(&self, msg: &str) {
        println!("  {msg}");
    }

    fn success(&self, msg: &str) {
        println!("✓ {msg}");
    }

    fn warning(&self, msg: &str) {
        println!("! {msg}");
    }

    fn error(&self, msg: &str) {
        eprintln!("✗ {msg}");
    }
}
