//! Console presentation for orchestration progress.

pub mod console;

pub use console::ConsoleReporter;
