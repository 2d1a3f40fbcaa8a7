mod terminal;
pub use terminal::TerminalReporter;
