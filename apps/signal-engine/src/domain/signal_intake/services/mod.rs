//! Signal Intake Services

mod signal_parser;

pub use signal_parser::SignalParser;
