//! Plain zap forwarding.

mod logging_sink;

pub use logging_sink::LoggingPlainZapSink;
