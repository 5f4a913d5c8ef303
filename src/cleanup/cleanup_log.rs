use time::{OffsetDateTime, format_description::well_known::Rfc3339};

/// A human readable log message, either one line or several.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LogMessage {
    Line(String),
    Lines(Vec<String>),
}

impl LogMessage {
    pub fn lines(&self) -> &[String] {
        match self {
            LogMessage::Line(line) => std::slice::from_ref(line),
            LogMessage::Lines(lines) => lines,
        }
    }
}

impl From<&str> for LogMessage {
    fn from(line: &str) -> Self {
        LogMessage::Line(line.to_owned())
    }
}

impl From<String> for LogMessage {
    fn from(line: String) -> Self {
        LogMessage::Line(line)
    }
}

impl From<Vec<String>> for LogMessage {
    fn from(lines: Vec<String>) -> Self {
        LogMessage::Lines(lines)
    }
}

/// Receives progress messages from the cleanup. Never used for control flow.
pub trait LogSink: Send + Sync {
    fn log(&self, message: LogMessage);
}

/// Writes each message as a timestamped banner block through `tracing`.
///
/// ```text
/// ****** LOG_MSG 2024-05-01T12:00:00Z ******
///      Number of previously generated output files: 3
///
/// ```
#[derive(Debug, Default, Clone)]
pub struct TracingLogSink;

impl LogSink for TracingLogSink {
    fn log(&self, message: LogMessage) {
        let block = format_log_block(OffsetDateTime::now_utc(), &message);
        tracing::info!("{}", block);
    }
}

pub fn format_log_block(timestamp: OffsetDateTime, message: &LogMessage) -> String {
    let timestamp = timestamp.format(&Rfc3339).unwrap_or_else(|_| timestamp.to_string());
    let mut block = vec![format!("****** LOG_MSG {} ******", timestamp)];
    block.extend(message.lines().iter().map(|line| format!("     {}", line)));
    block.push(String::new());
    block.join("\n")
}
