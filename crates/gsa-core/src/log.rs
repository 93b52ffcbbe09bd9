//! Append-only analysis narration consumed by the presentation layer.
//!
//! Cascade rounds, N-1 risk findings, and the final pass/fail verdict are
//! reported as an ordered sequence of human-readable messages. The order is
//! part of the engine's contract: overload messages per iteration, then the
//! stability or collapse verdict, then the N-1 vulnerability block, then the
//! security summary. Downstream display renders the entries verbatim.
//!
//! Entries carry a severity tag so a consumer can colour-code risks without
//! parsing message text.

use serde::Serialize;

/// Severity of a log entry
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    /// Narration of normal progress
    Info,
    /// A risk finding (overload, N-1 vulnerability)
    Warning,
    /// A terminal condition (island, collapse)
    Error,
}

/// A single ordered entry in the analysis narration
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub message: String,
}

impl std::fmt::Display for LogEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

/// Ordered, append-only collection of analysis messages.
#[derive(Debug, Clone, Default, Serialize)]
pub struct AnalysisLog {
    entries: Vec<LogEntry>,
}

impl AnalysisLog {
    /// Create a new empty log
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a progress message
    pub fn info(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry {
            severity: Severity::Info,
            message: message.into(),
        });
    }

    /// Append a risk finding
    pub fn warning(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry {
            severity: Severity::Warning,
            message: message.into(),
        });
    }

    /// Append a terminal-condition message
    pub fn error(&mut self, message: impl Into<String>) {
        self.entries.push(LogEntry {
            severity: Severity::Error,
            message: message.into(),
        });
    }

    /// All entries in append order
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Message texts in append order
    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|e| e.message.as_str())
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Count entries with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.entries
            .iter()
            .filter(|e| e.severity == severity)
            .count()
    }

    /// True if any entry is a risk finding or worse
    pub fn has_findings(&self) -> bool {
        self.entries
            .iter()
            .any(|e| e.severity != Severity::Info)
    }
}

impl std::fmt::Display for AnalysisLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        for entry in &self.entries {
            writeln!(f, "{}", entry)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_preserves_order() {
        let mut log = AnalysisLog::new();
        log.info("first");
        log.warning("second");
        log.error("third");

        let messages: Vec<&str> = log.messages().collect();
        assert_eq!(messages, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_severity_counts() {
        let mut log = AnalysisLog::new();
        log.info("progress");
        log.warning("risk a");
        log.warning("risk b");

        assert_eq!(log.count(Severity::Info), 1);
        assert_eq!(log.count(Severity::Warning), 2);
        assert_eq!(log.count(Severity::Error), 0);
        assert!(log.has_findings());
        assert_eq!(log.len(), 3);
    }

    #[test]
    fn test_empty_log_has_no_findings() {
        let log = AnalysisLog::new();
        assert!(log.is_empty());
        assert!(!log.has_findings());
    }

    #[test]
    fn test_log_serialization() {
        let mut log = AnalysisLog::new();
        log.warning("overload on line 1-2");

        let json = serde_json::to_string(&log).unwrap();
        assert!(json.contains("\"warning\""));
        assert!(json.contains("overload on line 1-2"));
    }
}
