use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

const MAX_ENTRIES: usize = 1000;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct AuditEntry {
    pub timestamp: DateTime<Utc>,
    pub action: String,
    pub details: String,
    /// Version committed by the action, if any.
    pub version: Option<u64>,
}

/// Bounded in-memory record of session actions, oldest first.
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    pub fn push(
        &mut self,
        action: impl Into<String>,
        details: impl Into<String>,
        version: Option<u64>,
    ) {
        self.entries.push(AuditEntry {
            timestamp: Utc::now(),
            action: action.into(),
            details: details.into(),
            version,
        });

        // Keep only the most recent entries
        if self.entries.len() > MAX_ENTRIES {
            self.entries.drain(0..self.entries.len() - MAX_ENTRIES);
        }
    }

    pub fn entries(&self) -> &[AuditEntry] {
        &self.entries
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_log_is_bounded() {
        let mut log = AuditLog::new();
        for i in 0..1005 {
            log.push("clean", format!("run {i}"), Some(i));
        }
        assert_eq!(log.len(), MAX_ENTRIES);
        assert_eq!(log.entries()[0].details, "run 5");
    }
}
