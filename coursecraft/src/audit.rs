/*
SPDX-FileCopyrightText: Copyright 2026 LG Electronics Inc.
SPDX-License-Identifier: MIT
*/

//! Append-only activity log.
//!
//! Hosts inject an [`AuditSink`] into the components that should report
//! user-visible actions (course added, conflict created, session expired).
//! There is no process-wide store: each host decides which sink to pass and
//! when to discard it.

use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Severity of an audit entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum AuditLevel {
    Info,
    Warning,
    Error,
}

/// One recorded action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    /// Unique within the sink that produced it.
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub level: AuditLevel,
    pub message: String,
    pub user: String,
}

/// Destination for audit entries.  Must never fail the caller.
pub trait AuditSink: Send + Sync {
    fn record(&self, level: AuditLevel, message: &str, user: &str);
}

/// In-memory sink.  Starts empty and only ever grows.
#[derive(Debug, Default)]
pub struct MemoryAuditLog {
    entries: Mutex<Vec<AuditEntry>>,
}

impl MemoryAuditLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of all entries, newest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        let guard = match self.entries.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.iter().rev().cloned().collect()
    }

    pub fn len(&self) -> usize {
        match self.entries.lock() {
            Ok(g) => g.len(),
            Err(poisoned) => poisoned.into_inner().len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl AuditSink for MemoryAuditLog {
    fn record(&self, level: AuditLevel, message: &str, user: &str) {
        let mut guard = match self.entries.lock() {
            Ok(g) => g,
            Err(poisoned) => poisoned.into_inner(),
        };
        let seq = guard.len() + 1;
        guard.push(AuditEntry {
            id: format!("log_{seq:06}"),
            timestamp: Utc::now(),
            level,
            message: message.to_string(),
            user: user.to_string(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_log_is_empty() {
        let log = MemoryAuditLog::new();
        assert!(log.is_empty());
        assert!(log.entries().is_empty());
    }

    #[test]
    fn entries_are_listed_newest_first() {
        let log = MemoryAuditLog::new();
        log.record(AuditLevel::Info, "first", "alex");
        log.record(AuditLevel::Warning, "second", "alex");

        let entries = log.entries();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].message, "second");
        assert_eq!(entries[0].level, AuditLevel::Warning);
        assert_eq!(entries[1].message, "first");
        assert!(entries[0].timestamp >= entries[1].timestamp);
    }

    #[test]
    fn ids_are_unique() {
        let log = MemoryAuditLog::new();
        for i in 0..5 {
            log.record(AuditLevel::Info, &format!("m{i}"), "u");
        }
        let mut ids: Vec<String> = log.entries().into_iter().map(|e| e.id).collect();
        ids.sort();
        ids.dedup();
        assert_eq!(ids.len(), 5);
    }

    #[test]
    fn usable_as_trait_object() {
        let log = std::sync::Arc::new(MemoryAuditLog::new());
        let sink: std::sync::Arc<dyn AuditSink> = log.clone();
        sink.record(AuditLevel::Error, "boom", "admin");
        assert_eq!(log.len(), 1);
        assert_eq!(log.entries()[0].user, "admin");
    }
}
