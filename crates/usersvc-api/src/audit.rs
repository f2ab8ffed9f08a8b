//! # Audit Side-Channel
//!
//! Best-effort record of user actions, decoupled from the response path.
//!
//! Handlers call [`AuditLog::record`], which pushes an [`AuditEntry`] onto a
//! bounded channel with `try_send` and returns immediately. A background
//! worker drains the channel into an [`AuditWriter`]. A full channel drops
//! the entry; a failing writer is logged. Neither is ever visible to the
//! client, and entries carry no ordering guarantee.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::mpsc::{self, error::TrySendError};
use usersvc_core::UserId;

/// Kind of action recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Get,
    Create,
    Update,
    Delete,
}

impl AuditAction {
    /// Return the string representation of this action.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Create => "CREATE",
            Self::Update => "UPDATE",
            Self::Delete => "DELETE",
        }
    }
}

impl std::fmt::Display for AuditAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One audit record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuditEntry {
    pub action: AuditAction,
    pub user_id: UserId,
    pub timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// Stamp an entry with the current time.
    pub fn now(action: AuditAction, user_id: UserId) -> Self {
        Self {
            action,
            user_id,
            timestamp: Utc::now(),
        }
    }
}

/// Failure to write an audit entry.
#[derive(Error, Debug)]
pub enum AuditError {
    /// The backing sink rejected the entry.
    #[error("audit sink unavailable: {0}")]
    Unavailable(String),
}

/// Destination for audit entries.
///
/// Runs on the audit worker task, never on a request task.
pub trait AuditWriter: Send + Sync + 'static {
    /// Persist one entry.
    fn write(&self, entry: &AuditEntry) -> Result<(), AuditError>;
}

/// Writes entries as structured `tracing` events under target `audit`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingAuditWriter;

impl AuditWriter for TracingAuditWriter {
    fn write(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        tracing::info!(
            target: "audit",
            action = %entry.action,
            user_id = %entry.user_id,
            timestamp = %entry.timestamp.to_rfc3339(),
            "user action"
        );
        Ok(())
    }
}

/// Collects entries in memory. Cloned handles share the buffer.
#[derive(Debug, Clone, Default)]
pub struct MemoryAuditWriter {
    entries: Arc<Mutex<Vec<AuditEntry>>>,
}

impl MemoryAuditWriter {
    /// Create an empty collector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the entries written so far.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.entries.lock().clone()
    }
}

impl AuditWriter for MemoryAuditWriter {
    fn write(&self, entry: &AuditEntry) -> Result<(), AuditError> {
        self.entries.lock().push(entry.clone());
        Ok(())
    }
}

/// Handle used by request handlers to dispatch audit entries.
#[derive(Debug, Clone)]
pub struct AuditLog {
    tx: mpsc::Sender<AuditEntry>,
}

impl AuditLog {
    /// Start the audit worker on the current tokio runtime.
    ///
    /// `capacity` bounds the number of pending entries; zero is treated as one.
    ///
    /// # Panics
    ///
    /// Panics if called outside a tokio runtime.
    pub fn spawn<W: AuditWriter>(writer: W, capacity: usize) -> Self {
        let (tx, mut rx) = mpsc::channel::<AuditEntry>(capacity.max(1));
        tokio::spawn(async move {
            while let Some(entry) = rx.recv().await {
                if let Err(e) = writer.write(&entry) {
                    tracing::warn!(
                        action = %entry.action,
                        user_id = %entry.user_id,
                        "audit write failed: {e}"
                    );
                }
            }
            tracing::debug!("audit worker stopped");
        });
        Self { tx }
    }

    /// Dispatch an entry without waiting for it to be written.
    pub fn record(&self, action: AuditAction, user_id: UserId) {
        match self.tx.try_send(AuditEntry::now(action, user_id)) {
            Ok(()) => {}
            Err(TrySendError::Full(entry)) => {
                tracing::warn!(action = %entry.action, user_id = %entry.user_id, "audit channel full; entry dropped");
            }
            Err(TrySendError::Closed(entry)) => {
                tracing::warn!(action = %entry.action, user_id = %entry.user_id, "audit worker gone; entry dropped");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    struct FailingWriter;

    impl AuditWriter for FailingWriter {
        fn write(&self, _entry: &AuditEntry) -> Result<(), AuditError> {
            Err(AuditError::Unavailable("disk full".to_string()))
        }
    }

    async fn wait_for(writer: &MemoryAuditWriter, n: usize) -> Vec<AuditEntry> {
        for _ in 0..100 {
            let entries = writer.entries();
            if entries.len() >= n {
                return entries;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        writer.entries()
    }

    #[test]
    fn action_strings() {
        assert_eq!(AuditAction::Get.to_string(), "GET");
        assert_eq!(AuditAction::Create.to_string(), "CREATE");
        assert_eq!(AuditAction::Update.to_string(), "UPDATE");
        assert_eq!(AuditAction::Delete.to_string(), "DELETE");
    }

    #[test]
    fn entry_serializes() {
        let entry = AuditEntry::now(AuditAction::Create, UserId::new(3));
        let json = serde_json::to_value(&entry).unwrap();
        assert_eq!(json["action"], "CREATE");
        assert_eq!(json["user_id"], 3);
        assert!(json["timestamp"].is_string());
    }

    #[tokio::test]
    async fn recorded_entries_reach_the_writer() {
        let writer = MemoryAuditWriter::new();
        let log = AuditLog::spawn(writer.clone(), 16);

        log.record(AuditAction::Create, UserId::new(1));
        log.record(AuditAction::Delete, UserId::new(1));

        let entries = wait_for(&writer, 2).await;
        assert_eq!(entries.len(), 2);
        assert!(entries.iter().any(|e| e.action == AuditAction::Create));
        assert!(entries.iter().any(|e| e.action == AuditAction::Delete));
    }

    #[tokio::test]
    async fn writer_failure_is_swallowed() {
        let log = AuditLog::spawn(FailingWriter, 4);
        log.record(AuditAction::Get, UserId::new(1));
        tokio::time::sleep(Duration::from_millis(20)).await;
        // The worker survives a failed write.
        log.record(AuditAction::Get, UserId::new(2));
        assert!(!log.tx.is_closed());
    }

    #[test]
    fn full_channel_drops_without_blocking() {
        let (tx, mut rx) = mpsc::channel(1);
        let log = AuditLog { tx };

        for i in 1..=5 {
            log.record(AuditAction::Update, UserId::new(i));
        }

        let kept = rx.try_recv().unwrap();
        assert_eq!(kept.user_id, UserId::new(1));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_is_ignored() {
        let (tx, rx) = mpsc::channel(1);
        drop(rx);
        let log = AuditLog { tx };
        log.record(AuditAction::Get, UserId::new(1));
    }
}
