use chrono::{DateTime, Utc};

/// Time source for entity and audit timestamps.
pub trait Clock: Send + Sync {
    /// Returns the current instant.
    fn now(&self) -> DateTime<Utc>;
}
