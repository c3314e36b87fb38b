use async_trait::async_trait;
use thiserror::Error;

/// Record families the checker asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RecordQuery {
    A,
    Any,
}

impl RecordQuery {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::A => "A",
            Self::Any => "ANY",
        }
    }
}

/// Classified lookup failure.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("name does not exist")]
    NxDomain,
    #[error("no records in answer")]
    NoAnswer,
    #[error("lookup timed out")]
    Timeout,
    #[error("lookup failed: {0}")]
    Other(String),
}

/// Transport used by [`crate::AvailabilityChecker`].
///
/// `Ok(())` means the query returned at least one record.
#[async_trait]
pub trait DnsProbe: Send + Sync {
    async fn probe(&self, host: &str, query: RecordQuery) -> Result<(), LookupError>;
}
