//! Heuristic domain availability backed by DNS lookups.

pub mod checker;
pub mod hickory;
pub mod probe;

pub use checker::{AvailabilityChecker, DEFAULT_DEADLINE};
pub use hickory::HickoryProbe;
pub use probe::{DnsProbe, LookupError, RecordQuery};
