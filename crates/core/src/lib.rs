//! Domain types shared by the HTTP layer, the DNS checker and storage.

pub mod catalogue;
pub mod hostname;
pub mod types;
