//! Core traits for the ncdns webhook
//!
//! This module defines the abstract interfaces that all implementations must follow.
//!
//! - [`RecordSetRepository`]: Fetch and replace a domain's full record set
//! - [`IpSource`]: Discover the client IP the registrar expects

pub mod ip_source;
pub mod record_store;

pub use ip_source::IpSource;
pub use record_store::{RecordSetRepository, RecordSetRepositoryFactory};
