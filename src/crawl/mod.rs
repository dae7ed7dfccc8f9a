//! Crawl-side helpers around the codec.
//!
//! Nothing here does I/O. [`links`] finds and classifies the URLs a page
//! points at; [`store`] computes object keys, freshness decisions, audit
//! queue entries and index lines for a storage layer to act on.

pub mod links;
pub mod store;

pub use links::{discover_links, Link, LinkError, LinkKind};
pub use store::{
    index_path, object_key, AuditEntry, AuditKind, CrawlIndex, FreshnessPolicy, IndexEntry,
    StoreLocation, StorePlan,
};
