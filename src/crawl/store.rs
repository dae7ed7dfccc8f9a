//! Storage and audit bookkeeping for converted pages.
//!
//! The functions here decide what a storage layer should do; they never
//! talk to a store themselves. Times are passed in so every decision is
//! reproducible.

use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha1::{Digest, Sha1};

use crate::error::{Error, Result};

/// Default age after which a stored page is written again.
pub const DEFAULT_MAX_AGE_DAYS: i64 = 90;

/// A bucket and key prefix, parsed from `s3://bucket/prefix/`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLocation {
    /// Bucket name
    pub bucket: String,

    /// Key prefix, possibly empty
    pub prefix: String,
}

impl StoreLocation {
    /// Create a location from its parts.
    pub fn new(bucket: impl Into<String>, prefix: impl Into<String>) -> Self {
        Self {
            bucket: bucket.into(),
            prefix: prefix.into(),
        }
    }

    /// Parse an `s3://bucket/prefix` URI.
    pub fn parse(uri: &str) -> Result<Self> {
        let rest = uri
            .strip_prefix("s3://")
            .ok_or_else(|| Error::Config(format!("Store location must start with s3://: {}", uri)))?;
        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));
        if bucket.is_empty() {
            return Err(Error::Config(format!("Store location has no bucket: {}", uri)));
        }
        Ok(Self::new(bucket, prefix))
    }

    /// Key for a converted page stored at this location.
    pub fn page_key(&self, url: &str) -> String {
        object_key(&self.prefix, url)
    }
}

/// Object key for a page: the prefix, the SHA-1 of its URL in hex, `.txt`.
pub fn object_key(prefix: &str, url: &str) -> String {
    let digest = Sha1::digest(url.as_bytes());
    let mut key = String::with_capacity(prefix.len() + 44);
    key.push_str(prefix);
    for byte in digest.iter() {
        key.push_str(&format!("{:02x}", byte));
    }
    key.push_str(".txt");
    key
}

/// Path of a project's crawl index under an index prefix.
pub fn index_path(prefix: &str, project_id: &str) -> String {
    format!("{}{}/index.csv", prefix, project_id)
}

/// When an already-stored page should be written again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FreshnessPolicy {
    max_age: Duration,
}

impl FreshnessPolicy {
    /// Create a policy with the default window.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the window in days.
    pub fn with_max_age_days(mut self, days: i64) -> Self {
        self.max_age = Duration::days(days);
        self
    }

    /// The rewrite window.
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Whether to write a page, given when it was last written.
    ///
    /// A page never written, or written longer than the window ago, is
    /// written.
    pub fn needs_write(&self, last_modified: Option<DateTime<Utc>>, now: DateTime<Utc>) -> bool {
        match last_modified {
            Some(written) => now.signed_duration_since(written) > self.max_age,
            None => true,
        }
    }
}

impl Default for FreshnessPolicy {
    fn default() -> Self {
        Self {
            max_age: Duration::days(DEFAULT_MAX_AGE_DAYS),
        }
    }
}

/// Kind of stored object awaiting audit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AuditKind {
    /// Converted page text
    Webpage,
    /// Downloaded image
    Image,
    /// Downloaded file
    File,
}

impl AuditKind {
    /// Name of the audit queue for a project.
    pub fn queue_key(&self, project_id: &str) -> String {
        let kind = match self {
            AuditKind::Webpage => "webpage",
            AuditKind::Image => "image",
            AuditKind::File => "file",
        };
        format!("{}_audit_queue_{}", kind, project_id)
    }
}

/// One member of a sorted audit queue.
///
/// Members are only added if absent, so the score records when an object
/// was first queued.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Queue the member belongs to
    pub queue: String,

    /// `bucket/path` of the stored object
    pub member: String,

    /// Minutes since the Unix epoch
    pub score: i64,
}

impl AuditEntry {
    /// Create an entry for an object queued at `now`.
    pub fn new(kind: AuditKind, project_id: &str, bucket: &str, path: &str, now: DateTime<Utc>) -> Self {
        Self {
            queue: kind.queue_key(project_id),
            member: format!("{}/{}", bucket, path),
            score: unix_minutes(now),
        }
    }
}

/// Whole minutes since the Unix epoch.
pub fn unix_minutes(time: DateTime<Utc>) -> i64 {
    time.timestamp().div_euclid(60)
}

/// One line of the crawl index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexEntry {
    pub url: String,
    pub bucket: String,
    pub path: String,
}

impl IndexEntry {
    pub fn new(url: impl Into<String>, bucket: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            bucket: bucket.into(),
            path: path.into(),
        }
    }
}

impl fmt::Display for IndexEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}\t{}", self.url, self.bucket, self.path)
    }
}

/// Index of everything stored during one crawl.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlIndex {
    entries: Vec<IndexEntry>,
}

impl CrawlIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, entry: IndexEntry) {
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Tab-separated index content, one line per entry.
    pub fn render(&self) -> String {
        let mut output = String::new();
        for entry in &self.entries {
            output.push_str(&entry.to_string());
            output.push('\n');
        }
        output
    }
}

/// Everything a storage layer needs to do for one converted page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorePlan {
    /// Object key the text goes to
    pub key: String,

    /// Whether the object should be (re)written
    pub write: bool,

    /// Audit queue entry to add if absent
    pub audit: AuditEntry,

    /// Line for the crawl index
    pub index: IndexEntry,
}

impl StorePlan {
    /// Plan the storage of a converted page.
    ///
    /// The index line and audit entry are produced whether or not the
    /// object is rewritten.
    pub fn for_webpage(
        url: &str,
        location: &StoreLocation,
        project_id: &str,
        last_modified: Option<DateTime<Utc>>,
        policy: &FreshnessPolicy,
        now: DateTime<Utc>,
    ) -> Self {
        let key = location.page_key(url);
        let write = policy.needs_write(last_modified, now);
        if write {
            log::debug!("{} will be written to {}", url, key);
        } else {
            log::debug!("{} is fresh, skipping write", url);
        }

        Self {
            audit: AuditEntry::new(AuditKind::Webpage, project_id, &location.bucket, &key, now),
            index: IndexEntry::new(url, location.bucket.as_str(), key.as_str()),
            key,
            write,
        }
    }
}
