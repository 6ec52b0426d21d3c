//! Storage gateway: host-provided, board-scoped key/value storage
//!
//! The engine only ever talks to storage through [`StorageGateway`].
//! Implementations:
//! - [`MemoryGateway`] - in-process, with failure injection for tests
//! - [`FileGateway`] - one JSON document per board on disk

mod file;
mod memory;

pub use file::FileGateway;
pub use memory::MemoryGateway;

use serde_json::{Map, Value};
use std::fmt;
use thiserror::Error;

/// A persisted record: field name to stored value, in insertion order
pub type Record = Map<String, Value>;

/// Where data is attached on the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Board,
}

/// Who can see the data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible to every board member
    Shared,
    /// Visible to the current member only; this tool never writes it
    #[allow(dead_code)]
    Private,
}

impl Scope {
    pub fn as_str(&self) -> &'static str {
        match self {
            Scope::Board => "board",
        }
    }
}

impl Visibility {
    pub fn as_str(&self) -> &'static str {
        match self {
            Visibility::Shared => "shared",
            Visibility::Private => "private",
        }
    }
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl fmt::Display for Visibility {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum GatewayError {
    /// Host did not answer (timeout, offline)
    #[error("storage unavailable: {0}")]
    Unavailable(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Host storage contract
///
/// `set` is all-or-nothing for the call and merges the given keys into the
/// existing record. `remove` deletes exactly the named keys.
#[allow(async_fn_in_trait)]
pub trait StorageGateway {
    /// Read one key; `Ok(None)` when it was never written
    async fn get(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
    ) -> Result<Option<Value>, GatewayError>;

    /// Read the full record
    async fn get_all(&self, scope: Scope, visibility: Visibility) -> Result<Record, GatewayError>;

    async fn set(
        &self,
        scope: Scope,
        visibility: Visibility,
        record: Record,
    ) -> Result<(), GatewayError>;

    async fn remove(
        &self,
        scope: Scope,
        visibility: Visibility,
        keys: &[String],
    ) -> Result<(), GatewayError>;
}
