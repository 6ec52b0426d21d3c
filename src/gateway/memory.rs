use serde_json::Value;
use std::collections::{HashMap, HashSet};
use tokio::sync::RwLock;

use super::{GatewayError, Record, Scope, StorageGateway, Visibility};

/// In-process gateway
///
/// Failures can be injected per key (reads) or per operation (set/remove)
/// to exercise degraded paths.
#[derive(Debug, Default)]
pub struct MemoryGateway {
    records: RwLock<HashMap<(Scope, Visibility), Record>>,
    failing_reads: RwLock<HashSet<String>>,
    fail_get_all: RwLock<bool>,
    fail_set: RwLock<bool>,
    fail_remove: RwLock<bool>,
}

impl MemoryGateway {
    #[cfg(test)]
    pub fn new() -> Self {
        Self::default()
    }

    /// Start with a shared board record already persisted
    pub fn with_shared(record: Record) -> Self {
        Self {
            records: RwLock::new(HashMap::from([((Scope::Board, Visibility::Shared), record)])),
            ..Self::default()
        }
    }

    #[cfg(test)]
    pub async fn fail_reads_of(&self, key: &str) {
        self.failing_reads.write().await.insert(key.to_string());
    }

    #[cfg(test)]
    pub async fn fail_get_all(&self, fail: bool) {
        *self.fail_get_all.write().await = fail;
    }

    #[cfg(test)]
    pub async fn fail_set(&self, fail: bool) {
        *self.fail_set.write().await = fail;
    }

    #[cfg(test)]
    pub async fn fail_remove(&self, fail: bool) {
        *self.fail_remove.write().await = fail;
    }
}

impl StorageGateway for MemoryGateway {
    async fn get(
        &self,
        scope: Scope,
        visibility: Visibility,
        key: &str,
    ) -> Result<Option<Value>, GatewayError> {
        if self.failing_reads.read().await.contains(key) {
            return Err(GatewayError::Unavailable(format!("read of '{key}' timed out")));
        }
        Ok(self
            .records
            .read()
            .await
            .get(&(scope, visibility))
            .and_then(|record| record.get(key).cloned()))
    }

    async fn get_all(&self, scope: Scope, visibility: Visibility) -> Result<Record, GatewayError> {
        if *self.fail_get_all.read().await {
            return Err(GatewayError::Unavailable("record read timed out".to_string()));
        }
        Ok(self
            .records
            .read()
            .await
            .get(&(scope, visibility))
            .cloned()
            .unwrap_or_default())
    }

    async fn set(
        &self,
        scope: Scope,
        visibility: Visibility,
        record: Record,
    ) -> Result<(), GatewayError> {
        if *self.fail_set.read().await {
            return Err(GatewayError::PermissionDenied("write rejected by host".to_string()));
        }
        let mut records = self.records.write().await;
        let stored = records.entry((scope, visibility)).or_default();
        for (key, value) in record {
            stored.insert(key, value);
        }
        Ok(())
    }

    async fn remove(
        &self,
        scope: Scope,
        visibility: Visibility,
        keys: &[String],
    ) -> Result<(), GatewayError> {
        if *self.fail_remove.read().await {
            return Err(GatewayError::Unavailable("remove timed out".to_string()));
        }
        if let Some(stored) = self.records.write().await.get_mut(&(scope, visibility)) {
            for key in keys {
                stored.shift_remove(key);
            }
        }
        Ok(())
    }
}
