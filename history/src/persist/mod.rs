pub mod sqlite_kv;

/// Opaque durable key-value map the engine persists through.
///
/// Calls may fail; callers treat failures as non-fatal and keep the
/// in-memory state authoritative.
#[async_trait::async_trait]
pub trait KeyValueStore: Send + Sync {
    async fn get(&self, key: &str) -> anyhow::Result<Option<serde_json::Value>>;
    async fn set(&self, key: &str, value: serde_json::Value) -> anyhow::Result<()>;
    async fn remove(&self, key: &str) -> anyhow::Result<()>;
}
