// ABOUTME: The external key-value store collaborator multipart reassembly is built on
// ABOUTME: Native async-fn-in-trait, matching the teacher crate's `SmppConnection`/`SmppClient` style

use std::future::Future;

use crate::error::StoreError;

/// The only interface this core requires of its key-value store (spec §6).
///
/// Implementations are expected to apply their own TTL to keys beginning
/// with `multi_`; this core never sets one (spec §3, MultipartBuffer
/// lifecycle).
pub trait MessageStore: Send + Sync {
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>, StoreError>> + Send;
    fn set(&self, key: &str, value: String) -> impl Future<Output = Result<(), StoreError>> + Send;
    fn delete(&self, key: &str) -> impl Future<Output = Result<(), StoreError>> + Send;
}

#[cfg(test)]
pub mod test_support {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// An in-memory `MessageStore` used only by this crate's own tests.
    /// No TTL is applied — tests that rely on eviction are out of scope
    /// (spec §5 leaves TTL to the external store).
    #[derive(Default)]
    pub struct InMemoryStore {
        data: Mutex<HashMap<String, String>>,
    }

    impl MessageStore for InMemoryStore {
        async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
            Ok(self.data.lock().unwrap().get(key).cloned())
        }

        async fn set(&self, key: &str, value: String) -> Result<(), StoreError> {
            self.data.lock().unwrap().insert(key.to_string(), value);
            Ok(())
        }

        async fn delete(&self, key: &str) -> Result<(), StoreError> {
            self.data.lock().unwrap().remove(key);
            Ok(())
        }
    }
}
