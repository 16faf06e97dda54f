use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::core::error::AppError;
use crate::modules::storage::ObjectStore;

/// In-memory store for tests; deletes can be made to fail on demand
pub struct MemoryStore {
    base_url: String,
    objects: Mutex<HashMap<String, (Vec<u8>, String)>>,
    fail_deletes: AtomicBool,
}

impl MemoryStore {
    pub fn new(base_url: &str) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            objects: Mutex::new(HashMap::new()),
            fail_deletes: AtomicBool::new(false),
        }
    }

    pub fn failing_deletes(base_url: &str) -> Self {
        let store = Self::new(base_url);
        store.fail_deletes.store(true, Ordering::SeqCst);
        store
    }

    pub fn contains(&self, key: &str) -> bool {
        self.objects.lock().unwrap().contains_key(key)
    }

    pub fn content_type(&self, key: &str) -> Option<String> {
        self.objects
            .lock()
            .unwrap()
            .get(key)
            .map(|(_, ct)| ct.clone())
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn put(&self, key: &str, data: &[u8], content_type: &str) -> Result<(), AppError> {
        self.objects
            .lock()
            .unwrap()
            .insert(key.to_string(), (data.to_vec(), content_type.to_string()));
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        if self.fail_deletes.load(Ordering::SeqCst) {
            return Err(AppError::Storage(format!("delete of '{}' refused", key)));
        }
        self.objects.lock().unwrap().remove(key);
        Ok(())
    }

    fn public_base_url(&self) -> &str {
        &self.base_url
    }
}
