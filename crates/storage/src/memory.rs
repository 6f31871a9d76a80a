//! In-process [`ObjectStore`] for tests.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::{ObjectStore, StorageError, Visibility};

/// A stored object: bytes plus the content type it was uploaded with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub body: Vec<u8>,
    pub content_type: String,
}

#[derive(Debug, Default)]
pub struct MemoryObjectStore {
    objects: Mutex<HashMap<(Visibility, String), StoredObject>>,
}

impl MemoryObjectStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, visibility: Visibility, key: &str) -> Option<StoredObject> {
        self.objects
            .lock()
            .await
            .get(&(visibility, key.to_string()))
            .cloned()
    }

    pub async fn len(&self) -> usize {
        self.objects.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

#[async_trait]
impl ObjectStore for MemoryObjectStore {
    async fn put_object(
        &self,
        visibility: Visibility,
        key: &str,
        body: Vec<u8>,
        content_type: &str,
    ) -> Result<(), StorageError> {
        self.objects.lock().await.insert(
            (visibility, key.to_string()),
            StoredObject {
                body,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete_object(&self, visibility: Visibility, key: &str) -> Result<(), StorageError> {
        self.objects
            .lock()
            .await
            .remove(&(visibility, key.to_string()));
        Ok(())
    }

    async fn presigned_url(&self, key: &str) -> Result<String, StorageError> {
        if self.get(Visibility::Private, key).await.is_none() {
            return Err(StorageError::Request {
                operation: "presign",
                key: key.to_string(),
                message: "no such object".to_string(),
            });
        }
        Ok(format!("memory://private/{key}?signature=test"))
    }
}
