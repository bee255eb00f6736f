use async_trait::async_trait;
use std::collections::HashMap;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt};
use tubely_storage::{ObjectReference, Storage, StorageError, StorageResult};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Object store kept in memory, signing deterministic URLs.
pub struct MockStorage {
    bucket: String,
    objects: Arc<Mutex<HashMap<String, StoredObject>>>,
    fail_uploads: AtomicBool,
}

impl MockStorage {
    pub fn new(bucket: &str) -> Self {
        Self {
            bucket: bucket.to_string(),
            objects: Arc::new(Mutex::new(HashMap::new())),
            fail_uploads: AtomicBool::new(false),
        }
    }

    /// Make every upload fail after the body has been read.
    pub fn fail_uploads(&self, fail: bool) {
        self.fail_uploads.store(fail, Ordering::SeqCst);
    }

    pub fn object(&self, key: &str) -> Option<StoredObject> {
        self.objects.lock().unwrap().get(key).cloned()
    }

    pub fn keys(&self) -> Vec<String> {
        self.objects.lock().unwrap().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.objects.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl Storage for MockStorage {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn upload_stream(
        &self,
        key: &str,
        content_type: &str,
        _content_length: Option<u64>,
        mut reader: Pin<Box<dyn AsyncRead + Send + Unpin>>,
    ) -> StorageResult<ObjectReference> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data).await?;

        if self.fail_uploads.load(Ordering::SeqCst) {
            return Err(StorageError::UploadFailed(
                "injected upload failure".to_string(),
            ));
        }

        self.objects.lock().unwrap().insert(
            key.to_string(),
            StoredObject {
                content_type: content_type.to_string(),
                data,
            },
        );
        Ok(ObjectReference::new(self.bucket.clone(), key))
    }

    async fn presigned_get_url(
        &self,
        reference: &ObjectReference,
        expires_in: Duration,
    ) -> StorageResult<String> {
        if reference.bucket() != self.bucket {
            return Err(StorageError::InvalidReference(format!(
                "unknown bucket '{}'",
                reference.bucket()
            )));
        }
        Ok(format!(
            "https://{}.s3.test/{}?X-Amz-Expires={}",
            self.bucket,
            reference.key(),
            expires_in.as_secs()
        ))
    }
}
