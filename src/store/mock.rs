use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::RwLock;

use futures::future::BoxFuture;
use futures::FutureExt;

use super::{Store, UploadReceipt};
use crate::errors::StoreError;

/// An in-memory store double that records every upload.
#[derive(Default)]
pub struct MockStore {
    pub uploads: RwLock<Vec<(String, String)>>,
    failing: AtomicBool,
}

impl MockStore {
    pub fn new() -> Self {
        MockStore::default()
    }

    /// A store whose every save fails, for exercising the sync-failure path.
    pub fn failing() -> Self {
        MockStore {
            failing: AtomicBool::new(true),
            ..MockStore::default()
        }
    }

    pub fn upload_count(&self) -> usize {
        self.uploads.read().unwrap().len()
    }

    pub fn last_upload(&self) -> Option<(String, String)> {
        self.uploads.read().unwrap().last().cloned()
    }
}

impl Store for MockStore {
    type Output = UploadReceipt;

    fn save(&self, filename: String, csv: String) -> BoxFuture<Result<UploadReceipt, StoreError>> {
        mock_save(self, filename, csv).boxed()
    }
}

async fn mock_save(
    store: &MockStore,
    filename: String,
    csv: String,
) -> Result<UploadReceipt, StoreError> {
    if store.failing.load(Ordering::SeqCst) {
        return Err(StoreError::Failed {
            message: "mock store is failing".to_owned(),
        });
    }

    let mut uploads = store.uploads.write().unwrap();
    uploads.push((filename, csv));

    Ok(UploadReceipt {
        file_id: Some(format!("mock-{}", uploads.len())),
    })
}
