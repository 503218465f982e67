//! Fault-injecting store wrappers for coordinator tests.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use common::storage::memory::InMemoryBlobStore;
use common::storage::{BlobKey, BlobStore, StorageError};
use uuid::Uuid;

use super::{FileScope, FileService};
use crate::metadata::{
    FilePatch, FileRecord, InMemoryMetadataStore, MetadataError, MetadataStore, NewFileRecord,
};

fn injected(op: &str) -> StorageError {
    StorageError::Backend(format!("injected {op} failure"))
}

/// In-memory blob store whose operations can be made to fail on demand.
#[derive(Default)]
pub struct FaultyBlobStore {
    pub inner: InMemoryBlobStore,
    pub fail_put: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_exists: AtomicBool,
    /// `delete` reports success without removing anything.
    pub ignore_delete: AtomicBool,
    pub delete_calls: AtomicUsize,
}

impl FaultyBlobStore {
    pub fn deletes(&self) -> usize {
        self.delete_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl BlobStore for FaultyBlobStore {
    async fn put(&self, key: &BlobKey, data: &[u8]) -> Result<String, StorageError> {
        if self.fail_put.load(Ordering::SeqCst) {
            return Err(injected("put"));
        }
        self.inner.put(key, data).await
    }

    async fn get(&self, key: &BlobKey) -> Result<Vec<u8>, StorageError> {
        self.inner.get(key).await
    }

    async fn exists(&self, key: &BlobKey) -> Result<bool, StorageError> {
        if self.fail_exists.load(Ordering::SeqCst) {
            return Err(injected("exists"));
        }
        self.inner.exists(key).await
    }

    async fn delete(&self, key: &BlobKey) -> Result<(), StorageError> {
        self.delete_calls.fetch_add(1, Ordering::SeqCst);
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(injected("delete"));
        }
        if self.ignore_delete.load(Ordering::SeqCst) {
            return Ok(());
        }
        self.inner.delete(key).await
    }
}

/// In-memory metadata store whose writes can be made to fail on demand.
#[derive(Default)]
pub struct FaultyMetadataStore {
    pub inner: InMemoryMetadataStore,
    pub fail_insert: AtomicBool,
    pub fail_update: AtomicBool,
    /// `update_by_id` reports a blob key collision.
    pub conflict_update: AtomicBool,
    pub fail_delete: AtomicBool,
    pub fail_reads: AtomicBool,
}

fn unavailable(op: &str) -> MetadataError {
    MetadataError::Unavailable(format!("injected {op} failure"))
}

#[async_trait]
impl MetadataStore for FaultyMetadataStore {
    async fn insert(&self, record: NewFileRecord) -> Result<FileRecord, MetadataError> {
        if self.fail_insert.load(Ordering::SeqCst) {
            return Err(unavailable("insert"));
        }
        self.inner.insert(record).await
    }

    async fn find_by_id(&self, id: Uuid) -> Result<FileRecord, MetadataError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("find_by_id"));
        }
        self.inner.find_by_id(id).await
    }

    async fn find_by_scope(
        &self,
        tenant_id: Uuid,
        owner_id: Uuid,
    ) -> Result<Vec<FileRecord>, MetadataError> {
        if self.fail_reads.load(Ordering::SeqCst) {
            return Err(unavailable("find_by_scope"));
        }
        self.inner.find_by_scope(tenant_id, owner_id).await
    }

    async fn update_by_id(&self, id: Uuid, patch: FilePatch) -> Result<FileRecord, MetadataError> {
        if self.fail_update.load(Ordering::SeqCst) {
            return Err(unavailable("update"));
        }
        if self.conflict_update.load(Ordering::SeqCst) {
            return Err(MetadataError::Conflict("injected blob key collision".into()));
        }
        self.inner.update_by_id(id, patch).await
    }

    async fn delete_by_id(&self, id: Uuid) -> Result<(), MetadataError> {
        if self.fail_delete.load(Ordering::SeqCst) {
            return Err(unavailable("delete"));
        }
        self.inner.delete_by_id(id).await
    }
}

pub struct Fixture {
    pub service: FileService,
    pub blobs: Arc<FaultyBlobStore>,
    pub metadata: Arc<FaultyMetadataStore>,
    pub scope: FileScope,
}

impl Fixture {
    pub fn new() -> Self {
        let blobs = Arc::new(FaultyBlobStore::default());
        let metadata = Arc::new(FaultyMetadataStore::default());
        Self {
            service: FileService::new(blobs.clone(), metadata.clone()),
            blobs,
            metadata,
            scope: FileScope::new(Uuid::new_v4(), Uuid::new_v4()),
        }
    }

    /// True when no record references `key`.
    pub async fn unreferenced(&self, key: &BlobKey) -> bool {
        self.metadata
            .inner
            .all()
            .await
            .iter()
            .all(|r| &r.blob_key != key)
    }

    /// Every live record points at an existing blob, and no two share one.
    pub async fn assert_consistent(&self) {
        let records = self.metadata.inner.all().await;
        let mut seen = std::collections::HashSet::new();
        for record in &records {
            assert!(
                self.blobs.inner.exists(&record.blob_key).await.unwrap(),
                "record {} points at missing blob {}",
                record.id,
                record.blob_key
            );
            assert!(
                seen.insert(record.blob_key.clone()),
                "blob {} shared by several records",
                record.blob_key
            );
        }
    }
}
