//! In-memory stores used by tests in place of MongoDB.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use bytes::Bytes;
use futures::stream::{self, StreamExt};
use mongodb::bson::{oid::ObjectId, Bson, Document};

use super::{ArticleStore, BlobDownload, BlobStore, StoreError};

/// Article documents kept in insertion order.
#[derive(Default)]
pub struct MemoryArticleStore {
    documents: RwLock<Vec<Document>>,
    failure: RwLock<Option<String>>,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, document: Document) {
        self.documents.write().unwrap().push(document);
    }

    /// Set `approved` on the document whose `_id` equals `id`.
    pub fn set_approved(&self, id: ObjectId, approved: bool) {
        let mut documents = self.documents.write().unwrap();
        for document in documents.iter_mut() {
            if document.get_object_id("_id").ok() == Some(id) {
                document.insert("approved", approved);
            }
        }
    }

    /// Make every query fail with `message` until cleared with `None`.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.write().unwrap() = message.map(str::to_string);
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn find_sorted(
        &self,
        filter: Document,
        sort: Document,
    ) -> Result<Vec<Document>, StoreError> {
        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(StoreError::Unavailable(message));
        }

        let mut matches: Vec<Document> = self
            .documents
            .read()
            .unwrap()
            .iter()
            .filter(|document| {
                filter
                    .iter()
                    .all(|(field, expected)| document.get(field) == Some(expected))
            })
            .cloned()
            .collect();

        // Stable, so ties keep insertion order.
        matches.sort_by(|a, b| {
            for (field, direction) in sort.iter() {
                let mut ordering = compare_values(a.get(field), b.get(field));
                if is_descending(direction) {
                    ordering = ordering.reverse();
                }
                if ordering != Ordering::Equal {
                    return ordering;
                }
            }
            Ordering::Equal
        });

        Ok(matches)
    }
}

fn is_descending(direction: &Bson) -> bool {
    match direction {
        Bson::Int32(n) => *n < 0,
        Bson::Int64(n) => *n < 0,
        Bson::Double(n) => *n < 0.0,
        _ => false,
    }
}

/// Rank of a BSON type in MongoDB's cross-type sort order.
fn type_rank(value: Option<&Bson>) -> u8 {
    match value {
        None | Some(Bson::Null) | Some(Bson::Undefined) => 0,
        Some(Bson::Int32(_)) | Some(Bson::Int64(_)) | Some(Bson::Double(_)) => 1,
        Some(Bson::String(_)) => 2,
        Some(Bson::ObjectId(_)) => 3,
        Some(Bson::Boolean(_)) => 4,
        Some(Bson::DateTime(_)) => 5,
        Some(_) => 6,
    }
}

fn as_f64(value: &Bson) -> Option<f64> {
    match value {
        Bson::Int32(n) => Some(f64::from(*n)),
        Bson::Int64(n) => Some(*n as f64),
        Bson::Double(n) => Some(*n),
        _ => None,
    }
}

fn compare_values(a: Option<&Bson>, b: Option<&Bson>) -> Ordering {
    let rank = type_rank(a).cmp(&type_rank(b));
    if rank != Ordering::Equal {
        return rank;
    }

    match (a, b) {
        (Some(Bson::String(x)), Some(Bson::String(y))) => x.cmp(y),
        (Some(Bson::ObjectId(x)), Some(Bson::ObjectId(y))) => x.bytes().cmp(&y.bytes()),
        (Some(Bson::Boolean(x)), Some(Bson::Boolean(y))) => x.cmp(y),
        (Some(Bson::DateTime(x)), Some(Bson::DateTime(y))) => x.cmp(y),
        (Some(x), Some(y)) => match (as_f64(x), as_f64(y)) {
            (Some(x), Some(y)) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

struct StoredBlob {
    filename: String,
    chunks: Vec<Bytes>,
    /// Emit an error instead of ending after the last chunk
    broken: bool,
}

/// Blobs kept as their original chunks, with a count of open downloads.
#[derive(Default)]
pub struct MemoryBlobStore {
    blobs: RwLock<HashMap<ObjectId, StoredBlob>>,
    open_downloads: Arc<AtomicUsize>,
    failure: RwLock<Option<String>>,
}

/// Counts as an open download cursor until dropped.
struct OpenCursor(Arc<AtomicUsize>);

impl OpenCursor {
    fn acquire(counter: &Arc<AtomicUsize>) -> Self {
        counter.fetch_add(1, AtomicOrdering::SeqCst);
        Self(counter.clone())
    }
}

impl Drop for OpenCursor {
    fn drop(&mut self) {
        self.0.fetch_sub(1, AtomicOrdering::SeqCst);
    }
}

impl MemoryBlobStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&self, key: ObjectId, filename: &str, chunks: &[&[u8]]) {
        self.insert_blob(key, filename, chunks, false);
    }

    /// Store a blob whose download fails after its last chunk.
    pub fn insert_broken(&self, key: ObjectId, filename: &str, chunks: &[&[u8]]) {
        self.insert_blob(key, filename, chunks, true);
    }

    fn insert_blob(&self, key: ObjectId, filename: &str, chunks: &[&[u8]], broken: bool) {
        let blob = StoredBlob {
            filename: filename.to_string(),
            chunks: chunks.iter().map(|c| Bytes::copy_from_slice(c)).collect(),
            broken,
        };
        self.blobs.write().unwrap().insert(key, blob);
    }

    /// Downloads opened and not yet dropped.
    pub fn open_downloads(&self) -> usize {
        self.open_downloads.load(AtomicOrdering::SeqCst)
    }

    /// Make every open fail with `message` until cleared with `None`.
    pub fn fail_with(&self, message: Option<&str>) {
        *self.failure.write().unwrap() = message.map(str::to_string);
    }
}

#[async_trait]
impl BlobStore for MemoryBlobStore {
    async fn open_download(&self, key: ObjectId) -> Result<BlobDownload, StoreError> {
        if let Some(message) = self.failure.read().unwrap().clone() {
            return Err(StoreError::Unavailable(message));
        }

        let blobs = self.blobs.read().unwrap();
        let blob = blobs
            .get(&key)
            .ok_or_else(|| StoreError::NotFound(format!("no file with id {}", key)))?;

        let mut items: Vec<std::io::Result<Bytes>> = blob.chunks.iter().cloned().map(Ok).collect();
        if blob.broken {
            items.push(Err(std::io::Error::new(
                std::io::ErrorKind::UnexpectedEof,
                "chunk missing",
            )));
        }

        let cursor = OpenCursor::acquire(&self.open_downloads);
        let chunks = stream::iter(items)
            .map(move |item| {
                let _cursor = &cursor;
                item
            })
            .boxed();

        Ok(BlobDownload {
            filename: blob.filename.clone(),
            chunks,
        })
    }
}
