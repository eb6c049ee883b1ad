//! MongoDB-backed stores: a document collection for articles, GridFS for PDFs.

use async_trait::async_trait;
use futures::TryStreamExt;
use mongodb::bson::{doc, oid::ObjectId, Bson, Document};
use mongodb::gridfs::GridFsBucket;
use mongodb::options::GridFsBucketOptions;
use mongodb::{Client, Collection, Database};

use super::{read_chunks, ArticleStore, BlobDownload, BlobStore, StoreError};

/// Connect to MongoDB and select the database.
///
/// The driver connects lazily, so this only fails on a malformed connection string.
pub async fn connect(uri: &str, database: &str) -> Result<Database, StoreError> {
    let client = Client::with_uri_str(uri).await?;
    Ok(client.database(database))
}

/// Article documents in a MongoDB collection.
#[derive(Clone)]
pub struct MongoArticleStore {
    collection: Collection<Document>,
}

impl MongoArticleStore {
    pub fn new(database: &Database, collection: &str) -> Self {
        Self {
            collection: database.collection(collection),
        }
    }
}

#[async_trait]
impl ArticleStore for MongoArticleStore {
    async fn find_sorted(
        &self,
        filter: Document,
        sort: Document,
    ) -> Result<Vec<Document>, StoreError> {
        let cursor = self.collection.find(filter).sort(sort).await?;
        let documents = cursor.try_collect().await?;
        Ok(documents)
    }
}

/// PDF files in a GridFS bucket.
#[derive(Clone)]
pub struct MongoBlobStore {
    bucket: GridFsBucket,
    chunk_bytes: usize,
}

impl MongoBlobStore {
    pub fn new(database: &Database, bucket_name: &str, chunk_bytes: usize) -> Self {
        let mut options = GridFsBucketOptions::default();
        options.bucket_name = Some(bucket_name.to_string());

        Self {
            bucket: database.gridfs_bucket(options),
            chunk_bytes,
        }
    }
}

#[async_trait]
impl BlobStore for MongoBlobStore {
    async fn open_download(&self, key: ObjectId) -> Result<BlobDownload, StoreError> {
        let id = Bson::ObjectId(key);

        let file = self
            .bucket
            .find_one(doc! { "_id": id.clone() })
            .await?
            .ok_or_else(|| StoreError::NotFound(format!("no file with id {}", key)))?;

        // A file removed between the lookup and the open surfaces as FileNotFound.
        let stream = self.bucket.open_download_stream(id).await?;

        tracing::debug!(
            id = %key,
            length = file.length,
            "opened GridFS download stream"
        );

        Ok(BlobDownload {
            filename: file.filename.unwrap_or_default(),
            chunks: read_chunks(stream, self.chunk_bytes),
        })
    }
}
