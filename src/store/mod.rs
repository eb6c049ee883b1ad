//! Store adapters for article documents and PDF blobs.
//!
//! MongoDB is the source of truth for both. The traits here are the only surface the
//! catalog and the streamer see, so tests can swap in the in-memory stores.

mod mongo;

#[cfg(test)]
pub mod memory;

pub use mongo::*;

use async_trait::async_trait;
use bytes::Bytes;
use futures::io::{AsyncRead, AsyncReadExt};
use futures::stream::{self, BoxStream, StreamExt};
use mongodb::bson::{oid::ObjectId, Document};
use mongodb::error::{ErrorKind, GridFsErrorKind};

/// Ordered, forward-only stream of blob content.
pub type ChunkStream = BoxStream<'static, std::io::Result<Bytes>>;

/// Errors raised by a store adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// Nothing stored under the requested key
    NotFound(String),
    /// Driver or communication fault
    Unavailable(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::NotFound(msg) => write!(f, "{}", msg),
            StoreError::Unavailable(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for StoreError {}

impl From<mongodb::error::Error> for StoreError {
    fn from(err: mongodb::error::Error) -> Self {
        match *err.kind {
            ErrorKind::GridFs(GridFsErrorKind::FileNotFound { .. }) => {
                StoreError::NotFound(err.to_string())
            }
            _ => {
                tracing::error!("MongoDB error: {:?}", err);
                StoreError::Unavailable(err.to_string())
            }
        }
    }
}

/// An open blob: its declared filename and a lazy reader over its content.
///
/// Dropping `chunks` releases the underlying store cursor.
pub struct BlobDownload {
    pub filename: String,
    pub chunks: ChunkStream,
}

/// Read access to the article collection.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Every document matching the equality `filter`, ordered by `sort`
    /// (`{field: 1 | -1, ...}`), fully materialised.
    async fn find_sorted(
        &self,
        filter: Document,
        sort: Document,
    ) -> Result<Vec<Document>, StoreError>;
}

/// Read access to the PDF bucket.
#[async_trait]
pub trait BlobStore: Send + Sync {
    /// Open a sequential download of the blob stored under `key`.
    ///
    /// Returns [`StoreError::NotFound`] when no blob exists under that key.
    async fn open_download(&self, key: ObjectId) -> Result<BlobDownload, StoreError>;
}

/// Turn an async reader into a stream of chunks of at most `chunk_bytes`.
///
/// Reads are issued one at a time, so chunks come out in reader order. The reader is
/// dropped as soon as it reports end of input or an error, or when the stream is dropped.
pub fn read_chunks<R>(reader: R, chunk_bytes: usize) -> ChunkStream
where
    R: AsyncRead + Send + 'static,
{
    let chunk_bytes = chunk_bytes.max(1);

    stream::try_unfold(Box::pin(reader), move |mut reader| async move {
        let mut buf = vec![0u8; chunk_bytes];
        let read = reader.read(&mut buf).await?;
        if read == 0 {
            return Ok(None);
        }
        buf.truncate(read);
        Ok(Some((Bytes::from(buf), reader)))
    })
    .boxed()
}
