//! Blob streamer: opens PDF downloads and hands them out as owned byte streams.

use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};

use bytes::Bytes;
use futures::stream::{self, Stream, StreamExt};
use mongodb::bson::oid::ObjectId;

use crate::errors::{AppError, PDF_NOT_FOUND};
use crate::store::{BlobStore, ChunkStream, StoreError};

/// An open download, scoped to one response.
pub struct BlobHandle {
    pub key: ObjectId,
    /// Filename declared at upload time; may be empty
    pub filename: String,
    pub content: DownloadStream,
}

/// Byte stream over one blob.
///
/// The store cursor is released as soon as the content ends or fails, and otherwise
/// when the stream is dropped (e.g. the client disconnected mid-transfer).
pub struct DownloadStream {
    key: ObjectId,
    inner: ChunkStream,
    bytes_sent: u64,
    finished: bool,
}

impl DownloadStream {
    pub fn new(key: ObjectId, inner: ChunkStream) -> Self {
        Self {
            key,
            inner,
            bytes_sent: 0,
            finished: false,
        }
    }

    fn release(&mut self) {
        self.finished = true;
        self.inner = stream::empty().boxed();
    }
}

impl Stream for DownloadStream {
    type Item = std::io::Result<Bytes>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let this = self.get_mut();
        if this.finished {
            return Poll::Ready(None);
        }

        match this.inner.poll_next_unpin(cx) {
            Poll::Ready(Some(Ok(chunk))) => {
                this.bytes_sent += chunk.len() as u64;
                Poll::Ready(Some(Ok(chunk)))
            }
            Poll::Ready(Some(Err(e))) => {
                tracing::error!(
                    id = %this.key,
                    bytes_sent = this.bytes_sent,
                    error = %e,
                    "PDF stream failed mid-transfer"
                );
                this.release();
                Poll::Ready(Some(Err(e)))
            }
            Poll::Ready(None) => {
                tracing::debug!(id = %this.key, bytes_sent = this.bytes_sent, "PDF stream complete");
                this.release();
                Poll::Ready(None)
            }
            Poll::Pending => Poll::Pending,
        }
    }
}

impl Drop for DownloadStream {
    fn drop(&mut self) {
        if !self.finished {
            tracing::debug!(
                id = %self.key,
                bytes_sent = self.bytes_sent,
                "PDF stream dropped before completion"
            );
        }
    }
}

pub struct PdfStreamer {
    store: Arc<dyn BlobStore>,
}

impl PdfStreamer {
    pub fn new(store: Arc<dyn BlobStore>) -> Self {
        Self { store }
    }

    /// Open the PDF stored under `key`.
    pub async fn open_download(&self, key: ObjectId) -> Result<BlobHandle, AppError> {
        match self.store.open_download(key).await {
            Ok(download) => Ok(BlobHandle {
                key,
                filename: download.filename,
                content: DownloadStream::new(key, download.chunks),
            }),
            Err(StoreError::NotFound(_)) => Err(AppError::NotFound(PDF_NOT_FOUND.to_string())),
            Err(StoreError::Unavailable(msg)) => Err(AppError::StoreUnavailable(format!(
                "Error retrieving PDF: {}",
                msg
            ))),
        }
    }
}
