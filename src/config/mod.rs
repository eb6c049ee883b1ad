//! Configuration module for the Student Opinion backend.
//!
//! All configuration is loaded from environment variables with sensible defaults.
//! Only the MongoDB connection string is mandatory.

use std::env;
use std::net::SocketAddr;
use std::path::PathBuf;

/// Default read size for each streamed PDF chunk (GridFS default chunk size).
pub const DEFAULT_DOWNLOAD_CHUNK_BYTES: usize = 255 * 1024;

/// Fatal configuration problems detected at startup.
#[derive(Debug)]
pub enum ConfigError {
    /// A required variable is not set
    Missing(&'static str),
    /// A variable is set but cannot be parsed
    Invalid { name: &'static str, value: String },
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(name) => write!(f, "{} environment variable is not set", name),
            ConfigError::Invalid { name, value } => {
                write!(f, "invalid value for {}: {:?}", name, value)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// MongoDB connection string
    pub mongodb_uri: String,
    /// Database holding articles and the PDF bucket
    pub database: String,
    /// Collection with article documents
    pub articles_collection: String,
    /// GridFS bucket name for PDF files
    pub pdf_bucket: String,
    /// Prebuilt frontend served for unmatched routes
    pub static_dir: Option<PathBuf>,
    /// Address to bind the server to
    pub bind_addr: SocketAddr,
    /// Log level (trace, debug, info, warn, error)
    pub log_level: String,
    /// Read size for streamed PDF chunks
    pub download_chunk_bytes: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let mongodb_uri = env::var("MONGODB_URI")
            .ok()
            .filter(|uri| !uri.trim().is_empty())
            .ok_or(ConfigError::Missing("MONGODB_URI"))?;

        let database = env::var("TSO_DATABASE").unwrap_or_else(|_| "thestudentopinion".to_string());

        let articles_collection =
            env::var("TSO_ARTICLES_COLLECTION").unwrap_or_else(|_| "articles".to_string());

        let pdf_bucket = env::var("TSO_PDF_BUCKET").unwrap_or_else(|_| "fs".to_string());

        let static_dir = env::var("TSO_STATIC_DIR").ok().map(PathBuf::from);

        let raw_addr = env::var("TSO_BIND_ADDR").unwrap_or_else(|_| "0.0.0.0:8000".to_string());
        let bind_addr = raw_addr.parse().map_err(|_| ConfigError::Invalid {
            name: "TSO_BIND_ADDR",
            value: raw_addr.clone(),
        })?;

        let log_level = env::var("TSO_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

        let download_chunk_bytes = match env::var("TSO_DOWNLOAD_CHUNK_BYTES") {
            Ok(raw) => match raw.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "TSO_DOWNLOAD_CHUNK_BYTES",
                        value: raw,
                    })
                }
            },
            Err(_) => DEFAULT_DOWNLOAD_CHUNK_BYTES,
        };

        Ok(Self {
            mongodb_uri,
            database,
            articles_collection,
            pdf_bucket,
            static_dir,
            bind_addr,
            log_level,
            download_chunk_bytes,
        })
    }
}
