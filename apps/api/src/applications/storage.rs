//! Resume object storage.
//!
//! `AppState` holds an `Arc<dyn ResumeStorage>`; production uses S3 (or any
//! S3-compatible store), tests use an in-memory map.

use async_trait::async_trait;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use thiserror::Error;
use tracing::info;
use uuid::Uuid;

pub const PDF_CONTENT_TYPE: &str = "application/pdf";
const FALLBACK_FILENAME: &str = "resume.pdf";

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("upload of {key} failed: {message}")]
    Upload { key: String, message: String },
}

#[async_trait]
pub trait ResumeStorage: Send + Sync {
    /// Writes `body` at `key`, replacing any existing object.
    async fn upload(&self, key: &str, body: Bytes, content_type: &str)
        -> Result<(), StorageError>;

    /// Public URL for an object key.
    fn public_url(&self, key: &str) -> String;
}

/// Object key for a resume: `{user_id}/{job_id}/{filename}`.
pub fn resume_object_key(user_id: Uuid, job_id: Uuid, filename: Option<&str>) -> String {
    format!("{user_id}/{job_id}/{}", sanitize_filename(filename))
}

/// Keeps only the final path component so a client cannot escape its prefix.
fn sanitize_filename(filename: Option<&str>) -> String {
    let name = filename
        .and_then(|f| f.rsplit(|c| c == '/' || c == '\\').next())
        .map(str::trim)
        .unwrap_or_default();

    if name.is_empty() || name == "." || name == ".." {
        FALLBACK_FILENAME.to_string()
    } else {
        name.to_string()
    }
}

/// Joins a public base URL and an object key, percent-encoding each segment.
pub fn join_public_url(base: &str, key: &str) -> String {
    let encoded: Vec<String> = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect();
    format!("{}/{}", base.trim_end_matches('/'), encoded.join("/"))
}

pub struct S3ResumeStorage {
    client: aws_sdk_s3::Client,
    bucket: String,
    public_base: String,
}

impl S3ResumeStorage {
    pub fn new(client: aws_sdk_s3::Client, bucket: String, public_base: String) -> Self {
        Self {
            client,
            bucket,
            public_base,
        }
    }
}

#[async_trait]
impl ResumeStorage for S3ResumeStorage {
    async fn upload(
        &self,
        key: &str,
        body: Bytes,
        content_type: &str,
    ) -> Result<(), StorageError> {
        let size = body.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(body))
            .content_type(content_type)
            .send()
            .await
            .map_err(|e| StorageError::Upload {
                key: key.to_string(),
                message: e.to_string(),
            })?;

        info!("Uploaded {size} bytes to s3://{}/{}", self.bucket, key);
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        join_public_url(&self.public_base, key)
    }
}

#[cfg(test)]
pub(crate) mod memory {
    use std::collections::HashMap;
    use std::sync::Mutex;

    use super::*;

    /// In-memory store; `failing()` makes every upload error.
    #[derive(Default)]
    pub struct MemoryStorage {
        pub objects: Mutex<HashMap<String, (Bytes, String)>>,
        fail: bool,
    }

    impl MemoryStorage {
        pub fn failing() -> Self {
            Self {
                objects: Mutex::default(),
                fail: true,
            }
        }
    }

    #[async_trait]
    impl ResumeStorage for MemoryStorage {
        async fn upload(
            &self,
            key: &str,
            body: Bytes,
            content_type: &str,
        ) -> Result<(), StorageError> {
            if self.fail {
                return Err(StorageError::Upload {
                    key: key.to_string(),
                    message: "bucket unavailable".to_string(),
                });
            }
            self.objects
                .lock()
                .unwrap()
                .insert(key.to_string(), (body, content_type.to_string()));
            Ok(())
        }

        fn public_url(&self, key: &str) -> String {
            join_public_url("http://storage.test/resumes", key)
        }
    }
}
