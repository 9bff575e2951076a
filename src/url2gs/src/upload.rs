// Copyright 2025 Google LLC
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     https://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Upload transports.
//!
//! The transfer orchestrator only needs one operation from the object storage
//! service: create an object from a single pass over a [StreamingSource]. The
//! [Uploader] trait captures that operation, and [XmlUploader] implements it
//! using the Cloud Storage XML API.

use crate::BoxError;
use crate::metadata::UploadMetadata;
use crate::streaming_source::StreamingSource;
use crate::target::StorageTarget;

mod xml;

pub use xml::{ClientBuilder, XmlUploader};

/// Defines the trait used by [Transfer][crate::Transfer] to create objects.
///
/// Application developers may need to implement this trait to mock the
/// storage service, or to upload the data using a different protocol.
///
/// Implementations must read the payload exactly once, from start to end, and
/// must not retry reads. Any error returned by the payload must fail the
/// upload, and should be included in the chain of sources of the returned
/// error.
pub trait Uploader: std::fmt::Debug + Send + Sync {
    /// Creates (or replaces) the object at `target` with the contents of
    /// `payload`.
    fn upload<P>(
        &self,
        target: &StorageTarget,
        payload: P,
        metadata: &UploadMetadata,
    ) -> impl Future<Output = Result<(), BoxError>> + Send
    where
        P: StreamingSource + Send + Sync + 'static;
}

/// Errors returned by [XmlUploader].
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum UploadError {
    /// The credentials could not be created, or could not produce the
    /// authentication headers.
    #[error("cannot authenticate the upload request: {0}")]
    Authentication(#[source] BoxError),

    /// The payload returned an error before it was fully uploaded.
    #[error("cannot read the upload payload: {0}")]
    Payload(#[source] BoxError),

    /// The request could not be sent, or the response could not be received.
    #[error("cannot send the upload request: {0}")]
    Send(#[source] reqwest::Error),

    /// The bucket or object name has `.` or `..` path segments, which the XML
    /// API path cannot represent.
    #[error("cannot address {0} in a request path, it has `.` or `..` segments")]
    UnaddressableName(String),

    /// The service rejected the upload.
    #[error("the service rejected the upload with status {status}: {body}")]
    Http { status: u16, body: String },
}

impl UploadError {
    /// The HTTP status code returned by the service, if any.
    pub fn http_status_code(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }
}
