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

//! Errors returned by transfers.
//!
//! Every failure aborts the whole transfer. None of these errors are retried
//! by this crate.

/// A boxed error, used where the concrete type depends on a collaborator.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// The reasons a transfer can fail.
///
/// # Example
/// ```
/// # use url2gs::{Error, StorageTarget};
/// let err = StorageTarget::parse("s3://bucket/key").unwrap_err();
/// assert!(matches!(err, Error::InvalidDestinationSyntax(ref d) if d == "s3://bucket/key"));
/// ```
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum Error {
    /// The destination is not of the form `gs://BUCKET/KEY`.
    #[error("invalid gs:// URL syntax: {0}")]
    InvalidDestinationSyntax(String),

    /// The request to the source URL could not be completed.
    #[error("failed to fetch source: {0}")]
    SourceFetchFailed(#[source] reqwest::Error),

    /// The source responded with a status code other than 200.
    #[error("failed to fetch file, status: {status_code}")]
    SourceFetchRejected { status_code: u16 },

    /// The `Content-Length` header in the source response is not a byte count.
    #[error("invalid content length from response: {0:?}")]
    InvalidContentLength(String),

    /// The source declared a length above the configured limit.
    ///
    /// This is detected before any of the body is read.
    #[error("content length greater than max size ({declared_length} > {max_bytes})")]
    DeclaredLengthExceedsLimit { declared_length: u64, max_bytes: u64 },

    /// The source produced more bytes than the configured limit.
    ///
    /// This covers sources that omit their length, or declare a length smaller
    /// than what they actually send.
    #[error("limited reader passed limit {max_bytes}")]
    TransferLimitExceeded { max_bytes: u64 },

    /// The source failed while the body was streamed.
    #[error("failed to read source body: {0}")]
    SourceReadFailed(#[source] BoxError),

    /// The upload failed.
    ///
    /// Failures reading the payload, including [Error::TransferLimitExceeded],
    /// are reported through this variant. Use [Error::is_limit_exceeded] to
    /// detect those.
    #[error("upload failed: {0}")]
    UploadFailed(#[source] BoxError),
}

impl Error {
    /// Returns the HTTP status code of a rejected source request, if any.
    pub fn status_code(&self) -> Option<u16> {
        match self {
            Self::SourceFetchRejected { status_code } => Some(*status_code),
            _ => None,
        }
    }

    /// Returns true if the transfer stopped because the source sent too many
    /// bytes, either as declared in its headers or as counted mid-stream.
    ///
    /// The mid-stream failure is raised while the upload transport reads the
    /// payload, and it may be wrapped several times before it reaches the
    /// caller. This function searches the full chain of sources.
    pub fn is_limit_exceeded(&self) -> bool {
        let mut current: Option<&(dyn std::error::Error + 'static)> = Some(self);
        while let Some(e) = current {
            if let Some(
                Self::TransferLimitExceeded { .. } | Self::DeclaredLengthExceedsLimit { .. },
            ) = e.downcast_ref::<Self>()
            {
                return true;
            }
            current = e.source();
        }
        false
    }
}
