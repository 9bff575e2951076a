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

//! Stream an HTTP(S) download directly into a Cloud Storage object.
//!
//! This crate fetches a URL with a single `GET` request and relays the
//! response body, chunk by chunk, into an object upload. The payload is never
//! buffered in full, so memory usage does not depend on the object size.
//!
//! A [TransferPolicy][metadata::TransferPolicy] controls the upload: an
//! optional ceiling on the number of bytes copied, the access-control value
//! for the new object, and overrides for its content type and
//! content-disposition.
//!
//! # Example
//! ```no_run
//! # async fn sample() -> anyhow::Result<()> {
//! use url2gs::{StorageTarget, Transfer, metadata::TransferPolicy, upload::XmlUploader};
//! let target = StorageTarget::parse("gs://my-bucket/path/to/object.png")?;
//! let policy = TransferPolicy::new()
//!     .set_max_bytes(10 * 1024 * 1024)
//!     .set_access_control("private");
//! let transfer = Transfer::new(XmlUploader::builder().build()?);
//! transfer
//!     .run("https://example.com/image.png", &target, &policy)
//!     .await?;
//! # Ok(()) }
//! ```

pub mod config;
pub mod error;
pub mod limited_source;
pub mod metadata;
pub mod streaming_source;
pub mod target;
pub mod transfer;
pub mod upload;

pub use error::{BoxError, Error};
pub use target::StorageTarget;
pub use transfer::Transfer;

/// The result type for transfers.
pub type Result<T> = std::result::Result<T, Error>;
