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

//! Resolve the metadata attached to uploaded objects.

/// The content type used when neither the caller nor the source provide one.
pub const DEFAULT_CONTENT_TYPE: &str = "application/octet-stream";

/// The access-control value used unless the caller provides a different one.
pub const DEFAULT_ACCESS_CONTROL: &str = "public-read";

/// Caller-supplied options for a transfer.
///
/// # Example
/// ```
/// # use url2gs::metadata::TransferPolicy;
/// let policy = TransferPolicy::new()
///     .set_max_bytes(1024)
///     .set_access_control("private")
///     .set_content_type_override("text/plain")
///     .set_content_disposition_override("attachment; filename=\"notes.txt\"");
/// assert_eq!(policy.max_bytes, 1024);
/// ```
#[derive(Clone, Debug, PartialEq)]
#[non_exhaustive]
pub struct TransferPolicy {
    /// The maximum number of bytes to copy, zero means "no limit".
    pub max_bytes: u64,

    /// The access-control value for the new object, sent as `x-goog-acl`.
    ///
    /// Typical values include `public-read`, `private`, and
    /// `bucket-owner-full-control`.
    pub access_control: String,

    /// If set, and non-empty, the `Content-Disposition` of the new object.
    pub content_disposition_override: Option<String>,

    /// If set, and non-empty, replaces the content type reported by the source.
    pub content_type_override: Option<String>,
}

impl TransferPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the [max_bytes][TransferPolicy::max_bytes] field.
    pub fn set_max_bytes(mut self, v: u64) -> Self {
        self.max_bytes = v;
        self
    }

    /// Sets the [access_control][TransferPolicy::access_control] field.
    pub fn set_access_control<T: Into<String>>(mut self, v: T) -> Self {
        self.access_control = v.into();
        self
    }

    /// Sets the [content_disposition_override][TransferPolicy::content_disposition_override] field.
    pub fn set_content_disposition_override<T: Into<String>>(mut self, v: T) -> Self {
        self.content_disposition_override = Some(v.into());
        self
    }

    /// Sets or clears the [content_disposition_override][TransferPolicy::content_disposition_override] field.
    pub fn set_or_clear_content_disposition_override<T: Into<String>>(
        mut self,
        v: Option<T>,
    ) -> Self {
        self.content_disposition_override = v.map(Into::into);
        self
    }

    /// Sets the [content_type_override][TransferPolicy::content_type_override] field.
    pub fn set_content_type_override<T: Into<String>>(mut self, v: T) -> Self {
        self.content_type_override = Some(v.into());
        self
    }

    /// Sets or clears the [content_type_override][TransferPolicy::content_type_override] field.
    pub fn set_or_clear_content_type_override<T: Into<String>>(mut self, v: Option<T>) -> Self {
        self.content_type_override = v.map(Into::into);
        self
    }
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self {
            max_bytes: 0,
            access_control: DEFAULT_ACCESS_CONTROL.to_string(),
            content_disposition_override: None,
            content_type_override: None,
        }
    }
}

/// The signals from the source response used to resolve the metadata.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SourceHeaders {
    pub content_type: Option<String>,
}

impl SourceHeaders {
    /// Extracts the relevant headers, ignoring values that are not valid
    /// strings.
    pub fn from_headers(headers: &http::HeaderMap) -> Self {
        let content_type = headers
            .get(http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Self { content_type }
    }
}

/// The metadata attached to a new object.
#[derive(Clone, Debug, PartialEq)]
pub struct UploadMetadata {
    pub content_type: String,
    /// When `None` the upload does not include a `Content-Disposition` header.
    pub content_disposition: Option<String>,
    pub access_control: String,
}

/// Computes the metadata for an upload.
///
/// Values in the policy take precedence over values from the source. Empty
/// strings are treated as missing values.
///
/// # Example
/// ```
/// # use url2gs::metadata::{SourceHeaders, TransferPolicy, resolve};
/// let source = SourceHeaders { content_type: Some("image/png".into()) };
/// let got = resolve(&TransferPolicy::new(), &source);
/// assert_eq!(got.content_type, "image/png");
/// assert_eq!(got.access_control, "public-read");
/// assert_eq!(got.content_disposition, None);
/// ```
pub fn resolve(policy: &TransferPolicy, source: &SourceHeaders) -> UploadMetadata {
    let content_type = non_empty(&policy.content_type_override)
        .or_else(|| non_empty(&source.content_type))
        .unwrap_or(DEFAULT_CONTENT_TYPE)
        .to_string();
    let content_disposition = non_empty(&policy.content_disposition_override).map(str::to_string);
    UploadMetadata {
        content_type,
        content_disposition,
        access_control: policy.access_control.clone(),
    }
}

fn non_empty(v: &Option<String>) -> Option<&str> {
    v.as_deref().filter(|s| !s.is_empty())
}
