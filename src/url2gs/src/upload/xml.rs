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

//! Uploads objects using the Cloud Storage XML API.

use super::{UploadError, Uploader};
use crate::BoxError;
use crate::metadata::UploadMetadata;
use crate::streaming_source::StreamingSource;
use crate::target::StorageTarget;
use futures::stream::unfold;
use google_cloud_auth::credentials::{CacheableResource, Credentials};
use http::Extensions;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use std::sync::Arc;
use tokio::sync::Mutex;

/// The default host used by the service.
const DEFAULT_HOST: &str = "https://storage.googleapis.com";

/// The header used to set the predefined ACL of a new object.
const ACL_HEADER: &str = "x-goog-acl";

/// The characters percent-encoded in object names.
///
/// The `/` character is not encoded, object names map to the URL path
/// verbatim: https://cloud.google.com/storage/docs/request-endpoints#encoding
/// URL parsers treat `\` as a path separator, it must be encoded too.
const PATH_ENCODE_SET: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Creates objects with a single `PUT` request to the XML API.
///
/// The request body is streamed from the payload, there is no buffering beyond
/// a single chunk. The upload is not resumable and it is not retried.
///
/// # Example
/// ```no_run
/// # async fn sample() -> anyhow::Result<()> {
/// use url2gs::upload::XmlUploader;
/// let uploader = XmlUploader::builder()
///     .with_endpoint("https://storage.googleapis.com")
///     .build()?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct XmlUploader {
    client: reqwest::Client,
    credentials: Credentials,
    endpoint: String,
}

impl XmlUploader {
    /// Returns a builder for [XmlUploader].
    pub fn builder() -> ClientBuilder {
        ClientBuilder::new()
    }

    /// The URL for an object.
    ///
    /// URL parsers remove `.` and `..` path segments, even when they are
    /// percent-encoded. A name with such segments cannot be addressed in the
    /// XML API path, and is rejected.
    fn object_url(&self, target: &StorageTarget) -> Result<String, UploadError> {
        let has_dot_segment = std::iter::once(target.bucket())
            .chain(target.key().split('/'))
            .any(|s| s == "." || s == "..");
        if has_dot_segment {
            return Err(UploadError::UnaddressableName(target.to_string()));
        }
        Ok(format!(
            "{}/{}/{}",
            self.endpoint.trim_end_matches('/'),
            utf8_percent_encode(target.bucket(), PATH_ENCODE_SET),
            utf8_percent_encode(target.key(), PATH_ENCODE_SET)
        ))
    }

    async fn apply_auth_headers(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> Result<reqwest::RequestBuilder, UploadError> {
        let cached_auth_headers = self
            .credentials
            .headers(Extensions::new())
            .await
            .map_err(|e| UploadError::Authentication(e.into()))?;

        let auth_headers = match cached_auth_headers {
            CacheableResource::New { data, .. } => data,
            CacheableResource::NotModified => {
                unreachable!("headers are not cached");
            }
        };

        Ok(builder.headers(auth_headers))
    }

    async fn put<P>(
        &self,
        target: &StorageTarget,
        payload: P,
        metadata: &UploadMetadata,
    ) -> Result<(), UploadError>
    where
        P: StreamingSource + Send + Sync + 'static,
    {
        let url = self.object_url(target)?;
        let hint = payload
            .size_hint()
            .await
            .map_err(|e| UploadError::Payload(e.into()))?;
        tracing::debug!(
            %target,
            expected_size = hint.exact(),
            min_size = hint.lower(),
            max_size = hint.upper(),
            "preparing upload"
        );
        let builder = self
            .client
            .put(url)
            .header(http::header::CONTENT_TYPE, metadata.content_type.as_str())
            .header(ACL_HEADER, metadata.access_control.as_str());
        let builder = match metadata.content_disposition.as_deref() {
            Some(v) => builder.header(http::header::CONTENT_DISPOSITION, v),
            None => builder,
        };
        let builder = self.apply_auth_headers(builder).await?;

        let payload_error = Arc::new(Mutex::new(None));
        let body = payload_to_body(payload, payload_error.clone());
        tracing::debug!(%target, "starting upload");
        let result = builder.body(body).send().await;

        // A broken payload aborts the request, report that as the root cause.
        if let Some(e) = payload_error.lock().await.take() {
            return Err(UploadError::Payload(e));
        }
        let response = result.map_err(UploadError::Send)?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UploadError::Http {
                status: status.as_u16(),
                body,
            });
        }
        tracing::debug!(%target, status = status.as_u16(), "upload completed");
        Ok(())
    }
}

impl Uploader for XmlUploader {
    async fn upload<P>(
        &self,
        target: &StorageTarget,
        payload: P,
        metadata: &UploadMetadata,
    ) -> Result<(), BoxError>
    where
        P: StreamingSource + Send + Sync + 'static,
    {
        self.put(target, payload, metadata).await.map_err(Into::into)
    }
}

/// Converts the payload into a streaming request body.
///
/// The HTTP client only sees an opaque error if the payload fails. The payload
/// error is saved in `payload_error` so the caller can report it.
fn payload_to_body<P>(payload: P, payload_error: Arc<Mutex<Option<BoxError>>>) -> reqwest::Body
where
    P: StreamingSource + Send + Sync + 'static,
{
    let stream = unfold(Some(payload), move |state| {
        let payload_error = payload_error.clone();
        async move {
            let mut payload = state?;
            match payload.next().await? {
                Ok(bytes) => Some((Ok(bytes), Some(payload))),
                Err(e) => {
                    *payload_error.lock().await = Some(e.into());
                    Some((Err(std::io::Error::other("upload payload failed")), None))
                }
            }
        }
    });
    reqwest::Body::wrap_stream(stream)
}

/// A builder for [XmlUploader].
///
/// ```no_run
/// # use url2gs::upload::XmlUploader;
/// # fn sample() -> anyhow::Result<()> {
/// use google_cloud_auth::credentials::anonymous::Builder as Anonymous;
/// let uploader = XmlUploader::builder()
///     .with_credentials(Anonymous::new().build())
///     .build()?;
/// # Ok(()) }
/// ```
#[derive(Debug, Default)]
pub struct ClientBuilder {
    client: Option<reqwest::Client>,
    credentials: Option<Credentials>,
    endpoint: Option<String>,
}

impl ClientBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Creates a new uploader.
    ///
    /// If no credentials are configured this uses [Application Default
    /// Credentials].
    ///
    /// [Application Default Credentials]: https://cloud.google.com/docs/authentication#adc
    pub fn build(self) -> Result<XmlUploader, UploadError> {
        let credentials = match self.credentials {
            Some(c) => c,
            None => google_cloud_auth::credentials::Builder::default()
                .build()
                .map_err(|e| UploadError::Authentication(e.into()))?,
        };
        Ok(XmlUploader {
            client: self.client.unwrap_or_default(),
            credentials,
            endpoint: self.endpoint.unwrap_or_else(|| DEFAULT_HOST.to_string()),
        })
    }

    /// Sets the endpoint, by default `https://storage.googleapis.com`.
    pub fn with_endpoint<V: Into<String>>(mut self, v: V) -> Self {
        self.endpoint = Some(v.into());
        self
    }

    /// Configures the authentication credentials.
    ///
    /// More information about valid credentials types can be found in the
    /// [google-cloud-auth] crate documentation.
    ///
    /// [google-cloud-auth]: https://docs.rs/google-cloud-auth
    pub fn with_credentials<V: Into<Credentials>>(mut self, v: V) -> Self {
        self.credentials = Some(v.into());
        self
    }

    /// Configures the HTTP client used for uploads.
    pub fn with_client(mut self, v: reqwest::Client) -> Self {
        self.client = Some(v);
        self
    }
}
