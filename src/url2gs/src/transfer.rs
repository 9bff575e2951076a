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

//! Relay an HTTP(S) download into an object upload.

use crate::limited_source::LimitedSource;
use crate::metadata::{SourceHeaders, TransferPolicy, resolve};
use crate::streaming_source::ResponseSource;
use crate::upload::Uploader;
use crate::{Error, Result, StorageTarget};

/// Copies the body of an HTTP(S) response into a new object.
///
/// Each call to [run()][Transfer::run] performs one transfer: a single `GET`
/// request to the source, followed by a single upload that consumes the
/// response body as it arrives. Nothing is retried.
///
/// # Example
/// ```no_run
/// # async fn sample() -> anyhow::Result<()> {
/// use url2gs::{StorageTarget, Transfer, metadata::TransferPolicy, upload::XmlUploader};
/// let transfer = Transfer::new(XmlUploader::builder().build()?);
/// let target: StorageTarget = "gs://my-bucket/my-object".parse()?;
/// transfer
///     .run("https://example.com/data.json", &target, &TransferPolicy::new())
///     .await?;
/// # Ok(()) }
/// ```
#[derive(Clone, Debug)]
pub struct Transfer<U> {
    client: reqwest::Client,
    uploader: U,
}

impl<U> Transfer<U>
where
    U: Uploader,
{
    /// Creates a new instance using the default HTTP client for the source.
    pub fn new(uploader: U) -> Self {
        Self {
            client: reqwest::Client::new(),
            uploader,
        }
    }

    /// Replaces the HTTP client used to fetch the source.
    ///
    /// Use this to configure timeouts, proxies, or the redirect policy.
    pub fn with_client(mut self, client: reqwest::Client) -> Self {
        self.client = client;
        self
    }

    /// Downloads `source_url` and uploads its contents to `target`.
    pub async fn run(
        &self,
        source_url: &str,
        target: &StorageTarget,
        policy: &TransferPolicy,
    ) -> Result<()> {
        tracing::info!(source_url, %target, "fetching source");
        let response = self
            .client
            .get(source_url)
            .send()
            .await
            .map_err(Error::SourceFetchFailed)?;
        self.relay(response, target, policy).await
    }

    /// Validates the source response and uploads its body.
    ///
    /// The response is dropped, releasing its connection, on every return
    /// path.
    pub(crate) async fn relay(
        &self,
        response: reqwest::Response,
        target: &StorageTarget,
        policy: &TransferPolicy,
    ) -> Result<()> {
        let status = response.status();
        if status != reqwest::StatusCode::OK {
            return Err(Error::SourceFetchRejected {
                status_code: status.as_u16(),
            });
        }

        let headers = response.headers();
        let content_length = headers
            .get(http::header::CONTENT_LENGTH)
            .map(|v| String::from_utf8_lossy(v.as_bytes()).into_owned());
        let metadata = resolve(policy, &SourceHeaders::from_headers(headers));

        if policy.max_bytes > 0 {
            let max_bytes = policy.max_bytes;
            tracing::info!(max_bytes, "setting max size");
            if let Some(declared_length) = declared_length(content_length.clone())? {
                if declared_length > max_bytes {
                    return Err(Error::DeclaredLengthExceedsLimit {
                        declared_length,
                        max_bytes,
                    });
                }
            }
        }

        tracing::info!(
            content_type = %metadata.content_type,
            size = content_length.as_deref().unwrap_or("unknown"),
            key = target.key(),
            "uploading"
        );
        tracing::info!(acl = %metadata.access_control, "ACL");
        tracing::info!(
            content_disposition = metadata.content_disposition.as_deref().unwrap_or_default(),
            "Content-Disposition"
        );

        let body = ResponseSource::new(response);
        let uploaded = match policy.max_bytes {
            0 => self.uploader.upload(target, body, &metadata).await,
            max_bytes => {
                let body = LimitedSource::new(body, max_bytes);
                self.uploader.upload(target, body, &metadata).await
            }
        };
        uploaded.map_err(Error::UploadFailed)?;
        tracing::info!(%target, "upload completed");
        Ok(())
    }
}

fn declared_length(header: Option<String>) -> Result<Option<u64>> {
    header
        .map(|v| {
            v.trim()
                .parse::<u64>()
                .map_err(|_| Error::InvalidContentLength(v))
        })
        .transpose()
}
