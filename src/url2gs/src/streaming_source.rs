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

//! Defines single-pass data sources for uploads.

use std::collections::VecDeque;

/// The *total* number of bytes expected in a [StreamingSource].
pub type SizeHint = http_body::SizeHint;

/// Provides bytes for an upload from single-pass sources.
///
/// Sources are read exactly once, from start to end. There is no support to
/// rewind or seek: an upload that fails part way must be restarted from a new
/// source.
///
/// # Example
/// ```
/// # tokio_test::block_on(async {
/// use url2gs::streaming_source::{BytesSource, StreamingSource};
/// let buffer : &[u8] = b"the quick brown fox jumps over the lazy dog";
/// let mut size = 0_usize;
/// let mut source = BytesSource::new(bytes::Bytes::from_static(buffer));
/// while let Some(bytes) = source.next().await.transpose()? {
///     size += bytes.len();
/// }
/// assert_eq!(size, buffer.len());
/// # anyhow::Result::<()>::Ok(()) });
/// ```
pub trait StreamingSource {
    /// The error type.
    type Error: std::error::Error + Send + Sync + 'static;

    /// Gets the next set of data to upload.
    ///
    /// Returns `None` at the end of the stream.
    fn next(&mut self) -> impl Future<Output = Option<Result<bytes::Bytes, Self::Error>>> + Send;

    /// An estimate of the upload size.
    ///
    /// Returns the expected size as a [min, max) range. Where `None` represents
    /// an unknown limit for the upload.
    fn size_hint(&self) -> impl Future<Output = Result<SizeHint, Self::Error>> + Send {
        std::future::ready(Ok(SizeHint::new()))
    }
}

/// Implements [StreamingSource] for the body of a [reqwest::Response].
///
/// The body is consumed as it arrives from the network, one chunk at a time.
/// The response, and the underlying connection, are released as soon as the
/// body is exhausted or fails.
#[derive(Debug)]
pub struct ResponseSource {
    response: Option<reqwest::Response>,
    declared_length: Option<u64>,
}

impl ResponseSource {
    pub fn new(response: reqwest::Response) -> Self {
        let declared_length = response
            .headers()
            .get(http::header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());
        Self {
            response: Some(response),
            declared_length,
        }
    }
}

impl StreamingSource for ResponseSource {
    type Error = reqwest::Error;

    async fn next(&mut self) -> Option<Result<bytes::Bytes, Self::Error>> {
        let response = self.response.as_mut()?;
        match response.chunk().await.transpose() {
            Some(Ok(b)) => Some(Ok(b)),
            other => {
                // End of stream, or a broken stream: either way we are done.
                self.response = None;
                other
            }
        }
    }

    async fn size_hint(&self) -> Result<SizeHint, Self::Error> {
        Ok(self
            .declared_length
            .map(SizeHint::with_exact)
            .unwrap_or_default())
    }
}

/// Implements [StreamingSource] for [bytes::Bytes].
#[derive(Debug)]
pub struct BytesSource {
    size: u64,
    current: Option<bytes::Bytes>,
}

impl BytesSource {
    pub fn new(contents: bytes::Bytes) -> Self {
        let size = contents.len() as u64;
        Self {
            size,
            current: Some(contents),
        }
    }
}

impl From<bytes::Bytes> for BytesSource {
    fn from(value: bytes::Bytes) -> Self {
        Self::new(value)
    }
}

impl From<&'static str> for BytesSource {
    fn from(value: &'static str) -> Self {
        Self::new(bytes::Bytes::from_static(value.as_bytes()))
    }
}

impl StreamingSource for BytesSource {
    type Error = std::io::Error;

    async fn next(&mut self) -> Option<Result<bytes::Bytes, Self::Error>> {
        self.current.take().map(Result::Ok)
    }

    async fn size_hint(&self) -> Result<SizeHint, Self::Error> {
        Ok(SizeHint::with_exact(self.size))
    }
}

/// Implements [StreamingSource] for a sequence of [bytes::Bytes].
#[derive(Debug)]
pub struct IterSource {
    size: u64,
    current: VecDeque<bytes::Bytes>,
}

impl IterSource {
    pub fn new<I>(iterator: I) -> Self
    where
        I: IntoIterator<Item = bytes::Bytes>,
    {
        let current: VecDeque<bytes::Bytes> = iterator.into_iter().collect();
        let size = current.iter().fold(0_u64, |a, i| a + i.len() as u64);
        Self { size, current }
    }
}

impl StreamingSource for IterSource {
    type Error = std::io::Error;

    async fn next(&mut self) -> Option<Result<bytes::Bytes, Self::Error>> {
        self.current.pop_front().map(Ok)
    }

    async fn size_hint(&self) -> Result<SizeHint, Self::Error> {
        Ok(SizeHint::with_exact(self.size))
    }
}
