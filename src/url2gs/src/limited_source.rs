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

//! Enforce a byte-count ceiling on a [StreamingSource].

use crate::Error;
use crate::streaming_source::{SizeHint, StreamingSource};

/// Wraps a [StreamingSource] to fail once it produces more than `max_bytes`.
///
/// Sources may omit their length, or declare a length smaller than what they
/// actually send. This wrapper counts the bytes as they flow through, and
/// fails the read that crosses the limit. The offending chunk is not
/// forwarded, so the consumer never observes more than `max_bytes`.
///
/// Once the limit is exceeded every subsequent read fails with the same error,
/// without polling the wrapped source.
///
/// # Example
/// ```
/// # tokio_test::block_on(async {
/// use url2gs::Error;
/// use url2gs::limited_source::LimitedSource;
/// use url2gs::streaming_source::{BytesSource, StreamingSource};
/// let mut source = LimitedSource::new(BytesSource::from("too many bytes"), 4);
/// let got = source.next().await;
/// assert!(matches!(got, Some(Err(Error::TransferLimitExceeded { max_bytes: 4 }))));
/// # });
/// ```
#[derive(Debug)]
pub struct LimitedSource<S> {
    inner: S,
    max_bytes: u64,
    remaining: u64,
    exceeded: bool,
}

impl<S> LimitedSource<S> {
    /// Creates a new wrapper, a `max_bytes` of zero rejects any non-empty data.
    pub fn new(inner: S, max_bytes: u64) -> Self {
        Self {
            inner,
            max_bytes,
            remaining: max_bytes,
            exceeded: false,
        }
    }

    /// The configured limit.
    pub fn max_bytes(&self) -> u64 {
        self.max_bytes
    }

    /// The number of bytes that can still be read before the limit trips.
    pub fn remaining(&self) -> u64 {
        self.remaining
    }

    fn limit_exceeded(&self) -> Error {
        Error::TransferLimitExceeded {
            max_bytes: self.max_bytes,
        }
    }
}

impl<S> StreamingSource for LimitedSource<S>
where
    S: StreamingSource + Send + Sync,
{
    type Error = Error;

    async fn next(&mut self) -> Option<Result<bytes::Bytes, Self::Error>> {
        if self.exceeded {
            return Some(Err(self.limit_exceeded()));
        }
        match self.inner.next().await? {
            Err(e) => Some(Err(Error::SourceReadFailed(e.into()))),
            Ok(b) => match self.remaining.checked_sub(b.len() as u64) {
                Some(r) => {
                    self.remaining = r;
                    Some(Ok(b))
                }
                None => {
                    self.remaining = 0;
                    self.exceeded = true;
                    tracing::warn!(
                        max_bytes = self.max_bytes,
                        "source sent more bytes than the limit allows"
                    );
                    Some(Err(self.limit_exceeded()))
                }
            },
        }
    }

    async fn size_hint(&self) -> Result<SizeHint, Self::Error> {
        let mut hint = self
            .inner
            .size_hint()
            .await
            .map_err(|e| Error::SourceReadFailed(e.into()))?;
        // `set_upper()` panics if the upper bound is below the lower bound.
        if hint.lower() <= self.max_bytes && hint.upper().is_none_or(|u| u > self.max_bytes) {
            hint.set_upper(self.max_bytes);
        }
        Ok(hint)
    }
}
