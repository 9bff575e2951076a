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

//! Parse upload destinations.

use crate::{Error, Result};
use regex::Regex;

lazy_static::lazy_static! {
    static ref GS_URL: Regex = Regex::new("^gs://([^/]+)/(.*)$").expect("the gs:// pattern is valid");
}

/// The bucket and object name of an upload.
///
/// # Example
/// ```
/// # use url2gs::StorageTarget;
/// let target = StorageTarget::parse("gs://my-bucket/path/to/object")?;
/// assert_eq!(target.bucket(), "my-bucket");
/// assert_eq!(target.key(), "path/to/object");
/// # Ok::<(), url2gs::Error>(())
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StorageTarget {
    bucket: String,
    key: String,
}

impl StorageTarget {
    /// Parses a `gs://BUCKET/KEY` destination.
    ///
    /// The bucket must be non-empty and cannot contain `/`. The key is
    /// everything after the first `/` following the bucket, used as-is: it may
    /// be empty and may contain `/` characters. No URL decoding takes place.
    pub fn parse(destination: &str) -> Result<Self> {
        let captures = GS_URL
            .captures(destination)
            .ok_or_else(|| Error::InvalidDestinationSyntax(destination.to_string()))?;
        Ok(Self {
            bucket: captures[1].to_string(),
            key: captures[2].to_string(),
        })
    }

    /// The bucket name, without any `gs://` or `projects/_/buckets/` prefix.
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    /// The object name.
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl std::str::FromStr for StorageTarget {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl std::fmt::Display for StorageTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "gs://{}/{}", self.bucket, self.key)
    }
}
