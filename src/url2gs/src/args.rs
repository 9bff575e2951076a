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

use clap::Parser;
use std::path::PathBuf;
use url2gs::metadata::{DEFAULT_ACCESS_CONTROL, TransferPolicy};

const DESCRIPTION: &str = concat!(
    "Fetches a URL and streams the response body into a Cloud Storage object.",
    " The body is never buffered in full, and only one GET request is made.",
    " If --max-bytes is set, a source that declares a larger Content-Length",
    " fails before any byte is copied, and a source that sends more bytes than",
    " the limit fails as soon as the limit is crossed."
);

/// Stream an HTTP(S) download into a Cloud Storage object.
#[derive(Clone, Debug, Parser)]
#[command(version, about, long_about = DESCRIPTION)]
pub struct Args {
    /// The URL to download.
    pub source_url: String,

    /// The destination, in `gs://BUCKET/KEY` format.
    pub destination: String,

    /// The configuration file.
    ///
    /// If not set, `url2gs.json` is used when it exists. Without a
    /// configuration the upload uses Application Default Credentials.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// The maximum number of bytes to copy, zero means "no limit".
    ///
    /// Accepts suffixes such as `KiB` or `MB`.
    #[arg(long, alias = "max_bytes", default_value_t = 0, value_parser = parse_size_arg)]
    pub max_bytes: u64,

    /// The access-control value for the new object.
    #[arg(long, default_value = DEFAULT_ACCESS_CONTROL)]
    pub acl: String,

    /// The `Content-Disposition` for the new object.
    #[arg(long, alias = "content_disposition")]
    pub content_disposition: Option<String>,

    /// Overrides the content type reported by the source.
    #[arg(long, alias = "content_type")]
    pub content_type: Option<String>,

    /// Overrides the Cloud Storage endpoint.
    #[arg(long, hide = true)]
    pub endpoint: Option<String>,
}

impl Args {
    pub fn policy(&self) -> TransferPolicy {
        TransferPolicy::new()
            .set_max_bytes(self.max_bytes)
            .set_access_control(&self.acl)
            .set_or_clear_content_disposition_override(self.content_disposition.as_ref())
            .set_or_clear_content_type_override(self.content_type.as_ref())
    }
}

fn parse_size_arg(arg: &str) -> anyhow::Result<u64> {
    let value = parse_size::parse_size(arg)?;
    Ok(value)
}
