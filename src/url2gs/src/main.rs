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

//! Copies the body of an HTTP(S) response into a Cloud Storage object.

mod args;

use args::Args;
use clap::Parser;
use url2gs::config::{Config, DEFAULT_PATH};
use url2gs::upload::XmlUploader;
use url2gs::{StorageTarget, Transfer};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let _guard = enable_tracing();

    let args = Args::parse();
    tracing::debug!("{args:?}");
    let target = StorageTarget::parse(&args.destination)?;

    let config = match &args.config {
        Some(path) => Config::load(path).await?,
        None => Config::load_or_default(DEFAULT_PATH).await?,
    };
    let mut builder = XmlUploader::builder();
    if let Some(credentials) = config.credentials().await? {
        builder = builder.with_credentials(credentials);
    }
    if let Some(endpoint) = &args.endpoint {
        builder = builder.with_endpoint(endpoint);
    }

    let transfer = Transfer::new(builder.build()?);
    transfer
        .run(&args.source_url, &target, &args.policy())
        .await?;
    tracing::info!("DONE");
    Ok(())
}

fn enable_tracing() -> tracing::dispatcher::DefaultGuard {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = tracing_subscriber::fmt()
        .with_level(true)
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_default(subscriber)
}
