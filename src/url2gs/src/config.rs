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

//! Load the configuration file.
//!
//! The file is a JSON object. All the fields are optional:
//!
//! ```json
//! {
//!   "PrivateKeyPath": "/path/to/key.pem",
//!   "ClientEmail": "uploader@my-project.iam.gserviceaccount.com",
//!   "PrivateKeyId": "0123456789abcdef"
//! }
//! ```
//!
//! When `PrivateKeyPath` and `ClientEmail` are present the uploads
//! authenticate as that service account. Otherwise they use [Application
//! Default Credentials]. Unknown fields, such as `Bucket`, are ignored.
//!
//! [Application Default Credentials]: https://cloud.google.com/docs/authentication#adc

use crate::BoxError;
use google_cloud_auth::credentials::Credentials;
use std::path::{Path, PathBuf};

/// The configuration file used when none is given.
pub const DEFAULT_PATH: &str = "url2gs.json";

/// Represents an error loading the configuration or its credentials.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum ConfigError {
    /// A file could not be read.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configuration file is not valid JSON, or has the wrong field types.
    #[error("cannot parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Only some of the service account fields are set.
    #[error("the configuration sets PrivateKeyPath or ClientEmail, but is missing {0}")]
    Incomplete(&'static str),

    /// The service account credentials could not be created.
    #[error("cannot create credentials: {0}")]
    Credentials(#[source] BoxError),
}

#[derive(Clone, Debug, Default, PartialEq, serde::Deserialize)]
#[serde(rename_all = "PascalCase")]
#[non_exhaustive]
pub struct Config {
    /// A file with the PEM-encoded private key of a service account.
    pub private_key_path: Option<PathBuf>,
    /// The service account email.
    pub client_email: Option<String>,
    /// The id of the private key, if known.
    pub private_key_id: Option<String>,
}

impl Config {
    /// Loads the configuration from `path`.
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let contents = tokio::fs::read(path)
            .await
            .map_err(|source| ConfigError::Read {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_json(path, &contents)
    }

    /// Loads the configuration from `path`, or returns the default
    /// configuration if the file does not exist.
    pub async fn load_or_default<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        match Self::load(path).await {
            Err(ConfigError::Read { path, source })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                tracing::debug!(path = %path.display(), "no configuration file, using defaults");
                Ok(Self::default())
            }
            r => r,
        }
    }

    /// Parses `contents`; `path` is only used in error messages.
    pub fn from_json(path: &Path, contents: &[u8]) -> Result<Self, ConfigError> {
        serde_json::from_slice(contents).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Creates the service account credentials described by this configuration.
    ///
    /// Returns `None` if the configuration has no service account, in which
    /// case the caller should use the default credentials.
    pub async fn credentials(&self) -> Result<Option<Credentials>, ConfigError> {
        let (key_path, client_email) = match (&self.private_key_path, &self.client_email) {
            (None, None) => return Ok(None),
            (Some(_), None) => return Err(ConfigError::Incomplete("ClientEmail")),
            (None, Some(_)) => return Err(ConfigError::Incomplete("PrivateKeyPath")),
            (Some(p), Some(e)) => (p, e),
        };
        let private_key = tokio::fs::read_to_string(key_path)
            .await
            .map_err(|source| ConfigError::Read {
                path: key_path.clone(),
                source,
            })?;
        tracing::info!(%client_email, "using service account credentials");
        let credentials = google_cloud_auth::credentials::service_account::Builder::new(
            self.service_account_key(client_email, private_key),
        )
        .build()
        .map_err(|e| ConfigError::Credentials(e.into()))?;
        Ok(Some(credentials))
    }

    fn service_account_key(&self, client_email: &str, private_key: String) -> serde_json::Value {
        let mut key = serde_json::json!({
            "type": "service_account",
            "client_email": client_email,
            "private_key": private_key,
        });
        if let Some(id) = &self.private_key_id {
            key["private_key_id"] = serde_json::Value::String(id.clone());
        }
        key
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Write;
    use test_case::test_case;

    type Result = anyhow::Result<()>;

    #[tokio::test]
    async fn load() -> Result {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(
            br#"{
                "PrivateKeyPath": "/secrets/key.pem",
                "ClientEmail": "test@example.iam.gserviceaccount.com",
                "Bucket": "unused-bucket"
            }"#,
        )?;
        let got = Config::load(file.path()).await?;
        let want = Config {
            private_key_path: Some(PathBuf::from("/secrets/key.pem")),
            client_email: Some("test@example.iam.gserviceaccount.com".to_string()),
            private_key_id: None,
        };
        assert_eq!(got, want);
        Ok(())
    }

    #[test_case(b"{}"; "empty object")]
    #[test_case(br#"{"Bucket": "b"}"#; "only unknown")]
    fn defaults(contents: &[u8]) -> Result {
        let got = Config::from_json(Path::new("test.json"), contents)?;
        assert_eq!(got, Config::default());
        Ok(())
    }

    #[test_case(b"not json")]
    #[test_case(br#"{"ClientEmail": 42}"#)]
    #[test_case(b"[]")]
    fn parse_error(contents: &[u8]) {
        let err = Config::from_json(Path::new("bad.json"), contents)
            .expect_err("expected a parse error");
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
        assert!(err.to_string().contains("bad.json"), "{err}");
    }

    #[tokio::test]
    async fn load_missing() -> Result {
        let dir = tempfile::tempdir()?;
        let path = dir.path().join("missing.json");
        let err = Config::load(&path)
            .await
            .expect_err("expected a read error");
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
        assert!(err.to_string().contains("missing.json"), "{err}");

        let got = Config::load_or_default(&path).await?;
        assert_eq!(got, Config::default());
        Ok(())
    }

    #[tokio::test]
    async fn load_or_default_keeps_parse_errors() -> Result {
        let mut file = tempfile::NamedTempFile::new()?;
        file.write_all(b"{")?;
        let err = Config::load_or_default(file.path())
            .await
            .expect_err("expected a parse error");
        assert!(matches!(err, ConfigError::Parse { .. }), "{err:?}");
        Ok(())
    }

    #[tokio::test]
    async fn no_service_account() -> Result {
        let got = Config::default().credentials().await?;
        assert!(got.is_none(), "{got:?}");
        Ok(())
    }

    #[test_case(Some("key.pem"), None, "ClientEmail")]
    #[test_case(None, Some("test@example.com"), "PrivateKeyPath")]
    #[tokio::test]
    async fn incomplete(path: Option<&str>, email: Option<&str>, missing: &str) {
        let config = Config {
            private_key_path: path.map(PathBuf::from),
            client_email: email.map(str::to_string),
            private_key_id: None,
        };
        let err = config
            .credentials()
            .await
            .expect_err("expected an incomplete configuration");
        assert!(
            matches!(err, ConfigError::Incomplete(m) if m == missing),
            "{err:?}"
        );
    }

    #[tokio::test]
    async fn missing_key_file() -> Result {
        let dir = tempfile::tempdir()?;
        let config = Config {
            private_key_path: Some(dir.path().join("missing.pem")),
            client_email: Some("test@example.com".to_string()),
            private_key_id: None,
        };
        let err = config
            .credentials()
            .await
            .expect_err("expected a read error");
        assert!(matches!(err, ConfigError::Read { .. }), "{err:?}");
        assert!(err.to_string().contains("missing.pem"), "{err}");
        Ok(())
    }

    #[test]
    fn service_account_key() {
        let config = Config {
            private_key_id: Some("test-key-id".to_string()),
            ..Config::default()
        };
        let got = config.service_account_key("test@example.com", "--PEM--".to_string());
        let want = serde_json::json!({
            "type": "service_account",
            "client_email": "test@example.com",
            "private_key": "--PEM--",
            "private_key_id": "test-key-id",
        });
        assert_eq!(got, want);

        let got = Config::default().service_account_key("test@example.com", "--PEM--".to_string());
        assert!(got.get("private_key_id").is_none(), "{got:?}");
    }
}
