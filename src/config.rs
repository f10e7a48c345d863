//! Remote source configuration.

use thiserror::Error;

pub const DEFAULT_HOST: &str = "hokusai.eorc.jaxa.jp";
pub const HOURLY_GAUGE_ROOT: &str = "realtime_ver/v7/hourly_G";

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("missing credential `{0}` (set it on the command line, in the environment or in .env)")]
    MissingCredential(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
/// FTP login for the GSMaP archive.
pub struct Credentials {
    pub user: String,
    pub pass: String,
}

impl Credentials {
    /// Builds credentials from optional values, failing on the first one absent or empty.
    pub fn new(user: Option<String>, pass: Option<String>) -> Result<Self, ConfigError> {
        let user = user
            .filter(|u| !u.is_empty())
            .ok_or(ConfigError::MissingCredential("GSMAP_USER"))?;
        let pass = pass
            .filter(|p| !p.is_empty())
            .ok_or(ConfigError::MissingCredential("GSMAP_PASS"))?;

        Ok(Credentials { user, pass })
    }
}

#[derive(Debug, Clone)]
/// Where the hourly gauge-calibrated files live.
pub struct FtpSource {
    pub host: String,
    pub credentials: Credentials,
}

impl FtpSource {
    pub fn new(host: &str, credentials: Credentials) -> Self {
        FtpSource {
            host: host.to_string(),
            credentials,
        }
    }

    pub fn base_url(&self) -> String {
        format!(
            "ftp://{}:{}@{}/{}",
            self.credentials.user, self.credentials.pass, self.host, HOURLY_GAUGE_ROOT
        )
    }
}

// -- Tests -------------------------------------------------------------------
