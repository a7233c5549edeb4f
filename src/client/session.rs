//! Server session descriptor
//!
//! Who the client talks to and how it logs in.

use serde::Deserialize;
use std::fmt;

fn default_port() -> u16 {
    21
}

/// An FTP server and the credentials to use on it.
///
/// Bound to a client with `FtpClient::begin` and shared, not copied, by
/// every transfer that follows.
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct ServerInfo {
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub login: String,
    pub password: String,
    /// Request transport certificate validation. Plain FTP has no TLS, so
    /// this is accepted and ignored.
    #[serde(default)]
    pub validate_ca: bool,
}

impl ServerInfo {
    pub fn new(
        host: impl Into<String>,
        port: u16,
        login: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            host: host.into(),
            port,
            login: login.into(),
            password: password.into(),
            validate_ca: false,
        }
    }
}

impl fmt::Debug for ServerInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ServerInfo")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"****")
            .field("validate_ca", &self.validate_ca)
            .finish()
    }
}
