//! Connection-string assembly
//!
//! The connection string is decided once at startup, in this order:
//! 1. an explicit `url`, used verbatim;
//! 2. `host` + `user` + `password`: an authenticated URL with percent-encoded
//!    credentials, the default port and the database name;
//! 3. `host` alone: an unauthenticated URL with the default port and database;
//! 4. nothing: no backing store (standalone mode).
//!
//! Empty strings count as absent.

use percent_encoding::{percent_decode_str, utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt;
use url::Url;

use crate::config::StoreConfig;

/// Scheme used for assembled URLs
pub const DEFAULT_SCHEME: &str = "ws";

/// Port used for assembled URLs
pub const DEFAULT_PORT: u16 = 8000;

/// Everything except `A-Z a-z 0-9 - _ . ! ~ * ' ( )` is escaped in credentials
const CREDENTIAL: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Which rule produced the connection string
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionSource {
    /// Explicit URL
    Explicit,
    /// Assembled from host, user and password
    Authenticated,
    /// Assembled from host only
    Unauthenticated,
}

impl fmt::Display for ConnectionSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit url"),
            Self::Authenticated => write!(f, "host with credentials"),
            Self::Unauthenticated => write!(f, "host only"),
        }
    }
}

/// A resolved store connection string
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionString {
    url: String,
    source: ConnectionSource,
}

impl fmt::Debug for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionString")
            .field("url", &self.sanitized())
            .field("source", &self.source)
            .finish()
    }
}

impl ConnectionString {
    /// Full connection URL, credentials included
    pub fn as_str(&self) -> &str {
        &self.url
    }

    /// Which rule produced this connection string
    pub fn source(&self) -> ConnectionSource {
        self.source
    }

    /// Connection URL safe for logging
    pub fn sanitized(&self) -> String {
        sanitize_url(&self.url)
    }

    /// Split into what the driver needs to connect
    ///
    /// The database is the first path segment when present, otherwise the
    /// configured one. Strings that do not parse as URLs are passed through
    /// as the endpoint.
    pub fn target(&self, config: &StoreConfig) -> ConnectionTarget {
        let namespace = config.namespace.clone();

        let url = match Url::parse(&self.url) {
            Ok(url) => url,
            Err(_) => {
                return ConnectionTarget {
                    endpoint: self.url.clone(),
                    credentials: None,
                    namespace,
                    database: config.database_name().to_string(),
                }
            }
        };

        let mut endpoint = format!("{}://", url.scheme());
        if let Some(host) = url.host_str() {
            endpoint.push_str(host);
        }
        if let Some(port) = url.port() {
            endpoint.push_str(&format!(":{}", port));
        }

        let credentials = if url.username().is_empty() {
            None
        } else {
            Some(Credentials {
                username: decode(url.username()),
                password: url.password().map(decode).unwrap_or_default(),
            })
        };

        let database = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .filter(|segment| !segment.is_empty())
            .map(decode)
            .unwrap_or_else(|| config.database_name().to_string());

        ConnectionTarget {
            endpoint,
            credentials,
            namespace,
            database,
        }
    }
}

impl fmt::Display for ConnectionString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.sanitized())
    }
}

/// Root credentials carried by a connection string
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"***")
            .finish()
    }
}

/// Connection string decomposed for the driver
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConnectionTarget {
    /// `scheme://host[:port]`
    pub endpoint: String,
    /// Sign-in credentials, when the URL carries any
    pub credentials: Option<Credentials>,
    pub namespace: String,
    pub database: String,
}

/// Resolve the connection string from the configured inputs
///
/// Returns `None` when no store is configured.
pub fn resolve(config: &StoreConfig) -> Option<ConnectionString> {
    if let Some(url) = present(&config.url) {
        return Some(ConnectionString {
            url: url.to_string(),
            source: ConnectionSource::Explicit,
        });
    }

    let database = config.database_name();

    match (
        present(&config.host),
        present(&config.user),
        present(&config.password),
    ) {
        (Some(host), Some(user), Some(password)) => Some(ConnectionString {
            url: format!(
                "{}://{}:{}@{}:{}/{}",
                DEFAULT_SCHEME,
                encode(user),
                encode(password),
                host,
                DEFAULT_PORT,
                database
            ),
            source: ConnectionSource::Authenticated,
        }),
        (Some(host), _, _) => Some(ConnectionString {
            url: format!("{}://{}:{}/{}", DEFAULT_SCHEME, host, DEFAULT_PORT, database),
            source: ConnectionSource::Unauthenticated,
        }),
        _ => None,
    }
}

/// Sanitize a connection URL for safe logging (remove credentials if present)
pub fn sanitize_url(url: &str) -> String {
    if let Some(at_pos) = url.rfind('@') {
        if let Some(scheme_end) = url.find("://") {
            if scheme_end < at_pos {
                let scheme = &url[..scheme_end + 3];
                let after_at = &url[at_pos..];
                return format!("{}***{}", scheme, after_at);
            }
        }
    }
    url.to_string()
}

fn present(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, CREDENTIAL).to_string()
}

fn decode(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}
