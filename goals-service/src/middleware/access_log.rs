//! Combined-format access log
//!
//! Every request produces one Apache combined log line, emitted as a `tracing`
//! event under [`ACCESS_LOG_TARGET`]. The observability setup routes that
//! target to the access log file and keeps it off stdout.

use axum::{
    body::HttpBody,
    extract::{ConnectInfo, Request},
    http::{header, HeaderMap, Method, StatusCode, Uri, Version},
    middleware::Next,
    response::Response,
};
use chrono::{DateTime, Utc};
use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// `tracing` target carrying access log lines
pub const ACCESS_LOG_TARGET: &str = "access_log";

const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S %z";

/// One served request
#[derive(Debug, Clone)]
pub struct AccessRecord {
    pub remote: Option<IpAddr>,
    pub timestamp: DateTime<Utc>,
    pub method: Method,
    pub uri: Uri,
    pub version: Version,
    pub status: StatusCode,
    pub bytes: Option<u64>,
    pub referer: Option<String>,
    pub user_agent: Option<String>,
}

impl fmt::Display for AccessRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.remote {
            Some(ip) => write!(f, "{}", ip)?,
            None => f.write_str("-")?,
        }

        write!(
            f,
            " - - [{}] \"{} {} {:?}\" {} ",
            self.timestamp.format(TIMESTAMP_FORMAT),
            self.method,
            self.uri,
            self.version,
            self.status.as_u16()
        )?;

        match self.bytes {
            Some(bytes) => write!(f, "{}", bytes)?,
            None => f.write_str("-")?,
        }

        write!(
            f,
            " \"{}\" \"{}\"",
            quoted(self.referer.as_deref()),
            quoted(self.user_agent.as_deref())
        )
    }
}

/// Header value with embedded quotes escaped, or `-` when absent
fn quoted(value: Option<&str>) -> String {
    match value {
        Some(v) if !v.is_empty() => v.replace('"', "\\\""),
        _ => "-".to_string(),
    }
}

fn header_text(headers: &HeaderMap, name: header::HeaderName) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

/// Size of the response body, when known before it is streamed
fn body_bytes(response: &Response) -> Option<u64> {
    response.body().size_hint().exact().or_else(|| {
        response
            .headers()
            .get(header::CONTENT_LENGTH)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse().ok())
    })
}

/// Middleware function for axum
///
/// Use with `axum::middleware::from_fn`. The peer address is taken from
/// `ConnectInfo<SocketAddr>` when the server provides it.
pub async fn access_log(request: Request, next: Next) -> Response {
    let remote = request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip());
    let method = request.method().clone();
    let uri = request.uri().clone();
    let version = request.version();
    let referer = header_text(request.headers(), header::REFERER);
    let user_agent = header_text(request.headers(), header::USER_AGENT);

    let response = next.run(request).await;

    let record = AccessRecord {
        remote,
        timestamp: Utc::now(),
        method,
        uri,
        version,
        status: response.status(),
        bytes: body_bytes(&response),
        referer,
        user_agent,
    };
    tracing::info!(target: ACCESS_LOG_TARGET, "{}", record);

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use chrono::TimeZone;

    fn record() -> AccessRecord {
        AccessRecord {
            remote: Some("203.0.113.9".parse().unwrap()),
            timestamp: Utc.with_ymd_and_hms(2024, 3, 5, 14, 7, 9).unwrap(),
            method: Method::POST,
            uri: "/goals?draft=1".parse().unwrap(),
            version: Version::HTTP_11,
            status: StatusCode::CREATED,
            bytes: Some(61),
            referer: Some("http://localhost:3000/".to_string()),
            user_agent: Some("curl/8.5.0".to_string()),
        }
    }

    #[test]
    fn test_combined_format() {
        assert_eq!(
            record().to_string(),
            r#"203.0.113.9 - - [05/Mar/2024:14:07:09 +0000] "POST /goals?draft=1 HTTP/1.1" 201 61 "http://localhost:3000/" "curl/8.5.0""#
        );
    }

    #[test]
    fn test_missing_fields_render_as_dash() {
        let mut record = record();
        record.remote = None;
        record.bytes = None;
        record.referer = None;
        record.user_agent = Some(String::new());

        assert_eq!(
            record.to_string(),
            r#"- - - [05/Mar/2024:14:07:09 +0000] "POST /goals?draft=1 HTTP/1.1" 201 - "-" "-""#
        );
    }

    #[test]
    fn test_quotes_in_headers_are_escaped() {
        let mut record = record();
        record.user_agent = Some(r#"evil" agent"#.to_string());
        assert!(record.to_string().ends_with(r#""evil\" agent""#));
    }

    #[test]
    fn test_body_bytes_from_full_body() {
        let response = Response::new(Body::from("hello"));
        assert_eq!(body_bytes(&response), Some(5));
    }
}
