//! Redirect audit log
//!
//! Every host redirect is written as one line to a dedicated "redirect"
//! channel: anonymized client IP, source URI and destination URL,
//! tab-separated. Sinks are pluggable via the subsystem registry.

use std::fs::{File, OpenOptions};
use std::io::Write;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::path::Path;
use std::sync::Mutex;

use axum::http::HeaderMap;

/// One redirect event.
#[derive(Debug, Clone)]
pub struct RedirectEntry {
    /// Client IP, already anonymized per the configured policy.
    pub client_ip: String,
    /// Request URI the client arrived on.
    pub source: String,
    /// Absolute URL the client was redirected to.
    pub destination: String,
}

impl RedirectEntry {
    /// Tab-separated audit line.
    pub fn format_line(&self) -> String {
        format!(
            "{} \t Host-Redirect Source: {} -> {}",
            self.client_ip, self.source, self.destination
        )
    }
}

/// Capability interface for the redirect audit channel.
pub trait AuditSink: Send + Sync {
    fn record(&self, entry: &RedirectEntry);
}

/// Emits audit lines on the `redirect` tracing target.
pub struct TracingAuditSink;

impl AuditSink for TracingAuditSink {
    fn record(&self, entry: &RedirectEntry) {
        tracing::info!(target: "redirect", "{}", entry.format_line());
    }
}

/// Appends audit lines to a dedicated log file.
pub struct FileAuditSink {
    file: Mutex<File>,
}

impl FileAuditSink {
    pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self {
            file: Mutex::new(file),
        })
    }
}

impl AuditSink for FileAuditSink {
    fn record(&self, entry: &RedirectEntry) {
        if let Ok(mut file) = self.file.lock() {
            // A failed audit write must not fail the request.
            if let Err(e) = writeln!(file, "{}", entry.format_line()) {
                tracing::warn!(error = %e, "failed to write redirect audit line");
            }
        }
    }
}

/// Extract client IP address from request headers.
/// Checks common proxy headers in order of preference.
pub fn extract_client_ip(headers: &HeaderMap) -> Option<String> {
    headers
        .get("cf-connecting-ip") // Cloudflare
        .or_else(|| headers.get("x-real-ip"))
        .or_else(|| headers.get("x-forwarded-for"))
        .and_then(|h| h.to_str().ok())
        .map(|s| s.split(',').next().unwrap_or(s).trim().to_string())
}

/// Anonymize an IP address: IPv4 zeroes the last octet, IPv6 the last 64 bits.
pub fn anonymize_ip(ip: IpAddr) -> IpAddr {
    match ip {
        IpAddr::V4(v4) => {
            let [a, b, c, _] = v4.octets();
            IpAddr::V4(Ipv4Addr::new(a, b, c, 0))
        }
        IpAddr::V6(v6) => {
            let [s0, s1, s2, s3, ..] = v6.segments();
            IpAddr::V6(Ipv6Addr::new(s0, s1, s2, s3, 0, 0, 0, 0))
        }
    }
}

/// Client IP for the audit line, anonymized when the policy requires it.
/// Unparseable header values are never logged verbatim.
pub fn audit_client_ip(headers: &HeaderMap, anonymize: bool) -> String {
    let raw = match extract_client_ip(headers) {
        Some(ip) => ip,
        None => return "unknown".to_string(),
    };

    if !anonymize {
        return raw;
    }

    match raw.parse::<IpAddr>() {
        Ok(ip) => anonymize_ip(ip).to_string(),
        Err(_) => "invalid".to_string(),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use axum::http::HeaderValue;

    #[test]
    fn test_anonymize_ipv4() {
        let ip: IpAddr = "203.0.113.42".parse().unwrap();
        assert_eq!(anonymize_ip(ip).to_string(), "203.0.113.0");
    }

    #[test]
    fn test_anonymize_ipv6() {
        let ip: IpAddr = "2001:db8:abcd:1234:5678:9abc:def0:1".parse().unwrap();
        assert_eq!(anonymize_ip(ip).to_string(), "2001:db8:abcd:1234::");
    }

    #[test]
    fn test_extract_client_ip_header_order() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("10.0.0.1, 10.0.0.2"));
        headers.insert("x-real-ip", HeaderValue::from_static("203.0.113.7"));
        assert_eq!(extract_client_ip(&headers), Some("203.0.113.7".to_string()));

        headers.insert("cf-connecting-ip", HeaderValue::from_static("198.51.100.9"));
        assert_eq!(extract_client_ip(&headers), Some("198.51.100.9".to_string()));
    }

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert("x-forwarded-for", HeaderValue::from_static("203.0.113.42, 10.0.0.2"));
        assert_eq!(audit_client_ip(&headers, true), "203.0.113.0");
    }

    #[test]
    fn test_audit_client_ip_missing_and_invalid() {
        let headers = HeaderMap::new();
        assert_eq!(audit_client_ip(&headers, true), "unknown");

        let mut headers = HeaderMap::new();
        headers.insert("x-real-ip", HeaderValue::from_static("not-an-ip"));
        assert_eq!(audit_client_ip(&headers, true), "invalid");
    }

    #[test]
    fn test_format_line_is_tab_separated() {
        let entry = RedirectEntry {
            client_ip: "203.0.113.0".to_string(),
            source: "/a/b?x=1".to_string(),
            destination: "http://shop.example.com/a/b?x=1".to_string(),
        };
        let line = entry.format_line();
        assert!(line.contains('\t'));
        assert!(line.starts_with("203.0.113.0"));
        assert!(line.ends_with("http://shop.example.com/a/b?x=1"));
    }

    #[test]
    fn test_file_sink_appends_lines() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let sink = FileAuditSink::open(file.path()).unwrap();
        let entry = RedirectEntry {
            client_ip: "203.0.113.0".to_string(),
            source: "/".to_string(),
            destination: "http://shop.example.com/".to_string(),
        };
        sink.record(&entry);
        sink.record(&entry);

        let contents = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
