//! Uptime targets and the reports produced by probing them.

mod descriptor;
mod report;

pub use descriptor::{HostCheck, HostDescriptor, HostSet};
pub use report::HealthReport;

use url::Url;

/// Metadata key holding the check URL.
pub const META_TARGET_URL: &str = "target_url";
/// Metadata key holding the owning tenant (API) id.
pub const META_TENANT_ID: &str = "api_id";
/// Metadata key holding the scheme-stripped host authority.
pub const META_HOST: &str = "host_name";

/// Network location of a URL: host plus explicit port, without scheme.
pub fn host_authority(url: &Url) -> String {
    let host = url.host_str().unwrap_or_default();
    match url.port() {
        Some(port) => format!("{}:{}", host, port),
        None => host.to_string(),
    }
}

/// Extract an authority from text that failed to parse as a URL.
///
/// Takes whatever sits between `://` and the next `/`, `?` or `#`, dropping
/// any userinfo. Input without a scheme separator is returned trimmed.
pub fn best_effort_authority(raw: &str) -> String {
    let rest = match raw.find("://") {
        Some(idx) => &raw[idx + 3..],
        None => return raw.trim().to_string(),
    };
    let end = rest.find(['/', '?', '#']).unwrap_or(rest.len());
    let authority = &rest[..end];
    match authority.rfind('@') {
        Some(at) => authority[at + 1..].to_string(),
        None => authority.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_host_authority() {
        let url = Url::parse("http://api.example.com/path").unwrap();
        assert_eq!(host_authority(&url), "api.example.com");

        let url = Url::parse("http://google.com:3000/").unwrap();
        assert_eq!(host_authority(&url), "google.com:3000");

        // Default ports are not part of the authority.
        let url = Url::parse("https://example.com:443/x").unwrap();
        assert_eq!(host_authority(&url), "example.com");
    }

    #[test]
    fn test_best_effort_authority() {
        assert_eq!(best_effort_authority("http://bad host/x"), "bad host");
        assert_eq!(best_effort_authority("http://u:p@h:9/x?y"), "h:9");
        assert_eq!(best_effort_authority("  plain  "), "plain");
        assert_eq!(best_effort_authority("http://"), "");
    }
}
