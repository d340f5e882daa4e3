use crate::error::ConfigError;
use url::Url;

/// Parsed probe target: normalized base URL plus the domain-name tokens the
/// candidate generator derives variants from. Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetDescriptor {
    base_url: String,
    tokens: Vec<String>,
}

impl TargetDescriptor {
    /// Parse a target URL string. The scheme must be http or https and a
    /// host must be present; anything else is a configuration error.
    pub fn parse(raw: &str) -> Result<Self, ConfigError> {
        let url = Url::parse(raw).map_err(|e| ConfigError::InvalidUrl {
            url: raw.to_string(),
            reason: e.to_string(),
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(ConfigError::InvalidUrl {
                url: raw.to_string(),
                reason: format!("unsupported scheme {:?}", url.scheme()),
            });
        }

        let host = match url.host_str() {
            Some(h) if !h.is_empty() => h.to_string(),
            _ => {
                return Err(ConfigError::InvalidUrl {
                    url: raw.to_string(),
                    reason: "missing host".to_string(),
                })
            }
        };

        Ok(Self {
            base_url: raw.trim_end_matches('/').to_string(),
            tokens: domain_tokens(&host),
        })
    }

    /// Base URL without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Lowercase domain tokens; empty for IP-literal hosts.
    pub fn tokens(&self) -> &[String] {
        &self.tokens
    }
}

/// Split a hostname into lowercase labels, dropping `www` and the final
/// label (the TLD) when more than one remains. IP literals yield no tokens.
fn domain_tokens(host: &str) -> Vec<String> {
    let bare = host.trim_start_matches('[').trim_end_matches(']');
    if bare.parse::<std::net::IpAddr>().is_ok() {
        return Vec::new();
    }

    let mut labels: Vec<String> = bare
        .split('.')
        .map(|l| l.to_ascii_lowercase())
        .filter(|l| !l.is_empty() && l != "www")
        .collect();
    if labels.len() > 1 {
        labels.pop();
    }
    labels.retain(|l| l.chars().any(|c| c.is_ascii_alphanumeric()));
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_and_tokenizes_host() {
        let d = TargetDescriptor::parse("https://www.example.com/").unwrap();
        assert_eq!(d.base_url(), "https://www.example.com");
        assert_eq!(d.tokens(), ["example"]);
    }

    #[test]
    fn keeps_subdomain_tokens() {
        let d = TargetDescriptor::parse("http://api.staging.example.com").unwrap();
        assert_eq!(d.tokens(), ["api", "staging", "example"]);
    }

    #[test]
    fn single_label_host_kept_whole() {
        let d = TargetDescriptor::parse("http://localhost:8080").unwrap();
        assert_eq!(d.tokens(), ["localhost"]);
    }

    #[test]
    fn ip_hosts_have_no_tokens() {
        let d = TargetDescriptor::parse("http://192.168.1.10/app").unwrap();
        assert!(d.tokens().is_empty());
        assert_eq!(d.base_url(), "http://192.168.1.10/app");
    }

    #[test]
    fn rejects_bad_urls() {
        assert!(TargetDescriptor::parse("not a url").is_err());
        assert!(TargetDescriptor::parse("ftp://example.com").is_err());
    }
}
