//! # Client Fingerprinting
//!
//! Derives a stable, opaque identity for a caller from connection and header
//! attributes.
//!
//! ## How The Digest Is Built
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────┐
//! │                    fingerprint(attributes)                          │
//! │                                                                     │
//! │  { user_agent, ip, accept_language, accept_encoding,               │
//! │    client_hint_ua, client_hint_platform }                          │
//! │        │                                                            │
//! │        ▼  canonical form: keys sorted, JSON-escaped values,        │
//! │           ": " and ", " separators                                 │
//! │  {"accept_encoding": "gzip", "accept_language": "en", ...}         │
//! │        │                                                            │
//! │        ▼  SHA-256                                                   │
//! │  64-char lowercase hex digest                                      │
//! └─────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The canonical form is part of the contract: identical attribute sets must
//! always produce the identical digest, across processes and releases, so
//! stored fingerprints stay comparable. Do not change the key names, the
//! ordering, or the separators.
//!
//! Missing attributes degrade to empty strings - this is best-effort
//! telemetry and never fails a request.

use std::collections::HashMap;

use sha2::{Digest, Sha256};
use tracing::info;

/// Client attributes that feed the fingerprint.
///
/// All fields default to empty; callers fill in whatever headers were
/// actually present.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClientAttributes {
    /// `User-Agent` header.
    pub user_agent: String,
    /// Resolved client IP (see [`resolve_ip`]).
    pub ip_address: String,
    /// `Accept-Language` header.
    pub accept_language: String,
    /// `Accept-Encoding` header.
    pub accept_encoding: String,
    /// `Sec-CH-UA` client hint.
    pub client_hint_ua: String,
    /// `Sec-CH-UA-Platform` client hint.
    pub client_hint_platform: String,
}

impl ClientAttributes {
    /// Builds attributes from a flat map, tolerating missing keys.
    ///
    /// Recognized keys: `user_agent`, `ip`, `accept_language`,
    /// `accept_encoding`, `client_hint_ua`, `client_hint_platform`.
    /// Unknown keys are ignored; map iteration order is irrelevant.
    pub fn from_map(map: &HashMap<String, String>) -> Self {
        let get = |key: &str| map.get(key).cloned().unwrap_or_default();

        ClientAttributes {
            user_agent: get("user_agent"),
            ip_address: get("ip"),
            accept_language: get("accept_language"),
            accept_encoding: get("accept_encoding"),
            client_hint_ua: get("client_hint_ua"),
            client_hint_platform: get("client_hint_platform"),
        }
    }

    /// Canonical serialized form fed to the digest.
    ///
    /// Keys are fixed and lexicographically ordered; values are JSON string
    /// literals; pairs join with `", "` and keys bind with `": "`.
    fn canonical(&self) -> String {
        // Already in lexicographic key order.
        let pairs: [(&str, &str); 6] = [
            ("accept_encoding", &self.accept_encoding),
            ("accept_language", &self.accept_language),
            ("ip_address", &self.ip_address),
            ("sec_ch_ua", &self.client_hint_ua),
            ("sec_ch_ua_platform", &self.client_hint_platform),
            ("user_agent", &self.user_agent),
        ];

        let body: Vec<String> = pairs
            .iter()
            .map(|(key, value)| {
                format!(
                    "{}: {}",
                    serde_json::Value::String((*key).to_string()),
                    serde_json::Value::String((*value).to_string()),
                )
            })
            .collect();

        format!("{{{}}}", body.join(", "))
    }
}

/// Computes the fingerprint digest for a set of client attributes.
///
/// Pure and deterministic: the same attributes always hash to the same
/// 64-character lowercase hex string, and any single attribute change
/// changes the output.
pub fn fingerprint(attrs: &ClientAttributes) -> String {
    let canonical = attrs.canonical();

    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hex::encode(hasher.finalize())
}

/// Resolves the client IP from a forwarded-for chain and the direct peer.
///
/// The first entry of the chain wins when present (the original client, as
/// appended by the nearest proxy); otherwise the direct peer address is
/// used. Garbage input degrades to the peer address rather than failing.
pub fn resolve_ip(forwarded_for: Option<&str>, peer_addr: &str) -> String {
    if let Some(chain) = forwarded_for {
        if let Some(first) = chain.split(',').next() {
            let first = first.trim();
            if !first.is_empty() {
                return first.to_string();
            }
        }
    }

    peer_addr.to_string()
}

/// Emits a structured access event for security monitoring.
///
/// This is telemetry, not enforcement: it always succeeds, and it does not
/// persist anything itself - subscribers decide what to do with the event.
pub fn log_access(event: &str, attrs: &ClientAttributes, user_id: Option<&str>) {
    info!(
        target: "warden_guard::access",
        event = %event,
        ip = %attrs.ip_address,
        user_agent = %attrs.user_agent,
        fingerprint = %fingerprint(attrs),
        user_id = user_id.unwrap_or(""),
        "access event"
    );
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> ClientAttributes {
        ClientAttributes {
            user_agent: "Mozilla/5.0".to_string(),
            ip_address: "203.0.113.7".to_string(),
            accept_language: "en-US,en;q=0.9".to_string(),
            accept_encoding: "gzip, deflate, br".to_string(),
            client_hint_ua: "\"Chromium\";v=\"120\"".to_string(),
            client_hint_platform: "\"Linux\"".to_string(),
        }
    }

    #[test]
    fn test_canonical_form_is_pinned() {
        let attrs = ClientAttributes {
            user_agent: "UA".to_string(),
            ip_address: "1.2.3.4".to_string(),
            accept_language: "en".to_string(),
            accept_encoding: "gzip".to_string(),
            client_hint_ua: String::new(),
            client_hint_platform: String::new(),
        };

        assert_eq!(
            attrs.canonical(),
            r#"{"accept_encoding": "gzip", "accept_language": "en", "ip_address": "1.2.3.4", "sec_ch_ua": "", "sec_ch_ua_platform": "", "user_agent": "UA"}"#
        );
    }

    #[test]
    fn test_canonical_form_escapes_values() {
        let attrs = ClientAttributes {
            client_hint_ua: "\"Chromium\"".to_string(),
            ..Default::default()
        };

        assert!(attrs.canonical().contains(r#""sec_ch_ua": "\"Chromium\"""#));
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = fingerprint(&sample());
        let b = fingerprint(&sample());
        assert_eq!(a, b);

        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }

    #[test]
    fn test_fingerprint_ignores_map_key_order() {
        let mut forward = HashMap::new();
        forward.insert("user_agent".to_string(), "UA".to_string());
        forward.insert("ip".to_string(), "1.2.3.4".to_string());
        forward.insert("accept_language".to_string(), "en".to_string());

        let mut reverse = HashMap::new();
        reverse.insert("accept_language".to_string(), "en".to_string());
        reverse.insert("ip".to_string(), "1.2.3.4".to_string());
        reverse.insert("user_agent".to_string(), "UA".to_string());

        assert_eq!(
            fingerprint(&ClientAttributes::from_map(&forward)),
            fingerprint(&ClientAttributes::from_map(&reverse)),
        );
    }

    #[test]
    fn test_any_attribute_change_changes_the_digest() {
        let base = sample();
        let base_print = fingerprint(&base);

        let variants = [
            ClientAttributes {
                user_agent: "other".to_string(),
                ..base.clone()
            },
            ClientAttributes {
                ip_address: "198.51.100.1".to_string(),
                ..base.clone()
            },
            ClientAttributes {
                accept_language: "fr".to_string(),
                ..base.clone()
            },
            ClientAttributes {
                accept_encoding: "identity".to_string(),
                ..base.clone()
            },
            ClientAttributes {
                client_hint_ua: String::new(),
                ..base.clone()
            },
            ClientAttributes {
                client_hint_platform: "\"Windows\"".to_string(),
                ..base.clone()
            },
        ];

        for variant in variants {
            assert_ne!(fingerprint(&variant), base_print);
        }
    }

    #[test]
    fn test_missing_attributes_degrade_to_empty() {
        let empty_map = HashMap::new();
        let attrs = ClientAttributes::from_map(&empty_map);
        assert_eq!(attrs, ClientAttributes::default());

        // Still hashable - never an error.
        assert_eq!(fingerprint(&attrs).len(), 64);
    }

    #[test]
    fn test_resolve_ip_prefers_first_forwarded_entry() {
        assert_eq!(
            resolve_ip(Some("203.0.113.7, 10.0.0.1, 10.0.0.2"), "10.0.0.3"),
            "203.0.113.7"
        );
        assert_eq!(resolve_ip(Some(" 203.0.113.7 "), "10.0.0.3"), "203.0.113.7");
        assert_eq!(resolve_ip(None, "10.0.0.3"), "10.0.0.3");
        assert_eq!(resolve_ip(Some(""), "10.0.0.3"), "10.0.0.3");
        assert_eq!(resolve_ip(Some(" , 10.0.0.1"), "10.0.0.3"), "10.0.0.3");
    }
}
