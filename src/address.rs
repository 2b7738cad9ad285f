//! Virtual document addressing.
//!
//! Every reconstructed document is identified by an [`Address`]: logical
//! file name, side, the commit pair the change set was resolved against,
//! and the change status. The codec is a pure bijection over those fields,
//! so a host can cache a token and re-request the same document without
//! re-resolving identity.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Serialize};

use crate::change::ChangeStatus;
use crate::content::Side;

/// Token scheme prefix.
pub const SCHEME: &str = "prdoc";

/// Identity of one reconstructed document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    pub file_name: String,
    pub side: Side,
    pub base_commit: String,
    pub head_commit: String,
    pub status: ChangeStatus,
}

/// Encode an address into a stable token.
///
/// Deterministic: the same address always produces the same token within a
/// serde_json version (struct fields serialize in declaration order).
pub fn encode(address: &Address) -> String {
    let payload = serde_json::to_string(address).expect("Address is always serializable");
    format!("{}:{}", SCHEME, URL_SAFE_NO_PAD.encode(payload))
}

/// Decode a token back into an address.
///
/// Total: malformed scheme, base64, or payload all yield `None`.
pub fn decode(token: &str) -> Option<Address> {
    let payload = token.strip_prefix(SCHEME)?.strip_prefix(':')?;
    let bytes = URL_SAFE_NO_PAD.decode(payload).ok()?;
    serde_json::from_slice(&bytes).ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn address(side: Side, status: ChangeStatus) -> Address {
        Address {
            file_name: "src/lib.rs".to_string(),
            side,
            base_commit: "0123abc".to_string(),
            head_commit: "4567def".to_string(),
            status,
        }
    }

    #[test]
    fn test_round_trip_all_sides_and_statuses() {
        for side in [Side::Base, Side::Head] {
            for status in [
                ChangeStatus::Added,
                ChangeStatus::Deleted,
                ChangeStatus::Modified,
                ChangeStatus::Renamed,
                ChangeStatus::Copied,
                ChangeStatus::Unknown,
            ] {
                let original = address(side, status);
                let decoded = decode(&encode(&original));
                assert_eq!(decoded, Some(original));
            }
        }
    }

    #[test]
    fn test_encode_is_stable() {
        let a = address(Side::Base, ChangeStatus::Modified);
        assert_eq!(encode(&a), encode(&a.clone()));
    }

    #[test]
    fn test_tokens_differ_per_side() {
        let base = encode(&address(Side::Base, ChangeStatus::Modified));
        let head = encode(&address(Side::Head, ChangeStatus::Modified));
        assert_ne!(base, head);
    }

    #[test]
    fn test_decode_malformed_returns_none() {
        assert_eq!(decode(""), None);
        assert_eq!(decode("prdoc"), None);
        assert_eq!(decode("prdoc:"), None);
        assert_eq!(decode("prdoc:!!!not-base64!!!"), None);
        assert_eq!(
            decode(&format!("prdoc:{}", URL_SAFE_NO_PAD.encode("{\"nope\":1}"))),
            None
        );
        assert_eq!(decode("other:abcd"), None);
    }

    #[test]
    fn test_token_has_scheme_prefix() {
        let token = encode(&address(Side::Head, ChangeStatus::Added));
        assert!(token.starts_with("prdoc:"));
    }
}
