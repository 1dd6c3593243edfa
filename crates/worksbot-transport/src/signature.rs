//! Callback signature verification.
//!
//! The platform signs each callback body with HMAC-SHA256 and sends the
//! base64 digest in the `x-works-signature` header.

use base64::{Engine, engine::general_purpose::STANDARD};
use hmac::{Hmac, Mac};
use sha2::Sha256;

use crate::error::{SignatureError, SignatureResult};

type HmacSha256 = Hmac<Sha256>;

/// Header carrying the body signature.
pub const SIGNATURE_HEADER: &str = "x-works-signature";

fn mac(secret: &str, body: &[u8]) -> SignatureResult<HmacSha256> {
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).map_err(|_| SignatureError::InvalidKey)?;
    mac.update(body);
    Ok(mac)
}

/// Computes the base64 signature of `body`.
pub fn sign(secret: &str, body: &[u8]) -> SignatureResult<String> {
    Ok(STANDARD.encode(mac(secret, body)?.finalize().into_bytes()))
}

/// Checks `signature` (the header value, if any) against `body`.
pub fn verify(secret: &str, body: &[u8], signature: Option<&str>) -> SignatureResult<()> {
    let signature = signature.ok_or(SignatureError::Missing)?;
    let expected = STANDARD
        .decode(signature.trim())
        .map_err(|_| SignatureError::Malformed)?;

    mac(secret, body)?
        .verify_slice(&expected)
        .map_err(|_| SignatureError::Mismatch)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_and_verify() {
        let body = br#"{"type":"join","source":{"roomId":"r1"}}"#;
        let signature = sign("api-id", body).unwrap();

        assert_eq!(verify("api-id", body, Some(&signature)), Ok(()));
        assert_eq!(
            verify("other", body, Some(&signature)),
            Err(SignatureError::Mismatch)
        );
        assert_eq!(
            verify("api-id", b"tampered", Some(&signature)),
            Err(SignatureError::Mismatch)
        );
    }

    #[test]
    fn test_known_digest() {
        // HMAC-SHA256("key", "The quick brown fox jumps over the lazy dog")
        assert_eq!(
            sign("key", b"The quick brown fox jumps over the lazy dog"),
            Ok("97yD9DBThCSxMpjmqm+xQ+9NWaFJRhdZl0edvC0aPNg=".to_string())
        );
    }

    #[test]
    fn test_missing_and_malformed() {
        assert_eq!(verify("k", b"{}", None), Err(SignatureError::Missing));
        assert_eq!(
            verify("k", b"{}", Some("not base64!")),
            Err(SignatureError::Malformed)
        );
    }

    #[test]
    fn test_empty_secret_still_signs() {
        let body = b"{}";
        let signature = sign("", body).unwrap();
        assert_eq!(verify("", body, Some(&signature)), Ok(()));
    }
}
