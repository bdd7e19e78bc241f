//! Webhook signature generation and verification

use crate::{Result, WebhookError};
use hmac::{Hmac, Mac};
use sha2::Sha256;
use std::fmt;
use std::sync::Arc;

type HmacSha256 = Hmac<Sha256>;

/// HMAC-SHA256 signer keyed by the process-wide shared secret.
///
/// The secret is fixed at construction and shared read-only between clones,
/// so one instance can be handed to every delivery task and to the verifiers
/// of the receiving side.
#[derive(Clone)]
pub struct WebhookSignature {
    secret: Arc<[u8]>,
}

impl WebhookSignature {
    /// Create a new signer with the given secret
    pub fn new(secret: impl AsRef<[u8]>) -> Self {
        Self {
            secret: Arc::from(secret.as_ref()),
        }
    }

    /// Sign `payload` and render the tag as lowercase hex
    pub fn sign(&self, payload: &[u8]) -> Result<String> {
        Ok(hex::encode(self.tag(payload)?))
    }

    /// Compute the raw HMAC tag over `payload`
    pub fn tag(&self, payload: &[u8]) -> Result<Vec<u8>> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Verify a hex signature against the payload.
    ///
    /// Returns `Ok(false)` for a well-formed signature that does not match and
    /// an error when the signature is not hex at all.
    pub fn verify(&self, payload: &[u8], signature: &str) -> Result<bool> {
        let received = hex::decode(signature.trim())?;
        self.verify_tag(payload, &received)
    }

    /// Verify a raw tag against the payload in constant time
    pub fn verify_tag(&self, payload: &[u8], tag: &[u8]) -> Result<bool> {
        let mut mac = self.mac()?;
        mac.update(payload);
        Ok(mac.verify_slice(tag).is_ok())
    }

    fn mac(&self) -> Result<HmacSha256> {
        HmacSha256::new_from_slice(&self.secret)
            .map_err(|e| WebhookError::Internal(format!("HMAC key rejected: {}", e)))
    }
}

impl fmt::Debug for WebhookSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WebhookSignature")
            .field("secret", &"<redacted>")
            .finish()
    }
}

/// Header names used on delivery calls
pub mod headers {
    /// The signature header name
    pub const SIGNATURE: &str = "X-SIGNATURE";

    /// Event label of the subscription being notified
    pub const EVENT: &str = "X-EVENT";
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sign_is_deterministic() {
        let signer = WebhookSignature::new([1u8, 2, 3, 4, 5]);

        let sig1 = signer.sign(b"payload-A").unwrap();
        let sig2 = signer.sign(b"payload-A").unwrap();

        assert_eq!(sig1, sig2);
        assert_eq!(sig1.len(), 64);
        assert!(sig1.chars().all(|c| c.is_ascii_digit() || c.is_ascii_lowercase()));
    }

    #[test]
    fn test_different_payloads_differ() {
        let signer = WebhookSignature::new("test-secret");
        assert_ne!(
            signer.sign(b"payload-A").unwrap(),
            signer.sign(b"payload-B").unwrap()
        );
    }

    #[test]
    fn test_known_vector() {
        // RFC 4231 test case 2
        let signer = WebhookSignature::new("Jefe");
        let signature = signer.sign(b"what do ya want for nothing?").unwrap();
        assert_eq!(
            signature,
            "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843"
        );
    }

    #[test]
    fn test_verify() {
        let signer = WebhookSignature::new("test-secret");
        let signature = signer.sign(b"test payload").unwrap();

        assert!(signer.verify(b"test payload", &signature).unwrap());
        assert!(!signer.verify(b"tampered payload", &signature).unwrap());
    }

    #[test]
    fn test_verify_wrong_secret() {
        let signer1 = WebhookSignature::new("secret1");
        let signer2 = WebhookSignature::new("secret2");

        let signature = signer1.sign(b"test payload").unwrap();
        assert!(!signer2.verify(b"test payload", &signature).unwrap());
    }

    #[test]
    fn test_verify_malformed_hex() {
        let signer = WebhookSignature::new("test-secret");
        let result = signer.verify(b"test payload", "not-hex");
        assert!(matches!(result, Err(WebhookError::SignatureMalformed(_))));
    }

    #[test]
    fn test_verify_truncated_tag() {
        let signer = WebhookSignature::new("test-secret");
        let signature = signer.sign(b"test payload").unwrap();
        assert!(!signer.verify(b"test payload", &signature[..32]).unwrap());
    }

    #[test]
    fn test_debug_redacts_secret() {
        let signer = WebhookSignature::new("super-secret");
        let rendered = format!("{:?}", signer);
        assert!(!rendered.contains("super-secret"));
    }
}
