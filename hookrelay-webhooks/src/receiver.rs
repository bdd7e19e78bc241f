//! Verification of incoming webhook calls
//!
//! A receiving service picks one [`Verifier`] and runs every inbound call
//! through it. Three levels are provided:
//!
//! - [`NoVerification`] accepts everything.
//! - [`SecretUrlVerifier`] expects the HMAC of the empty message as the last
//!   path segment, so only parties that know the secret can construct the URL.
//! - [`ContentVerifier`] checks the signature header against the payload
//!   embedded in the delivered body.

use crate::{Result, WebhookError, WebhookSignature, payload};
use std::fmt;
use std::str::FromStr;

/// An inbound call as seen by a verifier
#[derive(Debug, Clone, Copy)]
pub struct Invocation<'a> {
    /// Request path
    pub path: &'a str,

    /// Value of the signature header, if present
    pub signature: Option<&'a str>,

    /// Value of the event header, if present
    pub event: Option<&'a str>,

    /// Raw request body
    pub body: &'a [u8],
}

/// Decides whether an inbound call is authentic
pub trait Verifier: Send + Sync + fmt::Debug {
    /// Short name for logs
    fn name(&self) -> &'static str;

    /// Accept the call or explain why it is rejected
    fn verify(&self, invocation: &Invocation<'_>) -> Result<()>;
}

/// Accepts every call without checks
#[derive(Debug, Clone, Copy, Default)]
pub struct NoVerification;

impl Verifier for NoVerification {
    fn name(&self) -> &'static str {
        "none"
    }

    fn verify(&self, _invocation: &Invocation<'_>) -> Result<()> {
        Ok(())
    }
}

/// Requires the secret token as the final path segment
#[derive(Debug, Clone)]
pub struct SecretUrlVerifier {
    signer: WebhookSignature,
    token: String,
}

impl SecretUrlVerifier {
    /// Create a verifier deriving the URL token from `signer`
    pub fn new(signer: WebhookSignature) -> Result<Self> {
        let token = signer.sign(b"")?;
        Ok(Self { signer, token })
    }

    /// The path segment callers must use
    pub fn token(&self) -> &str {
        &self.token
    }
}

impl Verifier for SecretUrlVerifier {
    fn name(&self) -> &'static str {
        "url"
    }

    fn verify(&self, invocation: &Invocation<'_>) -> Result<()> {
        let segments: Vec<&str> = invocation.path.trim_matches('/').split('/').collect();
        let [_, token] = segments.as_slice() else {
            return Err(WebhookError::SignatureInvalid(format!(
                "Wrong number of tokens in {}",
                invocation.path
            )));
        };

        let received = hex::decode(token)?;
        if self.signer.verify_tag(b"", &received)? {
            Ok(())
        } else {
            Err(WebhookError::SignatureInvalid(format!(
                "Call to non-existent webhook on {}",
                invocation.path
            )))
        }
    }
}

/// Checks the signature header against the delivered payload
#[derive(Debug, Clone)]
pub struct ContentVerifier {
    signer: WebhookSignature,
}

impl ContentVerifier {
    /// Create a verifier checking signatures made with `signer`'s secret
    pub fn new(signer: WebhookSignature) -> Self {
        Self { signer }
    }
}

impl Verifier for ContentVerifier {
    fn name(&self) -> &'static str {
        "content"
    }

    fn verify(&self, invocation: &Invocation<'_>) -> Result<()> {
        let signature = invocation.signature.ok_or(WebhookError::SignatureMissing)?;
        let signed = payload::extract_payload(invocation.body, invocation.event);

        if self.signer.verify(signed, signature)? {
            Ok(())
        } else {
            Err(WebhookError::SignatureInvalid(
                "Content does not match signature".to_string(),
            ))
        }
    }
}

/// How strictly a receiver checks inbound calls
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerificationLevel {
    /// Accept everything
    #[default]
    None,
    /// Secret token in the URL
    Url,
    /// Signature over the content
    Content,
}

impl VerificationLevel {
    /// Build the verifier for this level
    pub fn verifier(self, signer: WebhookSignature) -> Result<Box<dyn Verifier>> {
        Ok(match self {
            Self::None => Box::new(NoVerification),
            Self::Url => Box::new(SecretUrlVerifier::new(signer)?),
            Self::Content => Box::new(ContentVerifier::new(signer)),
        })
    }

    /// Level name as accepted by [`FromStr`]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::Url => "url",
            Self::Content => "content",
        }
    }
}

impl FromStr for VerificationLevel {
    type Err = WebhookError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "none" | "0" => Ok(Self::None),
            "url" | "1" => Ok(Self::Url),
            "content" | "2" => Ok(Self::Content),
            other => Err(WebhookError::ConfigError(format!(
                "Invalid validation level: {}",
                other
            ))),
        }
    }
}

impl fmt::Display for VerificationLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> WebhookSignature {
        WebhookSignature::new([1u8, 2, 3, 4, 5])
    }

    fn invocation<'a>(
        path: &'a str,
        signature: Option<&'a str>,
        event: Option<&'a str>,
        body: &'a [u8],
    ) -> Invocation<'a> {
        Invocation {
            path,
            signature,
            event,
            body,
        }
    }

    #[test]
    fn test_no_verification_accepts_anything() {
        let call = invocation("/invoked/", None, None, b"anything");
        assert!(NoVerification.verify(&call).is_ok());
    }

    #[test]
    fn test_url_verifier() {
        let verifier = SecretUrlVerifier::new(signer()).unwrap();
        let path = format!("/invoked/{}", verifier.token());

        assert!(verifier.verify(&invocation(&path, None, None, b"")).is_ok());
    }

    #[test]
    fn test_url_verifier_wrong_token() {
        let verifier = SecretUrlVerifier::new(signer()).unwrap();
        let other = SecretUrlVerifier::new(WebhookSignature::new("other")).unwrap();
        let path = format!("/invoked/{}", other.token());

        let result = verifier.verify(&invocation(&path, None, None, b""));
        assert!(matches!(result, Err(WebhookError::SignatureInvalid(_))));
    }

    #[test]
    fn test_url_verifier_wrong_shape() {
        let verifier = SecretUrlVerifier::new(signer()).unwrap();

        let result = verifier.verify(&invocation("/invoked/", None, None, b""));
        assert!(matches!(result, Err(WebhookError::SignatureInvalid(_))));

        let result = verifier.verify(&invocation("/invoked/zz", None, None, b""));
        assert!(matches!(result, Err(WebhookError::SignatureMalformed(_))));
    }

    #[test]
    fn test_content_verifier_accepts_delivered_body() {
        let verifier = ContentVerifier::new(signer());
        let signature = signer().sign(b"payload-A").unwrap();
        let body = payload::compose("ORDER_PLACED", b"payload-A");

        let with_event = invocation("/invoked/", Some(signature.as_str()), Some("ORDER_PLACED"), &body);
        assert!(verifier.verify(&with_event).is_ok());

        let without_event = invocation("/invoked/", Some(signature.as_str()), None, &body);
        assert!(verifier.verify(&without_event).is_ok());
    }

    #[test]
    fn test_content_verifier_rejects_tampering() {
        let verifier = ContentVerifier::new(signer());
        let signature = signer().sign(b"payload-A").unwrap();
        let body = payload::compose("ORDER_PLACED", b"payload-B");

        let result = verifier.verify(&invocation("/", Some(signature.as_str()), None, &body));
        assert!(matches!(result, Err(WebhookError::SignatureInvalid(_))));
    }

    #[test]
    fn test_content_verifier_requires_signature() {
        let verifier = ContentVerifier::new(signer());
        let result = verifier.verify(&invocation("/", None, None, b"body"));
        assert!(matches!(result, Err(WebhookError::SignatureMissing)));
    }

    #[test]
    fn test_level_parsing() {
        assert_eq!("none".parse::<VerificationLevel>().unwrap(), VerificationLevel::None);
        assert_eq!("1".parse::<VerificationLevel>().unwrap(), VerificationLevel::Url);
        assert_eq!(
            "Content".parse::<VerificationLevel>().unwrap(),
            VerificationLevel::Content
        );
        assert!("3".parse::<VerificationLevel>().is_err());
    }

    #[test]
    fn test_level_builds_matching_verifier() {
        for level in [
            VerificationLevel::None,
            VerificationLevel::Url,
            VerificationLevel::Content,
        ] {
            let verifier = level.verifier(signer()).unwrap();
            assert_eq!(verifier.name(), level.as_str());
        }
    }
}
