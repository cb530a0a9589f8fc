use hmac::{Hmac, Mac};
use sha2::Sha256;
use subtle::ConstantTimeEq;

type HmacSha256 = Hmac<Sha256>;

/// Computes the lowercase hex HMAC-SHA256 of `payload` keyed with `secret`.
#[must_use]
pub fn compute_signature(payload: &[u8], secret: &[u8]) -> String {
    // HMAC accepts keys of any length, so this never fails.
    let Ok(mut mac) = HmacSha256::new_from_slice(secret) else {
        return String::new();
    };
    mac.update(payload);
    hex::encode(mac.finalize().into_bytes())
}

/// Checks `provided_signature_hex` against the HMAC-SHA256 of the raw body.
///
/// Never fails: an empty secret, an empty signature, malformed hex and a plain mismatch all
/// yield `false`.
#[must_use]
pub fn verify(raw_body: &[u8], provided_signature_hex: &str, secret: &[u8]) -> bool {
    if secret.is_empty() || provided_signature_hex.is_empty() {
        return false;
    }

    let expected = compute_signature(raw_body, secret);
    constant_time_eq(expected.as_bytes(), provided_signature_hex.as_bytes())
}

/// Byte comparison whose running time does not depend on where the inputs differ.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    a.ct_eq(b).into()
}

/// Guards the write path with the shared webhook secret.
#[derive(Clone)]
pub struct SignatureVerifier {
    secret: Option<Vec<u8>>,
}

impl std::fmt::Debug for SignatureVerifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SignatureVerifier").field("configured", &self.is_configured()).finish()
    }
}

impl SignatureVerifier {
    #[must_use]
    pub fn new(secret: Option<&[u8]>) -> Self {
        Self { secret: secret.filter(|s| !s.is_empty()).map(<[u8]>::to_vec) }
    }

    #[must_use]
    pub const fn is_configured(&self) -> bool {
        self.secret.is_some()
    }

    /// Verifies the signature header value against the raw request body.
    #[tracing::instrument(skip_all, level = "debug")]
    #[must_use]
    pub fn verify(&self, raw_body: &[u8], signature: Option<&str>) -> bool {
        match (&self.secret, signature) {
            (Some(secret), Some(signature)) => verify(raw_body, signature, secret),
            _ => false,
        }
    }
}
