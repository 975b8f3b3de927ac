use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use tracing::debug;

/// Path secret and bearer token checks for the briefing route.
///
/// Both sides are hashed before comparison so the compare runs in constant
/// time regardless of the candidate's length.
#[derive(Clone)]
pub struct GatewayAuth {
    path_secret: [u8; 32],
    auth_token: [u8; 32],
}

impl GatewayAuth {
    pub fn new(path_secret: &str, auth_token: &str) -> Self {
        Self {
            path_secret: digest(path_secret),
            auth_token: digest(auth_token),
        }
    }

    pub fn verify_path_secret(&self, candidate: &str) -> bool {
        secure_compare(&self.path_secret, candidate)
    }

    /// Checks an `Authorization` header value; a missing header is compared
    /// as the empty string.
    pub fn verify_authorization(&self, header: Option<&str>) -> bool {
        let token = header.map(extract_bearer).unwrap_or("");
        let ok = secure_compare(&self.auth_token, token);
        if !ok {
            debug!(
                target: "briefing::auth",
                header_present = header.is_some(),
                "Bearer token rejected"
            );
        }
        ok
    }
}

/// Strips a leading `Bearer ` (any run of whitespace after the scheme);
/// anything else is taken as the raw token.
pub fn extract_bearer(header: &str) -> &str {
    match header.strip_prefix("Bearer") {
        Some(rest) if rest.starts_with(char::is_whitespace) => rest.trim_start(),
        _ => header,
    }
}

fn digest(value: &str) -> [u8; 32] {
    Sha256::digest(value.as_bytes()).into()
}

fn secure_compare(expected: &[u8; 32], candidate: &str) -> bool {
    expected[..].ct_eq(&digest(candidate)[..]).into()
}
