// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! HS256 bearer token issuance and verification.
//!
//! ## Format
//!
//! ```text
//! base64url(header) . base64url(payload) . base64url(HMAC-SHA256(secret, header.payload))
//! ```
//!
//! The header is always `{"typ":"JWT","alg":"HS256"}` and the payload is a
//! [`TokenClaims`] object. Tokens live for [`TOKEN_TTL_SECS`] and there is
//! no revocation: logout is the client discarding its token.
//!
//! Verification is a pure function of the token, the secret, and the clock.
//! Expiry is checked here rather than by `jsonwebtoken` so that the clock
//! can be injected and `now == exp` already counts as expired.

use std::collections::HashSet;

use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};

use super::{AuthError, Role, TokenClaims, TokenError};

/// Token lifetime (24 hours).
pub const TOKEN_TTL_SECS: i64 = 24 * 60 * 60;

/// Shared HMAC key. Never empty.
#[derive(Clone)]
pub struct SigningSecret(Vec<u8>);

impl SigningSecret {
    /// Rejects empty or whitespace-only secrets.
    pub fn new(secret: impl Into<String>) -> Result<Self, AuthError> {
        let secret = secret.into();
        if secret.trim().is_empty() {
            return Err(AuthError::MisconfiguredSecret);
        }
        Ok(Self(secret.into_bytes()))
    }
}

impl std::fmt::Debug for SigningSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SigningSecret(<redacted>)")
    }
}

/// A freshly issued token and the claims it carries.
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub claims: TokenClaims,
}

/// Issues and verifies bearer tokens with a single shared secret.
#[derive(Clone)]
pub struct TokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
}

impl std::fmt::Debug for TokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenService")
            .field("algorithm", &Algorithm::HS256)
            .finish_non_exhaustive()
    }
}

impl TokenService {
    pub fn new(secret: SigningSecret) -> Self {
        // Only the signature and the algorithm are checked by the decoder;
        // required claims and expiry are handled in `verify_at`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims = HashSet::new();

        Self {
            encoding_key: EncodingKey::from_secret(&secret.0),
            decoding_key: DecodingKey::from_secret(&secret.0),
            validation,
        }
    }

    /// Issue a token valid for 24 hours from now.
    pub fn issue(&self, user_id: i64, email: &str, role: Role) -> Result<IssuedToken, AuthError> {
        self.issue_at(user_id, email, role, chrono::Utc::now().timestamp())
    }

    /// Issue a token as if the current time were `now` (Unix seconds).
    pub fn issue_at(
        &self,
        user_id: i64,
        email: &str,
        role: Role,
        now: i64,
    ) -> Result<IssuedToken, AuthError> {
        let claims = TokenClaims {
            sub: user_id,
            email: email.to_string(),
            role: Some(role),
            iat: Some(now),
            exp: Some(now + TOKEN_TTL_SECS),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to sign token");
                AuthError::MisconfiguredSecret
            })?;

        tracing::debug!(user_id, role = %role, exp = now + TOKEN_TTL_SECS, "Issued token");

        Ok(IssuedToken { token, claims })
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<TokenClaims, TokenError> {
        self.verify_at(token, chrono::Utc::now().timestamp())
    }

    /// Verify a token as if the current time were `now` (Unix seconds).
    pub fn verify_at(&self, token: &str, now: i64) -> Result<TokenClaims, TokenError> {
        if token.split('.').count() != 3 || token.split('.').any(str::is_empty) {
            return Err(TokenError::MalformedToken);
        }

        let payload = decode::<serde_json::Value>(token, &self.decoding_key, &self.validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature => TokenError::InvalidSignature,
                _ => TokenError::MalformedToken,
            })?
            .claims;

        let fields = payload.as_object().ok_or(TokenError::MalformedToken)?;
        let present = |key: &str| fields.get(key).is_some_and(|v| !v.is_null());
        if !present("sub") || !present("email") {
            return Err(TokenError::MissingClaims);
        }

        let claims: TokenClaims =
            serde_json::from_value(payload).map_err(|_| TokenError::MalformedToken)?;

        if claims.exp.is_some_and(|exp| now >= exp) {
            return Err(TokenError::ExpiredToken);
        }

        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use hmac::{Hmac, Mac};
    use sha2::Sha256;

    const NOW: i64 = 1_700_000_000;

    fn service() -> TokenService {
        TokenService::new(SigningSecret::new("test-secret").unwrap())
    }

    /// Sign arbitrary header/payload JSON with the test secret.
    fn forge(header: &str, payload: &str) -> String {
        let input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(header),
            URL_SAFE_NO_PAD.encode(payload)
        );
        let mut mac = Hmac::<Sha256>::new_from_slice(b"test-secret").unwrap();
        mac.update(input.as_bytes());
        format!("{input}.{}", URL_SAFE_NO_PAD.encode(mac.finalize().into_bytes()))
    }

    #[test]
    fn empty_secret_is_rejected() {
        assert_eq!(SigningSecret::new("").unwrap_err(), AuthError::MisconfiguredSecret);
        assert_eq!(SigningSecret::new("   ").unwrap_err(), AuthError::MisconfiguredSecret);
    }

    #[test]
    fn secret_debug_is_redacted() {
        let secret = SigningSecret::new("hunter2").unwrap();
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let svc = service();
        let issued = svc.issue_at(42, "a@b.com", Role::User, NOW).unwrap();

        let claims = svc.verify_at(&issued.token, NOW + 1).unwrap();
        assert_eq!(claims.sub, 42);
        assert_eq!(claims.email, "a@b.com");
        assert_eq!(claims.role, Some(Role::User));
        assert_eq!(claims.exp.unwrap() - claims.iat.unwrap(), TOKEN_TTL_SECS);
        assert_eq!(claims, issued.claims);
    }

    #[test]
    fn issue_uses_wall_clock() {
        let svc = service();
        let issued = svc.issue(1, "a@b.com", Role::Admin).unwrap();
        assert!(svc.verify(&issued.token).is_ok());
    }

    #[test]
    fn header_is_hs256_jwt() {
        let issued = service().issue_at(1, "a@b.com", Role::User, NOW).unwrap();
        let header = issued.token.split('.').next().unwrap();
        let decoded: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(header).unwrap()).unwrap();
        assert_eq!(decoded["alg"], "HS256");
        assert_eq!(decoded["typ"], "JWT");
    }

    #[test]
    fn token_expires_at_exp() {
        let svc = service();
        let issued = svc.issue_at(1, "a@b.com", Role::User, NOW).unwrap();
        let exp = NOW + TOKEN_TTL_SECS;

        assert!(svc.verify_at(&issued.token, exp - 1).is_ok());
        assert_eq!(svc.verify_at(&issued.token, exp), Err(TokenError::ExpiredToken));
        assert_eq!(svc.verify_at(&issued.token, exp + 1), Err(TokenError::ExpiredToken));
    }

    #[test]
    fn exp_relative_to_now() {
        let svc = service();
        let header = r#"{"alg":"HS256","typ":"JWT"}"#;

        let expired = forge(header, &format!(r#"{{"sub":1,"email":"a@b.com","exp":{}}}"#, NOW - 1));
        assert_eq!(svc.verify_at(&expired, NOW), Err(TokenError::ExpiredToken));

        let fresh = forge(header, &format!(r#"{{"sub":1,"email":"a@b.com","exp":{}}}"#, NOW + 3600));
        assert!(svc.verify_at(&fresh, NOW).is_ok());
    }

    #[test]
    fn token_without_exp_does_not_expire() {
        let svc = service();
        let token = forge(r#"{"alg":"HS256","typ":"JWT"}"#, r#"{"sub":1,"email":"a@b.com"}"#);
        let claims = svc.verify_at(&token, i64::MAX).unwrap();
        assert_eq!(claims.exp, None);
        assert_eq!(claims.role, None);
    }

    #[test]
    fn any_payload_change_is_detected() {
        let svc = service();
        let issued = svc.issue_at(42, "a@b.com", Role::User, NOW).unwrap();
        let segments: Vec<&str> = issued.token.split('.').collect();
        let payload = segments[1].as_bytes();

        for i in 0..payload.len() {
            for bit in 0..8 {
                let mut tampered = payload.to_vec();
                tampered[i] ^= 1 << bit;
                // Keep the token text valid UTF-8 without extra separators.
                let Ok(text) = String::from_utf8(tampered) else {
                    continue;
                };
                if text.contains('.') {
                    continue;
                }
                let token = format!("{}.{}.{}", segments[0], text, segments[2]);
                assert_eq!(
                    svc.verify_at(&token, NOW),
                    Err(TokenError::InvalidSignature),
                    "byte {i} bit {bit}"
                );
            }
        }
    }

    #[test]
    fn elevated_role_claim_is_rejected() {
        let svc = service();
        let issued = svc.issue_at(42, "a@b.com", Role::Guest, NOW).unwrap();
        let segments: Vec<&str> = issued.token.split('.').collect();
        let forged_payload = URL_SAFE_NO_PAD.encode(format!(
            r#"{{"sub":42,"email":"a@b.com","role":"admin","iat":{NOW},"exp":{}}}"#,
            NOW + TOKEN_TTL_SECS
        ));
        let token = format!("{}.{}.{}", segments[0], forged_payload, segments[2]);
        assert_eq!(svc.verify_at(&token, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn different_secret_is_rejected() {
        let issued = service().issue_at(1, "a@b.com", Role::User, NOW).unwrap();
        let other = TokenService::new(SigningSecret::new("rotated").unwrap());
        assert_eq!(other.verify_at(&issued.token, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn secret_as_signature_is_rejected() {
        // A token whose "signature" is just the encoded secret.
        let input = format!(
            "{}.{}",
            URL_SAFE_NO_PAD.encode(r#"{"alg":"HS256","typ":"JWT"}"#),
            URL_SAFE_NO_PAD.encode(r#"{"sub":1,"email":"a@b.com","role":"admin"}"#)
        );
        let token = format!("{input}.{}", URL_SAFE_NO_PAD.encode("test-secret"));
        assert_eq!(service().verify_at(&token, NOW), Err(TokenError::InvalidSignature));
    }

    #[test]
    fn malformed_inputs() {
        let svc = service();
        for token in ["not-a-token", "a.b", "", "..", "a..c", "a.b.c.d", ".b.c", "a.b."] {
            assert_eq!(svc.verify_at(token, NOW), Err(TokenError::MalformedToken), "{token}");
        }
    }

    #[test]
    fn non_base64_segments_are_malformed() {
        let svc = service();
        assert_eq!(svc.verify_at("!!!.???.***", NOW), Err(TokenError::MalformedToken));
    }

    #[test]
    fn other_algorithms_are_malformed() {
        let svc = service();
        let token = forge(r#"{"alg":"none","typ":"JWT"}"#, r#"{"sub":1,"email":"a@b.com"}"#);
        assert_eq!(svc.verify_at(&token, NOW), Err(TokenError::MalformedToken));
    }

    #[test]
    fn same_secret_with_hs384_is_malformed() {
        let token = encode(
            &Header::new(Algorithm::HS384),
            &serde_json::json!({ "sub": 1, "email": "a@b.com" }),
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();
        assert_eq!(service().verify_at(&token, NOW), Err(TokenError::MalformedToken));
    }

    #[test]
    fn missing_required_claims() {
        let svc = service();
        let header = r#"{"alg":"HS256","typ":"JWT"}"#;

        let no_sub = forge(header, r#"{"email":"a@b.com","exp":9999999999}"#);
        assert_eq!(svc.verify_at(&no_sub, NOW), Err(TokenError::MissingClaims));

        let no_email = forge(header, r#"{"sub":1,"exp":9999999999}"#);
        assert_eq!(svc.verify_at(&no_email, NOW), Err(TokenError::MissingClaims));

        let null_email = forge(header, r#"{"sub":1,"email":null}"#);
        assert_eq!(svc.verify_at(&null_email, NOW), Err(TokenError::MissingClaims));
    }

    #[test]
    fn invalid_claim_values_are_malformed() {
        let svc = service();
        let header = r#"{"alg":"HS256","typ":"JWT"}"#;

        let unknown_role = forge(header, r#"{"sub":1,"email":"a@b.com","role":"root"}"#);
        assert_eq!(svc.verify_at(&unknown_role, NOW), Err(TokenError::MalformedToken));

        let string_sub = forge(header, r#"{"sub":"one","email":"a@b.com"}"#);
        assert_eq!(svc.verify_at(&string_sub, NOW), Err(TokenError::MalformedToken));

        let not_object = forge(header, r#"[1,2,3]"#);
        assert_eq!(svc.verify_at(&not_object, NOW), Err(TokenError::MalformedToken));
    }
}
