//! Credential token decoding
//!
//! The backend signs its tokens with a secret the client never sees, so the
//! claims are read without verifying the signature. The backend re-checks
//! the token on every request; the client only needs the claimed identity
//! to pick a screen.

use crate::auth::models::Identity;
use crate::core::error::{PortalError, Result};
use jsonwebtoken::{decode, Algorithm, DecodingKey, Validation};
use std::collections::HashSet;

/// Decode the identity claims carried by a credential token
///
/// Fails for anything that is not a three-part JWT with a JSON payload
/// containing at least a `role`, and for tokens whose `exp` claim has
/// passed. Tokens without `exp` are accepted.
pub fn decode_identity(token: &str) -> Result<Identity> {
    let mut validation = Validation::new(Algorithm::HS256);
    validation.insecure_disable_signature_validation();
    validation.required_spec_claims = HashSet::new();
    validation.validate_aud = false;
    validation.validate_exp = true;

    let token_data = decode::<Identity>(token, &DecodingKey::from_secret(&[]), &validation)
        .map_err(|e| PortalError::AuthenticationError(format!("Invalid token: {}", e)))?;

    Ok(token_data.claims)
}
