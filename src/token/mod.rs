// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//
// SPDX-License-Identifier: Apache-2.0
//! # Token provider.
//!
//! Tokens are JWS compact serializations of the [`Claims`]. There is no
//! revocation: a token is valid as long as the signature verifies with the
//! configured certificate and it did not expire yet.
//!
//! The same key signs the short lived link states of the OAuth2 flow that
//! pre-allocates a local user. Their payload carries no subject, so a link
//! state never verifies as a token.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::{TimeDelta, Utc};
use serde::{Deserialize, Serialize};
use tracing::trace;

use autentigo_api_types::{Claims, ExtraClaims};
use autentigo_client::VerificationError;

pub mod error;
pub mod key_material;
#[cfg(test)]
mod mock;

use crate::config::Config;
pub use error::TokenProviderError;
pub use key_material::{KeyMaterial, SigningMethod};
#[cfg(test)]
pub use mock::MockTokenProvider;

/// Token issuance and verification.
pub trait TokenApi: Send + Sync + Clone {
    /// Issue a token for the `subject` valid for `ttl` from now.
    fn issue(
        &self,
        subject: &str,
        extra: ExtraClaims,
        ttl: TimeDelta,
    ) -> Result<(String, Claims), TokenProviderError>;

    /// Sign already built claims.
    fn encode(&self, claims: &Claims) -> Result<String, TokenProviderError>;

    /// Verify the token and return its claims.
    fn verify(&self, token: &str) -> Result<Claims, TokenProviderError>;

    /// Validity of newly issued tokens.
    fn token_duration(&self) -> TimeDelta;

    /// PEM encoded verification certificate.
    fn verification_certificate(&self) -> String;

    /// Signed state binding the local `user_id` to an OAuth2 flow with the
    /// `provider`.
    fn issue_link_state(
        &self,
        provider: &str,
        user_id: &str,
    ) -> Result<String, TokenProviderError>;

    /// Local user id carried by a state from [`TokenApi::issue_link_state`]
    /// for the same `provider`.
    fn verify_link_state(&self, provider: &str, state: &str) -> Result<String, TokenProviderError>;
}

/// Audience of the OAuth2 link states.
const LINK_STATE_AUDIENCE: &str = "autentigo-oauth-link";

/// Validity of an OAuth2 link state in seconds.
const LINK_STATE_TTL: i64 = 600;

#[derive(Debug, Deserialize, PartialEq, Serialize)]
struct LinkState {
    aud: String,
    provider: String,
    uid: String,
    iat: i64,
    exp: i64,
}

#[derive(Clone, Debug)]
pub struct TokenProvider {
    duration: TimeDelta,
    keys: Arc<KeyMaterial>,
}

impl TokenProvider {
    pub fn new(config: &Config) -> Result<Self, TokenProviderError> {
        let method: SigningMethod = config.token.signing_method.parse()?;
        let private_key = read_pem(&config.token.private_key, "token.private_key")?;
        let certificate = read_pem(&config.token.certificate, "token.certificate")?;
        let keys = KeyMaterial::load(method, &private_key, &certificate)?;
        let duration = i64::try_from(config.token.duration)
            .ok()
            .and_then(TimeDelta::try_seconds)
            .ok_or(TokenProviderError::ExpiryCalculation)?;
        Ok(Self::from_key_material(keys, duration))
    }

    pub fn from_key_material(keys: KeyMaterial, duration: TimeDelta) -> Self {
        Self {
            duration,
            keys: Arc::new(keys),
        }
    }
}

/// Key material is either given inline or as a path to the PEM file.
fn read_pem(value: &str, key: &'static str) -> Result<Vec<u8>, TokenProviderError> {
    if value.is_empty() {
        return Err(TokenProviderError::MissingKeyMaterial(key));
    }
    if value.contains("-----BEGIN") {
        return Ok(value.as_bytes().to_vec());
    }
    let path = PathBuf::from(value);
    std::fs::read(&path).map_err(|source| TokenProviderError::KeyRead { source, path })
}

impl TokenApi for TokenProvider {
    #[tracing::instrument(level = "debug", skip(self, extra))]
    fn issue(
        &self,
        subject: &str,
        extra: ExtraClaims,
        ttl: TimeDelta,
    ) -> Result<(String, Claims), TokenProviderError> {
        let now = Utc::now();
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(TokenProviderError::ExpiryCalculation)?;
        let claims = Claims::new(subject, extra, now, expires_at)?;
        Ok((self.encode(&claims)?, claims))
    }

    fn encode(&self, claims: &Claims) -> Result<String, TokenProviderError> {
        trace!("signing token for {}", claims.sub);
        self.keys.sign(claims)
    }

    fn verify(&self, token: &str) -> Result<Claims, TokenProviderError> {
        Ok(self.keys.verifier().verify(token)?)
    }

    fn token_duration(&self) -> TimeDelta {
        self.duration
    }

    fn verification_certificate(&self) -> String {
        self.keys.certificate().to_string()
    }

    #[tracing::instrument(level = "debug", skip(self))]
    fn issue_link_state(
        &self,
        provider: &str,
        user_id: &str,
    ) -> Result<String, TokenProviderError> {
        let iat = Utc::now().timestamp();
        self.keys.sign(&LinkState {
            aud: LINK_STATE_AUDIENCE.into(),
            provider: provider.into(),
            uid: user_id.into(),
            iat,
            exp: iat + LINK_STATE_TTL,
        })
    }

    fn verify_link_state(&self, provider: &str, state: &str) -> Result<String, TokenProviderError> {
        let link: LinkState = self.keys.verifier().decode(state)?;
        if link.aud != LINK_STATE_AUDIENCE || link.provider != provider || link.uid.is_empty() {
            return Err(TokenProviderError::InvalidLinkState);
        }
        if link.exp <= Utc::now().timestamp() {
            return Err(VerificationError::ExpiredToken.into());
        }
        Ok(link.uid)
    }
}
