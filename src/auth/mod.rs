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
//! # Authentication
//!
//! Every protocol adapter ends up here: the configured identity backend
//! checks the credentials, the token provider signs the claims and the fresh
//! token is verified once more before it leaves the process. A token the
//! service can not verify itself points at mismatching key material and is
//! never handed out.
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::{debug, error};

use autentigo_api_types::Claims;

use crate::identity::{IdentityApi, IdentityProviderError};
use crate::service::ServiceState;
use crate::token::{TokenApi, TokenProviderError};

#[derive(Error, Debug)]
pub enum AuthenticationError {
    /// Wrong user or password.
    #[error("Authentication failed")]
    InvalidCredentials,

    /// External identity is not linked to any local user.
    #[error("unknown user {0}")]
    UnknownUser(String),

    /// Identity backend failure.
    #[error("identity backend failure: {}", source)]
    Backend {
        #[from]
        source: IdentityProviderError,
    },

    /// Token signing or self verification failure.
    #[error("token failure: {}", source)]
    Token {
        #[from]
        source: TokenProviderError,
    },
}

/// Signed token and the claims it carries.
#[derive(Clone, Debug, PartialEq)]
pub struct AuthenticatedToken {
    pub token: String,
    pub claims: Claims,
}

fn expires_at(state: &ServiceState) -> Result<DateTime<Utc>, AuthenticationError> {
    Utc::now()
        .checked_add_signed(state.provider.get_token_provider().token_duration())
        .ok_or(TokenProviderError::ExpiryCalculation.into())
}

fn sign(state: &ServiceState, claims: Claims) -> Result<AuthenticatedToken, AuthenticationError> {
    let token_provider = state.provider.get_token_provider();
    let token = token_provider.encode(&claims)?;
    token_provider.verify(&token).inspect_err(|e| {
        error!("freshly issued token for {} does not verify: {}", claims.sub, e);
    })?;
    Ok(AuthenticatedToken { token, claims })
}

/// Authenticate a user with a password.
#[tracing::instrument(level = "info", skip(state, password))]
pub async fn login(
    state: &ServiceState,
    user: &str,
    password: &str,
) -> Result<AuthenticatedToken, AuthenticationError> {
    let claims = state
        .provider
        .get_identity_provider()
        .authenticate(state, user, password, expires_at(state)?)
        .await
        .map_err(|e| match e {
            IdentityProviderError::InvalidAuthentication
            | IdentityProviderError::UserNotFound(_) => {
                debug!("authentication of {} failed", user);
                AuthenticationError::InvalidCredentials
            }
            other => other.into(),
        })?;
    sign(state, claims)
}

/// Authenticate the local user linked to an identity of an external
/// provider.
#[tracing::instrument(level = "info", skip(state))]
pub async fn login_federated(
    state: &ServiceState,
    external_id: &str,
    provider: &str,
) -> Result<AuthenticatedToken, AuthenticationError> {
    let (user_id, claims) = state
        .provider
        .get_identity_provider()
        .find_user(state, external_id, provider, expires_at(state)?)
        .await
        .map_err(|e| match e {
            IdentityProviderError::UserNotFound(_) => {
                AuthenticationError::UnknownUser(external_id.into())
            }
            IdentityProviderError::InvalidAuthentication => {
                AuthenticationError::InvalidCredentials
            }
            other => other.into(),
        })?;
    debug!("{} at {} is {}", external_id, provider, user_id);
    sign(state, claims)
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;
    use sea_orm::DatabaseConnection;
    use std::sync::Arc;
    use tracing_test::traced_test;

    use autentigo_api_types::ExtraClaims;
    use autentigo_client::VerificationError;

    use super::*;
    use crate::config::Config;
    use crate::identity::MockIdentityProvider;
    use crate::identity::password_hashing::{hash_password, verify_password};
    use crate::provider::Provider;
    use crate::service::Service;
    use crate::token::key_material::tests::{RSA_CRT, RSA_KEY};
    use crate::token::{KeyMaterial, MockTokenProvider, SigningMethod, TokenProvider};

    fn claims(sub: &str, exp: DateTime<Utc>) -> Claims {
        Claims::new(sub, ExtraClaims::default(), Utc::now(), exp).unwrap()
    }

    fn state(identity_mock: MockIdentityProvider, token_mock: MockTokenProvider) -> ServiceState {
        let provider = Provider::mocked_builder()
            .identity(identity_mock)
            .token(token_mock)
            .build()
            .unwrap();
        Arc::new(Service::new(Config::default(), DatabaseConnection::Disconnected, provider).unwrap())
    }

    fn token_mock() -> MockTokenProvider {
        let mut token_mock = MockTokenProvider::default();
        token_mock
            .expect_token_duration()
            .returning(|| TimeDelta::seconds(3600));
        token_mock
            .expect_encode()
            .returning(|claims| Ok(format!("token-{}", claims.sub)));
        token_mock
            .expect_verify()
            .returning(|_| Ok(claims("alice", Utc::now() + TimeDelta::minutes(1))));
        token_mock
    }

    fn alice_identity() -> MockIdentityProvider {
        let digest = hash_password("secret");
        let mut identity_mock = MockIdentityProvider::default();
        identity_mock
            .expect_authenticate()
            .returning(move |_, user: &'_ str, password: &'_ str, exp| {
                if user == "alice" && verify_password(password, &digest) {
                    Ok(claims(user, exp))
                } else {
                    Err(IdentityProviderError::InvalidAuthentication)
                }
            });
        identity_mock
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login() {
        let state = state(alice_identity(), token_mock());
        let res = login(&state, "alice", "secret").await.unwrap();
        assert_eq!("token-alice", res.token);
        assert_eq!("alice", res.claims.sub);
        assert!((3599..=3600).contains(&(res.claims.exp - res.claims.iat)));

        assert!(matches!(
            login(&state, "alice", "wrong").await,
            Err(AuthenticationError::InvalidCredentials)
        ));
        assert!(matches!(
            login(&state, "bob", "secret").await,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login_real_tokens() {
        let keys =
            KeyMaterial::load(SigningMethod::RS256, RSA_KEY.as_bytes(), RSA_CRT.as_bytes()).unwrap();
        let token_provider = TokenProvider::from_key_material(keys, TimeDelta::seconds(600));
        let mut token_mock = MockTokenProvider::default();
        let engine = token_provider.clone();
        token_mock
            .expect_token_duration()
            .returning(move || engine.token_duration());
        let engine = token_provider.clone();
        token_mock
            .expect_encode()
            .returning(move |claims| engine.encode(claims));
        let engine = token_provider.clone();
        token_mock
            .expect_verify()
            .returning(move |token| engine.verify(token));

        let state = state(alice_identity(), token_mock);
        let res = login(&state, "alice", "secret").await.unwrap();
        let verified = token_provider.verify(&res.token).unwrap();
        assert_eq!("alice", verified.sub);
        assert_eq!(res.claims, verified);
        assert!((599..=600).contains(&(verified.exp - verified.iat)));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login_self_verification_failure() {
        let mut token_mock = MockTokenProvider::default();
        token_mock
            .expect_token_duration()
            .returning(|| TimeDelta::seconds(3600));
        token_mock
            .expect_encode()
            .returning(|_| Ok("garbage".into()));
        token_mock.expect_verify().returning(|_| {
            Err(TokenProviderError::Verification(
                VerificationError::InvalidSignature,
            ))
        });
        let state = state(alice_identity(), token_mock);
        assert!(matches!(
            login(&state, "alice", "secret").await,
            Err(AuthenticationError::Token { .. })
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login_backend_failure() {
        let mut identity_mock = MockIdentityProvider::default();
        identity_mock
            .expect_authenticate()
            .returning(|_, _, _, _| Err(IdentityProviderError::Timeout { operation: "ldap bind" }));
        let state = state(identity_mock, token_mock());
        assert!(matches!(
            login(&state, "alice", "secret").await,
            Err(AuthenticationError::Backend { .. })
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login_federated() {
        let mut identity_mock = MockIdentityProvider::default();
        identity_mock
            .expect_find_user()
            .returning(|_, external_id: &'_ str, provider: &'_ str, exp| {
                if external_id == "1234" && provider == "github" {
                    Ok(("alice".into(), claims("alice", exp)))
                } else {
                    Err(IdentityProviderError::UserNotFound(external_id.into()))
                }
            });
        let state = state(identity_mock, token_mock());
        let res = login_federated(&state, "1234", "github").await.unwrap();
        assert_eq!("alice", res.claims.sub);
        assert_eq!("token-alice", res.token);
        assert!(matches!(
            login_federated(&state, "9999", "github").await,
            Err(AuthenticationError::UnknownUser(x)) if x == "9999"
        ));
    }
}
