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
use chrono::TimeDelta;
use sea_orm::DatabaseConnection;
use std::sync::Arc;

use autentigo_api_types::{Claims, ExtraClaims};
use autentigo_client::VerificationError;

use crate::config::Config;
use crate::identity::{IdentityProviderError, MockIdentityProvider};
use crate::provider::{Provider, ProviderBuilder};
use crate::rbac::RoleTable;
use crate::service::{Service, ServiceState};
use crate::token::key_material::tests::{RSA_CRT, RSA_KEY};
use crate::token::{
    KeyMaterial, MockTokenProvider, SigningMethod, TokenApi, TokenProvider, TokenProviderError,
};

/// Token provider signing with the RSA test fixtures.
pub(crate) fn token_engine() -> TokenProvider {
    TokenProvider::from_key_material(
        KeyMaterial::load(SigningMethod::RS256, RSA_KEY.as_bytes(), RSA_CRT.as_bytes()).unwrap(),
        TimeDelta::seconds(3600),
    )
}

/// Signed token for the `subject` issued by [`token_engine`].
pub(crate) fn issue_token(subject: &str, extra: ExtraClaims) -> (String, Claims) {
    let engine = token_engine();
    engine
        .issue(subject, extra, engine.token_duration())
        .unwrap()
}

/// Token mock forwarding every call to [`token_engine`].
pub(crate) fn delegating_token_mock() -> MockTokenProvider {
    let engine = token_engine();
    let mut token_mock = MockTokenProvider::default();
    let e = engine.clone();
    token_mock
        .expect_issue()
        .returning(move |subject, extra, ttl| e.issue(subject, extra, ttl));
    let e = engine.clone();
    token_mock
        .expect_encode()
        .returning(move |claims| e.encode(claims));
    let e = engine.clone();
    token_mock
        .expect_verify()
        .returning(move |token| e.verify(token));
    let e = engine.clone();
    token_mock
        .expect_token_duration()
        .returning(move || e.token_duration());
    let e = engine.clone();
    token_mock
        .expect_issue_link_state()
        .returning(move |provider, user_id| e.issue_link_state(provider, user_id));
    let e = engine.clone();
    token_mock
        .expect_verify_link_state()
        .returning(move |provider, state| e.verify_link_state(provider, state));
    token_mock
        .expect_verification_certificate()
        .returning(move || engine.verification_certificate());
    token_mock
}

/// Identity mock knowing exactly one user.
pub(crate) fn password_identity_mock(
    user: &'static str,
    password: &'static str,
    extra: ExtraClaims,
) -> MockIdentityProvider {
    let mut identity_mock = MockIdentityProvider::default();
    identity_mock
        .expect_authenticate()
        .returning(move |_, u: &'_ str, p: &'_ str, exp| {
            if u == user && p == password {
                Ok(Claims::new(u, extra.clone(), chrono::Utc::now(), exp)?)
            } else {
                Err(IdentityProviderError::InvalidAuthentication)
            }
        });
    identity_mock
}

pub(crate) fn get_mocked_state_unauthed() -> ServiceState {
    let mut token_mock = MockTokenProvider::default();
    token_mock.expect_verify().returning(|_| {
        Err(TokenProviderError::Verification(
            VerificationError::InvalidSignature,
        ))
    });

    let provider = Provider::mocked_builder()
        .token(token_mock)
        .build()
        .unwrap();

    Arc::new(Service::new(Config::default(), DatabaseConnection::Disconnected, provider).unwrap())
}

pub(crate) fn get_mocked_state_with_db(db: DatabaseConnection) -> ServiceState {
    let provider = Provider::mocked_builder().build().unwrap();

    Arc::new(Service::new(Config::default(), db, provider).unwrap())
}

pub(crate) fn get_mocked_state(identity_mock: MockIdentityProvider) -> ServiceState {
    get_mocked_state_with(
        Provider::mocked_builder().identity(identity_mock),
        Config::default(),
        RoleTable::default(),
    )
}

/// State with real tokens, the given configuration and role table.
pub(crate) fn get_mocked_state_with(
    provider_builder: ProviderBuilder,
    config: Config,
    rbac: RoleTable,
) -> ServiceState {
    let provider = provider_builder
        .token(delegating_token_mock())
        .build()
        .unwrap();
    let mut service = Service::new(config, DatabaseConnection::Disconnected, provider).unwrap();
    service.rbac = rbac;
    Arc::new(service)
}
