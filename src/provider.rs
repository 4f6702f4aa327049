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
//! # Provider manager
//!
//! Provider manager provides access to the individual service providers. This
//! gives an easy interact for passing overall manager down to the individual
//! providers that might need to call other providers while also allowing an
//! easy injection of mocked providers.
use derive_builder::Builder;
use mockall_double::double;

use crate::config::Config;
use crate::error::AutentigoError;
use crate::identity::IdentityApi;
#[double]
use crate::identity::IdentityProvider;
use crate::oauth::OAuthApi;
#[double]
use crate::oauth::OAuthProvider;
use crate::token::TokenApi;
#[double]
use crate::token::TokenProvider;

/// Global provider manager.
#[derive(Builder, Clone)]
// It is necessary to use the owned pattern since otherwise builder invokes clone which immediately
// confuses mockall used in tests
#[builder(pattern = "owned")]
pub struct Provider {
    /// Configuration.
    pub config: Config,
    /// Identity provider.
    identity: IdentityProvider,
    /// OAuth2 client.
    oauth: OAuthProvider,
    /// Token provider.
    token: TokenProvider,
}

impl Provider {
    pub fn new(cfg: Config) -> Result<Self, AutentigoError> {
        let identity_provider = IdentityProvider::new(&cfg)?;
        let oauth_provider = OAuthProvider::new(&cfg)?;
        let token_provider = TokenProvider::new(&cfg)?;

        Ok(Self {
            config: cfg,
            identity: identity_provider,
            oauth: oauth_provider,
            token: token_provider,
        })
    }

    /// Get the identity provider.
    pub fn get_identity_provider(&self) -> &impl IdentityApi {
        &self.identity
    }

    /// Get the OAuth2 client.
    pub fn get_oauth_provider(&self) -> &impl OAuthApi {
        &self.oauth
    }

    /// Get the token provider.
    pub fn get_token_provider(&self) -> &impl TokenApi {
        &self.token
    }
}

#[cfg(test)]
impl Provider {
    pub fn mocked_builder() -> ProviderBuilder {
        let config = Config::default();
        let identity_mock = crate::identity::MockIdentityProvider::default();
        let oauth_mock = crate::oauth::MockOAuthProvider::default();
        let token_mock = crate::token::MockTokenProvider::default();

        ProviderBuilder::default()
            .config(config.clone())
            .identity(identity_mock)
            .oauth(oauth_mock)
            .token(token_mock)
    }
}
