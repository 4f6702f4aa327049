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
//! # OAuth2 client
//!
//! Talks to the external authorization servers configured under
//! `[oauth.<provider>]`: builds the authorization URL, exchanges the
//! authorization code and fetches the identity of the access token owner.
use async_trait::async_trait;
use oauth2::basic::BasicClient;
use oauth2::{
    AuthUrl, AuthorizationCode, ClientId, ClientSecret, CsrfToken, EndpointNotSet, EndpointSet,
    RedirectUrl, Scope, TokenResponse, TokenUrl,
};
use secrecy::ExposeSecret;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;
use url::Url;

use autentigo_api_types::oauth::ProviderIdentity;

pub mod error;
#[cfg(test)]
mod mock;

use crate::config::{Config, OAuthProviderSection};
pub use error::OAuthError;
#[cfg(test)]
pub use mock::MockOAuthProvider;

type ConfiguredClient =
    BasicClient<EndpointSet, EndpointNotSet, EndpointNotSet, EndpointNotSet, EndpointSet>;

#[async_trait]
pub trait OAuthApi: Send + Sync + Clone {
    /// Authorization URL of the provider carrying the `state`.
    fn authorize_url<'a>(&self, provider: &'a str, state: &'a str) -> Result<Url, OAuthError>;

    /// Exchange an authorization code for an access token.
    async fn exchange_code<'a>(
        &self,
        provider: &'a str,
        code: &'a str,
    ) -> Result<String, OAuthError>;

    /// Identity behind the access token, read from the user-info endpoint.
    async fn fetch_user_info<'a>(
        &self,
        provider: &'a str,
        access_token: &'a str,
    ) -> Result<ProviderIdentity, OAuthError>;

    /// Identity behind the access token, read from the user-identity
    /// endpoint.
    async fn fetch_identity<'a>(
        &self,
        provider: &'a str,
        access_token: &'a str,
    ) -> Result<ProviderIdentity, OAuthError>;
}

#[derive(Clone, Debug)]
pub struct OAuthProvider {
    providers: HashMap<String, OAuthProviderSection>,
    http: reqwest::Client,
}

impl OAuthProvider {
    pub fn new(config: &Config) -> Result<Self, OAuthError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            providers: config.oauth.clone(),
            http,
        })
    }

    fn section(&self, provider: &str) -> Result<&OAuthProviderSection, OAuthError> {
        self.providers
            .get(provider)
            .ok_or_else(|| OAuthError::UnknownProvider(provider.into()))
    }

    fn client(&self, provider: &str) -> Result<(&OAuthProviderSection, ConfiguredClient), OAuthError> {
        let section = self.section(provider)?;
        let client = BasicClient::new(ClientId::new(section.client_id.clone()))
            .set_client_secret(ClientSecret::new(
                section.client_secret.expose_secret().to_string(),
            ))
            .set_auth_uri(AuthUrl::from_url(section.auth_url.clone()))
            .set_token_uri(TokenUrl::from_url(section.token_url.clone()))
            .set_redirect_uri(RedirectUrl::from_url(section.redirect_url.clone()));
        Ok((section, client))
    }

    async fn fetch_document(
        &self,
        mut url: Url,
        query: &[(&str, &str)],
    ) -> Result<ProviderIdentity, OAuthError> {
        url.query_pairs_mut().extend_pairs(query);
        debug!("fetching identity from {}", url.path());
        let response = self.http.get(url).send().await?;
        if !response.status().is_success() {
            return Err(OAuthError::ProviderStatus(response.status()));
        }
        let document: Value = response.json().await?;
        ProviderIdentity::from_document(&document).ok_or(OAuthError::MissingIdentity)
    }
}

#[async_trait]
impl OAuthApi for OAuthProvider {
    fn authorize_url<'a>(&self, provider: &'a str, state: &'a str) -> Result<Url, OAuthError> {
        let (section, client) = self.client(provider)?;
        let state = state.to_string();
        let (url, _) = client
            .authorize_url(move || CsrfToken::new(state))
            .add_scopes(section.scopes.iter().cloned().map(Scope::new))
            .url();
        Ok(url)
    }

    #[tracing::instrument(level = "info", skip(self, code))]
    async fn exchange_code<'a>(
        &self,
        provider: &'a str,
        code: &'a str,
    ) -> Result<String, OAuthError> {
        let (_, client) = self.client(provider)?;
        let token = client
            .exchange_code(AuthorizationCode::new(code.to_string()))
            .request_async(&self.http)
            .await
            .map_err(|e| OAuthError::Exchange(e.to_string()))?;
        Ok(token.access_token().secret().clone())
    }

    #[tracing::instrument(level = "info", skip(self, access_token))]
    async fn fetch_user_info<'a>(
        &self,
        provider: &'a str,
        access_token: &'a str,
    ) -> Result<ProviderIdentity, OAuthError> {
        let url = self
            .section(provider)?
            .userinfo_url
            .clone()
            .ok_or(OAuthError::MissingEndpoint("userinfo_url"))?;
        self.fetch_document(url, &[("fields", "name,email"), ("access_token", access_token)])
            .await
    }

    #[tracing::instrument(level = "info", skip(self, access_token))]
    async fn fetch_identity<'a>(
        &self,
        provider: &'a str,
        access_token: &'a str,
    ) -> Result<ProviderIdentity, OAuthError> {
        let url = self
            .section(provider)?
            .user_identity_url
            .clone()
            .ok_or(OAuthError::MissingEndpoint("user_identity_url"))?;
        self.fetch_document(url, &[("access_token", access_token)])
            .await
    }
}
