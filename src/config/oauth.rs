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
//! # OAuth2 provider configuration
use secrecy::SecretString;
use serde::Deserialize;
use url::Url;

use crate::config::common::csv;

/// OAuth2 authorization-code client of a single external provider.
#[derive(Debug, Deserialize, Clone)]
pub struct OAuthProviderSection {
    /// Client id registered at the provider.
    pub client_id: String,

    /// Client secret registered at the provider.
    pub client_secret: SecretString,

    /// Requested scopes.
    #[serde(default, deserialize_with = "csv")]
    pub scopes: Vec<String>,

    /// Authorization endpoint.
    pub auth_url: Url,

    /// Token endpoint.
    pub token_url: Url,

    /// User information endpoint used by the registration callback.
    pub userinfo_url: Option<Url>,

    /// User identity endpoint used by the bearer login.
    pub user_identity_url: Option<Url>,

    /// Callback url the provider redirects to.
    pub redirect_url: Url,

    /// CSRF state sent to the provider.
    #[serde(default = "default_state")]
    pub state: String,

    /// Where the browser is sent after a successful registration.
    pub post_login_redirect: Option<Url>,
}

fn default_state() -> String {
    "><((('>".into()
}
