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
use async_trait::async_trait;
use mockall::mock;
use url::Url;

use autentigo_api_types::oauth::ProviderIdentity;

use super::OAuthApi;
use super::error::OAuthError;
use crate::config::Config;

mock! {
    pub OAuthProvider {
        pub fn new(cfg: &Config) -> Result<Self, OAuthError>;
    }

    #[async_trait]
    impl OAuthApi for OAuthProvider {
        fn authorize_url<'a>(&self, provider: &'a str, state: &'a str) -> Result<Url, OAuthError>;

        async fn exchange_code<'a>(
            &self,
            provider: &'a str,
            code: &'a str,
        ) -> Result<String, OAuthError>;

        async fn fetch_user_info<'a>(
            &self,
            provider: &'a str,
            access_token: &'a str,
        ) -> Result<ProviderIdentity, OAuthError>;

        async fn fetch_identity<'a>(
            &self,
            provider: &'a str,
            access_token: &'a str,
        ) -> Result<ProviderIdentity, OAuthError>;
    }

    impl Clone for OAuthProvider {
        fn clone(&self) -> Self;
    }
}
