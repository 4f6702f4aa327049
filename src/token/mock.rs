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
//! Internal mock structures for the [TokenProvider].

use chrono::TimeDelta;
use mockall::mock;

use autentigo_api_types::{Claims, ExtraClaims};

use super::TokenApi;
use super::error::TokenProviderError;
use crate::config::Config;

mock! {
    pub TokenProvider {
        pub fn new(cfg: &Config) -> Result<Self, TokenProviderError>;
    }

    impl TokenApi for TokenProvider {
        fn issue<'a>(
            &self,
            subject: &'a str,
            extra: ExtraClaims,
            ttl: TimeDelta,
        ) -> Result<(String, Claims), TokenProviderError>;

        fn encode(&self, claims: &Claims) -> Result<String, TokenProviderError>;

        fn verify<'a>(&self, token: &'a str) -> Result<Claims, TokenProviderError>;

        fn token_duration(&self) -> TimeDelta;

        fn verification_certificate(&self) -> String;

        fn issue_link_state<'a, 'b>(
            &self,
            provider: &'a str,
            user_id: &'b str,
        ) -> Result<String, TokenProviderError>;

        fn verify_link_state<'a, 'b>(
            &self,
            provider: &'a str,
            state: &'b str,
        ) -> Result<String, TokenProviderError>;
    }

    impl Clone for TokenProvider {
        fn clone(&self) -> Self;
    }
}
