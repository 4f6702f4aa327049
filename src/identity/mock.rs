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
use chrono::{DateTime, Utc};
use mockall::mock;

use autentigo_api_types::Claims;

use crate::config::Config;
use crate::identity::IdentityApi;
use crate::identity::error::IdentityProviderError;
use crate::identity::types::UserRecord;
use crate::service::ServiceState;

mock! {
    pub IdentityProvider {
        pub fn new(cfg: &Config) -> Result<Self, IdentityProviderError>;
    }

    #[async_trait]
    impl IdentityApi for IdentityProvider {
        async fn authenticate<'a>(
            &self,
            state: &ServiceState,
            user: &'a str,
            password: &'a str,
            expires_at: DateTime<Utc>,
        ) -> Result<Claims, IdentityProviderError>;

        async fn find_user<'a>(
            &self,
            state: &ServiceState,
            external_id: &'a str,
            provider: &'a str,
            expires_at: DateTime<Utc>,
        ) -> Result<(String, Claims), IdentityProviderError>;

        async fn get_user<'a>(
            &self,
            state: &ServiceState,
            user_id: &'a str,
        ) -> Result<Option<UserRecord>, IdentityProviderError>;

        async fn create_user<'a>(
            &self,
            state: &ServiceState,
            user_id: &'a str,
            record: UserRecord,
        ) -> Result<(), IdentityProviderError>;

        async fn update_user<'a>(
            &self,
            state: &ServiceState,
            user_id: &'a str,
            record: UserRecord,
        ) -> Result<(), IdentityProviderError>;

        async fn link_external_id<'a>(
            &self,
            state: &ServiceState,
            provider: &'a str,
            external_id: &'a str,
            user_id: &'a str,
        ) -> Result<(), IdentityProviderError>;
    }

    impl Clone for IdentityProvider {
        fn clone(&self) -> Self;
    }
}
