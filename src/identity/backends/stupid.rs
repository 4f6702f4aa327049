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
//! Backend accepting every user and password. Never use it in production.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::warn;

use autentigo_api_types::Claims;

use super::IdentityBackend;
use crate::identity::IdentityProviderError;
use crate::identity::types::UserRecord;
use crate::service::ServiceState;

#[derive(Clone, Debug, Default)]
pub struct StupidBackend {}

#[async_trait]
impl IdentityBackend for StupidBackend {
    fn name(&self) -> &'static str {
        "stupid"
    }

    async fn authenticate(
        &self,
        _state: &ServiceState,
        user: &str,
        _password: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError> {
        warn!("accepting {user} without checking the password");
        UserRecord::default().claims(user, expires_at)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::tests::api::get_mocked_state_unauthed;

    #[tokio::test]
    async fn test_anything_goes() {
        let state = get_mocked_state_unauthed();
        let exp = Utc::now() + TimeDelta::minutes(10);
        let claims = StupidBackend::default()
            .authenticate(&state, "alice", "whatever", exp)
            .await
            .unwrap();
        assert_eq!("alice", claims.sub);
        assert_eq!(exp.timestamp(), claims.exp);
        assert!(matches!(
            StupidBackend::default()
                .find_user(&state, "1234", "github", exp)
                .await,
            Err(IdentityProviderError::Unsupported {
                backend: "stupid",
                ..
            })
        ));
    }
}
