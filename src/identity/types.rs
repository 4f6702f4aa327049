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
//! Identity provider types.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use autentigo_api_types::{Claims, ExtraClaims};

use crate::identity::error::IdentityProviderError;

/// Stored user.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
pub struct UserRecord {
    /// Digest of the password; empty for users that can not log in with a
    /// password.
    #[serde(default)]
    pub password_hash: String,

    /// Identity attributes copied into the claims.
    #[serde(flatten)]
    pub extra: ExtraClaims,
}

impl UserRecord {
    /// Claims of the user valid from now until `expires_at`.
    pub fn claims(
        &self,
        user_id: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError> {
        Ok(Claims::new(
            user_id,
            self.extra.clone(),
            Utc::now(),
            expires_at,
        )?)
    }
}
