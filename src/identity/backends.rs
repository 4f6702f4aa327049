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
use dyn_clone::DynClone;

use autentigo_api_types::Claims;

use crate::identity::IdentityProviderError;
use crate::identity::types::UserRecord;
use crate::service::ServiceState;

pub mod file;
pub mod kv;
pub mod ldap;
pub mod sql;
pub mod stupid;

/// Identity storage backend.
///
/// Only `authenticate` is mandatory. Backends without federated lookup or
/// without a write path answer [`IdentityProviderError::Unsupported`].
#[async_trait]
pub trait IdentityBackend: DynClone + Send + Sync + std::fmt::Debug {
    /// Backend name used in diagnostics.
    fn name(&self) -> &'static str;

    /// Authenticate a user by a password.
    async fn authenticate(
        &self,
        state: &ServiceState,
        user: &str,
        password: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError>;

    /// Find the local user of an external identity.
    async fn find_user(
        &self,
        _state: &ServiceState,
        _external_id: &str,
        _provider: &str,
        _expires_at: DateTime<Utc>,
    ) -> Result<(String, Claims), IdentityProviderError> {
        Err(IdentityProviderError::unsupported(self.name(), "find user"))
    }

    /// Get single user by ID.
    async fn get_user(
        &self,
        _state: &ServiceState,
        _user_id: &str,
    ) -> Result<Option<UserRecord>, IdentityProviderError> {
        Err(IdentityProviderError::unsupported(self.name(), "get user"))
    }

    /// Create user.
    async fn create_user(
        &self,
        _state: &ServiceState,
        _user_id: &str,
        _record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        Err(IdentityProviderError::unsupported(self.name(), "create user"))
    }

    /// Update user.
    async fn update_user(
        &self,
        _state: &ServiceState,
        _user_id: &str,
        _record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        Err(IdentityProviderError::unsupported(self.name(), "update user"))
    }

    /// Link an external identity to a local user.
    async fn link_external_id(
        &self,
        _state: &ServiceState,
        _provider: &str,
        _external_id: &str,
        _user_id: &str,
    ) -> Result<(), IdentityProviderError> {
        Err(IdentityProviderError::unsupported(
            self.name(),
            "external identity link",
        ))
    }
}

dyn_clone::clone_trait_object!(IdentityBackend);
