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
//! # Identity provider
//!
//! The identity provider turns credentials or a federated identity into
//! [`Claims`]. The actual lookup is delegated to one backend selected at
//! startup by `[identity] driver`:
//!
//! - `ldap`: simple bind against a directory server,
//! - `sql`: a row of a relational table,
//! - `kv`: a JSON document in etcd,
//! - `file`: a line of a colon separated user file,
//! - `stupid`: everybody is welcome (testing only).

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use autentigo_api_types::Claims;

pub mod backends;
pub mod error;
#[cfg(test)]
mod mock;
pub mod password_hashing;
pub mod types;

use crate::config::Config;
use crate::identity::backends::{
    IdentityBackend, file::FileBackend, kv::KvBackend, ldap::LdapBackend, sql::SqlBackend,
    stupid::StupidBackend,
};
pub use crate::identity::error::IdentityProviderError;
#[cfg(test)]
pub use crate::identity::mock::MockIdentityProvider;
pub use crate::identity::types::UserRecord;
use crate::service::ServiceState;

#[async_trait]
pub trait IdentityApi: Send + Sync + Clone {
    /// Check the credentials and return the claims of the user.
    async fn authenticate<'a>(
        &self,
        state: &ServiceState,
        user: &'a str,
        password: &'a str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError>;

    /// Map an identity of an external provider to the local user.
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

    /// Create a user; fails with `UserAlreadyExists` for a known id.
    async fn create_user<'a>(
        &self,
        state: &ServiceState,
        user_id: &'a str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError>;

    /// Replace a user; fails with `UserNotFound` for an unknown id.
    async fn update_user<'a>(
        &self,
        state: &ServiceState,
        user_id: &'a str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError>;

    /// Record that `external_id` at `provider` is the local `user_id`.
    async fn link_external_id<'a>(
        &self,
        state: &ServiceState,
        provider: &'a str,
        external_id: &'a str,
        user_id: &'a str,
    ) -> Result<(), IdentityProviderError>;
}

#[derive(Clone, Debug)]
pub struct IdentityProvider {
    backend_driver: Box<dyn IdentityBackend>,
}

impl IdentityProvider {
    pub fn new(config: &Config) -> Result<Self, IdentityProviderError> {
        let backend_driver: Box<dyn IdentityBackend> = match config.identity.driver.as_str() {
            "ldap" | "ldap-bind" => Box::new(LdapBackend::new(config)?),
            "sql" => Box::new(SqlBackend::new(config)?),
            "kv" | "etcd" => Box::new(KvBackend::new(config)?),
            "file" => Box::new(FileBackend::new(config)?),
            "stupid" => Box::new(StupidBackend::default()),
            other => {
                return Err(IdentityProviderError::UnsupportedDriver(other.into()));
            }
        };
        Ok(Self { backend_driver })
    }

    /// Name of the selected backend.
    pub fn backend_name(&self) -> &'static str {
        self.backend_driver.name()
    }
}

#[async_trait]
impl IdentityApi for IdentityProvider {
    #[tracing::instrument(level = "info", skip(self, state, password))]
    async fn authenticate<'a>(
        &self,
        state: &ServiceState,
        user: &'a str,
        password: &'a str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError> {
        self.backend_driver
            .authenticate(state, user, password, expires_at)
            .await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn find_user<'a>(
        &self,
        state: &ServiceState,
        external_id: &'a str,
        provider: &'a str,
        expires_at: DateTime<Utc>,
    ) -> Result<(String, Claims), IdentityProviderError> {
        self.backend_driver
            .find_user(state, external_id, provider, expires_at)
            .await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn get_user<'a>(
        &self,
        state: &ServiceState,
        user_id: &'a str,
    ) -> Result<Option<UserRecord>, IdentityProviderError> {
        self.backend_driver.get_user(state, user_id).await
    }

    #[tracing::instrument(level = "info", skip(self, state, record))]
    async fn create_user<'a>(
        &self,
        state: &ServiceState,
        user_id: &'a str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        self.backend_driver.create_user(state, user_id, record).await
    }

    #[tracing::instrument(level = "info", skip(self, state, record))]
    async fn update_user<'a>(
        &self,
        state: &ServiceState,
        user_id: &'a str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        self.backend_driver.update_user(state, user_id, record).await
    }

    #[tracing::instrument(level = "info", skip(self, state))]
    async fn link_external_id<'a>(
        &self,
        state: &ServiceState,
        provider: &'a str,
        external_id: &'a str,
        user_id: &'a str,
    ) -> Result<(), IdentityProviderError> {
        self.backend_driver
            .link_external_id(state, provider, external_id, user_id)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_selection() {
        let mut config = Config::default();
        assert!(matches!(
            IdentityProvider::new(&config),
            Err(IdentityProviderError::UnsupportedDriver(x)) if x.is_empty()
        ));

        config.identity.driver = "stupid".into();
        assert_eq!("stupid", IdentityProvider::new(&config).unwrap().backend_name());

        config.identity.driver = "etcd".into();
        config.kv.endpoints = vec!["http://localhost:2379".into()];
        assert_eq!("kv", IdentityProvider::new(&config).unwrap().backend_name());

        config.identity.driver = "mongodb".into();
        assert!(matches!(
            IdentityProvider::new(&config),
            Err(IdentityProviderError::UnsupportedDriver(x)) if x == "mongodb"
        ));
    }
}
