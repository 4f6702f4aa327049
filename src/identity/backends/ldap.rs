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
//! # LDAP backend
//!
//! Authentication is a simple bind with the DN built from
//! `[ldap] user_template`. The directory is only asked whether the password
//! is right, so the claims carry nothing but the subject.
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use ldap3::{LdapConnAsync, LdapConnSettings, dn_escape};
use tracing::{debug, warn};
use url::Url;

use autentigo_api_types::Claims;

use super::IdentityBackend;
use crate::config::Config;
use crate::identity::IdentityProviderError;
use crate::identity::types::UserRecord;
use crate::service::ServiceState;

/// `invalidCredentials` result code.
const INVALID_CREDENTIALS: u32 = 49;

#[derive(Clone, Debug)]
pub struct LdapBackend {
    url: Url,
    user_template: String,
    timeout: Duration,
}

impl LdapBackend {
    pub fn new(config: &Config) -> Result<Self, IdentityProviderError> {
        let invalid = |message: String| IdentityProviderError::Configuration {
            backend: "ldap",
            message,
        };
        let url = config
            .ldap
            .url
            .clone()
            .ok_or_else(|| invalid("ldap.url is not set".into()))?;
        if !matches!(url.scheme(), "ldap" | "ldaps") {
            return Err(invalid(format!("unsupported scheme {}", url.scheme())));
        }
        if !config.ldap.user_template.contains("%s") {
            return Err(invalid("ldap.user_template has no %s placeholder".into()));
        }
        Ok(Self {
            url,
            user_template: config.ldap.user_template.clone(),
            timeout: Duration::from_secs(config.ldap.timeout),
        })
    }

    fn bind_dn(&self, user: &str) -> String {
        self.user_template.replace("%s", &dn_escape(user))
    }

    async fn bind(&self, dn: &str, password: &str) -> Result<(), IdentityProviderError> {
        let settings = LdapConnSettings::new().set_conn_timeout(self.timeout);
        let (conn, mut ldap) = LdapConnAsync::with_settings(settings, self.url.as_str()).await?;
        ldap3::drive!(conn);

        let result = ldap.simple_bind(dn, password).await?;
        if result.rc == INVALID_CREDENTIALS {
            debug!("bind as {} rejected", dn);
            return Err(IdentityProviderError::InvalidAuthentication);
        }
        result.success()?;
        if let Err(e) = ldap.unbind().await {
            warn!("unbind failed: {}", e);
        }
        Ok(())
    }
}

#[async_trait]
impl IdentityBackend for LdapBackend {
    fn name(&self) -> &'static str {
        "ldap"
    }

    async fn authenticate(
        &self,
        _state: &ServiceState,
        user: &str,
        password: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError> {
        // An empty password is an unauthenticated bind and always succeeds.
        if user.is_empty() || password.is_empty() {
            return Err(IdentityProviderError::InvalidAuthentication);
        }
        let dn = self.bind_dn(user);
        tokio::time::timeout(self.timeout, self.bind(&dn, password))
            .await
            .map_err(|_| IdentityProviderError::Timeout {
                operation: "ldap bind",
            })??;
        UserRecord::default().claims(user, expires_at)
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeDelta;

    use super::*;
    use crate::tests::api::get_mocked_state_unauthed;

    fn config(url: &str) -> Config {
        let mut config = Config::default();
        config.ldap.url = Some(Url::parse(url).unwrap());
        config.ldap.user_template = "uid=%s,ou=people,dc=example,dc=org".into();
        config.ldap.timeout = 2;
        config
    }

    #[test]
    fn test_new() {
        assert!(LdapBackend::new(&config("ldap://localhost")).is_ok());
        assert!(LdapBackend::new(&config("ldaps://localhost:636")).is_ok());
        assert!(matches!(
            LdapBackend::new(&config("http://localhost")),
            Err(IdentityProviderError::Configuration { backend: "ldap", .. })
        ));
        assert!(matches!(
            LdapBackend::new(&Config::default()),
            Err(IdentityProviderError::Configuration { backend: "ldap", .. })
        ));
        let mut no_placeholder = config("ldap://localhost");
        no_placeholder.ldap.user_template = "cn=admin".into();
        assert!(LdapBackend::new(&no_placeholder).is_err());
    }

    #[test]
    fn test_bind_dn() {
        let backend = LdapBackend::new(&config("ldap://localhost")).unwrap();
        assert_eq!(
            "uid=alice,ou=people,dc=example,dc=org",
            backend.bind_dn("alice")
        );
        assert!(!backend.bind_dn("a,b").starts_with("uid=a,b"));
    }

    #[tokio::test]
    async fn test_empty_password_rejected() {
        let backend = LdapBackend::new(&config("ldap://127.0.0.1:1")).unwrap();
        let state = get_mocked_state_unauthed();
        assert!(matches!(
            backend
                .authenticate(&state, "alice", "", Utc::now() + TimeDelta::minutes(1))
                .await,
            Err(IdentityProviderError::InvalidAuthentication)
        ));
    }

    #[tokio::test]
    async fn test_unreachable_server() {
        let backend = LdapBackend::new(&config("ldap://127.0.0.1:1")).unwrap();
        let state = get_mocked_state_unauthed();
        let res = backend
            .authenticate(&state, "alice", "secret", Utc::now() + TimeDelta::minutes(1))
            .await;
        assert!(matches!(
            res,
            Err(IdentityProviderError::Directory { .. } | IdentityProviderError::Timeout { .. })
        ));
    }

    #[tokio::test]
    async fn test_find_user_unsupported() {
        let backend = LdapBackend::new(&config("ldap://localhost")).unwrap();
        let state = get_mocked_state_unauthed();
        let err = backend
            .find_user(&state, "1234", "github", Utc::now() + TimeDelta::minutes(1))
            .await
            .unwrap_err();
        assert_eq!("find user is inconsistent with ldap backend", err.to_string());
    }
}
