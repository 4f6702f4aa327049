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
//! # Key-value backend
//!
//! Users are JSON documents stored in etcd and reached through the v3 JSON
//! gateway of the cluster:
//!
//! - `<prefix>/<user id>` holds the [`UserRecord`],
//! - `/oauth/<prefix>/<provider>/<external id>` holds the local user id of a
//!   linked external identity.
//!
//! Endpoints are tried in order until one answers. Every call is bounded by
//! `[kv] timeout`.
use std::time::Duration;

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use tracing::{debug, warn};
use url::Url;

use autentigo_api_types::Claims;

use super::IdentityBackend;
use crate::config::Config;
use crate::identity::IdentityProviderError;
use crate::identity::password_hashing::verify_password;
use crate::identity::types::UserRecord;
use crate::service::ServiceState;

const OAUTH_PREFIX: &str = "/oauth";

#[derive(Clone, Debug)]
pub struct KvBackend {
    endpoints: Vec<Url>,
    prefix: String,
    http: reqwest::Client,
}

#[derive(Debug, Default, Deserialize)]
struct RangeResponse {
    #[serde(default)]
    kvs: Vec<KeyValue>,
}

#[derive(Debug, Deserialize)]
struct KeyValue {
    #[serde(default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct TxnResponse {
    #[serde(default)]
    succeeded: bool,
}

/// Join key segments the way `path.Join` does, dropping empty segments.
fn join_key(segments: &[&str]) -> String {
    let absolute = segments.first().is_some_and(|s| s.starts_with('/'));
    let joined = segments
        .iter()
        .flat_map(|s| s.split('/'))
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if absolute {
        format!("/{joined}")
    } else {
        joined
    }
}

impl KvBackend {
    pub fn new(config: &Config) -> Result<Self, IdentityProviderError> {
        let invalid = |message: String| IdentityProviderError::Configuration {
            backend: "kv",
            message,
        };
        if config.kv.endpoints.is_empty() {
            return Err(invalid("kv.endpoints is not set".into()));
        }
        let endpoints = config
            .kv
            .endpoints
            .iter()
            .map(|e| Url::parse(e).map_err(|err| invalid(format!("endpoint {e}: {err}"))))
            .collect::<Result<Vec<_>, _>>()?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.kv.timeout))
            .build()?;
        Ok(Self {
            endpoints,
            prefix: config.kv.prefix.clone(),
            http,
        })
    }

    fn user_key(&self, user_id: &str) -> String {
        join_key(&[&self.prefix, user_id])
    }

    fn link_key(&self, provider: &str, external_id: &str) -> String {
        join_key(&[OAUTH_PREFIX, &self.prefix, provider, external_id])
    }

    async fn call<T: DeserializeOwned>(
        &self,
        api: &str,
        body: Value,
    ) -> Result<T, IdentityProviderError> {
        let mut last_error = None;
        for endpoint in &self.endpoints {
            let url = endpoint
                .join(api)
                .map_err(|e| IdentityProviderError::Configuration {
                    backend: "kv",
                    message: e.to_string(),
                })?;
            match self.http.post(url).json(&body).send().await {
                Ok(response) if response.status().is_success() => {
                    return Ok(response.json().await?);
                }
                Ok(response) => return Err(IdentityProviderError::KvStatus(response.status())),
                Err(e) if e.is_timeout() => {
                    return Err(IdentityProviderError::Timeout {
                        operation: "key-value request",
                    });
                }
                Err(e) if e.is_connect() => {
                    warn!("endpoint {} unreachable: {}", endpoint, e);
                    last_error = Some(e);
                }
                Err(e) => return Err(e.into()),
            }
        }
        match last_error {
            Some(e) => Err(e.into()),
            None => Err(IdentityProviderError::Configuration {
                backend: "kv",
                message: "no endpoint".into(),
            }),
        }
    }

    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, IdentityProviderError> {
        debug!("reading {}", key);
        let response: RangeResponse = self
            .call("v3/kv/range", json!({"key": STANDARD.encode(key)}))
            .await?;
        match response.kvs.into_iter().next() {
            Some(kv) => Ok(Some(STANDARD.decode(kv.value)?)),
            None => Ok(None),
        }
    }

    async fn put(&self, key: &str, value: &[u8]) -> Result<(), IdentityProviderError> {
        debug!("writing {}", key);
        let _: Value = self
            .call(
                "v3/kv/put",
                json!({"key": STANDARD.encode(key), "value": STANDARD.encode(value)}),
            )
            .await?;
        Ok(())
    }

    /// Put the value only if the key already exists (`must_exist`) or does
    /// not exist yet. Returns whether the value was written.
    async fn put_if(
        &self,
        key: &str,
        value: &[u8],
        must_exist: bool,
    ) -> Result<bool, IdentityProviderError> {
        let key = STANDARD.encode(key);
        let response: TxnResponse = self
            .call(
                "v3/kv/txn",
                json!({
                    "compare": [{
                        "key": key,
                        "target": "CREATE",
                        "result": if must_exist { "GREATER" } else { "EQUAL" },
                        "create_revision": "0",
                    }],
                    "success": [{
                        "request_put": {"key": key, "value": STANDARD.encode(value)},
                    }],
                }),
            )
            .await?;
        Ok(response.succeeded)
    }

    async fn load_user(&self, user_id: &str) -> Result<Option<UserRecord>, IdentityProviderError> {
        match self.get(&self.user_key(user_id)).await? {
            Some(raw) => Ok(Some(serde_json::from_slice(&raw).map_err(|e| {
                warn!("user {} can not be parsed: {}", user_id, e);
                IdentityProviderError::MalformedUser(user_id.into())
            })?)),
            None => Ok(None),
        }
    }
}

#[async_trait]
impl IdentityBackend for KvBackend {
    fn name(&self) -> &'static str {
        "kv"
    }

    async fn authenticate(
        &self,
        _state: &ServiceState,
        user: &str,
        password: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError> {
        let record = self
            .load_user(user)
            .await?
            .ok_or(IdentityProviderError::InvalidAuthentication)?;
        if !verify_password(password, &record.password_hash) {
            return Err(IdentityProviderError::InvalidAuthentication);
        }
        record.claims(user, expires_at)
    }

    async fn find_user(
        &self,
        _state: &ServiceState,
        external_id: &str,
        provider: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<(String, Claims), IdentityProviderError> {
        let raw = self
            .get(&self.link_key(provider, external_id))
            .await?
            .ok_or_else(|| IdentityProviderError::UserNotFound(external_id.into()))?;
        let user_id = String::from_utf8(raw)
            .map_err(|_| IdentityProviderError::MalformedUser(external_id.into()))?;
        let record = self
            .load_user(&user_id)
            .await?
            .ok_or_else(|| IdentityProviderError::UserNotFound(user_id.clone()))?;
        let claims = record.claims(&user_id, expires_at)?;
        Ok((user_id, claims))
    }

    async fn get_user(
        &self,
        _state: &ServiceState,
        user_id: &str,
    ) -> Result<Option<UserRecord>, IdentityProviderError> {
        self.load_user(user_id).await
    }

    async fn create_user(
        &self,
        _state: &ServiceState,
        user_id: &str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        let value = serde_json::to_vec(&record)?;
        if !self.put_if(&self.user_key(user_id), &value, false).await? {
            return Err(IdentityProviderError::UserAlreadyExists(user_id.into()));
        }
        Ok(())
    }

    async fn update_user(
        &self,
        _state: &ServiceState,
        user_id: &str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        let value = serde_json::to_vec(&record)?;
        if !self.put_if(&self.user_key(user_id), &value, true).await? {
            return Err(IdentityProviderError::UserNotFound(user_id.into()));
        }
        Ok(())
    }

    async fn link_external_id(
        &self,
        _state: &ServiceState,
        provider: &str,
        external_id: &str,
        user_id: &str,
    ) -> Result<(), IdentityProviderError> {
        self.put(&self.link_key(provider, external_id), user_id.as_bytes())
            .await
    }
}
