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
//! # Relational backend
//!
//! Users are rows of a configurable table:
//!
//! ```sql
//! id, password_hash, display_name, email, email_verified, groups
//! ```
//!
//! `groups` is stored comma separated.
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sea_orm::{ConnectionTrait, DatabaseBackend, FromQueryResult, Statement};

use autentigo_api_types::{Claims, ExtraClaims};

use super::IdentityBackend;
use crate::config::Config;
use crate::identity::IdentityProviderError;
use crate::identity::password_hashing::verify_password;
use crate::identity::types::UserRecord;
use crate::service::ServiceState;

#[derive(Clone, Debug)]
pub struct SqlBackend {
    table: String,
}

#[derive(Debug, FromQueryResult)]
struct UserRow {
    password_hash: String,
    display_name: Option<String>,
    email: Option<String>,
    email_verified: Option<bool>,
    groups: Option<String>,
}

impl From<UserRow> for UserRecord {
    fn from(value: UserRow) -> Self {
        Self {
            password_hash: value.password_hash,
            extra: ExtraClaims {
                display_name: value.display_name.unwrap_or_default(),
                email: value.email.unwrap_or_default(),
                email_verified: value.email_verified.unwrap_or_default(),
                groups: value
                    .groups
                    .unwrap_or_default()
                    .split(',')
                    .map(str::trim)
                    .filter(|g| !g.is_empty())
                    .map(String::from)
                    .collect(),
            },
        }
    }
}

impl SqlBackend {
    pub fn new(config: &Config) -> Result<Self, IdentityProviderError> {
        let table = config.database.table.clone();
        if table.is_empty()
            || !table
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '.')
        {
            return Err(IdentityProviderError::Configuration {
                backend: "sql",
                message: format!("invalid table name {table:?}"),
            });
        }
        Ok(Self { table })
    }

    fn select_user(&self, backend: DatabaseBackend, user: &str) -> Statement {
        let placeholder = match backend {
            DatabaseBackend::Postgres => "$1",
            _ => "?",
        };
        Statement::from_sql_and_values(
            backend,
            format!(
                "select id, password_hash, display_name, email, email_verified, groups from {} where id = {placeholder}",
                self.table
            ),
            [user.into()],
        )
    }
}

#[async_trait]
impl IdentityBackend for SqlBackend {
    fn name(&self) -> &'static str {
        "sql"
    }

    async fn authenticate(
        &self,
        state: &ServiceState,
        user: &str,
        password: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError> {
        let db = &state.db;
        let record: UserRecord =
            UserRow::find_by_statement(self.select_user(db.get_database_backend(), user))
                .one(db)
                .await
                .map_err(|err| IdentityProviderError::database(err, "fetching the user"))?
                .ok_or(IdentityProviderError::InvalidAuthentication)?
                .into();
        if !verify_password(password, &record.password_hash) {
            return Err(IdentityProviderError::InvalidAuthentication);
        }
        record.claims(user, expires_at)
    }
}
