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
//! # Identity backend configuration
use secrecy::SecretString;
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

use crate::config::common::{csv, default_timeout};

/// Identity backend selection.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct IdentitySection {
    /// Identity backend driver: `ldap`, `sql`, `kv`, `file` or `stupid`.
    #[serde(default)]
    pub driver: String,
}

/// Flat user file backend.
#[derive(Debug, Default, Deserialize, Clone)]
pub struct FileSection {
    /// Path of the user file.
    pub path: Option<PathBuf>,
}

/// Directory bind backend.
#[derive(Debug, Deserialize, Clone)]
pub struct LdapSection {
    /// Directory server url (`ldap://` or `ldaps://`).
    pub url: Option<Url>,

    /// Bind DN template; `%s` is replaced with the login.
    #[serde(default)]
    pub user_template: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for LdapSection {
    fn default() -> Self {
        Self {
            url: None,
            user_template: String::new(),
            timeout: default_timeout(),
        }
    }
}

/// Relational backend.
#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseSection {
    /// Database URL.
    pub connection: Option<SecretString>,

    /// Table holding the users.
    #[serde(default = "default_table")]
    pub table: String,
}

fn default_table() -> String {
    "users".into()
}

impl Default for DatabaseSection {
    fn default() -> Self {
        Self {
            connection: None,
            table: default_table(),
        }
    }
}

/// Key-value backend (etcd v3 JSON gateway).
#[derive(Debug, Deserialize, Clone)]
pub struct KvSection {
    /// Gateway endpoints.
    #[serde(default, deserialize_with = "csv")]
    pub endpoints: Vec<String>,

    /// Key prefix.
    #[serde(default)]
    pub prefix: String,

    /// Per-call timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

impl Default for KvSection {
    fn default() -> Self {
        Self {
            endpoints: Vec::new(),
            prefix: String::new(),
            timeout: default_timeout(),
        }
    }
}
