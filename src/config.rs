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
//! # Autentigo configuration
//!
//! The configuration is assembled from (in increasing precedence):
//!
//! - built-in defaults,
//! - the configuration file (format derived from the file extension),
//! - `AUTENTIGO__<SECTION>__<KEY>` environment variables,
//! - the legacy single-word environment variables (`TLS_KEY`, `AUTH_BACKEND`,
//!   ...), see [`LEGACY_ENV`].
use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use eyre::{Report, WrapErr};
use serde::Deserialize;
use std::collections::HashMap;
use std::net::SocketAddr;
use std::path::PathBuf;

mod common;
mod identity;
mod oauth;
mod rbac;
mod token;

pub use identity::{DatabaseSection, FileSection, IdentitySection, KvSection, LdapSection};
pub use oauth::OAuthProviderSection;
pub use rbac::RbacSection;
pub use token::TokenSection;

/// Legacy environment variables and the configuration keys they override.
pub const LEGACY_ENV: &[(&str, &str)] = &[
    ("TLS_KEY", "token.private_key"),
    ("TLS_CRT", "token.certificate"),
    ("SIGNING_METHOD", "token.signing_method"),
    ("TOKEN_DURATION", "token.duration"),
    ("AUTH_BACKEND", "identity.driver"),
    ("AUTH_FILE", "file.path"),
    ("LDAP_SERVER", "ldap.url"),
    ("LDAP_USER", "ldap.user_template"),
    ("ETCD_PREFIX", "kv.prefix"),
    ("ETCD_ENDPOINTS", "kv.endpoints"),
    ("ETCD_TIMEOUT", "kv.timeout"),
    ("SQL_DSN", "database.connection"),
    ("SQL_TABLE", "database.table"),
    ("ADMIN_TOKEN", "rbac.bypass_token"),
    ("RBAC_FILE", "rbac.definition"),
];

#[derive(Debug, Default, Deserialize, Clone)]
pub struct Config {
    /// Global configuration options
    #[serde(default)]
    pub default: DefaultSection,

    /// Token signing
    #[serde(default)]
    pub token: TokenSection,

    /// Identity backend selection
    #[serde(default)]
    pub identity: IdentitySection,

    /// File identity backend
    #[serde(default)]
    pub file: FileSection,

    /// Directory identity backend
    #[serde(default)]
    pub ldap: LdapSection,

    /// Relational identity backend
    #[serde(default)]
    pub database: DatabaseSection,

    /// Key-value identity backend
    #[serde(default)]
    pub kv: KvSection,

    /// OAuth2 providers keyed by provider name
    #[serde(default)]
    pub oauth: HashMap<String, OAuthProviderSection>,

    /// Role based access control
    #[serde(default)]
    pub rbac: RbacSection,
}

#[derive(Debug, Deserialize, Clone)]
pub struct DefaultSection {
    /// Listener address
    #[serde(default = "default_bind")]
    pub bind: SocketAddr,
}

fn default_bind() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 8080))
}

impl Default for DefaultSection {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

impl Config {
    pub fn new(path: PathBuf) -> Result<Self, Report> {
        let mut builder = config::Config::builder();

        if std::path::Path::new(&path).is_file() {
            builder = builder.add_source(File::from(path));
        }

        builder = builder.add_source(
            Environment::with_prefix("AUTENTIGO")
                .separator("__")
                .try_parsing(false),
        );

        with_legacy_env(builder, |name| std::env::var(name).ok())?.try_into()
    }
}

/// Apply the legacy environment variables found by `lookup` as overrides.
pub fn with_legacy_env<F>(
    builder: ConfigBuilder<DefaultState>,
    lookup: F,
) -> Result<ConfigBuilder<DefaultState>, Report>
where
    F: Fn(&str) -> Option<String>,
{
    let mut builder = builder;
    for (name, key) in LEGACY_ENV {
        builder = builder.set_override_option(*key, lookup(name).filter(|v| !v.is_empty()))?;
    }
    Ok(builder)
}

impl TryFrom<ConfigBuilder<DefaultState>> for Config {
    type Error = Report;
    fn try_from(builder: ConfigBuilder<DefaultState>) -> Result<Self, Self::Error> {
        let mut builder = builder;
        builder = builder
            .set_default("default.bind", "0.0.0.0:8080")?
            .set_default("token.signing_method", "RS256")?
            .set_default("token.duration", "3600")?
            .set_default("database.table", "users")?
            .set_default("ldap.timeout", "5")?
            .set_default("kv.timeout", "5")?;

        builder
            .build()
            .wrap_err("Failed to read configuration file")?
            .try_deserialize()
            .wrap_err("Failed to parse configuration file")
    }
}
