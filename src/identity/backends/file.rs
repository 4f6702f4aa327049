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
//! # Flat user file backend
//!
//! One user per line, fields separated by colons:
//!
//! ```text
//! id:password_hash[:display_name:email:email_verified:groups]
//! ```
//!
//! `groups` is a comma separated list. Blank lines and lines starting with
//! `#` are ignored.
//!
//! Writes rewrite the whole file into a temporary file next to it which then
//! replaces the original. Every line that is not the written user is copied
//! verbatim, including comments and lines that do not parse. Concurrent
//! writers are not coordinated: a single writer is assumed.
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::task;
use tracing::{debug, warn};

use autentigo_api_types::{Claims, ExtraClaims};

use super::IdentityBackend;
use crate::config::Config;
use crate::identity::IdentityProviderError;
use crate::identity::password_hashing::verify_password;
use crate::identity::types::UserRecord;
use crate::service::ServiceState;

#[derive(Clone, Debug)]
pub struct FileBackend {
    path: PathBuf,
}

impl FileBackend {
    pub fn new(config: &Config) -> Result<Self, IdentityProviderError> {
        let path = config
            .file
            .path
            .clone()
            .ok_or_else(|| IdentityProviderError::Configuration {
                backend: "file",
                message: "file.path is not set".into(),
            })?;
        Ok(Self { path })
    }

    /// All lines of the file in file order.
    async fn load(&self) -> Result<Vec<Line>, IdentityProviderError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => String::new(),
            Err(e) => return Err(e.into()),
        };
        Ok(content
            .lines()
            .map(|raw| {
                let line = Line::parse(raw);
                if line.is_malformed() {
                    warn!("skipping malformed line in {}", self.path.display());
                }
                line
            })
            .collect())
    }

    async fn find(&self, user_id: &str) -> Result<Option<UserRecord>, IdentityProviderError> {
        Ok(self
            .load()
            .await?
            .into_iter()
            .find_map(|line| match line.user {
                Some((id, record)) if id == user_id => Some(record),
                _ => None,
            }))
    }

    async fn store(&self, lines: Vec<Line>) -> Result<(), IdentityProviderError> {
        let mut content = String::new();
        for line in &lines {
            content.push_str(&line.raw);
            content.push('\n');
        }
        let path = self.path.clone();
        task::spawn_blocking(move || replace_file(&path, content.as_bytes()))
            .await
            .map_err(|e| std::io::Error::other(e.to_string()))?
    }
}

/// A line of the user file together with the user it describes.
#[derive(Clone, Debug, PartialEq)]
struct Line {
    raw: String,
    user: Option<(String, UserRecord)>,
}

impl Line {
    fn parse(raw: &str) -> Self {
        let trimmed = raw.trim();
        let user = if trimmed.is_empty() || trimmed.starts_with('#') {
            None
        } else {
            parse_line(trimmed)
        };
        Self {
            raw: raw.to_string(),
            user,
        }
    }

    fn user(id: &str, record: UserRecord) -> Result<Self, IdentityProviderError> {
        let raw = format_line(id, &record)?;
        Ok(Self {
            raw,
            user: Some((id.to_string(), record)),
        })
    }

    /// Neither a comment nor a parsable user.
    fn is_malformed(&self) -> bool {
        let trimmed = self.raw.trim();
        self.user.is_none() && !trimmed.is_empty() && !trimmed.starts_with('#')
    }

    /// Id in the first field of a line that does not parse.
    fn malformed_id(&self) -> Option<&str> {
        self.is_malformed()
            .then(|| self.raw.trim().split(':').next())
            .flatten()
    }
}

fn replace_file(path: &Path, content: &[u8]) -> Result<(), IdentityProviderError> {
    let dir = match path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}

fn parse_bool(value: &str) -> Option<bool> {
    match value {
        "true" | "yes" | "1" => Some(true),
        "false" | "no" | "0" | "" => Some(false),
        _ => None,
    }
}

fn parse_line(line: &str) -> Option<(String, UserRecord)> {
    let fields: Vec<&str> = line.split(':').collect();
    match fields.as_slice() {
        [id, hash] => Some((
            id.to_string(),
            UserRecord {
                password_hash: hash.to_string(),
                extra: ExtraClaims::default(),
            },
        )),
        [id, hash, display_name, email, email_verified, groups] => Some((
            id.to_string(),
            UserRecord {
                password_hash: hash.to_string(),
                extra: ExtraClaims {
                    display_name: display_name.to_string(),
                    email: email.to_string(),
                    email_verified: parse_bool(email_verified)?,
                    groups: groups
                        .split(',')
                        .filter(|g| !g.is_empty())
                        .map(String::from)
                        .collect(),
                },
            },
        )),
        _ => None,
    }
}

fn format_line(id: &str, record: &UserRecord) -> Result<String, IdentityProviderError> {
    let extra = &record.extra;
    let fields = [
        id.to_string(),
        record.password_hash.clone(),
        extra.display_name.clone(),
        extra.email.clone(),
        extra.email_verified.to_string(),
        extra.groups.join(","),
    ];
    if fields.iter().any(|f| f.contains([':', '\n', '\r'])) {
        return Err(IdentityProviderError::MalformedUser(id.into()));
    }
    Ok(fields.join(":"))
}

#[async_trait]
impl IdentityBackend for FileBackend {
    fn name(&self) -> &'static str {
        "file"
    }

    async fn authenticate(
        &self,
        _state: &ServiceState,
        user: &str,
        password: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<Claims, IdentityProviderError> {
        let record = self
            .find(user)
            .await?
            .ok_or(IdentityProviderError::InvalidAuthentication)?;
        if !verify_password(password, &record.password_hash) {
            return Err(IdentityProviderError::InvalidAuthentication);
        }
        record.claims(user, expires_at)
    }

    async fn get_user(
        &self,
        _state: &ServiceState,
        user_id: &str,
    ) -> Result<Option<UserRecord>, IdentityProviderError> {
        self.find(user_id).await
    }

    async fn create_user(
        &self,
        _state: &ServiceState,
        user_id: &str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        let mut lines = self.load().await?;
        for line in &lines {
            if line.user.as_ref().is_some_and(|(id, _)| id == user_id) {
                return Err(IdentityProviderError::UserAlreadyExists(user_id.into()));
            }
            if line.malformed_id() == Some(user_id) {
                return Err(IdentityProviderError::MalformedUser(user_id.into()));
            }
        }
        lines.push(Line::user(user_id, record)?);
        debug!("adding {} to {}", user_id, self.path.display());
        self.store(lines).await
    }

    async fn update_user(
        &self,
        _state: &ServiceState,
        user_id: &str,
        record: UserRecord,
    ) -> Result<(), IdentityProviderError> {
        let mut lines = self.load().await?;
        let line = lines
            .iter_mut()
            .find(|line| line.user.as_ref().is_some_and(|(id, _)| id == user_id))
            .ok_or_else(|| IdentityProviderError::UserNotFound(user_id.into()))?;
        *line = Line::user(user_id, record)?;
        self.store(lines).await
    }
}
