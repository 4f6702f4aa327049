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
//! # Role based access control
//!
//! Roles are granted by a static table loaded at startup:
//!
//! ```yaml
//! base: [viewer]
//! rules:
//!   - role: admin
//!     users: [alice]
//!     groups: [ops]
//! ```
//!
//! A user holds a role when it is listed in `base`, or when a rule for that
//! role names the user or one of the user's groups. There is no hierarchy
//! and no deny rule.
use serde::Deserialize;
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

use autentigo_api_types::Claims;

pub mod error;
pub mod filter;

use crate::config::RbacSection;
pub use error::RbacError;
pub use filter::{Admin, Authorized, RequiredRole, SelfService};

/// Name of the user authenticated with the bypass token.
pub const BYPASS_USER: &str = "bypass";

/// Projection of the validated token used for role matching.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct User {
    /// Subject of the token.
    pub name: String,
    /// Groups of the subject.
    pub groups: Vec<String>,
}

impl User {
    pub fn new<S: Into<String>>(name: S, groups: Vec<String>) -> Self {
        Self {
            name: name.into(),
            groups,
        }
    }
}

impl From<Claims> for User {
    fn from(value: Claims) -> Self {
        Self {
            name: value.sub,
            groups: value.extra.groups,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct Rule {
    /// Role granted by the rule.
    pub role: String,
    /// Users holding the role.
    #[serde(default)]
    pub users: Vec<String>,
    /// Groups holding the role.
    #[serde(default)]
    pub groups: Vec<String>,
}

impl Rule {
    fn grants(&self, user: &User) -> bool {
        self.users.iter().any(|u| *u == user.name)
            || self.groups.iter().any(|g| user.groups.contains(g))
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
pub struct RoleTable {
    /// Roles granted to everybody.
    #[serde(default)]
    pub base: Vec<String>,
    #[serde(default)]
    pub rules: Vec<Rule>,
}

impl RoleTable {
    /// Load the table named by the configuration. Without a definition the
    /// table is empty and nobody holds any role.
    pub fn from_config(config: &RbacSection) -> Result<Self, RbacError> {
        match &config.definition {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn load(path: &Path) -> Result<Self, RbacError> {
        debug!("loading role table from {}", path.display());
        let raw = std::fs::read_to_string(path).map_err(|source| RbacError::Read {
            source,
            path: path.to_path_buf(),
        })?;
        Self::from_yaml(&raw)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, RbacError> {
        Ok(serde_yaml::from_str(raw)?)
    }

    /// Whether the user holds the role.
    pub fn matches(&self, role: &str, user: &User) -> bool {
        self.base.iter().any(|r| r == role)
            || self
                .rules
                .iter()
                .any(|rule| rule.role == role && rule.grants(user))
    }

    /// All roles the user holds, sorted.
    pub fn roles_of(&self, user: &User) -> Vec<String> {
        self.base
            .iter()
            .chain(
                self.rules
                    .iter()
                    .filter(|rule| rule.grants(user))
                    .map(|rule| &rule.role),
            )
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    fn table() -> RoleTable {
        RoleTable::from_yaml(
            r#"
base: []
rules:
  - role: admin
    users: [alice]
"#,
        )
        .unwrap()
    }

    #[test]
    fn test_match_user() {
        let table = table();
        assert!(table.matches("admin", &User::new("alice", vec![])));
        assert!(!table.matches("admin", &User::new("bob", vec![])));
    }

    #[test]
    fn test_match_group() {
        let mut table = table();
        let bob = User::new("bob", vec!["ops".into()]);
        assert!(!table.matches("admin", &bob));
        table.rules[0].groups.push("ops".into());
        assert!(table.matches("admin", &bob));
    }

    #[test]
    fn test_rule_grants_only_its_role() {
        let table = table();
        assert!(!table.matches("self-service", &User::new("alice", vec![])));
    }

    #[test]
    fn test_base_roles() {
        let table = RoleTable::from_yaml(
            r#"
base: [self-service]
rules:
  - role: admin
    groups: [ops]
  - role: auditor
    groups: [ops, sec]
  - role: admin
    users: [carol]
"#,
        )
        .unwrap();
        let anybody = User::new("mallory", vec![]);
        assert!(table.matches("self-service", &anybody));
        assert_eq!(vec!["self-service"], table.roles_of(&anybody));
        assert_eq!(
            vec!["admin", "auditor", "self-service"],
            table.roles_of(&User::new("carol", vec!["sec".into(), "ops".into()]))
        );
    }

    #[test]
    fn test_empty_definition() {
        let table = RoleTable::from_yaml("{}").unwrap();
        assert!(table.roles_of(&User::new("alice", vec![])).is_empty());
        assert_eq!(
            RoleTable::default(),
            RoleTable::from_config(&RbacSection::default()).unwrap()
        );
    }

    #[test]
    fn test_load() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "rules:\n  - role: admin\n    users: [alice]").unwrap();
        let config = RbacSection {
            definition: Some(file.path().to_path_buf()),
            bypass_token: None,
        };
        let table = RoleTable::from_config(&config).unwrap();
        assert!(table.matches("admin", &User::new("alice", vec![])));

        assert!(matches!(
            RoleTable::load(Path::new("/nonexistent/rbac.yaml")),
            Err(RbacError::Read { .. })
        ));
        assert!(matches!(
            RoleTable::from_yaml("rules: 42"),
            Err(RbacError::Definition { .. })
        ));
    }
}
