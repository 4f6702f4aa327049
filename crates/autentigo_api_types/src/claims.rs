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
//! # Token claims.
//!
//! The claims are the assertions carried inside every token issued by the
//! gateway: the registered `sub`, `iat` and `exp` claims plus the extended
//! identity attributes that the identity backends know about the user.

use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::{BuilderError, ClaimsError};

/// Extended identity attributes.
///
/// Every attribute is optional and is omitted from the serialized form when it
/// carries no information.
#[derive(Builder, Clone, Debug, Default, Deserialize, Eq, PartialEq, Serialize, ToSchema)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(into), default)]
pub struct ExtraClaims {
    /// Human readable user name.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub display_name: String,

    /// User email address.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub email: String,

    /// Whether the email address has been verified.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub email_verified: bool,

    /// Groups the user belongs to.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,
}

impl ExtraClaims {
    pub fn builder() -> ExtraClaimsBuilder {
        ExtraClaimsBuilder::default()
    }
}

/// Token claims.
#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize, ToSchema)]
pub struct Claims {
    /// Subject (the user id assigned by the identity backend).
    pub sub: String,

    /// Issue timestamp (seconds since the unix epoch).
    pub iat: i64,

    /// Expiration timestamp (seconds since the unix epoch).
    pub exp: i64,

    /// Extended identity attributes.
    #[serde(flatten)]
    pub extra: ExtraClaims,
}

impl Claims {
    /// Build claims for the `subject` valid from `issued_at` until
    /// `expires_at`.
    pub fn new<S: Into<String>>(
        subject: S,
        extra: ExtraClaims,
        issued_at: DateTime<Utc>,
        expires_at: DateTime<Utc>,
    ) -> Result<Self, ClaimsError> {
        let (iat, exp) = (issued_at.timestamp(), expires_at.timestamp());
        if exp <= iat {
            return Err(ClaimsError::InvalidValidityWindow {
                issued_at: iat,
                expires_at: exp,
            });
        }
        Ok(Self {
            sub: subject.into(),
            iat,
            exp,
            extra,
        })
    }

    pub fn issued_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.iat, 0).unwrap_or_default()
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        DateTime::from_timestamp(self.exp, 0).unwrap_or_default()
    }
}
