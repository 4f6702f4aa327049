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
//! # Keystone compatible token API types.
//!
//! Only the password method of the Keystone v3 identity API is understood;
//! scoping is ignored.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::{DateTime, Utc};
use derive_builder::Builder;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::error::BuilderError;

/// Keystone authentication request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct AuthRequest {
    /// Authentication payload.
    #[validate(nested)]
    pub auth: Option<Auth>,
}

/// Authentication payload.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct Auth {
    /// Identity to authenticate.
    #[serde(default)]
    #[validate(nested)]
    pub identity: Identity,
}

/// Identity to authenticate.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct Identity {
    /// Authentication methods. Only `password` is meaningful.
    #[serde(default)]
    pub methods: Vec<String>,

    /// Password authentication.
    #[serde(default)]
    #[validate(nested)]
    pub password: PasswordAuth,
}

/// Password authentication.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct PasswordAuth {
    /// User credentials.
    #[serde(default)]
    #[validate(nested)]
    pub user: PasswordUser,
}

/// User credentials.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct PasswordUser {
    /// User id. Takes precedence over the name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub id: Option<String>,

    /// User name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    #[validate(length(max = 255))]
    pub name: Option<String>,

    /// User password.
    #[serde(default)]
    pub password: String,

    /// User domain. Accepted for compatibility and otherwise ignored.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<Domain>,
}

impl PasswordUser {
    /// Login to authenticate with: the id when present, the name otherwise.
    pub fn login(&self) -> Option<&str> {
        self.id
            .as_deref()
            .filter(|id| !id.is_empty())
            .or(self.name.as_deref())
            .filter(|login| !login.is_empty())
    }
}

/// Domain reference.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct Domain {
    /// Domain id.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    /// Domain name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// Token user.
#[derive(Builder, Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(into))]
pub struct User {
    /// User id.
    pub id: String,

    /// User name.
    pub name: String,
}

/// Token information.
#[derive(Builder, Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
#[builder(build_fn(error = "BuilderError"))]
#[builder(setter(into))]
pub struct Token {
    /// Issue time.
    pub issued_at: DateTime<Utc>,

    /// Expiration time.
    pub expires_at: DateTime<Utc>,

    /// Token owner.
    pub user: User,
}

/// Token response.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Token information.
    pub token: Token,
}

impl IntoResponse for TokenResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
