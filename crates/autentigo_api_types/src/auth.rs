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
//! # Basic and simple authentication types.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use validator::Validate;

use crate::claims::Claims;

/// Simple (JSON) authentication request.
///
/// Both fields are mandatory, they are only optional here so that the missing
/// one can be reported to the caller.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema, Validate)]
pub struct SimpleAuthRequest {
    /// User login.
    #[validate(length(max = 255))]
    pub user: Option<String>,

    /// User password.
    pub password: Option<String>,
}

/// Issued token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct TokenResponse {
    /// Signed token.
    pub token: String,
}

impl IntoResponse for TokenResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

/// Issued token together with its claims.
#[derive(Clone, Debug, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct AuthResponse {
    /// Signed token.
    pub token: String,

    /// Claims of the token.
    pub claims: Claims,
}

/// Identity of the caller as seen by the role based access control.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct MeResponse {
    /// Subject of the presented token.
    pub sub: String,

    /// Groups of the subject.
    #[serde(default)]
    pub groups: Vec<String>,

    /// Roles held by the subject.
    #[serde(default)]
    pub roles: Vec<String>,
}

impl IntoResponse for MeResponse {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}
