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
//! Keystone compatible token API.
//!
//! Mimics `/v3/auth/tokens` of the OpenStack identity service far enough for
//! clients that only need password authentication and token validation.
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, HeaderName, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use tracing::debug;
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::Validate;

use autentigo_api_types::Claims;
use autentigo_api_types::keystone::{AuthRequest, TokenBuilder, TokenResponse, UserBuilder};

use crate::api::error::AutentigoApiError;
use crate::auth;
use crate::service::ServiceState;
use crate::token::TokenApi;

pub(crate) const X_AUTH_TOKEN: &str = "x-auth-token";
pub(crate) const X_SUBJECT_TOKEN: &str = "x-subject-token";

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(create, show, check))
}

fn token_response(claims: &Claims) -> Result<TokenResponse, AutentigoApiError> {
    let name = if claims.extra.display_name.is_empty() {
        claims.sub.clone()
    } else {
        claims.extra.display_name.clone()
    };
    let token = TokenBuilder::default()
        .issued_at(claims.issued_at())
        .expires_at(claims.expires_at())
        .user(
            UserBuilder::default()
                .id(claims.sub.clone())
                .name(name)
                .build()
                .map_err(|e| AutentigoApiError::InternalError(e.to_string()))?,
        )
        .build()
        .map_err(|e| AutentigoApiError::InternalError(e.to_string()))?;
    Ok(TokenResponse { token })
}

/// Verify the admin and the subject token of a validation request.
fn validate(state: &ServiceState, headers: &HeaderMap) -> Result<Claims, AutentigoApiError> {
    let token_provider = state.provider.get_token_provider();
    let admin = headers
        .get(X_AUTH_TOKEN)
        .and_then(|val| val.to_str().ok())
        .ok_or(AutentigoApiError::Unauthorized(None))?;
    token_provider.verify(admin).map_err(|e| {
        debug!("admin token rejected: {}", e);
        AutentigoApiError::Unauthorized(None)
    })?;

    let subject = headers
        .get(X_SUBJECT_TOKEN)
        .and_then(|val| val.to_str().ok())
        .ok_or(AutentigoApiError::BadRequest(
            "missing x-subject-token header".into(),
        ))?;
    token_provider
        .verify(subject)
        .map_err(|e| AutentigoApiError::BadRequest(format!("invalid subject token: {e}")))
}

/// Authenticate with a password.
///
/// The token is returned in the `X-Subject-Token` header.
#[utoipa::path(
    post,
    path = "/",
    request_body = AuthRequest,
    responses(
        (status = CREATED, description = "Token object", body = TokenResponse,
            headers(("X-Subject-Token" = String, description = "Issued token"))),
        (status = UNAUTHORIZED, description = "Authentication failed"),
    ),
    tag = "keystone"
)]
#[tracing::instrument(name = "api::keystone::post", level = "debug", skip(state, req))]
pub(super) async fn create(
    State(state): State<ServiceState>,
    Json(req): Json<AuthRequest>,
) -> Result<Response, AutentigoApiError> {
    req.validate()?;
    let auth = req.auth.ok_or(AutentigoApiError::Unauthorized(Some(
        "No authentication provided".into(),
    )))?;
    let user = &auth.identity.password.user;
    let login = user.login().ok_or(auth::AuthenticationError::InvalidCredentials)?;

    let authenticated = auth::login(&state, login, &user.password).await?;

    let subject_token = HeaderValue::from_str(&authenticated.token)
        .map_err(|e| AutentigoApiError::InternalError(e.to_string()))?;
    Ok((
        StatusCode::CREATED,
        [(HeaderName::from_static(X_SUBJECT_TOKEN), subject_token)],
        Json(token_response(&authenticated.claims)?),
    )
        .into_response())
}

/// Validate and show information for token.
///
/// Pass your own token in the X-Auth-Token request header.
///
/// Pass the token that you want to validate in the X-Subject-Token request
/// header.
#[utoipa::path(
    get,
    path = "/",
    params(
        ("X-Auth-Token" = String, Header, description = "Token of the caller"),
        ("X-Subject-Token" = String, Header, description = "Token to validate"),
    ),
    responses(
        (status = OK, description = "Token object", body = TokenResponse),
        (status = BAD_REQUEST, description = "Subject token is missing or invalid"),
        (status = UNAUTHORIZED, description = "Caller token is missing or invalid"),
    ),
    security(("x-auth" = [])),
    tag = "keystone"
)]
#[tracing::instrument(name = "api::keystone::get", level = "debug", skip(state, headers))]
pub(super) async fn show(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<TokenResponse, AutentigoApiError> {
    let claims = validate(&state, &headers)?;
    token_response(&claims)
}

/// Validate token.
#[utoipa::path(
    head,
    path = "/",
    params(
        ("X-Auth-Token" = String, Header, description = "Token of the caller"),
        ("X-Subject-Token" = String, Header, description = "Token to validate"),
    ),
    responses(
        (status = OK, description = "Token is valid"),
        (status = BAD_REQUEST, description = "Subject token is missing or invalid"),
        (status = UNAUTHORIZED, description = "Caller token is missing or invalid"),
    ),
    security(("x-auth" = [])),
    tag = "keystone"
)]
#[tracing::instrument(name = "api::keystone::head", level = "debug", skip(state, headers))]
pub(super) async fn check(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<StatusCode, AutentigoApiError> {
    validate(&state, &headers)?;
    Ok(StatusCode::OK)
}
