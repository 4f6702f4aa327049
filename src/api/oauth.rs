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
//! # OAuth2 authorization code flow
//!
//! `GET /oauth/{provider}` sends the browser to the provider. The provider
//! redirects back to `GET /oauth/{provider}/callback`, where the code is
//! exchanged and the local user record is created or refreshed. The state
//! round trips through the provider and is not stored on the server. A
//! pre-allocated user id travels in a link state signed by the token
//! provider.
use axum::{
    Json,
    extract::{Path, Query, State},
    http::{HeaderMap, HeaderValue, StatusCode, header},
    response::{IntoResponse, Redirect, Response},
};
use tracing::{debug, info};
use utoipa_axum::{router::OpenApiRouter, routes};

use autentigo_api_types::auth::AuthResponse;
use autentigo_api_types::oauth::{CallbackParameters, ProviderIdentity};

use crate::api::error::AutentigoApiError;
use crate::auth;
use crate::config::OAuthProviderSection;
use crate::identity::{IdentityApi, IdentityProviderError, UserRecord};
use crate::oauth::{OAuthApi, OAuthError};
use crate::rbac::{Admin, Authorized, filter::bearer_token};
use crate::service::ServiceState;
use crate::token::TokenApi;

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .routes(routes!(login))
        .routes(routes!(callback))
        .routes(routes!(preallocate))
}

fn provider_section<'a>(
    state: &'a ServiceState,
    provider: &str,
) -> Result<&'a OAuthProviderSection, OAuthError> {
    state
        .config
        .oauth
        .get(provider)
        .ok_or_else(|| OAuthError::UnknownProvider(provider.into()))
}

/// Compare the returned state with the configured one.
///
/// Returns the pre-allocated local user id of a `<state>:<link state>`
/// value. The link state must be signed for the same `provider`.
fn check_state(
    state: &ServiceState,
    provider: &str,
    expected: &str,
    received: Option<&str>,
) -> Result<Option<String>, OAuthError> {
    let received = received.ok_or(OAuthError::StateMismatch)?;
    if received == expected {
        return Ok(None);
    }
    let link = received
        .strip_prefix(expected)
        .and_then(|rest| rest.strip_prefix(':'))
        .ok_or(OAuthError::StateMismatch)?;
    state
        .provider
        .get_token_provider()
        .verify_link_state(provider, link)
        .map(Some)
        .map_err(|e| {
            debug!("rejecting link state: {}", e);
            OAuthError::StateMismatch
        })
}

fn redirect_to_provider(
    state: &ServiceState,
    provider: &str,
    flow_state: &str,
) -> Result<Response, AutentigoApiError> {
    let url = state
        .provider
        .get_oauth_provider()
        .authorize_url(provider, flow_state)?;
    debug!("redirecting to the {} authorization endpoint", provider);
    Ok(Redirect::temporary(url.as_str()).into_response())
}

/// Start the authorization code flow or log in with a provider token.
///
/// Without credentials the caller is redirected to the provider. With an
/// `Authorization: Bearer` header carrying an access token of the provider
/// the local user linked to the token owner is logged in.
#[utoipa::path(
    get,
    path = "/{provider}",
    params(("provider" = String, Path, description = "Configured provider name")),
    responses(
        (status = OK, description = "Token of the linked local user", body = AuthResponse),
        (status = TEMPORARY_REDIRECT, description = "Redirect to the provider"),
        (status = NOT_FOUND, description = "Unknown provider"),
        (status = UNPROCESSABLE_ENTITY, description = "Provider did not report an identity"),
    ),
    tag = "oauth"
)]
#[tracing::instrument(name = "api::oauth::login", level = "debug", skip(state, headers))]
pub(super) async fn login(
    Path(provider): Path<String>,
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<Response, AutentigoApiError> {
    let section = provider_section(&state, &provider)?;
    let Some(access_token) = bearer_token(&headers) else {
        return redirect_to_provider(&state, &provider, &section.state);
    };

    let identity = state
        .provider
        .get_oauth_provider()
        .fetch_identity(&provider, access_token)
        .await?;
    let authenticated = auth::login_federated(&state, &identity.id, &provider).await?;
    Ok(Json(AuthResponse {
        token: authenticated.token,
        claims: authenticated.claims,
    })
    .into_response())
}

/// Start the authorization code flow for a pre-allocated local user.
///
/// The identity reported by the provider on callback is stored under
/// `user_id` and linked to it.
#[utoipa::path(
    get,
    path = "/{provider}/{user_id}",
    params(
        ("provider" = String, Path, description = "Configured provider name"),
        ("user_id" = String, Path, description = "Local user id to link"),
    ),
    responses(
        (status = TEMPORARY_REDIRECT, description = "Redirect to the provider"),
        (status = UNAUTHORIZED, description = "Token is missing or invalid"),
        (status = FORBIDDEN, description = "The admin role is missing"),
        (status = NOT_FOUND, description = "Unknown provider"),
    ),
    security(("jwt" = [])),
    tag = "oauth"
)]
#[tracing::instrument(
    name = "api::oauth::preallocate",
    level = "debug",
    skip(state, authorized)
)]
pub(super) async fn preallocate(
    authorized: Authorized<Admin>,
    Path((provider, user_id)): Path<(String, String)>,
    State(state): State<ServiceState>,
) -> Result<Response, AutentigoApiError> {
    let section = provider_section(&state, &provider)?;
    let link = state
        .provider
        .get_token_provider()
        .issue_link_state(&provider, &user_id)?;
    info!("{} links {} at {}", authorized.user.name, user_id, provider);
    redirect_to_provider(&state, &provider, &format!("{}:{}", section.state, link))
}

/// Store the identity reported by the provider as a local user.
async fn store_identity(
    state: &ServiceState,
    user_id: &str,
    identity: &ProviderIdentity,
) -> Result<(), AutentigoApiError> {
    let identity_provider = state.provider.get_identity_provider();
    let mut record = UserRecord::default();
    record.extra.display_name = identity.name.clone();
    record.extra.email = identity.email.clone();
    record.extra.email_verified = true;

    match identity_provider.create_user(state, user_id, record).await {
        Ok(()) => {
            info!("created user {}", user_id);
            return Ok(());
        }
        Err(IdentityProviderError::UserAlreadyExists(_)) => {}
        Err(e) => return Err(e.into()),
    }

    let mut record = identity_provider
        .get_user(state, user_id)
        .await?
        .ok_or_else(|| AutentigoApiError::InternalError(format!("user {user_id} vanished")))?;
    record.extra.display_name = identity.name.clone();
    if !identity.email.is_empty() && record.extra.email != identity.email {
        record.extra.email = identity.email.clone();
        record.extra.email_verified = true;
    }
    identity_provider.update_user(state, user_id, record).await?;
    info!("updated user {}", user_id);
    Ok(())
}

/// Complete the authorization code flow.
#[utoipa::path(
    get,
    path = "/{provider}/callback",
    params(
        ("provider" = String, Path, description = "Configured provider name"),
        CallbackParameters,
    ),
    responses(
        (status = OK, description = "User stored, the provider access token is in the Authorization header"),
        (status = TEMPORARY_REDIRECT, description = "User stored, redirect to the post login page"),
        (status = UNAUTHORIZED, description = "State mismatch, provider error or failed code exchange"),
        (status = NOT_FOUND, description = "Unknown provider"),
        (status = UNPROCESSABLE_ENTITY, description = "Provider did not report an identity"),
    ),
    tag = "oauth"
)]
#[tracing::instrument(name = "api::oauth::callback", level = "debug", skip(state, query))]
pub(super) async fn callback(
    Path(provider): Path<String>,
    State(state): State<ServiceState>,
    Query(query): Query<CallbackParameters>,
) -> Result<Response, AutentigoApiError> {
    let section = provider_section(&state, &provider)?;
    if let Some(error) = query.error {
        return Err(OAuthError::Provider(error).into());
    }
    let preallocated = check_state(&state, &provider, &section.state, query.state.as_deref())?;
    let code = query
        .code
        .filter(|code| !code.is_empty())
        .ok_or(OAuthError::MissingCode)?;

    let oauth = state.provider.get_oauth_provider();
    let access_token = oauth.exchange_code(&provider, &code).await?;
    let identity = oauth.fetch_user_info(&provider, &access_token).await?;

    let user_id = preallocated.as_deref().unwrap_or(identity.id.as_str());
    store_identity(&state, user_id, &identity).await?;
    if preallocated.is_some() {
        state
            .provider
            .get_identity_provider()
            .link_external_id(&state, &provider, &identity.id, user_id)
            .await?;
    }

    let mut headers = HeaderMap::new();
    headers.insert(
        header::AUTHORIZATION,
        HeaderValue::from_str(&format!("Bearer {access_token}")).map_err(|_| {
            AutentigoApiError::InternalError("unusable provider access token".into())
        })?,
    );
    Ok(match &section.post_login_redirect {
        Some(url) => (headers, Redirect::temporary(url.as_str())).into_response(),
        None => (StatusCode::OK, headers).into_response(),
    })
}
