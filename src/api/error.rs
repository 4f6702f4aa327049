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
//! # Autentigo API error.
use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::auth::AuthenticationError;
use crate::identity::error::IdentityProviderError;
use crate::oauth::OAuthError;
use crate::token::error::TokenProviderError;

/// Autentigo API operation errors
#[derive(Debug, Error)]
pub enum AutentigoApiError {
    #[error("could not find {resource}: {identifier}")]
    NotFound {
        resource: String,
        identifier: String,
    },

    #[error("{0}")]
    BadRequest(String),

    #[error("{}", .0.clone().unwrap_or("The request you have made requires authentication.".to_string()))]
    Unauthorized(Option<String>),

    #[error("You are not authorized to perform the requested action.")]
    Forbidden,

    #[error("{0}")]
    Unprocessable(String),

    #[error("internal error")]
    InternalError(String),

    #[error("internal error")]
    IdentityError { source: IdentityProviderError },

    #[error("internal error")]
    OAuthError { source: OAuthError },

    #[error("internal error")]
    TokenError { source: TokenProviderError },

    #[error(transparent)]
    JsonExtractorRejection(#[from] JsonRejection),

    /// Request validation error.
    #[error("request validation failed: {source}")]
    Validator {
        /// The source of the error.
        #[from]
        source: validator::ValidationErrors,
    },
}

impl AutentigoApiError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AutentigoApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            AutentigoApiError::BadRequest(..) => StatusCode::BAD_REQUEST,
            AutentigoApiError::Unauthorized(..) => StatusCode::UNAUTHORIZED,
            AutentigoApiError::Forbidden => StatusCode::FORBIDDEN,
            AutentigoApiError::Unprocessable(..) => StatusCode::UNPROCESSABLE_ENTITY,
            AutentigoApiError::InternalError(_)
            | AutentigoApiError::IdentityError { .. }
            | AutentigoApiError::OAuthError { .. }
            | AutentigoApiError::TokenError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            AutentigoApiError::JsonExtractorRejection(rejection) => rejection.status(),
            AutentigoApiError::Validator { .. } => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for AutentigoApiError {
    fn into_response(self) -> Response {
        error!("Error happened during request processing: {:#?}", self);

        let status_code = self.status_code();
        (
            status_code,
            Json(json!({"error": {"code": status_code.as_u16(), "message": self.to_string()}})),
        )
            .into_response()
    }
}

impl From<AuthenticationError> for AutentigoApiError {
    fn from(value: AuthenticationError) -> Self {
        match value {
            AuthenticationError::InvalidCredentials => {
                Self::Unauthorized(Some("Authentication failed".to_string()))
            }
            AuthenticationError::UnknownUser(user) => {
                Self::Unprocessable(format!("unknown user {user}"))
            }
            AuthenticationError::Backend { source } => source.into(),
            AuthenticationError::Token { source } => source.into(),
        }
    }
}

impl From<IdentityProviderError> for AutentigoApiError {
    fn from(value: IdentityProviderError) -> Self {
        Self::IdentityError { source: value }
    }
}

impl From<TokenProviderError> for AutentigoApiError {
    fn from(value: TokenProviderError) -> Self {
        Self::TokenError { source: value }
    }
}

impl From<OAuthError> for AutentigoApiError {
    fn from(value: OAuthError) -> Self {
        match value {
            OAuthError::UnknownProvider(provider) => Self::NotFound {
                resource: "oauth provider".into(),
                identifier: provider,
            },
            OAuthError::StateMismatch
            | OAuthError::Provider(_)
            | OAuthError::MissingCode
            | OAuthError::Exchange(_) => Self::Unauthorized(Some(value.to_string())),
            OAuthError::MissingIdentity => Self::Unprocessable(value.to_string()),
            _ => Self::OAuthError { source: value },
        }
    }
}

#[cfg(test)]
mod tests {
    use http_body_util::BodyExt;
    use serde_json::Value;

    use super::*;

    async fn body(err: AutentigoApiError) -> (StatusCode, Value) {
        let response = err.into_response();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_invalid_credentials() {
        let (status, body) = body(AuthenticationError::InvalidCredentials.into()).await;
        assert_eq!(StatusCode::UNAUTHORIZED, status);
        assert_eq!(
            json!({"error": {"code": 401, "message": "Authentication failed"}}),
            body
        );
    }

    #[tokio::test]
    async fn test_backend_details_hidden() {
        let err: AutentigoApiError = AuthenticationError::Backend {
            source: IdentityProviderError::Configuration {
                backend: "sql",
                message: "postgres://admin:hunter2@db".into(),
            },
        }
        .into();
        let (status, body) = body(err).await;
        assert_eq!(StatusCode::INTERNAL_SERVER_ERROR, status);
        assert_eq!(
            json!({"error": {"code": 500, "message": "internal error"}}),
            body
        );
    }

    #[tokio::test]
    async fn test_unknown_user() {
        let (status, _) = body(AuthenticationError::UnknownUser("1234".into()).into()).await;
        assert_eq!(StatusCode::UNPROCESSABLE_ENTITY, status);
    }

    #[test]
    fn test_oauth_mapping() {
        assert_eq!(
            StatusCode::UNAUTHORIZED,
            AutentigoApiError::from(OAuthError::StateMismatch).status_code()
        );
        assert_eq!(
            StatusCode::NOT_FOUND,
            AutentigoApiError::from(OAuthError::UnknownProvider("x".into())).status_code()
        );
        assert_eq!(
            StatusCode::UNPROCESSABLE_ENTITY,
            AutentigoApiError::from(OAuthError::MissingIdentity).status_code()
        );
        assert_eq!(
            StatusCode::INTERNAL_SERVER_ERROR,
            AutentigoApiError::from(OAuthError::MissingEndpoint("userinfo_url")).status_code()
        );
    }
}
