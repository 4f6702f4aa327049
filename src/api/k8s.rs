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
//! Kubernetes webhook token authentication.
//!
//! The response body is the verdict; the status code only mirrors it.
use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;
use utoipa_axum::{router::OpenApiRouter, routes};

use autentigo_api_types::k8s_auth::TokenReview;

use crate::service::ServiceState;
use crate::token::TokenApi;

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(review))
}

/// Review a token.
#[utoipa::path(
    post,
    path = "/review-token",
    request_body = TokenReview,
    responses(
        (status = OK, description = "Token is valid", body = TokenReview),
        (status = UNAUTHORIZED, description = "Token is rejected", body = TokenReview),
    ),
    tag = "k8s"
)]
#[tracing::instrument(name = "api::k8s::review", level = "debug", skip(state, review))]
pub(super) async fn review(
    State(state): State<ServiceState>,
    review: Result<Json<TokenReview>, JsonRejection>,
) -> impl IntoResponse {
    let review = match review {
        Ok(Json(review)) => review,
        Err(rejection) => {
            return (
                StatusCode::BAD_REQUEST,
                Json(TokenReview::rejected(rejection.body_text())),
            );
        }
    };
    match state
        .provider
        .get_token_provider()
        .verify(&review.spec.token)
    {
        Ok(claims) => (
            StatusCode::OK,
            Json(TokenReview::authenticated(claims.into())),
        ),
        Err(e) => {
            debug!("token review rejected: {}", e);
            (
                StatusCode::UNAUTHORIZED,
                Json(TokenReview::rejected(e.to_string())),
            )
        }
    }
}
