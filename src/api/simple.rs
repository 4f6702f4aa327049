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
//! Simple authentication with a JSON body.
use axum::{
    Json,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
};
use utoipa_axum::{router::OpenApiRouter, routes};
use validator::Validate;

use autentigo_api_types::auth::{AuthResponse, SimpleAuthRequest};

use crate::api::common::CookieRequest;
use crate::api::error::AutentigoApiError;
use crate::auth;
use crate::service::ServiceState;

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(simple))
}

/// Authenticate with a user and a password.
#[utoipa::path(
    post,
    path = "/simple",
    params(
        ("X-Set-Cookie" = Option<String>, Header, description = "Set the (HTTP only) cookie with this name and return an empty 201 response"),
        ("X-Set-Cookie-Domain" = Option<String>, Header, description = "Domain of the cookie"),
        ("X-Set-Cookie-Insecure" = Option<String>, Header, description = "`yes` drops the Secure cookie attribute"),
    ),
    request_body = SimpleAuthRequest,
    responses(
        (status = CREATED, description = "Token and its claims", body = AuthResponse),
        (status = UNAUTHORIZED, description = "Authentication failed"),
    ),
    tag = "auth"
)]
#[tracing::instrument(name = "api::simple", level = "debug", skip(state, headers, req))]
pub(super) async fn simple(
    State(state): State<ServiceState>,
    headers: HeaderMap,
    Json(req): Json<SimpleAuthRequest>,
) -> Result<Response, AutentigoApiError> {
    req.validate()?;
    let user = req
        .user
        .filter(|user| !user.is_empty())
        .ok_or_else(|| AutentigoApiError::Unauthorized(Some("No user given".into())))?;
    let password = req
        .password
        .filter(|password| !password.is_empty())
        .ok_or_else(|| AutentigoApiError::Unauthorized(Some("No password given".into())))?;
    let cookie = CookieRequest::from_headers(&headers)?;

    let authenticated = auth::login(&state, &user, &password).await?;

    match cookie {
        Some(cookie) => cookie.response(&authenticated.token, &authenticated.claims),
        None => Ok((
            StatusCode::CREATED,
            Json(AuthResponse {
                token: authenticated.token,
                claims: authenticated.claims,
            }),
        )
            .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, header},
    };
    use http_body_util::BodyExt; // for `collect`
    use serde_json::{Value, json};
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use autentigo_api_types::ExtraClaims;

    use super::*;
    use crate::tests::api::{get_mocked_state, password_identity_mock, token_engine};
    use crate::token::TokenApi;

    async fn post(body: Value) -> Response {
        let extra = ExtraClaims::builder()
            .display_name("Alice")
            .groups(vec!["ops".to_string()])
            .build()
            .unwrap();
        let state = get_mocked_state(password_identity_mock("alice", "secret", extra));
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        api.as_service()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/simple")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(serde_json::to_vec(&body).unwrap()))
                    .unwrap(),
            )
            .await
            .unwrap()
    }

    async fn error_message(response: Response) -> String {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: Value = serde_json::from_slice(&body).unwrap();
        res["error"]["message"].as_str().unwrap().to_string()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_simple() {
        let response = post(json!({"user": "alice", "password": "secret"})).await;

        assert_eq!(response.status(), StatusCode::CREATED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: AuthResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!("alice", res.claims.sub);
        assert_eq!("Alice", res.claims.extra.display_name);
        assert_eq!(res.claims, token_engine().verify(&res.token).unwrap());
    }

    #[tokio::test]
    #[traced_test]
    async fn test_simple_missing_fields() {
        let response = post(json!({"password": "secret"})).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!("No user given", error_message(response).await);

        let response = post(json!({"user": "alice"})).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!("No password given", error_message(response).await);

        let response = post(json!({"user": "alice", "password": ""})).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!("No password given", error_message(response).await);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_simple_wrong_password() {
        let response = post(json!({"user": "alice", "password": "guess"})).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!("Authentication failed", error_message(response).await);
    }
}
