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
//! Basic authentication.
use axum::{
    extract::State,
    http::{HeaderMap, HeaderValue, header},
    response::{IntoResponse, Response},
};
use base64::{Engine as _, engine::general_purpose::STANDARD};
use utoipa_axum::{router::OpenApiRouter, routes};

use autentigo_api_types::auth::TokenResponse;

use crate::api::common::CookieRequest;
use crate::api::error::AutentigoApiError;
use crate::auth;
use crate::service::ServiceState;

const CHALLENGE: &str = r#"Basic realm="Autentigo""#;

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(basic))
}

/// User and password of an `Authorization: Basic` header.
fn credentials(headers: &HeaderMap) -> Option<(String, String)> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, encoded) = value.split_once(' ')?;
    if !scheme.eq_ignore_ascii_case("basic") {
        return None;
    }
    let decoded = String::from_utf8(STANDARD.decode(encoded.trim()).ok()?).ok()?;
    let (user, password) = decoded.split_once(':')?;
    Some((user.to_string(), password.to_string()))
}

/// Authenticate with HTTP basic authentication.
#[utoipa::path(
    get,
    path = "/basic",
    params(
        ("X-Set-Cookie" = Option<String>, Header, description = "Set the (HTTP only) cookie with this name and return an empty 201 response"),
        ("X-Set-Cookie-Domain" = Option<String>, Header, description = "Domain of the cookie"),
        ("X-Set-Cookie-Insecure" = Option<String>, Header, description = "`yes` drops the Secure cookie attribute"),
    ),
    responses(
        (status = OK, description = "Token", body = TokenResponse),
        (status = CREATED, description = "Cookie is set"),
        (status = UNAUTHORIZED, description = "Authentication failed"),
    ),
    security(("basic" = [])),
    tag = "auth"
)]
#[tracing::instrument(name = "api::basic", level = "debug", skip(state, headers))]
pub(super) async fn basic(
    State(state): State<ServiceState>,
    headers: HeaderMap,
) -> Result<Response, AutentigoApiError> {
    let Some((user, password)) = credentials(&headers) else {
        let mut response = AutentigoApiError::Unauthorized(None).into_response();
        response
            .headers_mut()
            .insert(header::WWW_AUTHENTICATE, HeaderValue::from_static(CHALLENGE));
        return Ok(response);
    };
    let cookie = CookieRequest::from_headers(&headers)?;

    let authenticated = auth::login(&state, &user, &password).await?;

    match cookie {
        Some(cookie) => cookie.response(&authenticated.token, &authenticated.claims),
        None => Ok(TokenResponse {
            token: authenticated.token,
        }
        .into_response()),
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use http_body_util::BodyExt; // for `collect`
    use tower::ServiceExt; // for `call`, `oneshot`, and `ready`
    use tower_http::trace::TraceLayer;
    use tracing_test::traced_test;

    use autentigo_api_types::ExtraClaims;

    use super::*;
    use crate::tests::api::{get_mocked_state, password_identity_mock, token_engine};
    use crate::token::TokenApi;

    fn basic_header(user: &str, password: &str) -> String {
        format!("Basic {}", STANDARD.encode(format!("{user}:{password}")))
    }

    #[test]
    fn test_credentials() {
        let mut headers = HeaderMap::new();
        assert_eq!(None, credentials(&headers));
        headers.insert(header::AUTHORIZATION, "Bearer abc".parse().unwrap());
        assert_eq!(None, credentials(&headers));
        headers.insert(header::AUTHORIZATION, "Basic !!!".parse().unwrap());
        assert_eq!(None, credentials(&headers));
        headers.insert(
            header::AUTHORIZATION,
            basic_header("alice", "se:cret").parse().unwrap(),
        );
        assert_eq!(
            Some(("alice".to_string(), "se:cret".to_string())),
            credentials(&headers)
        );
    }

    #[tokio::test]
    #[traced_test]
    async fn test_basic() {
        let state = get_mocked_state(password_identity_mock(
            "alice",
            "secret",
            ExtraClaims::default(),
        ));
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/basic")
                    .header(header::AUTHORIZATION, basic_header("alice", "secret"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: TokenResponse = serde_json::from_slice(&body).unwrap();
        assert_eq!("alice", token_engine().verify(&res.token).unwrap().sub);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_basic_wrong_password() {
        let state = get_mocked_state(password_identity_mock(
            "alice",
            "secret",
            ExtraClaims::default(),
        ));
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/basic")
                    .header(header::AUTHORIZATION, basic_header("alice", "wrong"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        let res: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!("Authentication failed", res["error"]["message"]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_basic_challenge() {
        let state = get_mocked_state(password_identity_mock(
            "alice",
            "secret",
            ExtraClaims::default(),
        ));
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(Request::builder().uri("/basic").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(CHALLENGE, response.headers()[header::WWW_AUTHENTICATE]);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_basic_cookie() {
        let state = get_mocked_state(password_identity_mock(
            "alice",
            "secret",
            ExtraClaims::default(),
        ));
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/basic")
                    .header(header::AUTHORIZATION, basic_header("alice", "secret"))
                    .header("X-Set-Cookie", "autentigo")
                    .header("X-Set-Cookie-Insecure", "yes")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CREATED);
        let cookie = response
            .headers()
            .get(header::SET_COOKIE)
            .unwrap()
            .to_str()
            .unwrap()
            .to_string();
        assert!(cookie.starts_with("autentigo=ey"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert!(body.is_empty());
    }
}
