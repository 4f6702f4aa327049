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
//! Verification certificate distribution.
use axum::{
    extract::State,
    http::{HeaderValue, header},
    response::IntoResponse,
};
use utoipa_axum::{router::OpenApiRouter, routes};

use crate::service::ServiceState;
use crate::token::TokenApi;

pub(crate) const CERTIFICATE_CONTENT_TYPE: &str = "application/x-x509-user-cert";

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(certificate))
}

/// PEM certificate verifying the issued tokens.
#[utoipa::path(
    get,
    path = "/validation-certificate",
    responses(
        (status = OK, description = "PEM encoded certificate", content_type = "application/x-x509-user-cert", body = String),
    ),
    tag = "auth"
)]
#[tracing::instrument(name = "api::certificate", level = "debug", skip(state))]
pub(super) async fn certificate(State(state): State<ServiceState>) -> impl IntoResponse {
    (
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static(CERTIFICATE_CONTENT_TYPE),
        )],
        state
            .provider
            .get_token_provider()
            .verification_certificate(),
    )
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

    use super::*;
    use crate::identity::MockIdentityProvider;
    use crate::tests::api::get_mocked_state;
    use crate::token::key_material::tests::RSA_CRT;

    #[tokio::test]
    async fn test_certificate() {
        let state = get_mocked_state(MockIdentityProvider::default());
        let mut api = openapi_router()
            .layer(TraceLayer::new_for_http())
            .with_state(state);

        let response = api
            .as_service()
            .oneshot(
                Request::builder()
                    .uri("/validation-certificate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            CERTIFICATE_CONTENT_TYPE,
            response.headers()[header::CONTENT_TYPE]
        );
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(RSA_CRT.as_bytes(), &body[..]);
    }
}
