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
//! Autentigo API
use utoipa::{
    Modify, OpenApi,
    openapi::security::{ApiKey, ApiKeyValue, HttpAuthScheme, HttpBuilder, SecurityScheme},
};
use utoipa_axum::router::OpenApiRouter;

use crate::service::ServiceState;

mod basic;
mod certificate;
pub(crate) mod common;
pub mod error;
mod k8s;
mod keystone;
mod me;
mod oauth;
mod simple;

#[derive(OpenApi)]
#[openapi(
    info(title = "Autentigo"),
    modifiers(&SecurityAddon),
    tags(
        (name="auth", description="Token issuance"),
        (name="keystone", description="OpenStack Keystone compatible token API"),
        (name="k8s", description="Kubernetes authentication webhook"),
        (name="oauth", description="OAuth2 authorization code flow"),
        (name="rbac", description="Role based access control"),
    )
)]
pub struct ApiDoc;

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        let components = openapi.components.get_or_insert_with(Default::default);
        components.add_security_scheme(
            "x-auth",
            SecurityScheme::ApiKey(ApiKey::Header(ApiKeyValue::new("x-auth-token"))),
        );
        components.add_security_scheme(
            "jwt",
            SecurityScheme::Http(
                HttpBuilder::new()
                    .scheme(HttpAuthScheme::Bearer)
                    .bearer_format("JWT")
                    .description(Some("Token issued by Autentigo"))
                    .build(),
            ),
        );
        components.add_security_scheme(
            "basic",
            SecurityScheme::Http(HttpBuilder::new().scheme(HttpAuthScheme::Basic).build()),
        );
    }
}

pub fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new()
        .merge(basic::openapi_router())
        .merge(simple::openapi_router())
        .merge(k8s::openapi_router())
        .merge(certificate::openapi_router())
        .merge(me::openapi_router())
        .nest("/v3/auth/tokens", keystone::openapi_router())
        .nest("/oauth", oauth::openapi_router())
}
