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
//! Identity of the caller.
use axum::extract::State;
use utoipa_axum::{router::OpenApiRouter, routes};

use autentigo_api_types::auth::MeResponse;

use crate::rbac::{Authorized, SelfService};
use crate::service::ServiceState;

pub(crate) fn openapi_router() -> OpenApiRouter<ServiceState> {
    OpenApiRouter::new().routes(routes!(me))
}

/// Subject, groups and roles of the presented token.
#[utoipa::path(
    get,
    path = "/me",
    responses(
        (status = OK, description = "Caller identity", body = MeResponse),
        (status = UNAUTHORIZED, description = "Token is missing or invalid"),
        (status = FORBIDDEN, description = "The self-service role is missing"),
    ),
    security(("jwt" = [])),
    tag = "rbac"
)]
#[tracing::instrument(name = "api::me", level = "debug", skip(state, authorized))]
pub(super) async fn me(
    authorized: Authorized<SelfService>,
    State(state): State<ServiceState>,
) -> MeResponse {
    let roles = state.rbac.roles_of(&authorized.user);
    MeResponse {
        sub: authorized.user.name,
        groups: authorized.user.groups,
        roles,
    }
}
