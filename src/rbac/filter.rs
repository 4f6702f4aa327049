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
//! Request filter.
//!
//! `Authorized<R>` extracts the bearer token of the request, verifies it and
//! requires the role named by `R`. A request presenting the configured
//! bypass token passes without further checks.
use std::marker::PhantomData;

use axum::extract::FromRequestParts;
use axum::http::{HeaderMap, header, request::Parts};
use secrecy::ExposeSecret;
use tracing::{debug, warn};

use super::{BYPASS_USER, User};
use crate::api::error::AutentigoApiError;
use crate::service::ServiceState;
use crate::token::TokenApi;

/// Role a handler requires.
pub trait RequiredRole: Send + Sync {
    const ROLE: &'static str;
}

#[derive(Debug)]
pub struct Admin;

impl RequiredRole for Admin {
    const ROLE: &'static str = "admin";
}

#[derive(Debug)]
pub struct SelfService;

impl RequiredRole for SelfService {
    const ROLE: &'static str = "self-service";
}

/// Authenticated user holding the role `R`.
#[derive(Debug)]
pub struct Authorized<R: RequiredRole> {
    pub user: User,
    role: PhantomData<R>,
}

impl<R: RequiredRole> Authorized<R> {
    fn new(user: User) -> Self {
        Self {
            user,
            role: PhantomData,
        }
    }
}

/// Value of an `Authorization: Bearer <token>` header.
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ')?;
    let token = token.trim();
    (scheme.eq_ignore_ascii_case("bearer") && !token.is_empty()).then_some(token)
}

/// Byte comparison whose duration does not depend on the position of the
/// first difference.
fn constant_time_eq(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.iter()
        .zip(b.iter())
        .fold(0u8, |diff, (left, right)| diff | (left ^ right))
        == 0
}

impl<R: RequiredRole> FromRequestParts<ServiceState> for Authorized<R> {
    type Rejection = AutentigoApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServiceState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(&parts.headers).ok_or(AutentigoApiError::Unauthorized(None))?;

        if state
            .config
            .rbac
            .bypass_token
            .as_ref()
            .is_some_and(|bypass| {
                constant_time_eq(bypass.expose_secret().as_bytes(), token.as_bytes())
            })
        {
            warn!("request authorized with the bypass token");
            return Ok(Self::new(User::new(BYPASS_USER, Vec::new())));
        }

        let user: User = state
            .provider
            .get_token_provider()
            .verify(token)
            .map_err(|e| {
                debug!("rejecting bearer token: {}", e);
                AutentigoApiError::Unauthorized(None)
            })?
            .into();

        if !state.rbac.matches(R::ROLE, &user) {
            debug!("{} does not hold the {} role", user.name, R::ROLE);
            return Err(AutentigoApiError::Forbidden);
        }
        Ok(Self::new(user))
    }
}
