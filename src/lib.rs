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
//! # Autentigo
//!
//! Autentigo is a credential issuance and token validation gateway. A
//! principal authenticates against one of the pluggable identity backends
//! (LDAP, SQL, etcd, a flat file) and receives a signed, time bounded JWT.
//! The token is re-validated on demand through several protocol compatible
//! surfaces:
//!
//! - plain bearer validation with the [`autentigo_client`] crate and the
//!   published verification certificate,
//! - an OpenStack Keystone compatible token API,
//! - a Kubernetes authentication webhook (`TokenReview`),
//! - a federated OAuth2 authorization code flow.
//!
//! Administrative endpoints are gated by a role table evaluated against the
//! claims of the presented token (see [`rbac`]).

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod identity;
pub mod oauth;
pub mod provider;
pub mod rbac;
pub mod service;
pub mod token;

#[cfg(test)]
mod tests;
