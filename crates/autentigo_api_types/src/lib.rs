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
//! # Autentigo API types
//!
//! This crate defines the types that the Autentigo gateway uses on the wire:
//! the claims carried inside issued tokens and the request/response bodies of
//! every protocol adapter. Both the gateway and its clients depend on it.

pub mod auth;
pub mod claims;
pub mod error;
pub mod k8s_auth;
pub mod keystone;
pub mod oauth;

pub use claims::{Claims, ExtraClaims};
