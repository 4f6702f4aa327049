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
//! # Error
//!
//! Errors that can occur while setting up or running the service (not the
//! API).
use thiserror::Error;

use crate::auth::AuthenticationError;
use crate::identity::error::IdentityProviderError;
use crate::oauth::OAuthError;
use crate::rbac::RbacError;
use crate::token::TokenProviderError;

/// Autentigo error.
#[derive(Debug, Error)]
pub enum AutentigoError {
    #[error(transparent)]
    Authentication {
        #[from]
        source: AuthenticationError,
    },

    #[error(transparent)]
    IdentityError {
        #[from]
        source: IdentityProviderError,
    },

    #[error(transparent)]
    IO {
        #[from]
        source: std::io::Error,
    },

    #[error(transparent)]
    OAuth {
        #[from]
        source: OAuthError,
    },

    #[error(transparent)]
    Rbac {
        #[from]
        source: RbacError,
    },

    #[error(transparent)]
    TokenProvider {
        #[from]
        source: TokenProviderError,
    },

    /// Json serialization error.
    #[error("json serde error: {}", source)]
    JsonError {
        /// The source of the error.
        #[from]
        source: serde_json::Error,
    },

    /// Url parsing error
    #[error(transparent)]
    UrlParse {
        #[from]
        source: url::ParseError,
    },
}
