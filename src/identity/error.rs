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
use thiserror::Error;

use autentigo_api_types::error::ClaimsError;

#[derive(Error, Debug)]
pub enum IdentityProviderError {
    /// Unsupported driver
    #[error("unsupported driver {0}")]
    UnsupportedDriver(String),

    /// The backend is misconfigured.
    #[error("invalid {backend} backend configuration: {message}")]
    Configuration {
        backend: &'static str,
        message: String,
    },

    /// Credentials do not match.
    #[error("invalid authentication")]
    InvalidAuthentication,

    /// Operation is not offered by the backend.
    #[error("{operation} is inconsistent with {backend} backend")]
    Unsupported {
        backend: &'static str,
        operation: &'static str,
    },

    #[error("user {0} not found")]
    UserNotFound(String),

    #[error("user {0} already exists")]
    UserAlreadyExists(String),

    /// Stored user record can not be understood.
    #[error("corrupted entry for user {0}")]
    MalformedUser(String),

    #[error(transparent)]
    Claims {
        #[from]
        source: ClaimsError,
    },

    #[error("database error while {context}")]
    Database {
        source: sea_orm::DbErr,
        context: String,
    },

    #[error("directory error: {}", source)]
    Directory {
        #[from]
        source: ldap3::LdapError,
    },

    #[error("key-value store error: {}", source)]
    KvTransport {
        #[from]
        source: reqwest::Error,
    },

    #[error("key-value store answered {0}")]
    KvStatus(reqwest::StatusCode),

    #[error("b64 decoding error")]
    Base64Decode(#[from] base64::DecodeError),

    /// Identity provider error
    #[error("data serialization error")]
    Serde {
        #[from]
        source: serde_json::Error,
    },

    #[error("{operation} timed out")]
    Timeout { operation: &'static str },

    #[error("user file error: {}", source)]
    Io {
        #[from]
        source: std::io::Error,
    },

    /// tempfile persisting error
    #[error(transparent)]
    Persist(#[from] tempfile::PersistError),
}

impl IdentityProviderError {
    pub fn database(source: sea_orm::DbErr, context: &str) -> Self {
        Self::Database {
            source,
            context: context.to_string(),
        }
    }

    pub fn unsupported(backend: &'static str, operation: &'static str) -> Self {
        Self::Unsupported { backend, operation }
    }
}
