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
//! # Autentigo client
//!
//! Client side helpers for services that accept tokens issued by the
//! Autentigo gateway:
//!
//! - [`Verifier`] checks a token against the verification certificate of the
//!   gateway. The gateway uses it for its own verification as well.
//! - [`Client`] logs users in and validates tokens, lazily fetching the
//!   verification certificate from the gateway and caching it.
//!
//! A cached certificate is never refreshed automatically. After a key
//! rotation on the gateway call [`Client::refresh_verification_material`].

mod error;
mod login;
mod validation;
pub mod verifier;

pub use error::{ClientError, VerificationError};
pub use verifier::{AlgorithmFamily, Verifier};

use std::sync::Arc;

use reqwest::redirect::Policy;
use tokio::sync::RwLock;
use url::Url;

/// Gateway client.
#[derive(Debug)]
pub struct Client {
    /// Base url of the gateway.
    server_url: Url,
    /// Http client.
    http: reqwest::Client,
    /// Cached verification material.
    verifier: RwLock<Option<Arc<Verifier>>>,
}

impl Client {
    /// Client for the gateway reachable at `server_url`.
    pub fn new(server_url: Url) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()?;
        Ok(Self {
            server_url,
            http,
            verifier: RwLock::new(None),
        })
    }

    /// Client with the verification certificate already known.
    pub fn with_certificate(server_url: Url, certificate: &[u8]) -> Result<Self, ClientError> {
        let client = Self::new(server_url)?;
        let verifier = Verifier::from_certificate_pem(certificate)
            .map_err(ClientError::VerificationMaterial)?;
        Ok(Self {
            verifier: RwLock::new(Some(Arc::new(verifier))),
            ..client
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, ClientError> {
        Ok(self.server_url.join(path)?)
    }
}
