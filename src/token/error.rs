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
//! Token provider errors.

use std::path::PathBuf;

use autentigo_api_types::error::ClaimsError;
use autentigo_client::VerificationError;
use thiserror::Error;

/// Token provider error.
#[derive(Error, Debug)]
pub enum TokenProviderError {
    /// Claims can not be built.
    #[error(transparent)]
    Claims(#[from] ClaimsError),

    /// Expiry calculation overflow.
    #[error("token expiry calculation failed")]
    ExpiryCalculation,

    /// Signing failure.
    #[error("token signing failed: {}", source)]
    Signing {
        /// The source of the error.
        #[from]
        source: jsonwebtoken::errors::Error,
    },

    /// Key material does not fit together.
    #[error("key material mismatch: {0}")]
    KeyMismatch(String),

    /// Key file read error.
    #[error("key read error {}: {}", path.display(), source)]
    KeyRead {
        /// The source of the error.
        source: std::io::Error,
        /// Key file name.
        path: PathBuf,
    },

    /// Private key can not be parsed.
    #[error("invalid private key: {0}")]
    InvalidPrivateKey(String),

    /// Required key material is not configured.
    #[error("{0} is not configured")]
    MissingKeyMaterial(&'static str),

    /// Signing method is not supported.
    #[error("unsupported signing method {0}")]
    UnsupportedSigningMethod(String),

    /// OAuth2 link state was issued for another flow.
    #[error("link state does not belong to this flow")]
    InvalidLinkState,

    /// Token verification error.
    #[error(transparent)]
    Verification(#[from] VerificationError),
}
