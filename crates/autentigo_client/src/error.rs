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
//! Client errors.

use thiserror::Error;

/// Token verification error.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum VerificationError {
    /// The token is past its expiration time.
    #[error("token is expired")]
    ExpiredToken,

    /// The signature does not match the verification material.
    #[error("token signature is invalid")]
    InvalidSignature,

    /// The token can not be decoded.
    #[error("malformed token: {0}")]
    MalformedToken(String),

    /// The token header names a signing algorithm the gateway never uses.
    #[error("unknown signing method: {0}")]
    UnknownAlgorithm(String),

    /// The verification certificate is unusable.
    #[error("invalid verification certificate: {0}")]
    Certificate(String),
}

/// Gateway client error.
#[derive(Debug, Error)]
pub enum ClientError {
    /// Http transport error.
    #[error(transparent)]
    Http(#[from] reqwest::Error),

    /// Gateway url can not be built.
    #[error(transparent)]
    Url(#[from] url::ParseError),

    /// The gateway answered with an unexpected status.
    #[error("unexpected HTTP status {0}")]
    UnexpectedStatus(reqwest::StatusCode),

    /// The certificate served by the gateway is unusable.
    #[error("verification material error: {0}")]
    VerificationMaterial(VerificationError),

    /// Token verification error.
    #[error(transparent)]
    Verification(#[from] VerificationError),
}
