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
//! # Token verification
//!
//! A [`Verifier`] holds the public key of the verification certificate and
//! checks the compact JWS form of a token:
//!
//! 1. The signing algorithm is taken from the token header. Only the `RS*`
//!    and `ES*` families are recognized.
//! 2. The algorithm family must match the key type of the certificate.
//! 3. The signature is verified.
//! 4. The token must not be expired. There is no leeway.

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, Validation, decode, decode_header};
use serde::de::DeserializeOwned;
use x509_parser::prelude::*;
use x509_parser::public_key::PublicKey;

use autentigo_api_types::Claims;

use crate::error::VerificationError;

/// Signing algorithm family.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum AlgorithmFamily {
    /// RSASSA-PKCS1-v1_5 (`RS256`, `RS384`, `RS512`).
    Rsa,
    /// ECDSA (`ES256`, `ES384`).
    Ec,
}

impl AlgorithmFamily {
    /// Family of the `alg` header value.
    pub fn of(alg: &str) -> Option<Self> {
        if alg.starts_with("RS") {
            Some(Self::Rsa)
        } else if alg.starts_with("ES") {
            Some(Self::Ec)
        } else {
            None
        }
    }
}

/// Token verifier.
#[derive(Clone)]
pub struct Verifier {
    family: AlgorithmFamily,
    key: DecodingKey,
}

impl std::fmt::Debug for Verifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Verifier")
            .field("family", &self.family)
            .finish_non_exhaustive()
    }
}

impl Verifier {
    /// Verifier for the public key of a PEM encoded X.509 certificate.
    pub fn from_certificate_pem(pem: &[u8]) -> Result<Self, VerificationError> {
        let (_, pem) =
            parse_x509_pem(pem).map_err(|e| VerificationError::Certificate(e.to_string()))?;
        let certificate = pem
            .parse_x509()
            .map_err(|e| VerificationError::Certificate(e.to_string()))?;
        let spki = certificate.public_key();
        let raw = spki.subject_public_key.data.as_ref();
        match spki
            .parsed()
            .map_err(|e| VerificationError::Certificate(e.to_string()))?
        {
            PublicKey::RSA(_) => Ok(Self {
                family: AlgorithmFamily::Rsa,
                key: DecodingKey::from_rsa_der(raw),
            }),
            PublicKey::EC(_) => Ok(Self {
                family: AlgorithmFamily::Ec,
                key: DecodingKey::from_ec_der(raw),
            }),
            _ => Err(VerificationError::Certificate(
                "unsupported public key type".into(),
            )),
        }
    }

    /// Key family of the verification certificate.
    pub fn family(&self) -> AlgorithmFamily {
        self.family
    }

    /// Verify the token at the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, VerificationError> {
        self.verify_at(token, Utc::now())
    }

    /// Verify the token as of `now`.
    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, VerificationError> {
        let claims: Claims = self.decode(token)?;
        if claims.exp <= now.timestamp() {
            return Err(VerificationError::ExpiredToken);
        }
        Ok(claims)
    }

    /// Check the header and the signature and decode the payload.
    ///
    /// No registered claim is validated, the caller owns the payload
    /// semantics including expiry.
    pub fn decode<T: DeserializeOwned>(&self, token: &str) -> Result<T, VerificationError> {
        let header = decode_header(token).map_err(|e| match e.kind() {
            ErrorKind::InvalidAlgorithmName => VerificationError::UnknownAlgorithm(e.to_string()),
            ErrorKind::Json(source) if source.is_data() => {
                VerificationError::UnknownAlgorithm(source.to_string())
            }
            _ => VerificationError::MalformedToken(e.to_string()),
        })?;
        let alg_name = format!("{:?}", header.alg);
        let family = AlgorithmFamily::of(&alg_name)
            .ok_or_else(|| VerificationError::UnknownAlgorithm(alg_name))?;
        if family != self.family {
            return Err(VerificationError::InvalidSignature);
        }

        let mut validation = Validation::new(header.alg);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.required_spec_claims.clear();

        Ok(decode::<T>(token, &self.key, &validation)
            .map_err(|e| match e.kind() {
                ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => {
                    VerificationError::InvalidSignature
                }
                _ => VerificationError::MalformedToken(e.to_string()),
            })?
            .claims)
    }
}
