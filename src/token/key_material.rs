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
//! # Key material
//!
//! The signing key, the verification certificate and the signing method are
//! loaded once at startup. Any disagreement between them is fatal.
use std::fmt;
use std::str::FromStr;

use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
use p256::pkcs8::{DecodePrivateKey, EncodePrivateKey};
use serde_json::json;
use tracing::debug;

use autentigo_client::{AlgorithmFamily, Verifier};

use crate::token::error::TokenProviderError;

/// Signing method of the issued tokens.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SigningMethod {
    RS256,
    RS384,
    RS512,
    ES256,
    ES384,
}

impl SigningMethod {
    pub fn algorithm(&self) -> Algorithm {
        match self {
            Self::RS256 => Algorithm::RS256,
            Self::RS384 => Algorithm::RS384,
            Self::RS512 => Algorithm::RS512,
            Self::ES256 => Algorithm::ES256,
            Self::ES384 => Algorithm::ES384,
        }
    }

    pub fn family(&self) -> AlgorithmFamily {
        match self {
            Self::RS256 | Self::RS384 | Self::RS512 => AlgorithmFamily::Rsa,
            Self::ES256 | Self::ES384 => AlgorithmFamily::Ec,
        }
    }
}

impl FromStr for SigningMethod {
    type Err = TokenProviderError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RS256" => Ok(Self::RS256),
            "RS384" => Ok(Self::RS384),
            "RS512" => Ok(Self::RS512),
            "ES256" => Ok(Self::ES256),
            "ES384" => Ok(Self::ES384),
            other => Err(TokenProviderError::UnsupportedSigningMethod(other.into())),
        }
    }
}

/// Signing and verification halves of the token key pair.
#[derive(Clone)]
pub struct KeyMaterial {
    method: SigningMethod,
    signing_key: EncodingKey,
    verifier: Verifier,
    certificate: String,
}

impl fmt::Debug for KeyMaterial {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyMaterial")
            .field("method", &self.method)
            .finish_non_exhaustive()
    }
}

impl KeyMaterial {
    /// Load the key material and make sure that the certificate verifies what
    /// the private key signs.
    pub fn load(
        method: SigningMethod,
        private_key_pem: &[u8],
        certificate_pem: &[u8],
    ) -> Result<Self, TokenProviderError> {
        let verifier = Verifier::from_certificate_pem(certificate_pem)?;
        if verifier.family() != method.family() {
            return Err(TokenProviderError::KeyMismatch(format!(
                "{method:?} can not be verified with a {:?} certificate",
                verifier.family()
            )));
        }
        let signing_key = signing_key(method, private_key_pem)?;
        let certificate = String::from_utf8(certificate_pem.to_vec())
            .map_err(|e| TokenProviderError::KeyMismatch(e.to_string()))?;

        let keys = Self {
            method,
            signing_key,
            verifier,
            certificate,
        };
        keys.check_pair()?;
        debug!("loaded {:?} key material", method);
        Ok(keys)
    }

    /// Sign a short lived token and verify it back.
    fn check_pair(&self) -> Result<(), TokenProviderError> {
        let now = chrono::Utc::now().timestamp();
        let token = self.sign(&json!({"sub": "key-check", "iat": now, "exp": now + 60}))?;
        self.verifier.verify(&token).map_err(|_| {
            TokenProviderError::KeyMismatch("private key does not match the certificate".into())
        })?;
        Ok(())
    }

    pub fn method(&self) -> SigningMethod {
        self.method
    }

    pub fn verifier(&self) -> &Verifier {
        &self.verifier
    }

    /// PEM form of the verification certificate.
    pub fn certificate(&self) -> &str {
        &self.certificate
    }

    pub fn sign<T: serde::Serialize>(&self, claims: &T) -> Result<String, TokenProviderError> {
        Ok(encode(
            &Header::new(self.method.algorithm()),
            claims,
            &self.signing_key,
        )?)
    }
}

/// Parse the private key for the signing method.
///
/// RSA keys are accepted in PKCS#1 and PKCS#8 form. EC keys are accepted in
/// SEC1 and PKCS#8 form and must be on the curve of the signing method.
fn signing_key(method: SigningMethod, pem: &[u8]) -> Result<EncodingKey, TokenProviderError> {
    let invalid = |e: &dyn fmt::Display| TokenProviderError::InvalidPrivateKey(e.to_string());
    match method {
        SigningMethod::RS256 | SigningMethod::RS384 | SigningMethod::RS512 => {
            EncodingKey::from_rsa_pem(pem).map_err(|e| invalid(&e))
        }
        SigningMethod::ES256 => {
            let pem = std::str::from_utf8(pem).map_err(|e| invalid(&e))?;
            let key = p256::SecretKey::from_sec1_pem(pem)
                .or_else(|_| p256::SecretKey::from_pkcs8_pem(pem))
                .map_err(|e| invalid(&e))?;
            let der = key.to_pkcs8_der().map_err(|e| invalid(&e))?;
            Ok(EncodingKey::from_ec_der(der.as_bytes()))
        }
        SigningMethod::ES384 => {
            let pem = std::str::from_utf8(pem).map_err(|e| invalid(&e))?;
            let key = p384::SecretKey::from_sec1_pem(pem)
                .or_else(|_| p384::SecretKey::from_pkcs8_pem(pem))
                .map_err(|e| invalid(&e))?;
            let der = key.to_pkcs8_der().map_err(|e| invalid(&e))?;
            Ok(EncodingKey::from_ec_der(der.as_bytes()))
        }
    }
}
