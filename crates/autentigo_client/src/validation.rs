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
//! Token validation against the gateway verification certificate.

use std::sync::Arc;

use autentigo_api_types::Claims;
use reqwest::StatusCode;
use tracing::debug;

use crate::error::ClientError;
use crate::verifier::Verifier;
use crate::Client;

impl Client {
    /// Fetch the verification certificate from the gateway and replace the
    /// cached verification material.
    #[tracing::instrument(level = "debug", skip(self), err)]
    pub async fn refresh_verification_material(&self) -> Result<Arc<Verifier>, ClientError> {
        let response = self
            .http
            .get(self.endpoint("validation-certificate")?)
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus(response.status()));
        }
        let pem = response.bytes().await?;
        let verifier = Arc::new(
            Verifier::from_certificate_pem(&pem).map_err(ClientError::VerificationMaterial)?,
        );
        debug!("refreshed verification material: {:?}", verifier.family());
        *self.verifier.write().await = Some(verifier.clone());
        Ok(verifier)
    }

    /// Validate the token and return its claims.
    ///
    /// The verification certificate is fetched on first use.
    pub async fn validate(&self, token: &str) -> Result<Claims, ClientError> {
        let cached = self.verifier.read().await.clone();
        let verifier = match cached {
            Some(verifier) => verifier,
            None => self.refresh_verification_material().await?,
        };
        Ok(verifier.verify(token)?)
    }

    /// Whether the token is valid.
    ///
    /// Only failures to obtain or parse the verification material are
    /// reported as errors.
    pub async fn is_valid(&self, token: &str) -> Result<bool, ClientError> {
        match self.validate(token).await {
            Ok(_) => Ok(true),
            Err(ClientError::Verification(_)) => Ok(false),
            Err(other) => Err(other),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::{TimeDelta, Utc};
    use httpmock::MockServer;
    use jsonwebtoken::{Algorithm, EncodingKey, Header, encode};
    use serde_json::json;
    use tracing_test::traced_test;
    use url::Url;

    use super::*;
    use crate::error::VerificationError;

    const RSA_KEY: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../tests/fixtures/rsa.key"
    ));
    const RSA_CRT: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../tests/fixtures/rsa.crt"
    ));
    const RSA_OTHER_CRT: &str = include_str!(concat!(
        env!("CARGO_MANIFEST_DIR"),
        "/../../tests/fixtures/rsa-other.crt"
    ));

    fn token(ttl: TimeDelta) -> String {
        let now = Utc::now();
        encode(
            &Header::new(Algorithm::RS256),
            &json!({"sub": "alice", "iat": now.timestamp(), "exp": (now + ttl).timestamp()}),
            &EncodingKey::from_rsa_pem(RSA_KEY.as_bytes()).unwrap(),
        )
        .unwrap()
    }

    #[tokio::test]
    #[traced_test]
    async fn test_validate_fetches_certificate_once() {
        let server = MockServer::start();
        let cert_mock = server.mock(|when, then| {
            when.method("GET").path("/validation-certificate");
            then.status(200).body(RSA_CRT);
        });
        let client = Client::new(Url::parse(&server.base_url()).unwrap()).unwrap();

        let claims = client.validate(&token(TimeDelta::minutes(5))).await.unwrap();
        assert_eq!("alice", claims.sub);
        assert!(client.is_valid(&token(TimeDelta::minutes(5))).await.unwrap());
        assert!(!client.is_valid(&token(TimeDelta::minutes(-5))).await.unwrap());
        cert_mock.assert_hits(1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_refresh_replaces_material() {
        let server = MockServer::start();
        let cert_mock = server.mock(|when, then| {
            when.method("GET").path("/validation-certificate");
            then.status(200).body(RSA_CRT);
        });
        let client = Client::with_certificate(
            Url::parse(&server.base_url()).unwrap(),
            RSA_OTHER_CRT.as_bytes(),
        )
        .unwrap();
        let token = token(TimeDelta::minutes(5));

        assert!(matches!(
            client.validate(&token).await,
            Err(ClientError::Verification(VerificationError::InvalidSignature))
        ));
        cert_mock.assert_hits(0);

        client.refresh_verification_material().await.unwrap();
        assert!(client.validate(&token).await.is_ok());
        cert_mock.assert_hits(1);
    }

    #[tokio::test]
    #[traced_test]
    async fn test_certificate_unavailable() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/validation-certificate");
            then.status(503);
        });
        let client = Client::new(Url::parse(&server.base_url()).unwrap()).unwrap();
        assert!(matches!(
            client.is_valid(&token(TimeDelta::minutes(5))).await,
            Err(ClientError::UnexpectedStatus(StatusCode::SERVICE_UNAVAILABLE))
        ));
    }

    #[tokio::test]
    #[traced_test]
    async fn test_unparseable_certificate() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/validation-certificate");
            then.status(200).body("not a certificate");
        });
        let client = Client::new(Url::parse(&server.base_url()).unwrap()).unwrap();
        assert!(matches!(
            client.is_valid(&token(TimeDelta::minutes(5))).await,
            Err(ClientError::VerificationMaterial(
                VerificationError::Certificate(_)
            ))
        ));
    }
}
