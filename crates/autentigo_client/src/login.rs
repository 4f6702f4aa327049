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
//! Basic authentication login.

use autentigo_api_types::auth::TokenResponse;
use reqwest::StatusCode;

use crate::error::ClientError;
use crate::Client;

impl Client {
    /// Log in with a user name and password and return the issued token.
    #[tracing::instrument(level = "debug", skip(self, password), err)]
    pub async fn login(&self, user: &str, password: &str) -> Result<TokenResponse, ClientError> {
        let response = self
            .http
            .get(self.endpoint("basic")?)
            .basic_auth(user, Some(password))
            .send()
            .await?;
        if response.status() != StatusCode::OK {
            return Err(ClientError::UnexpectedStatus(response.status()));
        }
        Ok(response.json().await?)
    }
}

#[cfg(test)]
mod tests {
    use httpmock::MockServer;
    use serde_json::json;
    use tracing_test::traced_test;
    use url::Url;

    use super::*;

    #[tokio::test]
    #[traced_test]
    async fn test_login() {
        let server = MockServer::start();
        let basic_mock = server.mock(|when, then| {
            when.method("GET")
                .path("/basic")
                // alice:secret
                .header("authorization", "Basic YWxpY2U6c2VjcmV0");
            then.status(200).json_body(json!({"token": "t0k3n"}));
        });
        let client = Client::new(Url::parse(&server.base_url()).unwrap()).unwrap();
        let response = client.login("alice", "secret").await.unwrap();
        assert_eq!("t0k3n", response.token);
        basic_mock.assert();
    }

    #[tokio::test]
    #[traced_test]
    async fn test_login_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method("GET").path("/basic");
            then.status(401).json_body(json!({"error": {"code": 401, "message": "unauthorized"}}));
        });
        let client = Client::new(Url::parse(&server.base_url()).unwrap()).unwrap();
        assert!(matches!(
            client.login("alice", "wrong").await,
            Err(ClientError::UnexpectedStatus(StatusCode::UNAUTHORIZED))
        ));
    }
}
