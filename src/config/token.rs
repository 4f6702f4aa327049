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
//! # Token configuration
use serde::Deserialize;

/// Token signing configuration.
#[derive(Debug, Deserialize, Clone)]
pub struct TokenSection {
    /// Name of the JWS algorithm used to sign tokens (`RS256`, `RS384`,
    /// `RS512`, `ES256` or `ES384`).
    #[serde(default = "default_signing_method")]
    pub signing_method: String,

    /// Private key used to sign tokens. Either the PEM document itself or the
    /// path of a file holding it.
    #[serde(default)]
    pub private_key: String,

    /// Certificate holding the public half of the signing key. Either the PEM
    /// document itself or the path of a file holding it.
    #[serde(default)]
    pub certificate: String,

    /// The amount of time that a token should remain valid (in seconds).
    #[serde(default = "default_token_duration")]
    pub duration: u64,
}

fn default_signing_method() -> String {
    "RS256".into()
}

fn default_token_duration() -> u64 {
    3600
}

impl Default for TokenSection {
    fn default() -> Self {
        Self {
            signing_method: default_signing_method(),
            private_key: String::new(),
            certificate: String::new(),
            duration: default_token_duration(),
        }
    }
}
