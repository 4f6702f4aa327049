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
//! # OAuth2 authorization code flow types.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use utoipa::{IntoParams, ToSchema};

/// Query parameters of the provider redirect back to the gateway.
#[derive(Clone, Debug, Default, Deserialize, IntoParams, PartialEq, Serialize)]
#[into_params(parameter_in = Query)]
pub struct CallbackParameters {
    /// State value embedded into the authorization URL.
    pub state: Option<String>,

    /// Authorization code to exchange.
    pub code: Option<String>,

    /// Error reported by the provider.
    pub error: Option<String>,
}

/// Identity of the user as reported by the OAuth2 provider.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct ProviderIdentity {
    /// Provider side user id.
    pub id: String,

    /// User display name.
    #[serde(default)]
    pub name: String,

    /// User email address.
    #[serde(default)]
    pub email: String,
}

impl ProviderIdentity {
    /// Extract the identity out of a provider user-info document.
    ///
    /// Providers disagree on the name of the id attribute: `id` is tried
    /// first and `sub` second. Numeric ids are accepted. Returns `None` when
    /// no usable id is present.
    pub fn from_document(document: &Value) -> Option<Self> {
        let id = ["id", "sub"]
            .iter()
            .filter_map(|field| match document.get(field) {
                Some(Value::String(val)) => Some(val.clone()),
                Some(Value::Number(val)) => Some(val.to_string()),
                _ => None,
            })
            .find(|val| !val.is_empty())?;
        let text = |field: &str| {
            document
                .get(field)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Some(Self {
            id,
            name: text("name"),
            email: text("email"),
        })
    }
}
