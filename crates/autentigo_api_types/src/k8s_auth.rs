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
//! # Kubernetes authentication webhook types.
//!
//! A subset of the `authentication.k8s.io/v1` `TokenReview` object that is
//! exchanged with the kube-apiserver when the gateway is configured as its
//! webhook token authenticator.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::claims::Claims;

/// API version of the `TokenReview` objects.
pub const API_VERSION: &str = "authentication.k8s.io/v1";

/// Kind of the `TokenReview` objects.
pub const KIND: &str = "TokenReview";

/// Token review object.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TokenReview {
    /// API version.
    #[serde(default)]
    pub api_version: String,

    /// Object kind.
    #[serde(default)]
    pub kind: String,

    /// Review request.
    #[serde(default)]
    pub spec: TokenReviewSpec,

    /// Review verdict.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<TokenReviewStatus>,
}

/// Token review request.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct TokenReviewSpec {
    /// Opaque bearer token.
    #[serde(default)]
    pub token: String,

    /// Audiences the token should be valid for.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub audiences: Vec<String>,
}

/// Token review verdict.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct TokenReviewStatus {
    /// Whether the token was accepted.
    pub authenticated: bool,

    /// Identity the token belongs to.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user: Option<UserInfo>,

    /// Reason of the rejection.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Identity of an authenticated token.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize, ToSchema)]
pub struct UserInfo {
    /// User name.
    pub username: String,

    /// Groups of the user.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub groups: Vec<String>,

    /// Additional attributes. A missing key means that the attribute is not
    /// known.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, Vec<String>>,
}

impl TokenReview {
    /// Review verdict accepting the token for the `user`.
    pub fn authenticated(user: UserInfo) -> Self {
        Self::verdict(TokenReviewStatus {
            authenticated: true,
            user: Some(user),
            error: None,
        })
    }

    /// Review verdict rejecting the token.
    pub fn rejected<S: Into<String>>(error: S) -> Self {
        Self::verdict(TokenReviewStatus {
            authenticated: false,
            user: None,
            error: Some(error.into()),
        })
    }

    fn verdict(status: TokenReviewStatus) -> Self {
        Self {
            api_version: API_VERSION.into(),
            kind: KIND.into(),
            spec: TokenReviewSpec::default(),
            status: Some(status),
        }
    }
}

impl From<Claims> for UserInfo {
    /// `email` and `email_verified` are only present in `extra` when the
    /// claims carry them.
    fn from(claims: Claims) -> Self {
        let mut extra = BTreeMap::new();
        if !claims.extra.email.is_empty() {
            extra.insert("email".to_string(), vec![claims.extra.email]);
        }
        if claims.extra.email_verified {
            extra.insert("email_verified".to_string(), vec!["true".to_string()]);
        }
        Self {
            username: claims.sub,
            groups: claims.extra.groups,
            extra,
        }
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn test_request_parse() {
        let review: TokenReview = serde_json::from_value(json!({
            "apiVersion": "authentication.k8s.io/v1",
            "kind": "TokenReview",
            "spec": {"token": "abc"}
        }))
        .unwrap();
        assert_eq!("abc", review.spec.token);
        assert!(review.status.is_none());
    }

    #[test]
    fn test_user_info_from_claims() {
        let claims: Claims = serde_json::from_value(json!({
            "sub": "alice", "iat": 1, "exp": 2, "email": "alice@example.org"
        }))
        .unwrap();
        let user = UserInfo::from(claims);
        assert_eq!("alice", user.username);
        assert_eq!(
            Some(&vec!["alice@example.org".to_string()]),
            user.extra.get("email")
        );
        assert!(!user.extra.contains_key("email_verified"));
    }

    #[test]
    fn test_rejected_serialization() {
        assert_eq!(
            json!({
                "apiVersion": "authentication.k8s.io/v1",
                "kind": "TokenReview",
                "spec": {"token": ""},
                "status": {"authenticated": false, "error": "token expired"}
            }),
            serde_json::to_value(TokenReview::rejected("token expired")).unwrap()
        );
    }
}
