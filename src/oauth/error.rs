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
use thiserror::Error;

#[derive(Error, Debug)]
pub enum OAuthError {
    #[error("unknown oauth provider {0}")]
    UnknownProvider(String),

    /// The callback carries a state that was never issued.
    #[error("state mismatch")]
    StateMismatch,

    /// The provider reported an error on the callback.
    #[error("provider error: {0}")]
    Provider(String),

    #[error("missing authorization code")]
    MissingCode,

    /// Code exchange was refused.
    #[error("code exchange failed: {0}")]
    Exchange(String),

    /// The identity document has no usable id.
    #[error("no user id in the identity document")]
    MissingIdentity,

    #[error("{0} is not configured")]
    MissingEndpoint(&'static str),

    #[error("provider answered {0}")]
    ProviderStatus(reqwest::StatusCode),

    #[error("provider request failed: {}", source)]
    Transport {
        #[from]
        source: reqwest::Error,
    },
}
