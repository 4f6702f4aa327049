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
//! Password digests.
//!
//! Stored credentials are the lowercase hex SHA-256 digest of the UTF-8
//! password. There is no salt and no cost factor.
use sha2::{Digest, Sha256};

/// Digest of the password in its stored form.
pub fn hash_password<S: AsRef<[u8]>>(password: S) -> String {
    hex::encode(Sha256::digest(password.as_ref()))
}

/// Verify the password matches the stored digest.
pub fn verify_password<P: AsRef<[u8]>, H: AsRef<str>>(password: P, hash: H) -> bool {
    hash_password(password) == hash.as_ref()
}
