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
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum RbacError {
    /// Role table can not be read.
    #[error("role table read error {}: {}", path.display(), source)]
    Read {
        source: std::io::Error,
        path: PathBuf,
    },

    /// Role table can not be parsed.
    #[error("invalid role table: {}", source)]
    Definition {
        #[from]
        source: serde_yaml::Error,
    },
}
