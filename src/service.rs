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
//! # Service state
//!
//! Everything a request handler needs, built once at startup.
use axum::extract::FromRef;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tracing::info;

use crate::config::Config;
use crate::error::AutentigoError;
use crate::provider::Provider;
use crate::rbac::RoleTable;

// Placing ServiceState behind Arc is necessary to address DatabaseConnection
// not implementing Clone.
#[derive(FromRef)]
pub struct Service {
    /// Config file
    pub config: Config,
    /// Service/resource Provider
    pub provider: Provider,
    /// Database connection
    #[from_ref(skip)]
    pub db: DatabaseConnection,
    /// Role table used by the request filter.
    #[from_ref(skip)]
    pub rbac: RoleTable,
}

pub type ServiceState = Arc<Service>;

impl Service {
    pub fn new(
        cfg: Config,
        db: DatabaseConnection,
        provider: Provider,
    ) -> Result<Self, AutentigoError> {
        let rbac = RoleTable::from_config(&cfg.rbac)?;
        Ok(Self {
            config: cfg,
            provider,
            db,
            rbac,
        })
    }

    pub async fn terminate(&self) -> Result<(), AutentigoError> {
        info!("Terminating Autentigo");
        Ok(())
    }
}
