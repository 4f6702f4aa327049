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
//! Command line client for the Autentigo gateway.

use std::io::{self, BufRead};
use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Report, Result};
use eyre::WrapErr;
use tracing_subscriber::{
    Layer,
    filter::{LevelFilter, Targets},
    prelude::*,
};
use url::Url;

use autentigo_client::Client;

/// Log in to and validate tokens of an Autentigo gateway.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Base url of the gateway.
    #[arg(short, long, env = "AZCTL_SERVER", default_value = "http://localhost:8080/")]
    server: Url,

    /// Verbosity level. Repeat to increase level.
    #[arg(short, long, global=true, action = clap::ArgAction::Count, display_order = 920)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in with basic credentials and print the token.
    Login {
        /// User name.
        user: String,

        /// Password. Read from the standard input when not given.
        #[arg(long, env = "AZCTL_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Validate a token and print its claims.
    Validate {
        /// The token.
        token: String,

        /// Verification certificate to use instead of fetching it from the
        /// gateway.
        #[arg(long)]
        certificate: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Report> {
    color_eyre::install()?;
    let args = Args::parse();

    let filter = Targets::new().with_default(match args.verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        2 => LevelFilter::DEBUG,
        _ => LevelFilter::TRACE,
    });
    let log_layer = tracing_subscriber::fmt::layer()
        .with_writer(io::stderr)
        .with_filter(filter);
    tracing_subscriber::registry().with(log_layer).init();

    match args.command {
        Command::Login { user, password } => {
            let password = match password {
                Some(password) => password,
                None => {
                    eprint!("Password: ");
                    let mut line = String::new();
                    io::stdin().lock().read_line(&mut line)?;
                    line.trim_end_matches(['\r', '\n']).to_string()
                }
            };
            let client = Client::new(args.server)?;
            let response = client
                .login(&user, &password)
                .await
                .wrap_err("Login failed")?;
            println!("{}", response.token);
        }
        Command::Validate { token, certificate } => {
            let client = match certificate {
                Some(path) => {
                    let pem = tokio::fs::read(&path)
                        .await
                        .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
                    Client::with_certificate(args.server, &pem)?
                }
                None => Client::new(args.server)?,
            };
            let claims = client
                .validate(&token)
                .await
                .wrap_err("Token is not valid")?;
            println!("{}", serde_json::to_string_pretty(&claims)?);
        }
    }
    Ok(())
}
