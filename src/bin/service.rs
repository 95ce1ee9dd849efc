// Copyright 2025 Daniel Gehriger
//
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

//! Remote Signing Service
//!
//! Hosts the stateless signing service behind the two transports the remote
//! signer adapters speak: a function invocation endpoint and a plain HTTP
//! signing endpoint.

#![allow(clippy::missing_errors_doc)]

use clap::Parser;
use external_signer::{
    adapters::remote::{
        protocol::DEFAULT_FUNCTION_NAME,
        server::{initialize_service, routes, SigningServerConfig},
    },
    infra::config::DEFAULT_PASSPHRASE_ENV,
    KeyBundleConfig, Passphrase,
};
use std::net::SocketAddr;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "signing-service")]
#[command(about = "Stateless remote signing service for external signer adapters")]
#[command(version)]
struct Cli {
    /// Address to bind to (e.g., "0.0.0.0:7062")
    #[arg(short, long, default_value = "127.0.0.1:7062")]
    bind: String,

    /// PKCS#12 bundle holding the RSA private key
    #[arg(short, long, env = "EXTERNAL_SIGNER_KEY_BUNDLE")]
    key_bundle: PathBuf,

    /// Function name answered on the invocation endpoint
    #[arg(long, default_value = DEFAULT_FUNCTION_NAME)]
    function_name: String,

    /// TLS certificate file (PEM format)
    #[arg(long, requires = "tls_key")]
    tls_cert: Option<String>,

    /// TLS private key file (PEM format)
    #[arg(long, requires = "tls_cert")]
    tls_key: Option<String>,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let passphrase = match Passphrase::from_env(DEFAULT_PASSPHRASE_ENV) {
        Ok(p) => p,
        Err(e) => {
            eprintln!("❌ {e}");
            std::process::exit(1);
        }
    };

    let addr: SocketAddr = match cli.bind.parse() {
        Ok(a) => a,
        Err(e) => {
            eprintln!("❌ Invalid bind address: {e}");
            std::process::exit(1);
        }
    };

    let mut config =
        SigningServerConfig::new(&cli.bind, KeyBundleConfig::new(&cli.key_bundle, passphrase))
            .with_function_name(&cli.function_name);
    if let (Some(cert), Some(key)) = (&cli.tls_cert, &cli.tls_key) {
        config = config.with_tls(cert, key);
    }

    println!("🔐 Initializing signing service...");
    let state = match initialize_service(&config) {
        Ok(s) => s,
        Err(e) => {
            eprintln!("❌ Failed to initialize: {e}");
            std::process::exit(1);
        }
    };

    let routes = routes(state);

    println!("🚀 Signing service listening on {addr}");
    println!("   Endpoints:");
    println!("     POST /api/ExternalSign?digestAlgorithm=<Sha256|Sha384|Sha512>");
    println!(
        "     POST /2015-03-31/functions/{}/invocations",
        config.function_name
    );
    println!("     GET  /health");
    println!();
    println!("   Use Ctrl+C to stop the server");

    match (&config.tls_cert_path, &config.tls_key_path) {
        (Some(cert), Some(key)) => {
            warp::serve(routes)
                .tls()
                .cert_path(cert)
                .key_path(key)
                .run(addr)
                .await;
        }
        _ => {
            println!("⚠️  Running without TLS - use only behind a TLS-terminating proxy!");
            warp::serve(routes).run(addr).await;
        }
    }
}
