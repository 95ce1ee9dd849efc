//! External Signer CLI
//!
//! Signs a prepared document byte range through the configured signer
//! adapter, prints the verification chain, verifies detached signatures, and
//! manages the configuration file.

use clap::{Parser, Subcommand, ValueEnum};
use external_signer::{
    build_signer_of_kind,
    infra::config::ExportFormat,
    services::verification::verify_with_chain,
    sign_request, AdapterKind, CertificateChain, ConfigManager, HashAlgorithm, SignerConfiguration,
    SigningOptions, SigningRequest,
};
use miette::{Context, IntoDiagnostic, Result};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "external-signer")]
#[command(about = "PKCS#1 v1.5 signing through local, cloud-function or HTTP signers")]
#[command(long_about = "
External Signer - produce RSA signatures for document byte ranges

EXAMPLES:
    # Sign with the adapter from the configuration file
    external-signer sign range.bin -o range.sig

    # Sign through the HTTP endpoint with SHA-512
    external-signer sign range.bin --adapter http --hash sha512

    # Show the certificate chain that verifies the signatures
    external-signer chain

    # Verify a detached signature against the public certificate
    external-signer verify range.bin range.sig --hash sha512

ENVIRONMENT VARIABLES:
    EXTERNAL_SIGNER_PASSPHRASE   Key bundle passphrase (local adapter)
    RUST_LOG                     Logging level (debug, info, warn, error)
")]
#[command(version)]
struct Cli {
    /// Configuration file (defaults to the per-user config directory)
    #[arg(short, long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Sign the bytes of a file
    Sign {
        /// File holding the byte range to sign
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,

        /// Signature output path (defaults to INPUT_FILE.sig)
        #[arg(short, long, value_name = "OUTPUT_FILE")]
        output: Option<PathBuf>,

        /// Signer adapter (overrides config)
        #[arg(short, long, value_enum)]
        adapter: Option<AdapterArg>,

        /// Hash algorithm (overrides config)
        #[arg(long, value_enum)]
        hash: Option<HashAlgorithmArg>,

        /// Verify the signature against the chain leaf before writing it
        #[arg(long)]
        verify: bool,
    },

    /// Print the certificate chain of the configured signer
    Chain {
        /// Signer adapter (overrides config)
        #[arg(short, long, value_enum)]
        adapter: Option<AdapterArg>,
    },

    /// Verify a detached signature against the public certificate
    Verify {
        /// Signed data
        #[arg(value_name = "INPUT_FILE")]
        input_file: PathBuf,

        /// Detached PKCS#1 v1.5 signature
        #[arg(value_name = "SIGNATURE_FILE")]
        signature: PathBuf,

        /// Hash algorithm the signature was made with (defaults to config)
        #[arg(long, value_enum)]
        hash: Option<HashAlgorithmArg>,

        /// Certificate to verify with (defaults to config public_certificate)
        #[arg(long, value_name = "CERT_FILE")]
        certificate: Option<PathBuf>,
    },

    /// Configuration management
    #[command(subcommand)]
    Config(ConfigCommands),
}

#[derive(Subcommand)]
enum ConfigCommands {
    /// Show current configuration
    Show,

    /// Print the configuration file path
    Path,

    /// Create default configuration file
    Init,

    /// Set a configuration value
    Set {
        /// Configuration key (e.g. `http.url`)
        key: String,
        /// Configuration value
        value: String,
    },

    /// Export configuration
    Export {
        /// Export format
        #[arg(short, long, value_enum, default_value = "toml")]
        format: ExportFormatArg,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(ValueEnum, Clone, Copy)]
enum AdapterArg {
    Local,
    Function,
    Http,
}

impl From<AdapterArg> for AdapterKind {
    fn from(arg: AdapterArg) -> Self {
        match arg {
            AdapterArg::Local => AdapterKind::Local,
            AdapterArg::Function => AdapterKind::Function,
            AdapterArg::Http => AdapterKind::Http,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum HashAlgorithmArg {
    Sha256,
    Sha384,
    Sha512,
}

impl From<HashAlgorithmArg> for HashAlgorithm {
    fn from(arg: HashAlgorithmArg) -> Self {
        match arg {
            HashAlgorithmArg::Sha256 => HashAlgorithm::Sha256,
            HashAlgorithmArg::Sha384 => HashAlgorithm::Sha384,
            HashAlgorithmArg::Sha512 => HashAlgorithm::Sha512,
        }
    }
}

#[derive(ValueEnum, Clone, Copy)]
enum ExportFormatArg {
    Toml,
    Json,
}

impl From<ExportFormatArg> for ExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Toml => ExportFormat::Toml,
            ExportFormatArg::Json => ExportFormat::Json,
        }
    }
}

/// Parameters for the sign command
struct SignCommandArgs {
    input_file: PathBuf,
    output: Option<PathBuf>,
    adapter: Option<AdapterArg>,
    hash: Option<HashAlgorithmArg>,
    verify: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    let config_manager = match cli.config {
        Some(path) => ConfigManager::with_path(path),
        None => ConfigManager::new()?,
    };

    match cli.command {
        Commands::Sign {
            input_file,
            output,
            adapter,
            hash,
            verify,
        } => {
            let args = SignCommandArgs {
                input_file,
                output,
                adapter,
                hash,
                verify,
            };
            handle_sign_command(&config_manager, args).await?;
        }

        Commands::Chain { adapter } => {
            handle_chain_command(&config_manager, adapter).await?;
        }

        Commands::Verify {
            input_file,
            signature,
            hash,
            certificate,
        } => {
            handle_verify_command(&config_manager, &input_file, &signature, hash, certificate)?;
        }

        Commands::Config(config_cmd) => {
            handle_config_command(&config_manager, config_cmd)?;
        }
    }

    Ok(())
}

fn load_configuration(config_manager: &ConfigManager) -> Result<SignerConfiguration> {
    config_manager.load_or_default().wrap_err_with(|| {
        format!(
            "Failed to load configuration from {}",
            config_manager.config_path().display()
        )
    })
}

async fn handle_sign_command(config_manager: &ConfigManager, args: SignCommandArgs) -> Result<()> {
    let config = load_configuration(config_manager)?;
    let kind = args.adapter.map_or(config.adapter, AdapterKind::from);
    let algorithm = match args.hash {
        Some(hash) => hash.into(),
        None => config.hash_algorithm()?,
    };

    let data = std::fs::read(&args.input_file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", args.input_file.display()))?;
    let output_path = args.output.unwrap_or_else(|| {
        let mut name = args.input_file.clone().into_os_string();
        name.push(".sig");
        PathBuf::from(name)
    });

    println!("🔏 Signing {} bytes via {kind} signer ({algorithm})", data.len());

    let signer = build_signer_of_kind(&config, kind)?;
    let request = SigningRequest::new(data, algorithm);
    let options = SigningOptions {
        verify_signature: args.verify || config.verify_signature,
    };

    match sign_request(signer.as_ref(), &request, options).await {
        Ok(signed) => {
            std::fs::write(&output_path, signed.signature.as_slice())
                .into_diagnostic()
                .wrap_err_with(|| format!("Failed to write {}", output_path.display()))?;
            println!("✅ Signature written to {}", output_path.display());
            println!("  Duration: {:.2}s", signed.duration.as_secs_f64());
            println!("  Signature size: {} bytes", signed.signature.as_slice().len());
            println!("  Chain length: {}", signed.chain.len());
            if options.verify_signature {
                println!("  Verified against chain leaf: yes");
            }
        }
        Err(e) => {
            if e.is_retryable() {
                eprintln!("❌ Signer unreachable (retrying may help): {e}");
            } else {
                eprintln!("❌ Signing failed: {e}");
            }
            std::process::exit(1);
        }
    }

    Ok(())
}

async fn handle_chain_command(
    config_manager: &ConfigManager,
    adapter: Option<AdapterArg>,
) -> Result<()> {
    let config = load_configuration(config_manager)?;
    let kind = adapter.map_or(config.adapter, AdapterKind::from);
    let signer = build_signer_of_kind(&config, kind)?;

    let chain = signer.certificate_chain().await?;
    println!("📜 Certificate chain ({} signer):", signer.kind());
    print_chain(&chain)?;
    Ok(())
}

fn print_chain(chain: &CertificateChain) -> Result<()> {
    for (index, summary) in chain.describe()?.iter().enumerate() {
        println!("  [{index}] Subject: {}", summary.subject);
        println!("      Issuer: {}", summary.issuer);
        println!("      SHA-256: {}", summary.sha256_fingerprint);
    }
    Ok(())
}

fn handle_verify_command(
    config_manager: &ConfigManager,
    input_file: &Path,
    signature_file: &Path,
    hash: Option<HashAlgorithmArg>,
    certificate: Option<PathBuf>,
) -> Result<()> {
    let config = load_configuration(config_manager)?;
    let algorithm = match hash {
        Some(hash) => hash.into(),
        None => config.hash_algorithm()?,
    };
    let certificate = certificate.unwrap_or_else(|| config.public_certificate.clone());

    let chain = CertificateChain::load(&certificate)?;
    let data = std::fs::read(input_file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", input_file.display()))?;
    let signature = std::fs::read(signature_file)
        .into_diagnostic()
        .wrap_err_with(|| format!("Failed to read {}", signature_file.display()))?;

    println!("🔍 Verifying {algorithm} signature with {}", certificate.display());
    if verify_with_chain(&chain, &data, algorithm, &signature)? {
        println!("✅ Signature is valid");
        Ok(())
    } else {
        eprintln!("❌ Signature does not verify");
        std::process::exit(1);
    }
}

fn handle_config_command(config_manager: &ConfigManager, config_cmd: ConfigCommands) -> Result<()> {
    match config_cmd {
        ConfigCommands::Show => match config_manager.load() {
            Ok(config) => {
                println!("📋 Current Configuration:");
                println!("  Adapter: {}", config.adapter);
                println!("  Digest algorithm: {}", config.digest_algorithm);
                println!(
                    "  Public certificate: {}",
                    config.public_certificate.display()
                );
                println!("  Verify signatures: {}", config.verify_signature);
                println!("  Network timeout: {}s", config.network_timeout_seconds);
                println!("  Key bundle: {}", config.local.key_bundle.display());
                println!("  Passphrase variable: {}", config.local.passphrase_env);
                println!(
                    "  Function: {} @ {}",
                    config.function.function_name, config.function.endpoint
                );
                println!("  HTTP endpoint: {}", config.http.url);
                println!(
                    "  Configuration file: {}",
                    config_manager.config_path().display()
                );
            }
            Err(_) => {
                println!("📋 No configuration file found. Use 'config init' to create one.");
            }
        },

        ConfigCommands::Path => {
            println!("{}", config_manager.config_path().display());
        }

        ConfigCommands::Init => {
            let _config = config_manager.load_or_create_default()?;
            println!(
                "✅ Configuration initialized: {}",
                config_manager.config_path().display()
            );
            println!("   Edit the file to customize settings, or use 'config set' commands.");
        }

        ConfigCommands::Set { key, value } => {
            config_manager.update_value(&key, &value)?;
            println!("✅ Configuration updated: {key} = {value}");
        }

        ConfigCommands::Export { format, output } => {
            let content = config_manager.export_config(format.into())?;

            if let Some(output_path) = output {
                std::fs::write(&output_path, content).into_diagnostic()?;
                println!("✅ Configuration exported to: {}", output_path.display());
            } else {
                println!("{content}");
            }
        }
    }

    Ok(())
}
