use clap::Parser;
use github_secrets_gateway::{
    config::Config,
    crypto::{seal_for_public_key, SealedBoxCrypto},
    error::{AppError, SecurityError},
    security::{InputValidator, SecureString},
    server::run_server,
};
use tracing::info;

#[derive(Parser)]
#[command(name = "github-secrets-gateway")]
#[command(about = "HTTP gateway for GitHub Actions repository and environment secrets")]
#[command(version = env!("CARGO_PKG_VERSION"))]
pub enum Cli {
    /// Start the gateway
    Server {
        /// TOML configuration file; defaults are used when omitted
        #[arg(short, long, env = "GATEWAY_CONFIG")]
        config: Option<String>,
        /// Host to bind to (overrides config)
        #[arg(long, env = "SERVER_HOST")]
        host: Option<String>,
        /// Port to bind to (overrides config)
        #[arg(long, env = "SERVER_PORT")]
        port: Option<u16>,
    },
    /// Generate a gateway key pair
    Keygen,
    /// Seal a PAT or secret value for a request body
    Seal {
        /// Base64 public key from `GET /crypto/public-key`
        #[arg(long)]
        public_key: String,
        value: String,
    },
}

#[tokio::main]
async fn main() -> Result<(), AppError> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("github_secrets_gateway=info")),
        )
        .init();

    match Cli::parse() {
        Cli::Server { config, host, port } => {
            info!("Starting GitHub secrets gateway");
            handle_server_command(config, host, port).await
        }
        Cli::Keygen => {
            handle_keygen_command();
            Ok(())
        }
        Cli::Seal { public_key, value } => {
            let sealed = handle_seal_command(&public_key, SecureString::new(value))?;
            println!("{sealed}");
            Ok(())
        }
    }
}

/// Apply CLI overrides on top of the configuration file
fn resolve_config(
    config_path: Option<&str>,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<Config, AppError> {
    let mut config = match config_path {
        Some(path) => Config::from_file(path)?,
        None => {
            info!("No configuration file given, using defaults");
            Config::default()
        }
    };

    if let Some(host) = host_override {
        config.server.host = host;
    }

    if let Some(port) = port_override {
        config.server.port = port;
    }

    config.validate()?;
    Ok(config)
}

async fn handle_server_command(
    config_path: Option<String>,
    host_override: Option<String>,
    port_override: Option<u16>,
) -> Result<(), AppError> {
    let config = resolve_config(config_path.as_deref(), host_override, port_override)?;
    run_server(config).await
}

fn handle_keygen_command() {
    let crypto = SealedBoxCrypto::generate();
    println!("GATEWAY_PRIVATE_KEY={}", crypto.secret_key_base64().as_str());
    println!("public key: {}", crypto.public_key_base64());
}

fn handle_seal_command(public_key: &str, value: SecureString) -> Result<String, AppError> {
    if !InputValidator::new().looks_like_base64(public_key.trim()) {
        return Err(SecurityError::InputValidationFailed {
            message: "public key is not base64".to_string(),
        }
        .into());
    }

    Ok(seal_for_public_key(value.as_bytes(), public_key)?)
}
