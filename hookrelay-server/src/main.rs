//! hookrelay - minimal webhook broker
//!
//! # Commands
//!
//! - `hookrelay serve` - Run the broker (registration and invocation endpoints)
//! - `hookrelay receive` - Run a validating subscriber for trying deliveries out
//! - `hookrelay sign` - Print the hex HMAC-SHA256 of a message

use clap::{Args, Parser, Subcommand};
use hookrelay_server::logging::{LogConfig, LogFormat, LogLevel, LogOutput};
use hookrelay_server::{
    Application, Broker, Receiver, ReceiverConfig, Result, Secret, ServerConfig, ServerError,
};
use hookrelay_webhooks::{VerificationLevel, WebhookConfig};
use std::process::ExitCode;
use tracing::{error, info};

/// hookrelay - register callbacks, trigger signed fan-out deliveries
#[derive(Parser)]
#[command(name = "hookrelay")]
#[command(version)]
#[command(about = "Minimal webhook broker with HMAC-signed deliveries")]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Log output format
    #[arg(long, global = true, env = "HOOKRELAY_LOG_FORMAT", default_value = "json", value_parser = parse_format)]
    log_format: LogFormat,

    /// Minimum log level (RUST_LOG takes precedence when set)
    #[arg(long, global = true, env = "HOOKRELAY_LOG_LEVEL", default_value = "info", value_parser = parse_level)]
    log_level: LogLevel,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the webhook broker
    #[command(alias = "s")]
    Serve(ServeArgs),

    /// Run a validating webhook receiver
    #[command(alias = "r")]
    Receive(ReceiveArgs),

    /// Print the signature of a message
    Sign(SignArgs),
}

#[derive(Args)]
struct ServeArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8080)]
    port: u16,

    /// Shared signing secret (defaults to a demo secret)
    #[arg(long, env = "HOOKRELAY_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// Path of the registration endpoint
    #[arg(long, env = "HOOKRELAY_REGISTRATION_PATH", default_value = hookrelay_server::config::REGISTRATION_PATH)]
    registration_path: String,

    /// Path of the invocation endpoint
    #[arg(long, env = "HOOKRELAY_INVOCATION_PATH", default_value = hookrelay_server::config::INVOCATION_PATH)]
    invocation_path: String,

    /// Deadline for each delivery in seconds, 0 for none
    #[arg(long, env = "HOOKRELAY_DELIVERY_TIMEOUT", default_value_t = 30)]
    delivery_timeout: u64,
}

#[derive(Args)]
struct ReceiveArgs {
    /// Port to listen on
    #[arg(short, long, env = "PORT", default_value_t = 8081)]
    port: u16,

    /// Shared signing secret (defaults to a demo secret)
    #[arg(long, env = "HOOKRELAY_SECRET", hide_env_values = true)]
    secret: Option<String>,

    /// How inbound calls are verified: none (0), url (1) or content (2)
    #[arg(short, long, env = "HOOKRELAY_VALIDATION", default_value = "none", value_parser = parse_verification)]
    level: VerificationLevel,
}

#[derive(Args)]
struct SignArgs {
    /// Secret to sign with
    #[arg(long, env = "HOOKRELAY_SECRET", hide_env_values = true)]
    secret: String,

    /// Message to sign
    message: String,
}

fn parse_format(s: &str) -> std::result::Result<LogFormat, String> {
    s.parse()
}

fn parse_level(s: &str) -> std::result::Result<LogLevel, String> {
    s.parse()
}

fn parse_verification(s: &str) -> std::result::Result<VerificationLevel, String> {
    s.parse().map_err(|e: hookrelay_webhooks::WebhookError| e.to_string())
}

fn secret_from(arg: Option<String>) -> Secret {
    arg.map(|s| Secret::new(s.into_bytes())).unwrap_or_default()
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let webhook = WebhookConfig::builder()
        .timeout_secs(args.delivery_timeout)
        .build();
    let config = ServerConfig::new()
        .port(args.port)
        .registration_path(args.registration_path)
        .invocation_path(args.invocation_path)
        .secret(secret_from(args.secret))
        .webhook(webhook);

    let broker = Broker::new(&config)?;
    let app = Application::bind_port(config.port, broker).await?;
    let port = app.local_addr().port();

    info!("Service listening on port {}", port);
    info!(
        "For registration of webhook, send POST request to http://localhost:{}{}",
        port, config.registration_path
    );
    info!(
        "For invocation of any registered webhook, send POST request to http://localhost:{}{}",
        port, config.invocation_path
    );

    app.run_until(shutdown_signal()).await
}

async fn receive(args: ReceiveArgs) -> Result<()> {
    let level = args.level;
    let config = ReceiverConfig::new()
        .port(args.port)
        .secret(secret_from(args.secret))
        .level(level);

    let receiver = Receiver::new(&config)?;
    let subscriber_path = receiver.subscriber_path();
    let app = Application::bind_port(config.port, receiver).await?;

    info!(
        "Service URL ({}-validating): http://localhost:{}{}",
        level,
        app.local_addr().port(),
        subscriber_path
    );

    app.run_until(shutdown_signal()).await
}

fn sign(args: SignArgs) -> Result<()> {
    let signature = Secret::new(args.secret.into_bytes())
        .signer()
        .sign(args.message.as_bytes())
        .map_err(ServerError::from)?;
    println!("{}", signature);
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let _guard = LogConfig::new()
        .level(cli.log_level)
        .format(cli.log_format)
        .output(LogOutput::Stderr)
        .init();

    let result = match cli.command {
        Commands::Serve(args) => serve(args).await,
        Commands::Receive(args) => receive(args).await,
        Commands::Sign(args) => sign(args),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{}", e);
            ExitCode::FAILURE
        }
    }
}
