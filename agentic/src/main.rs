use clap::{Parser, Subcommand};
use learn_client::credentials::CookieJar;
use learn_client::{ApiClient, CachedClient, ClientError, RequestDescriptor};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

mod config;
mod fallback;
mod telemetry;

use config::Config;

#[derive(Parser)]
#[command(name = "agentic", about = "Command line client for the AgenticLearn backend")]
struct Cli {
    /// Path to the YAML config file
    #[arg(long, short, global = true)]
    config: Option<PathBuf>,

    /// Cookie string holding the session, e.g. "access_token=...; user_id=..."
    #[arg(long, env = "AGENTIC_COOKIE", global = true, hide_env_values = true)]
    cookie: Option<String>,

    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Print the base URL every service resolves to
    Resolve { service: Option<String> },
    /// Check backend health
    Health {
        /// Probe every configured service instead of the content backend
        #[arg(long)]
        all: bool,
    },
    /// List available courses
    Courses,
    /// Send a message to the ARIA tutor
    Chat {
        message: String,
        #[arg(long)]
        session: Option<String>,
    },
    /// Run the backend connection smoke test
    Smoke,
}

#[derive(thiserror::Error, Debug)]
enum CliError {
    #[error(transparent)]
    Telemetry(#[from] telemetry::TelemetryError),
    #[error("invalid client config: {0}")]
    Validation(#[from] learn_client::config::ValidationError),
    #[error(transparent)]
    Client(#[from] ClientError),
    #[error("could not render output: {0}")]
    Output(#[from] serde_json::Error),
    #[error("{passed}/{total} smoke checks passed")]
    SmokeFailed { passed: usize, total: usize },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => match Config::from_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Config::default(),
    };

    let _sentry = telemetry::init_logging(&config.logging);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            tracing::error!(error = %e, "could not start runtime");
            return ExitCode::FAILURE;
        }
    };

    match runtime.block_on(run(cli, config)) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::error!(error = %e, "command failed");
            eprintln!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: Config) -> Result<(), CliError> {
    telemetry::init_metrics(config.metrics.as_ref())?;

    let cookies = CookieJar::parse(cli.cookie.as_deref().unwrap_or_default());
    let cache_config = config.client.cache.clone();
    let client = ApiClient::builder(config.client)
        .credentials(Arc::new(cookies))
        .build()?;

    match cli.command {
        CliCommand::Resolve { service } => resolve(&client, service.as_deref()),
        CliCommand::Health { all } => health(&client, all).await,
        CliCommand::Courses => {
            let cached = CachedClient::new(client, &cache_config);
            let courses = cached
                .execute("content", RequestDescriptor::get("/courses"))
                .await?;
            print_json(&courses)
        }
        CliCommand::Chat { message, session } => chat(&client, &message, session.as_deref()).await,
        CliCommand::Smoke => smoke(&client).await,
    }
}

fn print_json(value: &Value) -> Result<(), CliError> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn resolve(client: &ApiClient, service: Option<&str>) -> Result<(), CliError> {
    let resolver = client.resolver();
    let services: Vec<&str> = match service {
        Some(service) => vec![service],
        None => resolver.services(),
    };

    let mut table = serde_json::Map::new();
    for service in services {
        let url = resolver.resolve(service).map(|url| url.to_string());
        if url.is_none() {
            tracing::warn!(service, "service has no base URL");
        }
        table.insert(service.to_string(), json!(url));
    }

    print_json(&json!({
        "environment": client.environment().as_str(),
        "services": table,
    }))
}

async fn health(client: &ApiClient, all: bool) -> Result<(), CliError> {
    if !all {
        let report = client.health_check().await?;
        return print_json(&serde_json::to_value(report)?);
    }

    let mut table = serde_json::Map::new();
    for (service, result) in client.all_service_health().await {
        let entry = match result {
            Ok(report) => serde_json::to_value(report)?,
            Err(e) => json!({ "error": e.to_string() }),
        };
        table.insert(service, entry);
    }
    print_json(&Value::Object(table))
}

async fn chat(client: &ApiClient, message: &str, session: Option<&str>) -> Result<(), CliError> {
    // Degrade to an offline reply rather than failing the command.
    let reply = match client.chat(message, session).await {
        Ok(response) => fallback::reply_text(&response)
            .map(String::from)
            .unwrap_or_else(|| fallback::offline_reply(message)),
        Err(e) => {
            tracing::warn!(error = %e, "chat backend unavailable, using offline reply");
            fallback::offline_reply(message)
        }
    };
    println!("{reply}");
    Ok(())
}

async fn smoke(client: &ApiClient) -> Result<(), CliError> {
    let checks = [
        ("health", client.health_check().await.map(|_| ())),
        ("courses", client.courses().await.map(|_| ())),
        (
            "aria",
            client
                .chat("Hello, can you help me?", None)
                .await
                .map(|_| ()),
        ),
    ];

    let total = checks.len();
    let mut passed = 0;
    for (name, result) in &checks {
        match result {
            Ok(()) => {
                passed += 1;
                tracing::info!(check = name, "smoke check passed");
            }
            Err(e) => tracing::error!(check = name, error = %e, "smoke check failed"),
        }
    }

    print_json(&json!({
        "passed": passed,
        "total": total,
        "carbon_footprint": client.carbon_footprint(),
    }))?;

    if passed == total {
        Ok(())
    } else {
        Err(CliError::SmokeFailed { passed, total })
    }
}
