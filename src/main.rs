use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use contact_relay::application::usecases::{SubmissionOutcome, SubmitContactUseCase};
use contact_relay::application::{
    Clock, EmailRelay, KeyValueStore, NotificationCenter, SubmissionThrottle,
};
use contact_relay::domain::{ContactForm, ThrottleDecision};
use contact_relay::infrastructure::{
    clock::SystemClock, console_notifier::ConsoleNotifier, emailjs_relay::EmailJsRelay,
    file_store::JsonFileKeyValueStore, memory_store::InMemoryKeyValueStore,
    simulated_relay::SimulatedRelay, sqlite_store::SqliteKeyValueStore,
};
use contact_relay::interfaces::config::{
    Config, StorageCfg, DEFAULT_SQLITE_URL, DEFAULT_STATE_FILE,
};
use contact_relay::interfaces::http_api::{build_router, ApiState};

#[derive(Parser, Debug)]
#[command(name = "contact-relay")]
struct Args {
    /// Path to config.yaml (optional)
    #[arg(long, default_value = "config.yaml")]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Submit one message through the contact flow
    Send {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        message: String,
    },
    /// Show whether a submission would currently be allowed
    Status,
    /// Serve the contact endpoint over HTTP
    Serve {
        /// Listen address, overrides http.bind
        #[arg(long)]
        bind: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env().add_directive(
                "contact_relay=info"
                    .parse()
                    .expect("static directive is valid"),
            ),
        )
        .init();
    if dotenvy::dotenv().is_err() {
        let _ = dotenvy::from_path(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join(".env"));
    }
    let args = Args::parse();

    // 1) load config
    let cfg = match Config::load(&args.config) {
        Ok(c) => c,
        Err(e) => {
            tracing::error!("Failed to load config {}: {}", args.config, e);
            std::process::exit(1);
        }
    };

    // 2) build infra
    let store = match open_store(&cfg.storage).await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("Failed to open storage: {e}");
            std::process::exit(1);
        }
    };
    let relay: Arc<dyn EmailRelay> = match cfg.relay_credentials() {
        Some(creds) => Arc::new(EmailJsRelay::with_endpoint(creds, cfg.relay_endpoint())),
        None => {
            tracing::warn!("email relay credentials not set, running in simulated mode");
            Arc::new(SimulatedRelay::new())
        }
    };
    let clock: Arc<dyn Clock> = Arc::new(SystemClock::new());
    let notifications = Arc::new(NotificationCenter::new());
    let throttle = SubmissionThrottle::new(store);

    // 3) usecase
    let flow = Arc::new(SubmitContactUseCase::new(
        throttle.clone(),
        relay,
        notifications.clone(),
        clock.clone(),
    ));

    // 4) run
    match args.command {
        Command::Send {
            name,
            email,
            message,
        } => {
            let mut form = ContactForm::new(name, email, message);
            let (outcome, shown) = flow.execute(&mut form).await;
            if let Some(n) = shown {
                ConsoleNotifier::new().print(&n);
            }
            if !matches!(outcome, SubmissionOutcome::Sent) {
                std::process::exit(1);
            }
        }
        Command::Status => {
            let now = clock.now_millis();
            let recent = throttle.recent(now).await;
            println!(
                "recent submissions: {}/{}",
                recent.len(),
                throttle.policy().max_attempts()
            );
            match throttle.check_allowed(now).await {
                ThrottleDecision::Allowed => println!("status: allowed"),
                ThrottleDecision::Denied { reason, .. } => println!("status: denied ({reason})"),
            }
        }
        Command::Serve { bind } => {
            let addr = bind.unwrap_or_else(|| cfg.bind_addr());
            let listener = match tokio::net::TcpListener::bind(&addr).await {
                Ok(l) => l,
                Err(e) => {
                    tracing::error!("Failed to bind {addr}: {e}");
                    std::process::exit(1);
                }
            };
            let _console = ConsoleNotifier::new().spawn(notifications.subscribe());

            tracing::info!(addr = %addr, "http api listening");
            if let Err(e) = axum::serve(listener, build_router(ApiState { flow })).await {
                tracing::error!("http server failed: {e}");
                std::process::exit(1);
            }
        }
    }
}

async fn open_store(cfg: &StorageCfg) -> anyhow::Result<Arc<dyn KeyValueStore>> {
    let store: Arc<dyn KeyValueStore> = match cfg {
        StorageCfg::Memory => {
            tracing::warn!("in-memory storage: submission history is lost on exit");
            Arc::new(InMemoryKeyValueStore::new())
        }
        StorageCfg::File { path } => Arc::new(JsonFileKeyValueStore::new(
            path.clone()
                .unwrap_or_else(|| DEFAULT_STATE_FILE.to_string()),
        )),
        StorageCfg::Sqlite { url } => {
            let url = url.clone().unwrap_or_else(|| DEFAULT_SQLITE_URL.to_string());
            Arc::new(SqliteKeyValueStore::new(&url).await?)
        }
    };
    Ok(store)
}
