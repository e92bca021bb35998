//! Wiring & DI. Entry point: bootstrap adapters, inject into services, run UI.
//! No business logic here.

use dotenv::dotenv;
use hr_assist::adapters::ai::{MockTranslator, OpenAiTranslator};
use hr_assist::adapters::mail::{SmtpMailer, UnconfiguredMailer};
use hr_assist::adapters::persistence::SqliteStore;
use hr_assist::adapters::report::FileReportRenderer;
use hr_assist::adapters::ui::tui::TuiInputPort;
use hr_assist::ports::{
    DataStorePort, InputPort, MailSenderPort, QueryTranslatorPort, ReportRendererPort,
};
use hr_assist::shared::config::AppConfig;
use hr_assist::usecases::{DeliveryService, QueryService, RecipientResolver};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cwd = std::env::current_dir().unwrap_or_else(|_| PathBuf::from("."));
    let env_loaded = dotenv();
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    match &env_loaded {
        Ok(path) => info!(path = %path.display(), "loaded .env"),
        Err(_) => info!(cwd = %cwd.display(), "no .env found (check CWD)"),
    }

    hr_assist::adapters::ui::init_ui();

    let cfg = AppConfig::load().unwrap_or_else(|e| {
        warn!(error = %e, "config load failed; using defaults");
        AppConfig::default()
    });

    let data_path = PathBuf::from(cfg.data_dir_or_default());
    let data_dir_abs = data_path
        .canonicalize()
        .unwrap_or_else(|_| data_path.clone());
    info!(path = %data_dir_abs.display(), "data directory");

    let schema = cfg.schema();
    let table_name = schema.table_name.clone();

    // --- Data store ---
    let store: Arc<dyn DataStorePort> = Arc::new(
        SqliteStore::connect(&data_path)
            .await
            .map_err(|e| anyhow::anyhow!("SQLite connect failed: {}", e))?,
    );

    // --- Query translator ---
    let translator: Arc<dyn QueryTranslatorPort> = if cfg.is_ai_configured() {
        info!(
            model = %cfg.ai_model_or_default(),
            url = %cfg.ai_api_url_or_default(),
            "query translation via OpenAI-compatible API"
        );
        Arc::new(OpenAiTranslator::new(
            cfg.ai_api_url_or_default(),
            cfg.ai_api_key().unwrap_or_default(),
            cfg.ai_model_or_default(),
            schema.column_notes(),
        ))
    } else {
        warn!("HR_ASSIST_AI_API_KEY not set, using mock translator");
        Arc::new(MockTranslator::new(table_name.clone()))
    };

    // --- Mail ---
    let mailer: Arc<dyn MailSenderPort> = if cfg.is_smtp_configured() {
        let sender = cfg.sender_email.clone().unwrap_or_default();
        info!(
            server = %cfg.smtp_server_or_default(),
            port = cfg.smtp_port_or_default(),
            sender = %sender,
            "SMTP delivery enabled"
        );
        Arc::new(
            SmtpMailer::new(
                &cfg.smtp_server_or_default(),
                cfg.smtp_port_or_default(),
                &sender,
                cfg.sender_password.as_deref().unwrap_or_default(),
            )
            .map_err(|e| anyhow::anyhow!("{}", e))?,
        )
    } else {
        warn!("HR_ASSIST_SENDER_EMAIL/HR_ASSIST_SENDER_PASSWORD not set; sending disabled");
        Arc::new(UnconfiguredMailer)
    };

    // --- Reports ---
    let reports_dir = data_path.join("reports");
    let renderer: Arc<dyn ReportRendererPort> = Arc::new(FileReportRenderer::new(reports_dir));

    // --- Services ---
    let queries = Arc::new(QueryService::new(
        translator,
        Arc::clone(&store),
        schema,
    ));
    let resolver = Arc::new(RecipientResolver::new(Arc::clone(&store), table_name));
    let delivery = Arc::new(DeliveryService::new(mailer, renderer));

    let input_port: Arc<dyn InputPort> = Arc::new(TuiInputPort::new(
        queries,
        resolver,
        delivery,
        Arc::clone(&store),
    ));

    // --- Run (main menu until Exit) ---
    input_port
        .run()
        .await
        .map_err(|e| anyhow::anyhow!("{}", e))?;

    Ok(())
}
