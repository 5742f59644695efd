use std::sync::Arc;

use request_relay::audit::JsonLinesAudit;
use request_relay::config::RelayConfig;
use request_relay::delivery::{HttpBot, Orchestrator, SmtpRelay};
use request_relay::directory::HostConventionDirectory;
use request_relay::server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .init();

    let config = Arc::new(RelayConfig::from_env()?);

    let audit_path =
        std::env::var("AUDIT_LOG_PATH").unwrap_or_else(|_| "./data/audit.log".to_string());

    let port: u16 = std::env::var("REQUEST_RELAY_PORT")
        .unwrap_or_else(|_| "8080".to_string())
        .parse()
        .unwrap_or(8080);

    let mail_domain = std::env::var("MAIL_DOMAIN").unwrap_or_else(|_| "tamu.edu".to_string());
    let group_base =
        std::env::var("GROUP_DIR_BASE").unwrap_or_else(|_| "/scratch/group".to_string());

    eprintln!("Request relay v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Cluster: {}", config.cluster_name);
    eprintln!("   Bot route: {}", config.bot_route);
    eprintln!("   Intake: {}", config.request_email);
    eprintln!("   SMTP relay: {}:{}", config.smtp_host, config.smtp_port);
    eprintln!("   Audit log: {audit_path}");
    eprintln!("   Listening: http://0.0.0.0:{port}/api/requests\n");

    if let Some(parent) = std::path::Path::new(&audit_path).parent() {
        std::fs::create_dir_all(parent)?;
    }
    let audit = Arc::new(JsonLinesAudit::open(&audit_path)?);

    let directory = Arc::new(HostConventionDirectory::new(mail_domain, group_base));
    let bot = Arc::new(HttpBot::new(config.bot_route.clone(), config.bot_timeout));
    let email = Arc::new(SmtpRelay::new(
        config.smtp_host.clone(),
        config.smtp_port,
    ));

    let orchestrator = Arc::new(Orchestrator::new(config, directory, bot, email, audit));
    let app = server::routes(orchestrator);

    let listener = tokio::net::TcpListener::bind(("0.0.0.0", port)).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
