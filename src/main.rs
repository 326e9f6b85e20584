use artiverse_data::{
    config::{AppConfig, database},
    core::password_reset,
    errors::Result,
    mail::MailService,
};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env and validate the configuration; any missing field is fatal
    let app_config = Arc::new(AppConfig::load()?);

    // 3. Connect and make sure every table exists
    let db = database::create_connection(&app_config.database_url)
        .await
        .inspect_err(|e| error!("Failed to connect to database: {}", e))?;
    database::create_tables(&db)
        .await
        .inspect(|_| info!("Database initialized successfully."))
        .inspect_err(|e| error!("Failed to create tables: {}", e))?;

    // 4. Build the SMTP transport so TLS settings are checked at start-up
    let _mail_service = MailService::from_config(Arc::clone(&app_config))
        .inspect_err(|e| error!("Failed to configure mail transport: {}", e))?;
    info!(
        server = %app_config.mail.server,
        port = app_config.mail.port,
        "Mail transport ready"
    );

    // 5. Housekeeping
    let purged = password_reset::purge_expired_tokens(&db).await?;
    info!(purged, "Artiverse data layer ready");

    Ok(())
}
