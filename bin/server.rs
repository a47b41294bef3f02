// Numerology Calculator - Web Server
// Form at / and JSON API under /api

use anyhow::{anyhow, Context, Result};
use numerology::{logging, web, JsonFileStore, NumerologyService, Settings};
use tracing::info;

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::load().map_err(|e| anyhow!("Failed to load settings: {}", e))?;
    logging::init(settings.log_level_or("info"));

    println!("🌐 Numerology Calculator - Web Server v{}", numerology::VERSION);
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");

    let store = JsonFileStore::new(&settings.history_file);
    info!(path = %store.path().display(), "using history file");

    let app = web::router(NumerologyService::new(store));

    let listener = tokio::net::TcpListener::bind(&settings.bind_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.bind_addr))?;

    println!("\n🚀 Server running on http://{}", settings.bind_addr);
    println!("   API: http://{}/api/history", settings.bind_addr);
    println!("   UI:  http://{}", settings.bind_addr);
    println!("\n   Press Ctrl+C to stop\n");

    axum::serve(listener, app)
        .await
        .context("Server error")?;

    Ok(())
}
