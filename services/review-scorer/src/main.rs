use actix_web::{web, App, HttpServer};
use anyhow::Context;
use review_scorer::handlers::{self, AppState};
use shared::config::Settings;
use shared::openai_client::ChatClient;
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    let json = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            error!(%e, "failed to load settings");
            std::process::exit(1);
        }
    };

    let client = ChatClient::from_settings(&settings).context("failed to build completion client")?;
    info!(
        model = client.model(),
        batch_size = settings.max_reviews_per_call,
        "completion client ready"
    );

    let bind = (settings.http_bind.clone(), settings.http_port);
    let data = web::Data::new(AppState::new(Arc::new(client), settings.clone()));

    info!("Server running on http://{}:{}", bind.0, bind.1);
    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .configure(|cfg| handlers::configure(cfg, &settings))
    })
    .bind(bind)
    .context("failed to bind http listener")?
    .run()
    .await?;

    Ok(())
}
