use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use prepdeck::catalog::CatalogClient;
use prepdeck::config::{self, AppConfig};
use prepdeck::grading::LlmGrader;
use prepdeck::srs::Scheduler;
use prepdeck::state::AppState;
use prepdeck::{db, handlers};

#[tokio::main]
async fn main() {
  tracing_subscriber::registry()
    .with(
      tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "prepdeck=debug,tower_http=debug".into()),
    )
    .with(tracing_subscriber::fmt::layer())
    .init();

  let config = AppConfig::load();

  let pool = db::init_db(&config.database_path).expect("Failed to initialize database");

  if config.grader.api_key.is_empty() {
    tracing::warn!("GRADER_API_KEY is not set; answer grading will fail");
  }
  let grader = LlmGrader::new(config.grader.clone()).expect("Failed to build grading client");

  let catalog = match &config.catalog_refill_url {
    Some(url) => Some(CatalogClient::new(url.clone()).expect("Failed to build catalog client")),
    None => {
      tracing::info!("No catalog refill URL configured; low-pool signal disabled");
      None
    }
  };

  let state = AppState::new(pool, Scheduler::new(config.srs.clone()), grader, catalog);
  let app = handlers::app(state);

  let bind_addr = config::server_bind_addr();
  let listener = tokio::net::TcpListener::bind(&bind_addr)
    .await
    .unwrap_or_else(|_| panic!("Failed to bind to {}", bind_addr));

  tracing::info!("Server running on http://localhost:{}", config::SERVER_PORT);

  axum::serve(listener, app)
    .await
    .expect("Server failed to start");
}
