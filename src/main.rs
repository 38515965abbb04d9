use tracing_subscriber::EnvFilter;
use whispers::{app, db, pictures::PictureStore, AppState, CallerHeader, Config};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = Config::from_env()?;

    let db_pool = db::connect(&config).await?;
    let pictures = PictureStore::open(db_pool.clone(), &config).await?;

    let app_state = AppState {
        db_pool,
        pictures,
        caller_header: CallerHeader(config.caller_header.clone()),
    };

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    tracing::info!(addr = %config.bind_addr, caller_header = %config.caller_header, "listening");

    axum::serve(listener, app(app_state)).await?;
    Ok(())
}
