use memory_duel::config::Config;
use memory_duel::http::routes::{self, AppState};
use memory_duel::room::manager::RoomManager;
use memory_duel::telemetry;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    telemetry::init()?;

    let config = Config::from_env();
    let state = AppState { rooms: RoomManager::new(config.rooms) };
    let app = routes::router(state, &config.static_dir);

    tracing::info!(
        addr = %config.addr,
        static_dir = %config.static_dir.display(),
        total_pairs = config.rooms.total_pairs,
        "listening"
    );
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}
