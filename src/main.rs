use anyhow::Result;
use tracing::info;

use wishcast::app::config::WishConfig;
use wishcast::service::main_axum::start_axum_server;
use wishcast::utils::log::init_logger_once;

#[tokio::main]
async fn main() -> Result<()> {
    init_logger_once();

    let config = WishConfig::load()?;
    info!("Starting wishcast");

    start_axum_server(config).await
}
