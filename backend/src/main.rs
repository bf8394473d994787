use std::net::SocketAddr;

use log::info;

use artisanflow_backend::{create_router, initialize_backend};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let data_directory =
        std::env::var("ARTISANFLOW_DATA_DIR").unwrap_or_else(|_| "./data".to_string());
    info!("Using data directory {}", data_directory);

    let state = initialize_backend(&data_directory)?;
    let app = create_router(state);

    let addr = SocketAddr::from(([127, 0, 0, 1], 3000));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}
