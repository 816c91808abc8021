use clap::Parser;
use posts::config::Config;
use posts::store::MemoryStore;
use posts::{Server, api, telemetry};

#[tokio::main]
async fn main() -> Result<(), posts::Error> {
    let config = Config::parse();
    telemetry::init(&config)?;

    let app = api::router(MemoryStore::shared());

    Server::bind(config.socket_addr()?)
        .await?
        .body_limit(config.max_body_bytes)
        .serve(app)
        .await
}
