use std::str::FromStr;

use eyre::Result;
use log::info;
use refinery::config::Config as MigrationConfig;
use sqlx::PgPool;

use amisag::app::router;
use amisag::config::Config;
use amisag::routes::Api;

refinery::embed_migrations!("migrations");

#[tokio::main]
async fn main() -> Result<()> {
    // setup log
    env_logger::init();
    let config = Config::from_env()?;
    info!("server starts with logging");

    // run migrations
    let mut migration_config = MigrationConfig::from_str(&config.database_url)?;
    migrations::runner()
        .run_async(&mut migration_config)
        .await?;
    let pool = PgPool::connect(&config.database_url).await?;

    let api = Api::new(pool, &config);
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    info!("listening on {}", config.bind_address);
    axum::serve(listener, router(api)).await?;
    Ok(())
}
