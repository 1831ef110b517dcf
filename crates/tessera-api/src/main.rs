use tessera_core::Config;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tessera_api::setup::telemetry::init_tracing();

    // Load configuration
    let config = Config::from_env()?;

    // Initialize the application (database, storage, services, routes)
    let (_state, router) = tessera_api::setup::initialize_app(config.clone()).await?;

    // Start the server
    tessera_api::setup::server::start_server(&config, router).await?;

    Ok(())
}
