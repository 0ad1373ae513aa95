use muistutin::startup;
use tracing::info;

#[tokio::main]
async fn main() -> miette::Result<()> {
    // Initialize logging
    startup::init_logging()?;

    info!("Starting Muistutin");

    // Load configuration
    let config = startup::load_config()?;

    // Log in and run the reminder loop
    startup::start(config).await
}
