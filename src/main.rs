use std::sync::Arc;

use tracing::error;

use vault_session::config::{load_config, print_schema};
use vault_session::startup;
use vault_session::utils::logger::init_logging;

#[tokio::main]
async fn main() {
    // `vault-session --schema` prints the config JSON schema and exits.
    if std::env::args().any(|arg| arg == "--schema") {
        print_schema();
        return;
    }

    let config = Arc::new(load_config());
    init_logging(&config.logging);

    if let Err(e) = startup::run(config).await {
        error!("Client failed: {}", e);
        std::process::exit(1);
    }
}
