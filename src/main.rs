use tokio::net::TcpListener;

use impostor::config::Config;
use impostor::metrics::register_metrics;
use impostor::startup::create_web_server;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    std_logger::Config::logfmt().init();
    register_metrics();

    let config = Config::get()?;
    let address = format!("{}:{}", config.application.host, config.application.port);
    let listener = TcpListener::bind(&address).await?;

    create_web_server(config, listener).await?;
    Ok(())
}
