use bayrou_meter::api::ApiClient;
use bayrou_meter::config::Config;
use bayrou_meter::runtime::{get_logger, set_logger};
use bayrou_meter::shell::Shell;
use evlog::{meta, LogEventConsolePrinter, Logger};
use tokio::io::BufReader;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();

    let mut logger = Logger::default();
    logger.register(LogEventConsolePrinter::default());
    set_logger(logger);

    let config = Config::from_env()?;

    get_logger().info("Starting Bayrou Meter.", meta![
        "ApiURL" => config.api_url.clone(),
        "PollIntervalMs" => config.poll_interval.as_millis(),
        "RequestTimeoutMs" => config.request_timeout.as_millis(),
    ]);

    let client = ApiClient::from_config(&config)?;

    let mut shell = Shell::new(client, config.poll_interval);
    if let Err(e) = shell.run(BufReader::new(tokio::io::stdin()), tokio::io::stdout()).await {
        get_logger().error("Shell stopped on error.", meta![
            "Error" => e.to_string(),
        ]);
        return Err(e);
    }

    Ok(())
}
