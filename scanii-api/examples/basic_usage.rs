use std::time::Duration;

use scanii::{ScaniiClient, ScaniiConfig, SubmitOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // SCANII_CREDS=key:secret, SCANII_TARGET optional (e.g. v2.1-eu1)
    let config = ScaniiConfig::from_env()?
        .with_connect_timeout(Duration::from_secs(60))
        .with_request_timeout(Duration::from_secs(600));

    let client = ScaniiClient::new(config)?;

    if client.ping().await? {
        println!("Connected to {}", client.base_url());
    }

    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Cargo.toml".to_string());

    let options = SubmitOptions::new().with_metadata("source", "basic_usage");
    let result = client.process_file(&path, &options).await?;

    println!("File:     {path}");
    println!("Id:       {}", result.resource_id);
    println!("Checksum: {}", result.checksum.as_deref().unwrap_or("-"));
    if result.is_clean() {
        println!("Result:   clean");
    } else {
        println!("Result:   {}", result.findings.join(", "));
    }
    println!("Request:  {}", result.meta.request_id.as_deref().unwrap_or("-"));

    Ok(())
}
