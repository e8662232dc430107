use scanii::{PollPolicy, ScaniiClient, ScaniiConfig, SubmitOptions, poll_for_result};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let client = ScaniiClient::new(ScaniiConfig::from_env()?)?;

    let location = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "https://scanii.s3.amazonaws.com/eicarcom2.zip".to_string());

    println!("🌐 Asking the service to fetch {location}");
    let pending = client
        .fetch(
            &location,
            &SubmitOptions::new().with_metadata("example", "fetch_lifecycle"),
        )
        .await?;
    println!("✅ Accepted as {}", pending.resource_id);

    let result = poll_for_result(&client, &pending.resource_id, &PollPolicy::default()).await?;

    println!("   Content type:   {}", result.content_type.as_deref().unwrap_or("-"));
    println!(
        "   Content length: {}",
        result.content_length.map_or_else(|| "-".to_string(), |l| l.to_string())
    );
    println!("   Checksum:       {}", result.checksum.as_deref().unwrap_or("-"));
    println!("   Findings:       {:?}", result.findings);

    Ok(())
}
