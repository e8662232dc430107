use scanii::{PollPolicy, ScanSource, ScaniiClient, ScaniiConfig, SubmitOptions, poll_for_result};

const EICAR: &str =
    "X5O!P%@AP[4\\PZX54(P^)7CC)7}$EICAR-STANDARD-ANTIVIRUS-TEST-FILE!$H+H*\n";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let client = ScaniiClient::new(ScaniiConfig::from_env()?)?;

    println!("🔧 Asynchronous Scan Lifecycle Example\n");

    // Step 1: submit, the service answers before processing
    println!("📤 Step 1: Submitting EICAR test content...");
    let options = SubmitOptions::new()
        .with_metadata("example", "async_scan_lifecycle")
        .with_callback("https://httpbin.org/post");
    let pending = client
        .process_async(ScanSource::bytes(EICAR), &options)
        .await?;

    println!("✅ Accepted:");
    println!("   Id: {}", pending.resource_id);
    if let Some(location) = pending.resource_location() {
        println!("   Location: {location}");
    }

    // Step 2: retrieve answers 404 until the result is ready
    println!("\n⏳ Step 2: Waiting for the result...");
    match poll_for_result(&client, &pending.resource_id, &PollPolicy::default()).await {
        Ok(result) => {
            println!("✅ Result ready:");
            println!("   Findings: {:?}", result.findings);
            println!("   Metadata: {:?}", result.metadata);
            println!("   Created:  {}", result.creation_date.as_deref().unwrap_or("-"));
        }
        Err(e) if e.is_not_found() => {
            eprintln!("❌ Result still not available, try again later: {e}");
        }
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
