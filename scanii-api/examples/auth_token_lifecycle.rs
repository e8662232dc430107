use scanii::auth::DEFAULT_TOKEN_TIMEOUT_SECS;
use scanii::{ScanSource, ScaniiClient, ScaniiConfig, SubmitOptions};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let config = ScaniiConfig::from_env()?;
    let client = ScaniiClient::new(config.clone())?;

    // Step 1: create a short lived token
    let token = client.create_auth_token(DEFAULT_TOKEN_TIMEOUT_SECS).await?;
    println!("🔑 Created token {}", token.resource_id);
    println!("   Expires: {}", token.expiration_date.as_deref().unwrap_or("-"));

    // Step 2: a client that only knows the token
    let token_client = ScaniiClient::with_auth_token(&config, &token)?;
    let result = token_client
        .process(ScanSource::bytes("hello from a token"), &SubmitOptions::new())
        .await?;
    println!("✅ Processed {} with the token, clean: {}", result.resource_id, result.is_clean());

    // Step 3: look it up again
    let retrieved = client.retrieve_auth_token(&token.resource_id).await?;
    println!("🔎 Token created at {}", retrieved.creation_date.as_deref().unwrap_or("-"));

    // Step 4: revoke it
    client.delete_auth_token(&token.resource_id).await?;
    println!("🗑️  Token deleted");

    Ok(())
}
