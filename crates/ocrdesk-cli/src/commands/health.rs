//! `ocrdesk health` - Check that the backend answers.

use ocrdesk_core::OcrdeskConfig;

pub async fn run(config: &OcrdeskConfig) -> anyhow::Result<()> {
    let client = super::api_client(config)?;
    let health = client.health_check().await?;

    if health.is_healthy() {
        println!("✔ Backend {} is healthy", client.base_url());
    } else {
        println!("⚠️  Backend {} reports status: {}", client.base_url(), health.status);
    }
    for (key, value) in &health.extra {
        println!("  {key}: {value}");
    }

    if !health.is_healthy() {
        anyhow::bail!("backend is not healthy");
    }
    Ok(())
}
