//! Command implementations for roloctl.

use anyhow::{bail, Context, Result};
use rolo_common::api::{ChatReply, ChatRequest, ChatStatus, ContactsResponse, HealthResponse};
use std::time::Duration;

// The chat path waits on the model; give it more room than the rest.
const CHAT_TIMEOUT: Duration = Duration::from_secs(120);
const API_TIMEOUT: Duration = Duration::from_secs(10);

fn client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to create HTTP client")
}

pub async fn chat(addr: &str, prompt: &str) -> Result<()> {
    if prompt.trim().is_empty() {
        bail!("empty prompt; try: roloctl chat add Adam 555-1234");
    }

    let reply: ChatReply = client(CHAT_TIMEOUT)?
        .post(format!("{addr}/api/chat"))
        .json(&ChatRequest {
            prompt: prompt.to_string(),
        })
        .send()
        .await
        .with_context(|| format!("daemon not reachable at {addr}"))?
        .error_for_status()
        .context("daemon returned an error")?
        .json()
        .await
        .context("invalid response from daemon")?;

    match reply.status {
        ChatStatus::Info => {
            println!("{}", reply.message.as_str().unwrap_or_default());
        }
        ChatStatus::Success | ChatStatus::Fail => {
            if let Some(action) = &reply.action {
                println!("action: {action}");
            }
            match reply.message.as_str() {
                Some(text) => println!("{text}"),
                None => println!("{}", serde_json::to_string_pretty(&reply.message)?),
            }
        }
    }
    Ok(())
}

pub async fn list(addr: &str) -> Result<()> {
    let response: ContactsResponse = client(API_TIMEOUT)?
        .get(format!("{addr}/api/contacts"))
        .send()
        .await
        .with_context(|| format!("daemon not reachable at {addr}"))?
        .error_for_status()
        .context("daemon returned an error")?
        .json()
        .await
        .context("invalid response from daemon")?;

    if response.data.is_empty() {
        println!("No contacts.");
        return Ok(());
    }

    for contact in &response.data {
        println!("{:<24} {}", contact.name, contact.phone);
    }
    Ok(())
}

pub async fn status(addr: &str) -> Result<()> {
    let health: HealthResponse = client(API_TIMEOUT)?
        .get(format!("{addr}/api/health"))
        .send()
        .await
        .with_context(|| format!("daemon not reachable at {addr}"))?
        .error_for_status()
        .context("daemon returned an error")?
        .json()
        .await
        .context("invalid response from daemon")?;

    println!("status:   {}", health.status);
    println!("version:  {}", health.version);
    println!("uptime:   {}s", health.uptime_seconds);
    println!("contacts: {}", health.contacts);
    Ok(())
}
