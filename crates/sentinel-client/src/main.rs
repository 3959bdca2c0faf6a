//! # sentinel-client
//!
//! Terminal shell around the Sentinel message pipeline.  Reads drafts from
//! stdin, renders pipeline events, and exits when the session expires.
//!
//! Requires `SENTINEL_TOKEN` (bearer token issued by the credential
//! endpoint); see [`ClientConfig`] for the remaining environment knobs.

use anyhow::Context;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::info;
use tracing_subscriber::{fmt, EnvFilter};

use sentinel_api::{ApiClient, SessionContext};
use sentinel_client::compose::Draft;
use sentinel_client::events::PipelineEvent;
use sentinel_client::{spawn_pipeline, ClientConfig, PipelineError, PipelineHandle};
use sentinel_shared::types::ChannelHandle;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("sentinel_client=info,sentinel_api=info,warn"));

    fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .init();

    let token = std::env::var("SENTINEL_TOKEN")
        .context("SENTINEL_TOKEN must be set (bearer token from the credential endpoint)")?;

    let config = ClientConfig::from_env();
    info!(server = %config.server_url, channel = %config.initial_channel, "Starting Sentinel client");

    let session = SessionContext::new(token);
    let api = ApiClient::new(config.server_url.clone(), session);
    let (pipeline, mut events) = spawn_pipeline(config, api);

    println!("Commands: /channel <handle> | /dm <identifier> | /messages | /quit");
    println!("Anything else is submitted to the active channel. Prefix with /ttl <secs> to expire.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        tokio::select! {
            line = lines.next_line() => {
                match line? {
                    Some(line) => {
                        if !handle_line(&pipeline, line.trim()).await? {
                            break;
                        }
                    }
                    None => break,
                }
            }
            event = events.recv() => {
                match event {
                    Some(PipelineEvent::SessionExpired) => {
                        eprintln!("Session expired; re-authenticate and restart.");
                        break;
                    }
                    Some(event) => render(&event),
                    None => break,
                }
            }
        }
    }

    pipeline.shutdown().await;
    Ok(())
}

/// Returns `false` when the operator asked to quit.
async fn handle_line(pipeline: &PipelineHandle, line: &str) -> anyhow::Result<bool> {
    if line.is_empty() {
        return Ok(true);
    }

    if let Some(handle) = line.strip_prefix("/channel ") {
        pipeline
            .switch_channel(ChannelHandle::new(handle.trim()))
            .await?;
        return Ok(true);
    }

    if let Some(identifier) = line.strip_prefix("/dm ") {
        match pipeline.open_direct_message(identifier.trim()).await {
            Ok(binding) => {
                println!("Direct channel {} with {}", binding.handle, binding.display_name)
            }
            Err(PipelineError::ResolutionNotFound { identifier }) => {
                println!("No user matches {identifier}")
            }
            Err(e) => return Err(e.into()),
        }
        return Ok(true);
    }

    if line == "/messages" {
        for message in pipeline.snapshot().await? {
            let risk = message
                .risk
                .as_ref()
                .map(|r| format!("{:?}/{:?}", r.opsec_risk, r.phishing_risk))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "[{}] {:?} {:?} {} ({risk})",
                message.timestamp.format("%H:%M:%S"),
                message.sender,
                message.status,
                message.text,
            );
        }
        return Ok(true);
    }

    if line == "/quit" {
        return Ok(false);
    }

    let draft = match line.strip_prefix("/ttl ") {
        Some(rest) => {
            let mut parts = rest.splitn(2, ' ');
            let seconds: u32 = parts
                .next()
                .unwrap_or_default()
                .parse()
                .context("usage: /ttl <secs> <text>")?;
            Draft::text(parts.next().unwrap_or_default()).with_ttl(seconds)
        }
        None => Draft::text(line),
    };

    match pipeline.submit(draft).await {
        Ok(key) => println!("→ scanning ({})", key.short()),
        Err(PipelineError::EmptyDraft) => {}
        Err(e) => return Err(e.into()),
    }
    Ok(true)
}

fn render(event: &PipelineEvent) {
    match event {
        PipelineEvent::MessageAppended { message } => {
            println!("+ {:?} {:?}: {}", message.sender, message.status, message.text);
        }
        PipelineEvent::MessageResolved {
            client_key,
            status,
            verdict,
        } => {
            println!(
                "= {} → {:?} (opsec {:?}, phishing {:?}, ai {:.1})",
                client_key.short(),
                status,
                verdict.opsec_risk,
                verdict.phishing_risk,
                verdict.ai_score,
            );
        }
        PipelineEvent::ChannelSwitched { channel } => println!("# now on {channel}"),
        PipelineEvent::DirectMessageRegistered { binding } => {
            println!("# direct channel added: {} ({})", binding.display_name, binding.handle);
        }
        PipelineEvent::ChannelReconciled { .. } | PipelineEvent::SessionExpired => {}
    }
}
