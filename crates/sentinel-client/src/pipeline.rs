//! Pipeline orchestration with the tokio mpsc command/notification pattern.
//!
//! The event loop runs in a dedicated tokio task that exclusively owns the
//! [`ChannelStore`].  External code communicates through the typed
//! [`PipelineHandle`]; classification and auto-reply timers run in spawned
//! tasks that post commands back into the loop, so every state transition
//! still happens on the loop, one discrete event at a time.

use std::sync::Arc;

use chrono::Utc;
use tokio::sync::{mpsc, oneshot};
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

use sentinel_api::ApiError;
use sentinel_shared::classifier;
use sentinel_shared::constants::DM_STATUS;
use sentinel_shared::types::{
    ChannelHandle, ClientKey, DirectMessageBinding, Message, MessageStatus, RiskVerdict,
};

use crate::compose::{self, Draft};
use crate::config::ClientConfig;
use crate::error::PipelineError;
use crate::events::PipelineEvent;
use crate::gateway::ServerGateway;
use crate::store::ChannelStore;

/// Commands sent *into* the pipeline task.
#[derive(Debug)]
pub enum PipelineCommand {
    /// Submit a draft to the active channel; replies with the client key
    /// as soon as the message is appended in `Scanning` state.
    Submit {
        draft: Draft,
        reply: oneshot::Sender<ClientKey>,
    },
    /// A classification completed (posted by the scan task).
    Resolve {
        channel: ChannelHandle,
        client_key: ClientKey,
        verdict: RiskVerdict,
    },
    /// The auto-reply timer fired (posted by the reply task).
    SynthesizeReply { channel: ChannelHandle },
    /// Make a different channel active.
    SwitchChannel { channel: ChannelHandle },
    /// Resolve an identifier into a direct-message channel and switch to it.
    OpenDirectMessage {
        identifier: String,
        reply: oneshot::Sender<Result<DirectMessageBinding, PipelineError>>,
    },
    /// Request a copy of the active channel's message sequence.
    Snapshot {
        reply: oneshot::Sender<Vec<Message>>,
    },
    /// Request the active channel handle.
    ActiveChannel {
        reply: oneshot::Sender<ChannelHandle>,
    },
    /// Request the current direct-message bindings.
    ListDirectMessages {
        reply: oneshot::Sender<Vec<DirectMessageBinding>>,
    },
    /// The bearer token was rejected mid-flight (posted by a scan task).
    SessionExpired,
    /// Gracefully stop the pipeline.
    Shutdown,
}

/// Cloneable handle for talking to a running pipeline.
#[derive(Debug, Clone)]
pub struct PipelineHandle {
    tx: mpsc::Sender<PipelineCommand>,
}

impl PipelineHandle {
    /// Submit a draft.  Returns as soon as the message is appended in
    /// `Scanning` state; classification completes in the background.
    pub async fn submit(&self, draft: Draft) -> Result<ClientKey, PipelineError> {
        if draft.is_empty() {
            return Err(PipelineError::EmptyDraft);
        }
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::Submit { draft, reply })
            .await
            .map_err(|_| PipelineError::Closed)?;
        rx.await.map_err(|_| PipelineError::Closed)
    }

    /// Switch the active channel, discarding the previous sequence and
    /// triggering an immediate re-fetch.
    pub async fn switch_channel(&self, channel: ChannelHandle) -> Result<(), PipelineError> {
        self.tx
            .send(PipelineCommand::SwitchChannel { channel })
            .await
            .map_err(|_| PipelineError::Closed)
    }

    /// Resolve an identifier into a direct-message channel and switch to it.
    pub async fn open_direct_message(
        &self,
        identifier: impl Into<String>,
    ) -> Result<DirectMessageBinding, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::OpenDirectMessage {
                identifier: identifier.into(),
                reply,
            })
            .await
            .map_err(|_| PipelineError::Closed)?;
        rx.await.map_err(|_| PipelineError::Closed)?
    }

    /// A copy of the active channel's current message sequence.
    pub async fn snapshot(&self) -> Result<Vec<Message>, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::Snapshot { reply })
            .await
            .map_err(|_| PipelineError::Closed)?;
        rx.await.map_err(|_| PipelineError::Closed)
    }

    /// The currently active channel handle.
    pub async fn active_channel(&self) -> Result<ChannelHandle, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::ActiveChannel { reply })
            .await
            .map_err(|_| PipelineError::Closed)?;
        rx.await.map_err(|_| PipelineError::Closed)
    }

    /// The current direct-message bindings.
    pub async fn direct_messages(&self) -> Result<Vec<DirectMessageBinding>, PipelineError> {
        let (reply, rx) = oneshot::channel();
        self.tx
            .send(PipelineCommand::ListDirectMessages { reply })
            .await
            .map_err(|_| PipelineError::Closed)?;
        rx.await.map_err(|_| PipelineError::Closed)
    }

    /// Stop the pipeline.  Safe to call more than once.
    pub async fn shutdown(&self) {
        let _ = self.tx.send(PipelineCommand::Shutdown).await;
    }
}

/// Spawn the pipeline in a background tokio task.
///
/// Returns the command handle and the event stream.  The task stops on
/// [`PipelineHandle::shutdown`], on session expiry, or when every handle
/// and in-flight scan task has gone away.
pub fn spawn_pipeline<G: ServerGateway>(
    config: ClientConfig,
    gateway: G,
) -> (PipelineHandle, mpsc::Receiver<PipelineEvent>) {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<PipelineCommand>(256);
    let (event_tx, event_rx) = mpsc::channel::<PipelineEvent>(256);

    // Spawned scan/reply tasks hold weak senders so an abandoned pipeline
    // (all handles dropped) can still wind down.
    let internal_tx = cmd_tx.downgrade();
    let gateway = Arc::new(gateway);

    tokio::spawn(async move {
        let mut store =
            ChannelStore::new(config.channels.clone(), config.initial_channel.clone());

        // Load known DM bindings; failure is non-fatal short of a 401.
        match gateway.list_dms().await {
            Ok(entries) => store.replace_dms(
                entries
                    .into_iter()
                    .map(|entry| DirectMessageBinding {
                        handle: ChannelHandle::new(entry.id),
                        display_name: entry.name,
                        status: entry.status,
                    })
                    .collect(),
            ),
            Err(ApiError::Unauthorized) => {
                let _ = event_tx.send(PipelineEvent::SessionExpired).await;
                return;
            }
            Err(e) => warn!(error = %e, "Could not load direct-message list"),
        }

        // Initial fetch so the first sequence does not wait a full tick.
        if !poll_active(gateway.as_ref(), &mut store, &event_tx).await {
            let _ = event_tx.send(PipelineEvent::SessionExpired).await;
            return;
        }

        let mut poll = tokio::time::interval_at(
            tokio::time::Instant::now() + config.poll_interval,
            config.poll_interval,
        );
        poll.set_missed_tick_behavior(MissedTickBehavior::Skip);

        info!(channel = %store.active(), "Pipeline started");

        loop {
            tokio::select! {
                cmd = cmd_rx.recv() => {
                    match cmd {
                        Some(PipelineCommand::Submit { draft, reply }) => {
                            let message =
                                compose::outbound(store.active().clone(), &draft, Utc::now());
                            let key = message.client_key;
                            store.append(message.clone());
                            let _ = reply.send(key);
                            let _ = event_tx
                                .send(PipelineEvent::MessageAppended {
                                    message: message.clone(),
                                })
                                .await;
                            info!(key = %key.short(), channel = %message.channel, "Message submitted");

                            let request = compose::scan_request(&message, draft.reply_to);
                            let channel = message.channel.clone();
                            let gateway = Arc::clone(&gateway);
                            let tx = internal_tx.clone();
                            let scan_delay = config.scan_delay;
                            tokio::spawn(async move {
                                tokio::time::sleep(scan_delay).await;
                                let verdict = match gateway.scan(&request).await {
                                    Ok(response) => response.into_verdict(),
                                    Err(ApiError::Unauthorized) => {
                                        if let Some(tx) = tx.upgrade() {
                                            let _ =
                                                tx.send(PipelineCommand::SessionExpired).await;
                                        }
                                        return;
                                    }
                                    Err(e) => {
                                        warn!(
                                            error = %e,
                                            "Remote scan unavailable, using local classifier"
                                        );
                                        classifier::classify(&request.lines)
                                    }
                                };
                                if let Some(tx) = tx.upgrade() {
                                    let _ = tx
                                        .send(PipelineCommand::Resolve {
                                            channel,
                                            client_key: key,
                                            verdict,
                                        })
                                        .await;
                                }
                            });
                        }

                        Some(PipelineCommand::Resolve { channel, client_key, verdict }) => {
                            if let Some(status) =
                                store.resolve(&channel, client_key, verdict.clone())
                            {
                                info!(key = %client_key.short(), status = ?status, "Message resolved");
                                let _ = event_tx
                                    .send(PipelineEvent::MessageResolved {
                                        client_key,
                                        status,
                                        verdict,
                                    })
                                    .await;

                                if status == MessageStatus::Sent && config.auto_reply {
                                    let tx = internal_tx.clone();
                                    let delay = config.auto_reply_delay;
                                    tokio::spawn(async move {
                                        tokio::time::sleep(delay).await;
                                        if let Some(tx) = tx.upgrade() {
                                            let _ = tx
                                                .send(PipelineCommand::SynthesizeReply {
                                                    channel,
                                                })
                                                .await;
                                        }
                                    });
                                }
                            }
                        }

                        Some(PipelineCommand::SynthesizeReply { channel }) => {
                            // Dropped silently if the operator moved on.
                            if channel == *store.active() {
                                let reply = compose::canned_reply(channel, Utc::now());
                                store.append(reply.clone());
                                let _ = event_tx
                                    .send(PipelineEvent::MessageAppended { message: reply })
                                    .await;
                            }
                        }

                        Some(PipelineCommand::SwitchChannel { channel }) => {
                            if channel != *store.active() {
                                store.switch_channel(channel.clone());
                                let _ = event_tx
                                    .send(PipelineEvent::ChannelSwitched { channel })
                                    .await;
                                if !poll_active(gateway.as_ref(), &mut store, &event_tx).await {
                                    let _ =
                                        event_tx.send(PipelineEvent::SessionExpired).await;
                                    break;
                                }
                                poll.reset();
                            }
                        }

                        Some(PipelineCommand::OpenDirectMessage { identifier, reply }) => {
                            match gateway.provision_dm(&identifier).await {
                                Ok(dm) => {
                                    let binding = DirectMessageBinding {
                                        handle: ChannelHandle::new(dm.channel_id),
                                        display_name: dm.target_user.display_name(),
                                        status: DM_STATUS.to_string(),
                                    };
                                    if store.register_dm(binding.clone()) {
                                        let _ = event_tx
                                            .send(PipelineEvent::DirectMessageRegistered {
                                                binding: binding.clone(),
                                            })
                                            .await;
                                    }
                                    // Already-known handle that is active:
                                    // nothing to discard or re-fetch.
                                    if binding.handle != *store.active() {
                                        store.switch_channel(binding.handle.clone());
                                        let _ = event_tx
                                            .send(PipelineEvent::ChannelSwitched {
                                                channel: binding.handle.clone(),
                                            })
                                            .await;
                                        let _ = reply.send(Ok(binding));
                                        if !poll_active(gateway.as_ref(), &mut store, &event_tx)
                                            .await
                                        {
                                            let _ = event_tx
                                                .send(PipelineEvent::SessionExpired)
                                                .await;
                                            break;
                                        }
                                        poll.reset();
                                    } else {
                                        let _ = reply.send(Ok(binding));
                                    }
                                }
                                Err(ApiError::Unauthorized) => {
                                    let _ = reply.send(Err(PipelineError::Unauthorized));
                                    let _ = event_tx.send(PipelineEvent::SessionExpired).await;
                                    break;
                                }
                                Err(e) => {
                                    debug!(
                                        identifier = %identifier,
                                        error = %e,
                                        "Direct-message resolution failed"
                                    );
                                    let _ = reply.send(Err(
                                        PipelineError::ResolutionNotFound { identifier },
                                    ));
                                }
                            }
                        }

                        Some(PipelineCommand::Snapshot { reply }) => {
                            let _ = reply.send(store.messages().to_vec());
                        }

                        Some(PipelineCommand::ActiveChannel { reply }) => {
                            let _ = reply.send(store.active().clone());
                        }

                        Some(PipelineCommand::ListDirectMessages { reply }) => {
                            let _ = reply.send(store.direct_messages().to_vec());
                        }

                        Some(PipelineCommand::SessionExpired) => {
                            error!("Bearer token rejected, stopping pipeline");
                            let _ = event_tx.send(PipelineEvent::SessionExpired).await;
                            break;
                        }

                        Some(PipelineCommand::Shutdown) => {
                            info!("Pipeline shutdown requested");
                            break;
                        }

                        None => {
                            info!("All handles dropped, stopping pipeline");
                            break;
                        }
                    }
                }

                _ = poll.tick() => {
                    if !poll_active(gateway.as_ref(), &mut store, &event_tx).await {
                        let _ = event_tx.send(PipelineEvent::SessionExpired).await;
                        break;
                    }
                }
            }
        }

        info!("Pipeline stopped");
    });

    (PipelineHandle { tx: cmd_tx }, event_rx)
}

/// Fetch the active channel and reconcile the store against it.
///
/// Returns `false` only when the server rejected the session; every other
/// failure is logged and retried at the next tick.
async fn poll_active<G: ServerGateway>(
    gateway: &G,
    store: &mut ChannelStore,
    events: &mpsc::Sender<PipelineEvent>,
) -> bool {
    let channel = store.active().clone();
    match gateway.fetch_channel(&channel).await {
        Ok(records) => {
            let snapshot = records
                .into_iter()
                .map(|record| record.into_message(&channel))
                .collect();
            if let Some(count) = store.reconcile(&channel, snapshot, Utc::now()) {
                let _ = events
                    .send(PipelineEvent::ChannelReconciled { channel, count })
                    .await;
            }
            true
        }
        Err(ApiError::Unauthorized) => {
            error!(channel = %channel, "Poll rejected: session expired");
            false
        }
        Err(e) => {
            warn!(channel = %channel, error = %e, "Poll failed, retrying next tick");
            true
        }
    }
}
