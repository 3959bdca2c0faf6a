//! Per-channel message store and lifecycle transitions.
//!
//! The store is owned exclusively by the pipeline task; every mutation is
//! an append or a full-sequence replace so interleaved completions (a scan
//! resolving while a poll rebuilds the sequence) stay last-write-wins.
//! Only the active channel's sequence is held in memory; switching
//! channels discards it and the next fetch rebuilds from server truth.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use tracing::debug;

use sentinel_shared::types::{
    Channel, ChannelHandle, ClientKey, DirectMessageBinding, Message, MessageStatus, RiskVerdict,
};

use crate::expiry;

/// Session-local message state: the active channel's ordered sequence,
/// the standing channel roster, and the direct-message bindings.
pub struct ChannelStore {
    active: ChannelHandle,
    messages: Vec<Message>,
    channels: Vec<Channel>,
    dms: Vec<DirectMessageBinding>,
}

impl ChannelStore {
    pub fn new(channels: Vec<Channel>, active: ChannelHandle) -> Self {
        Self {
            active,
            messages: Vec::new(),
            channels,
            dms: Vec::new(),
        }
    }

    pub fn active(&self) -> &ChannelHandle {
        &self.active
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn channels(&self) -> &[Channel] {
        &self.channels
    }

    pub fn direct_messages(&self) -> &[DirectMessageBinding] {
        &self.dms
    }

    /// Append a message to the active channel's sequence.
    ///
    /// Messages addressed to any other channel are dropped: they were
    /// produced by work scheduled before a channel switch.
    pub fn append(&mut self, message: Message) -> bool {
        if message.channel != self.active {
            debug!(
                channel = %message.channel,
                active = %self.active,
                "Dropping append for inactive channel"
            );
            return false;
        }
        self.messages.push(message);
        true
    }

    /// Apply a classification verdict to a scanning message.
    ///
    /// Transitions `Scanning → Sent` or `Scanning → Blocked` depending on
    /// whether the verdict blocks delivery.  Returns `None` (a logged
    /// no-op) when the message is gone (superseded by a poll), already
    /// terminal (duplicate resolution), or belongs to a channel that is no
    /// longer active.
    pub fn resolve(
        &mut self,
        channel: &ChannelHandle,
        key: ClientKey,
        verdict: RiskVerdict,
    ) -> Option<MessageStatus> {
        if *channel != self.active {
            debug!(key = %key, channel = %channel, "Resolution for inactive channel discarded");
            return None;
        }

        let message = match self.messages.iter_mut().find(|m| m.client_key == key) {
            Some(message) => message,
            None => {
                debug!(key = %key, "Resolution for unknown message discarded");
                return None;
            }
        };

        if message.status.is_terminal() {
            debug!(key = %key, status = ?message.status, "Duplicate resolution ignored");
            return None;
        }

        let status = if verdict.blocks() {
            MessageStatus::Blocked
        } else {
            MessageStatus::Sent
        };
        message.status = status;
        message.risk = Some(verdict);
        Some(status)
    }

    /// Replace the active sequence wholesale with a server snapshot.
    ///
    /// The server is authoritative for status and timestamps.  Expired
    /// messages are excluded, and locally-born messages whose client key
    /// the snapshot does not echo are carried over: the persistence
    /// endpoint has not confirmed them (still scanning, or resolved via
    /// the local fallback).  Returns the reconciled length, or `None` if
    /// the snapshot is for a channel that is no longer active.
    pub fn reconcile(
        &mut self,
        channel: &ChannelHandle,
        mut snapshot: Vec<Message>,
        now: DateTime<Utc>,
    ) -> Option<usize> {
        if *channel != self.active {
            debug!(channel = %channel, active = %self.active, "Stale snapshot discarded");
            return None;
        }

        expiry::retain_live(&mut snapshot, now);

        let echoed: HashSet<ClientKey> = snapshot.iter().map(|m| m.client_key).collect();
        let pending: Vec<Message> = self
            .messages
            .drain(..)
            .filter(|m| m.server_id.is_none() && !echoed.contains(&m.client_key))
            .collect();

        self.messages = snapshot;
        self.messages.extend(pending);
        Some(self.messages.len())
    }

    /// Make a different channel active, discarding the in-memory sequence.
    pub fn switch_channel(&mut self, channel: ChannelHandle) {
        debug!(from = %self.active, to = %channel, "Switching channel");
        self.active = channel;
        self.messages.clear();
    }

    /// Register a direct-message binding, once per channel handle.
    ///
    /// Returns `false` when the handle is already bound (resolution of an
    /// already-known counterpart just switches to the existing channel).
    pub fn register_dm(&mut self, binding: DirectMessageBinding) -> bool {
        if self.dms.iter().any(|dm| dm.handle == binding.handle) {
            return false;
        }
        self.dms.push(binding);
        true
    }

    /// Replace the binding list with the server's DM listing.
    pub fn replace_dms(&mut self, bindings: Vec<DirectMessageBinding>) {
        self.dms = bindings;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use sentinel_shared::classifier::classify;
    use sentinel_shared::types::Sender;

    use crate::compose::{outbound, Draft};

    fn store() -> ChannelStore {
        ChannelStore::new(Vec::new(), ChannelHandle::new("general"))
    }

    fn general() -> ChannelHandle {
        ChannelHandle::new("general")
    }

    fn server_copy(local: &Message, status: MessageStatus) -> Message {
        let mut copy = local.clone();
        copy.server_id = Some(100);
        copy.status = status;
        copy.risk = Some(RiskVerdict::benign("Analysis complete"));
        copy
    }

    #[test]
    fn test_submit_then_resolve_sent() {
        let mut store = store();
        let message = outbound(general(), &Draft::text("status report"), Utc::now());
        let key = message.client_key;
        assert!(store.append(message));

        let status = store.resolve(&general(), key, classify("status report"));
        assert_eq!(status, Some(MessageStatus::Sent));
        let resolved = &store.messages()[0];
        assert!(resolved.risk.is_some());
        assert_eq!(resolved.status, MessageStatus::Sent);
    }

    #[test]
    fn test_high_opsec_verdict_blocks() {
        let mut store = store();
        let message = outbound(general(), &Draft::text("deployment at 0600 tomorrow"), Utc::now());
        let key = message.client_key;
        store.append(message);

        let status = store.resolve(&general(), key, classify("deployment at 0600 tomorrow"));
        assert_eq!(status, Some(MessageStatus::Blocked));
    }

    #[test]
    fn test_resolve_is_idempotent() {
        let mut store = store();
        let message = outbound(general(), &Draft::text("hello"), Utc::now());
        let key = message.client_key;
        store.append(message);

        assert!(store.resolve(&general(), key, classify("hello")).is_some());
        let before = store.messages().to_vec();
        // Second resolution is a no-op, even with a contradictory verdict.
        assert!(store
            .resolve(&general(), key, classify("bomb"))
            .is_none());
        assert_eq!(store.messages(), &before[..]);
    }

    #[test]
    fn test_resolve_unknown_key_is_noop() {
        let mut store = store();
        assert!(store
            .resolve(&general(), ClientKey::new(), classify("hello"))
            .is_none());
    }

    #[test]
    fn test_resolve_after_switch_is_discarded() {
        let mut store = store();
        let message = outbound(general(), &Draft::text("hello"), Utc::now());
        let key = message.client_key;
        store.append(message);

        store.switch_channel(ChannelHandle::new("bravo"));
        assert!(store.resolve(&general(), key, classify("hello")).is_none());
        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_append_for_inactive_channel_is_dropped() {
        let mut store = store();
        let stray = outbound(ChannelHandle::new("bravo"), &Draft::text("late"), Utc::now());
        assert!(!store.append(stray));
        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_reconcile_replaces_wholesale_and_keeps_identity() {
        let mut store = store();
        let local = outbound(general(), &Draft::text("hello"), Utc::now());
        let key = local.client_key;
        store.append(local.clone());

        // The server persisted the message during scanning and echoes the
        // client key; the replaced copy keeps the same identity.
        let snapshot = vec![server_copy(&local, MessageStatus::Sent)];
        let count = store.reconcile(&general(), snapshot, Utc::now());
        assert_eq!(count, Some(1));
        assert_eq!(store.messages()[0].client_key, key);
        assert_eq!(store.messages()[0].server_id, Some(100));
        assert_eq!(store.messages()[0].status, MessageStatus::Sent);

        // The scan completing afterwards finds a terminal message: no-op.
        assert!(store.resolve(&general(), key, classify("hello")).is_none());
    }

    #[test]
    fn test_reconcile_carries_over_unpersisted_scanning() {
        let mut store = store();
        let pending = outbound(general(), &Draft::text("in flight"), Utc::now());
        let key = pending.client_key;
        store.append(pending);

        let other = server_copy(
            &outbound(general(), &Draft::text("older"), Utc::now()),
            MessageStatus::Sent,
        );
        let count = store.reconcile(&general(), vec![other], Utc::now());
        assert_eq!(count, Some(2));
        assert!(store
            .messages()
            .iter()
            .any(|m| m.client_key == key && m.is_scanning()));
    }

    #[test]
    fn test_reconcile_keeps_fallback_resolved_messages() {
        // A message resolved through the local classifier never reached
        // the persistence endpoint; the snapshot cannot echo it, but a
        // poll must not delete it either.
        let mut store = store();
        let message = outbound(general(), &Draft::text("hello"), Utc::now());
        let key = message.client_key;
        store.append(message);
        store.resolve(&general(), key, classify("hello"));

        let count = store.reconcile(&general(), Vec::new(), Utc::now());
        assert_eq!(count, Some(1));
        assert_eq!(store.messages()[0].status, MessageStatus::Sent);
    }

    #[test]
    fn test_reconcile_drops_expired_ttl() {
        let mut store = store();
        let mut expired = server_copy(
            &outbound(general(), &Draft::text("burn").with_ttl(10), Utc::now()),
            MessageStatus::Sent,
        );
        expired.timestamp = Utc::now() - Duration::seconds(11);

        let count = store.reconcile(&general(), vec![expired], Utc::now());
        assert_eq!(count, Some(0));
    }

    #[test]
    fn test_reconcile_for_inactive_channel_is_discarded() {
        let mut store = store();
        let stray = server_copy(
            &outbound(ChannelHandle::new("bravo"), &Draft::text("x"), Utc::now()),
            MessageStatus::Sent,
        );
        assert!(store
            .reconcile(&ChannelHandle::new("bravo"), vec![stray], Utc::now())
            .is_none());
        assert!(store.messages().is_empty());
    }

    #[test]
    fn test_switch_does_not_resurrect_discarded_messages() {
        let mut store = store();
        store.append(outbound(general(), &Draft::text("ephemeral"), Utc::now()));
        store.switch_channel(ChannelHandle::new("bravo"));
        store.switch_channel(general());

        // Back on the original channel the sequence is empty until the
        // server's snapshot says otherwise.
        assert!(store.messages().is_empty());
        let from_server = server_copy(
            &outbound(general(), &Draft::text("persisted"), Utc::now()),
            MessageStatus::Sent,
        );
        store.reconcile(&general(), vec![from_server], Utc::now());
        assert_eq!(store.messages().len(), 1);
        assert_eq!(store.messages()[0].text, "persisted");
    }

    #[test]
    fn test_register_dm_is_idempotent() {
        let mut store = store();
        let binding = DirectMessageBinding {
            handle: ChannelHandle::new("dm_3_5"),
            display_name: "Dana Ops".into(),
            status: "ENCRYPTED".into(),
        };
        assert!(store.register_dm(binding.clone()));
        assert!(!store.register_dm(binding));
        assert_eq!(store.direct_messages().len(), 1);
    }

    #[test]
    fn test_counterpart_messages_survive_reconcile() {
        let mut store = store();
        let mut inbound = server_copy(
            &outbound(general(), &Draft::text("Status report for sector 7?"), Utc::now()),
            MessageStatus::Sent,
        );
        inbound.sender = Sender::Counterpart;
        store.reconcile(&general(), vec![inbound], Utc::now());
        assert_eq!(store.messages()[0].sender, Sender::Counterpart);
    }
}
