//! End-to-end synchronization scenarios through a scripted network client.
//!
//! Each test drives the public [`ChatSession`] surface: optimistic
//! mutations through the coordinator, connectivity flips through session
//! state, and replays through the background sync pass. The scripted
//! client can be switched between confirming calls, failing them
//! transiently, and rejecting them permanently.

#![allow(clippy::unwrap_used)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use palaver_core::{
    ChatApi, ChatError, ChatResult, Cid, Clock, Message, Reaction, SyncStatus, User,
    clock::test_utils::FixedClock,
};
use palaver_state::ConnectionState;
use palaver_sync::ChatSession;

/// How the scripted client answers the next calls.
#[derive(Clone, Copy, Default)]
enum Mode {
    /// Confirm with server stamps.
    #[default]
    Confirm,
    /// Fail as a dropped connection.
    Transient,
    /// Reject as a server-side validation failure.
    Permanent,
}

/// Scripted [`ChatApi`] that records every call it receives.
#[derive(Default)]
struct ScriptedApi {
    mode: Mutex<Mode>,
    calls: Mutex<Vec<String>>,
}

impl ScriptedApi {
    fn set_mode(&self, mode: Mode) {
        *self.mode.lock().unwrap() = mode;
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    fn answer<T>(&self, call: String, confirmed: T) -> ChatResult<T> {
        self.calls.lock().unwrap().push(call);
        match *self.mode.lock().unwrap() {
            Mode::Confirm => Ok(confirmed),
            Mode::Transient => Err(ChatError::transient_network("socket closed")),
            Mode::Permanent => Err(ChatError::permanent_network(400, "rejected")),
        }
    }
}

fn server_stamp() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 1, 1, 0, 5, 0).single().unwrap()
}

#[async_trait]
impl ChatApi for ScriptedApi {
    async fn send_message(&self, message: &Message) -> ChatResult<Message> {
        let mut confirmed = message.clone();
        confirmed.created_at = Some(server_stamp());
        self.answer(format!("send {}", message.id), confirmed)
    }

    async fn update_message(&self, message: &Message) -> ChatResult<Message> {
        let mut confirmed = message.clone();
        confirmed.updated_at = Some(server_stamp());
        self.answer(format!("update {}", message.id), confirmed)
    }

    async fn delete_message(&self, message_id: &str, _hard: bool) -> ChatResult<Message> {
        let confirmed = Message {
            id: message_id.into(),
            cid: cid(),
            deleted_at: Some(server_stamp()),
            ..Message::default()
        };
        self.answer(format!("delete {message_id}"), confirmed)
    }

    async fn send_reaction(&self, reaction: &Reaction, _enforce_unique: bool) -> ChatResult<Reaction> {
        let mut confirmed = reaction.clone();
        confirmed.created_at = Some(server_stamp());
        self.answer(format!("react {} {}", reaction.message_id, reaction.kind), confirmed)
    }

    async fn delete_reaction(&self, message_id: &str, kind: &str) -> ChatResult<Message> {
        let confirmed = Message { id: message_id.into(), cid: cid(), ..Message::default() };
        self.answer(format!("unreact {message_id} {kind}"), confirmed)
    }

    async fn mark_read(&self, target: &Cid) -> ChatResult<()> {
        self.answer(format!("read {target}"), ())
    }

    async fn start_typing(&self, target: &Cid, _parent_id: Option<&str>) -> ChatResult<()> {
        self.answer(format!("typing {target}"), ())
    }

    async fn stop_typing(&self, target: &Cid) -> ChatResult<()> {
        self.answer(format!("stop-typing {target}"), ())
    }

    async fn send_giphy(&self, message: &Message) -> ChatResult<Message> {
        let mut confirmed = message.clone();
        confirmed.created_at = Some(server_stamp());
        self.answer(format!("giphy {}", message.id), confirmed)
    }

    async fn shuffle_giphy(&self, message: &Message) -> ChatResult<Message> {
        self.answer(format!("shuffle {}", message.id), message.clone())
    }
}

fn cid() -> Cid {
    Cid::new("messaging", "general")
}

fn draft(id: &str) -> Message {
    Message { id: id.into(), cid: cid(), text: "hi".into(), ..Message::default() }
}

/// Confirmed message already living on the server.
fn confirmed(id: &str) -> Message {
    Message {
        id: id.into(),
        cid: cid(),
        text: "hi".into(),
        user: User::new("me"),
        sync_status: SyncStatus::Completed,
        created_at: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap()),
        ..Message::default()
    }
}

fn connected_session() -> (ChatSession, Arc<ScriptedApi>, Arc<FixedClock>) {
    let api = Arc::new(ScriptedApi::default());
    let clock = Arc::new(FixedClock::new());
    let api_handle: Arc<dyn ChatApi> = api.clone();
    let clock_handle: Arc<dyn Clock> = clock.clone();
    let session = ChatSession::sign_in(api_handle, User::new("me"), clock_handle);
    session.set_connection(ConnectionState::Connected);
    (session, api, clock)
}

#[tokio::test]
async fn offline_delete_replays_to_completed_on_reconnect() {
    let (session, api, clock) = connected_session();
    session.set_connection(ConnectionState::Offline);
    api.set_mode(Mode::Transient);

    let channel = session.registry().channel("messaging", "general");
    channel.upsert_message(confirmed("m1"));

    let result = session.coordinator().delete_message(confirmed("m1"), false).await;
    assert!(result.is_err());

    let stored = channel.message("m1").unwrap();
    assert_eq!(stored.sync_status, SyncStatus::SyncNeeded);
    assert!(stored.deleted_at.is_some());

    // Reconnect: the pending delete goes back through the client.
    session.set_connection(ConnectionState::Connected);
    api.set_mode(Mode::Confirm);
    clock.advance_millis(60_000);
    session.coordinator().sync_pending().await;

    let stored = channel.message("m1").unwrap();
    assert_eq!(stored.sync_status, SyncStatus::Completed);
    assert!(stored.deleted_at.is_some());
    assert_eq!(api.calls(), vec!["delete m1".to_string(), "delete m1".to_string()]);
}

#[tokio::test]
async fn offline_send_replays_to_completed_on_reconnect() {
    let (session, api, _clock) = connected_session();
    session.set_connection(ConnectionState::Offline);
    api.set_mode(Mode::Transient);

    let result = session.coordinator().send_message(draft("m1")).await;
    assert!(result.is_err());

    let channel = session.registry().channel("messaging", "general");
    let stored = channel.message("m1").unwrap();
    assert_eq!(stored.sync_status, SyncStatus::SyncNeeded);
    assert!(stored.created_at.is_none());
    assert!(stored.created_locally_at.is_some());

    session.set_connection(ConnectionState::Connected);
    api.set_mode(Mode::Confirm);
    session.coordinator().sync_pending().await;

    let stored = channel.message("m1").unwrap();
    assert_eq!(stored.sync_status, SyncStatus::Completed);
    assert_eq!(stored.created_at, Some(server_stamp()));
}

#[tokio::test]
async fn permanent_send_failure_is_never_retried() {
    let (session, api, _clock) = connected_session();
    api.set_mode(Mode::Permanent);

    let result = session.coordinator().send_message(draft("m1")).await;
    assert!(result.is_err());

    let channel = session.registry().channel("messaging", "general");
    assert_eq!(channel.message("m1").unwrap().sync_status, SyncStatus::FailedPermanently);

    api.set_mode(Mode::Confirm);
    session.coordinator().sync_pending().await;
    session.coordinator().sync_pending().await;

    assert_eq!(channel.message("m1").unwrap().sync_status, SyncStatus::FailedPermanently);
    assert_eq!(api.calls(), vec!["send m1".to_string()]);
}

#[tokio::test]
async fn edit_keeps_channel_and_thread_copies_identical() {
    let (session, _api, _clock) = connected_session();

    let mut reply = confirmed("r1");
    reply.parent_id = Some("root".into());
    reply.show_in_channel = true;
    let channel = session.registry().channel("messaging", "general");
    let thread = session.registry().thread("root");
    channel.upsert_message(reply.clone());
    thread.upsert_message(reply.clone());

    reply.text = "edited".into();
    let result = session.coordinator().edit_message(reply).await;
    assert!(result.is_ok());

    let in_channel = channel.message("r1").unwrap();
    let in_thread = thread.message("r1").unwrap();
    assert_eq!(in_channel, in_thread);
    assert_eq!(in_channel.text, "edited");
    assert_eq!(in_channel.sync_status, SyncStatus::Completed);
}

#[tokio::test]
async fn unique_reaction_supersedes_previous_kind_end_to_end() {
    let (session, _api, _clock) = connected_session();
    let channel = session.registry().channel("messaging", "general");
    channel.upsert_message(confirmed("m1"));
    let target = channel.message("m1").unwrap();

    let like = Reaction { message_id: "m1".into(), kind: "like".into(), ..Reaction::default() };
    session.coordinator().send_reaction(&target, like, true).await.unwrap();
    let wow = Reaction { message_id: "m1".into(), kind: "wow".into(), ..Reaction::default() };
    session.coordinator().send_reaction(&target, wow, true).await.unwrap();

    let stored = channel.message("m1").unwrap();
    assert_eq!(stored.own_reactions.len(), 1);
    assert_eq!(stored.own_reactions[0].kind, "wow");
    assert_eq!(stored.own_reactions[0].sync_status, SyncStatus::Completed);
    assert!(!stored.reaction_groups.contains_key("like"));
}

#[tokio::test]
async fn typing_cooldown_blocks_until_elapsed() {
    let (session, api, clock) = connected_session();
    session.registry().channel("messaging", "general");

    session.coordinator().start_typing(&cid(), None).await.unwrap();

    clock.advance_millis(1_000);
    assert!(session.coordinator().start_typing(&cid(), None).await.is_err());

    clock.advance_millis(2_001);
    assert!(session.coordinator().start_typing(&cid(), None).await.is_ok());

    // The rejected attempt never reached the network.
    assert_eq!(api.calls().len(), 2);
}

#[tokio::test]
async fn precondition_failure_touches_no_state() {
    let (session, api, _clock) = connected_session();

    let mut empty = draft("m1");
    empty.text = String::new();
    let result = session.coordinator().send_message(empty).await;
    assert!(result.is_err());

    // Stopping typing on a channel the session never touched fails the
    // precheck and must not produce a container either.
    let cid = palaver_core::Cid::new("messaging", "general");
    assert!(session.coordinator().stop_typing(&cid).await.is_err());

    assert!(session.registry().channels().is_empty());
    assert!(api.calls().is_empty());
}
