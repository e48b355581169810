//! Per-connection event loop.
//!
//! `run_session` drives one open connection until it ends: it dispatches
//! server pushes into [`ChatState`], executes user commands, polls
//! presence every five seconds and ticks the typing debounce. Socket
//! errors never escape as panics or propagated errors — the loop returns
//! a [`SessionEnd`] and the runner decides what happens next.

use std::time::Duration;

use tokio::sync::mpsc;

use codethrone_shared::time::Clock;

use crate::domain::composer::can_compose;
use crate::domain::connection::ConnectionStatus;
use crate::domain::entity::{ChatMessage, OnlineUser, Room};
use crate::domain::value_object::{AuthToken, RoomId, UserId};
use crate::infrastructure::dto::websocket::{
    AuthPayload, ClientEvent, JoinRoomPayload, JoinRoomsPayload, ReactToMessagePayload,
    ServerEvent, TypingPayload, CreatePrivateChatPayload,
};
use crate::infrastructure::dto::http::ChatMessageDto;
use crate::infrastructure::http::{ApiClient, ApiError};
use crate::infrastructure::websocket::{InboundFrame, SocketTransport, TransportError};

use super::state::ChatState;

/// How often the online-user list is requested while connected
pub const PRESENCE_POLL_INTERVAL: Duration = Duration::from_secs(5);

/// Granularity of the typing-deadline check
const TYPING_TICK: Duration = Duration::from_millis(250);

/// User actions fed into the session
#[derive(Debug)]
pub enum ChatCommand {
    /// Send the given text to the active room (REST)
    SendMessage { content: String },
    /// A keystroke in the composer; drives the typing debounce
    InputActivity,
    /// Switch the active room: join it on the socket and fetch history
    SetActiveRoom { room_id: RoomId },
    /// Join a room the user is not yet a member of (REST + socket)
    JoinRoom { room_id: RoomId },
    /// React to a message in the active room
    React { message_id: String, emoji: String },
    /// Ask the server to open a private room with the given user
    StartPrivateChat { target_user_id: String },
    /// Manual retry; only meaningful after the retry budget ran out
    Retry,
    /// Tear the session down
    Close,
}

/// What the view layer renders
#[derive(Debug)]
pub enum ChatNotification {
    StatusChanged {
        status: ConnectionStatus,
        last_error: Option<String>,
    },
    /// Retry budget exhausted; only a manual retry continues
    GaveUp { last_error: Option<String> },
    MessageReceived(ChatMessage),
    /// An existing message changed (edit or reaction)
    MessageUpdated { message_id: String },
    TypingChanged { room_id: RoomId, users: Vec<String> },
    OnlineUsers(Vec<OnlineUser>),
    RoomJoined { room_id: RoomId },
    PrivateRoomCreated(Room),
    /// The active room needs a join action before composing
    JoinRequired { room_id: RoomId },
    ServerError(String),
    SendFailed(String),
}

/// Why a live session ended
#[derive(Debug)]
pub(crate) enum SessionEnd {
    LocalClose,
    RemoteClose { server_initiated: bool },
    TransportFailed { reason: String },
}

/// Handshake and membership announcement, in order: the `auth` payload,
/// one batched `joinRooms` for every known room, then `joinRoom` for the
/// active room.
pub(crate) async fn announce_membership(
    transport: &mut dyn SocketTransport,
    token: &AuthToken,
    user_id: &UserId,
    state: &ChatState,
) -> Result<(), TransportError> {
    transport
        .send(&ClientEvent::Auth(AuthPayload {
            token: token.as_str().to_string(),
            user_id: user_id.as_str().to_string(),
        }))
        .await?;
    transport
        .send(&ClientEvent::JoinRooms(JoinRoomsPayload {
            room_ids: state.known_room_ids(),
        }))
        .await?;
    if let Some(active) = state.active_room() {
        transport
            .send(&ClientEvent::JoinRoom(JoinRoomPayload {
                room_id: active.as_str().to_string(),
            }))
            .await?;
    }
    Ok(())
}

/// Drive one open connection until it ends.
pub(crate) async fn run_session(
    transport: &mut dyn SocketTransport,
    frames: &mut mpsc::UnboundedReceiver<InboundFrame>,
    api: &ApiClient,
    state: &mut ChatState,
    commands: &mut mpsc::UnboundedReceiver<ChatCommand>,
    notifications: &mpsc::UnboundedSender<ChatNotification>,
    clock: &dyn Clock,
) -> SessionEnd {
    let mut presence = tokio::time::interval(PRESENCE_POLL_INTERVAL);
    let mut typing_tick = tokio::time::interval(TYPING_TICK);
    let (send_result_tx, mut send_result_rx) =
        mpsc::unbounded_channel::<Result<ChatMessageDto, ApiError>>();

    loop {
        tokio::select! {
            maybe_frame = frames.recv() => {
                match maybe_frame {
                    Some(InboundFrame::Event(event)) => {
                        handle_server_event(event, state, notifications, clock);
                    }
                    Some(InboundFrame::Unknown(text)) => {
                        tracing::debug!("Ignoring unrecognized frame: {}", text);
                    }
                    Some(InboundFrame::Closed { server_initiated }) => {
                        return SessionEnd::RemoteClose { server_initiated };
                    }
                    Some(InboundFrame::Failed { reason }) => {
                        return SessionEnd::TransportFailed { reason };
                    }
                    None => {
                        return SessionEnd::TransportFailed {
                            reason: "read task ended unexpectedly".to_string(),
                        };
                    }
                }
            }
            maybe_command = commands.recv() => {
                match maybe_command {
                    Some(ChatCommand::Close) | None => {
                        transport.close().await;
                        return SessionEnd::LocalClose;
                    }
                    Some(command) => {
                        handle_command(
                            command,
                            transport,
                            api,
                            state,
                            notifications,
                            &send_result_tx,
                            clock,
                        )
                        .await;
                    }
                }
            }
            maybe_result = send_result_rx.recv() => {
                // send_result_tx is held by this scope, so recv never
                // yields None here
                if let Some(result) = maybe_result {
                    match result {
                        Ok(_message) => {
                            // The broadcast copy arrives as newMessage;
                            // only clear the draft and reply context
                            state.composer.complete_send();
                        }
                        Err(e) => {
                            state.composer.fail_send();
                            tracing::error!("Message send failed: {}", e);
                            let _ = notifications.send(ChatNotification::SendFailed(e.to_string()));
                        }
                    }
                }
            }
            _ = presence.tick() => {
                if let Err(e) = transport.send(&ClientEvent::RequestOnlineUsers).await {
                    tracing::warn!("Presence request failed: {}", e);
                }
            }
            _ = typing_tick.tick() => {
                if state.debounce.on_tick(clock.now_millis())
                    && let Some(room_id) = state.active_room()
                {
                    let event = ClientEvent::Typing(TypingPayload {
                        room_id: room_id.as_str().to_string(),
                        is_typing: false,
                    });
                    if let Err(e) = transport.send(&event).await {
                        tracing::warn!("Typing stop signal failed: {}", e);
                    }
                }
            }
        }
    }
}

fn handle_server_event(
    event: ServerEvent,
    state: &mut ChatState,
    notifications: &mpsc::UnboundedSender<ChatNotification>,
    clock: &dyn Clock,
) {
    match event {
        ServerEvent::NewMessage(dto) => {
            let message: ChatMessage = dto.into();
            state.roster.append_message(message.clone());
            let _ = notifications.send(ChatNotification::MessageReceived(message));
        }
        ServerEvent::UserTyping(dto) => {
            let Ok(room_id) = RoomId::new(dto.room_id) else {
                return;
            };
            let Ok(user_id) = UserId::new(dto.user_id) else {
                return;
            };
            let now = clock.now_millis();
            state
                .indicators
                .observe(room_id.clone(), user_id, dto.username, dto.is_typing, now);
            let users = state.indicators.active_in(&room_id, now);
            let _ = notifications.send(ChatNotification::TypingChanged { room_id, users });
        }
        ServerEvent::MessageReaction(dto) => {
            state.roster.apply_reactions(
                &dto.message_id,
                dto.reactions.into_iter().map(Into::into).collect(),
            );
            let _ = notifications.send(ChatNotification::MessageUpdated {
                message_id: dto.message_id,
            });
        }
        ServerEvent::MessageEdited(dto) => {
            state
                .roster
                .apply_edit(&dto.message_id, dto.content, dto.edited_at);
            let _ = notifications.send(ChatNotification::MessageUpdated {
                message_id: dto.message_id,
            });
        }
        ServerEvent::PrivateRoomCreated(dto) => {
            let room: Room = dto.into();
            state.roster.upsert_room(room.clone());
            let _ = notifications.send(ChatNotification::PrivateRoomCreated(room));
        }
        ServerEvent::JoinedRoom(dto) => {
            if let Ok(room_id) = RoomId::new(dto.room_id) {
                let _ = notifications.send(ChatNotification::RoomJoined { room_id });
            }
        }
        ServerEvent::OnlineUsers(list) => {
            state.online = list.into_iter().map(Into::into).collect();
            let _ = notifications.send(ChatNotification::OnlineUsers(state.online.clone()));
        }
        ServerEvent::Error(dto) => {
            tracing::warn!("Server reported: {}", dto.message);
            let _ = notifications.send(ChatNotification::ServerError(dto.message));
        }
    }
}

async fn handle_command(
    command: ChatCommand,
    transport: &mut dyn SocketTransport,
    api: &ApiClient,
    state: &mut ChatState,
    notifications: &mpsc::UnboundedSender<ChatNotification>,
    send_result_tx: &mpsc::UnboundedSender<Result<ChatMessageDto, ApiError>>,
    clock: &dyn Clock,
) {
    match command {
        ChatCommand::SendMessage { content } => {
            send_message(content, api, state, notifications, send_result_tx);
        }
        ChatCommand::InputActivity => {
            if state.debounce.on_input(clock.now_millis())
                && let Some(room_id) = state.active_room()
            {
                let event = ClientEvent::Typing(TypingPayload {
                    room_id: room_id.as_str().to_string(),
                    is_typing: true,
                });
                if let Err(e) = transport.send(&event).await {
                    tracing::warn!("Typing start signal failed: {}", e);
                }
            }
        }
        ChatCommand::SetActiveRoom { room_id } => {
            state.set_active_room(room_id.clone());
            let event = ClientEvent::JoinRoom(JoinRoomPayload {
                room_id: room_id.as_str().to_string(),
            });
            if let Err(e) = transport.send(&event).await {
                tracing::warn!("Room join signal failed: {}", e);
            }
            match api.room_messages(room_id.as_str()).await {
                Ok(dtos) => {
                    let history: Vec<ChatMessage> = dtos.into_iter().map(Into::into).collect();
                    state.roster.set_history(room_id, history);
                }
                Err(e) => {
                    tracing::warn!("History fetch for room '{}' failed: {}", room_id.as_str(), e);
                }
            }
        }
        ChatCommand::JoinRoom { room_id } => {
            match api.join_chat_room(room_id.as_str()).await {
                Ok(()) => {
                    let event = ClientEvent::JoinRoom(JoinRoomPayload {
                        room_id: room_id.as_str().to_string(),
                    });
                    if let Err(e) = transport.send(&event).await {
                        tracing::warn!("Room join signal failed: {}", e);
                    }
                    let _ = notifications.send(ChatNotification::RoomJoined { room_id });
                }
                Err(e) => {
                    tracing::error!("Joining room '{}' failed: {}", room_id.as_str(), e);
                    let _ = notifications.send(ChatNotification::ServerError(e.to_string()));
                }
            }
        }
        ChatCommand::React { message_id, emoji } => {
            let Some(room_id) = state.active_room() else {
                return;
            };
            let event = ClientEvent::ReactToMessage(ReactToMessagePayload {
                room_id: room_id.as_str().to_string(),
                message_id,
                emoji,
            });
            if let Err(e) = transport.send(&event).await {
                tracing::warn!("Reaction signal failed: {}", e);
            }
        }
        ChatCommand::StartPrivateChat { target_user_id } => {
            let event = ClientEvent::CreatePrivateChat(CreatePrivateChatPayload { target_user_id });
            if let Err(e) = transport.send(&event).await {
                tracing::warn!("Private chat request failed: {}", e);
            }
        }
        ChatCommand::Retry => {
            // Only meaningful while disconnected; the runner handles it
        }
        ChatCommand::Close => {
            // Handled by the caller before dispatching here
        }
    }
}

/// Start a message send if the composer allows it. The REST call runs in
/// its own task so a second invocation while it is outstanding can be
/// ignored instead of queued.
fn send_message(
    content: String,
    api: &ApiClient,
    state: &mut ChatState,
    notifications: &mpsc::UnboundedSender<ChatNotification>,
    send_result_tx: &mpsc::UnboundedSender<Result<ChatMessageDto, ApiError>>,
) {
    let Some(room_id) = state.active_room().cloned() else {
        let _ = notifications.send(ChatNotification::SendFailed(
            "no active room selected".to_string(),
        ));
        return;
    };

    if let Some(room) = state.roster.room(&room_id)
        && !can_compose(room, state.user_id())
    {
        let _ = notifications.send(ChatNotification::JoinRequired { room_id });
        return;
    }

    if state.composer.is_in_flight() {
        tracing::debug!("Send ignored: another send is still outstanding");
        return;
    }

    state.composer.set_draft(content);
    let Some(draft) = state.composer.begin_send() else {
        return;
    };

    let api = api.clone();
    let result_tx = send_result_tx.clone();
    tokio::spawn(async move {
        let result = api
            .post_room_message(room_id.as_str(), &draft.content, draft.reply_to)
            .await;
        let _ = result_tx.send(result);
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::value_object::AuthToken;
    use crate::infrastructure::websocket::transport::MockSocketTransport;

    fn state_with_rooms(user: &str, room_ids: &[&str]) -> ChatState {
        use crate::domain::entity::{Room, RoomType};
        let mut state = ChatState::new(UserId::new(user.to_string()).unwrap());
        state.roster.set_rooms(
            room_ids
                .iter()
                .map(|id| Room {
                    id: RoomId::new((*id).to_string()).unwrap(),
                    name: (*id).to_string(),
                    room_type: RoomType::General,
                    participants: Vec::new(),
                    message_count: 0,
                    last_activity: 0,
                })
                .collect(),
        );
        state
    }

    #[tokio::test]
    async fn test_announce_sends_auth_then_batched_joins_then_active_room() {
        // テスト項目: 接続直後に auth → joinRooms → joinRoom の順で送信される
        // given (前提条件):
        let mut state = state_with_rooms("alice", &["r1", "r2"]);
        state.set_active_room(RoomId::new("r2".to_string()).unwrap());
        let token = AuthToken::new("tok".to_string()).unwrap();
        let user_id = UserId::new("alice".to_string()).unwrap();

        let mut transport = MockSocketTransport::new();
        let mut order = mockall::Sequence::new();
        transport
            .expect_send()
            .withf(|event| matches!(event, ClientEvent::Auth(_)))
            .times(1)
            .in_sequence(&mut order)
            .returning(|_| Ok(()));
        transport
            .expect_send()
            .withf(|event| {
                matches!(event, ClientEvent::JoinRooms(payload) if payload.room_ids == vec!["r1", "r2"])
            })
            .times(1)
            .in_sequence(&mut order)
            .returning(|_| Ok(()));
        transport
            .expect_send()
            .withf(|event| {
                matches!(event, ClientEvent::JoinRoom(payload) if payload.room_id == "r2")
            })
            .times(1)
            .in_sequence(&mut order)
            .returning(|_| Ok(()));

        // when (操作):
        let result = announce_membership(&mut transport, &token, &user_id, &state).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_announce_without_active_room_skips_join_room() {
        // テスト項目: アクティブルームが無い場合は joinRoom が送られない
        // given (前提条件):
        let state = state_with_rooms("alice", &["r1"]);
        let token = AuthToken::new("tok".to_string()).unwrap();
        let user_id = UserId::new("alice".to_string()).unwrap();

        let mut transport = MockSocketTransport::new();
        transport
            .expect_send()
            .withf(|event| !matches!(event, ClientEvent::JoinRoom(_)))
            .times(2)
            .returning(|_| Ok(()));

        // when (操作):
        let result = announce_membership(&mut transport, &token, &user_id, &state).await;

        // then (期待する結果):
        assert!(result.is_ok());
    }

    #[test]
    fn test_send_for_unjoined_public_room_asks_to_join() {
        // テスト項目: 非参加の公開ルームへの送信が join 導線の通知になる
        // given (前提条件):
        let mut state = state_with_rooms("bob", &["r1"]);
        state.set_active_room(RoomId::new("r1".to_string()).unwrap());
        let api = ApiClient::new("http://127.0.0.1:1");
        let (notify_tx, mut notify_rx) = mpsc::unbounded_channel();
        let (result_tx, _result_rx) = mpsc::unbounded_channel();

        // when (操作):
        send_message("hi".to_string(), &api, &mut state, &notify_tx, &result_tx);

        // then (期待する結果):
        match notify_rx.try_recv() {
            Ok(ChatNotification::JoinRequired { room_id }) => {
                assert_eq!(room_id.as_str(), "r1");
            }
            other => panic!("expected JoinRequired, got {:?}", other),
        }
        assert!(!state.composer.is_in_flight());
    }
}
