//! Reconnect driver for the chat session.
//!
//! Owns the connection state machine and executes its effects: dialing,
//! backoff sleeps, the membership announcement after each successful
//! open, and the wait for a manual retry once the budget is exhausted.
//! The room-list fetch and the first dial run concurrently on purpose;
//! the roster reconciles pushes that win that race.

use tokio::sync::mpsc;

use codethrone_shared::time::SystemClock;

use crate::domain::connection::{
    ConnectionEffect, ConnectionEvent, ConnectionStateMachine, ReconnectPolicy,
};
use crate::domain::entity::Room;
use crate::domain::value_object::{AuthToken, UserId};
use crate::error::ClientError;
use crate::infrastructure::http::ApiClient;
use crate::infrastructure::websocket::{Connection, SocketConnector, TransportError};

use super::session::{announce_membership, run_session, ChatCommand, ChatNotification, SessionEnd};
use super::state::ChatState;

/// Run the chat session until the user closes it.
///
/// Does nothing (and does not retry) unless both an auth token and a user
/// identity are present.
pub async fn run_chat(
    connector: &dyn SocketConnector,
    api: &ApiClient,
    token: Option<AuthToken>,
    user_id: Option<UserId>,
    mut commands: mpsc::UnboundedReceiver<ChatCommand>,
    notifications: mpsc::UnboundedSender<ChatNotification>,
    policy: ReconnectPolicy,
) -> Result<(), ClientError> {
    let (Some(token), Some(user_id)) = (token, user_id) else {
        tracing::warn!("Chat session not started: auth token and user identity are required");
        return Ok(());
    };

    let clock = SystemClock;
    let mut state = ChatState::new(user_id.clone());
    let mut machine = ConnectionStateMachine::new(policy);

    machine.apply(ConnectionEvent::ConnectRequested);
    notify_status(&machine, &notifications);

    // The room-list fetch and the first dial race independently
    let (rooms_result, connect_result) = tokio::join!(api.chat_rooms(), connector.connect());
    match rooms_result {
        Ok(dtos) => {
            let rooms: Vec<Room> = dtos.into_iter().map(Into::into).collect();
            state.roster.set_rooms(rooms);
        }
        Err(e) => {
            tracing::warn!("Room list fetch failed: {}", e);
        }
    }

    let mut pending_connect: Option<Result<Connection, TransportError>> = Some(connect_result);

    loop {
        let connect_result = match pending_connect.take() {
            Some(result) => result,
            None => connector.connect().await,
        };

        let effect = match connect_result {
            Ok(Connection {
                mut transport,
                mut frames,
            }) => {
                let mut effect = machine.apply(ConnectionEvent::Opened);
                notify_status(&machine, &notifications);

                if effect == ConnectionEffect::AnnounceRooms {
                    match announce_membership(transport.as_mut(), &token, &user_id, &state).await {
                        Ok(()) => {
                            let end = run_session(
                                transport.as_mut(),
                                &mut frames,
                                api,
                                &mut state,
                                &mut commands,
                                &notifications,
                                &clock,
                            )
                            .await;
                            effect = match end {
                                SessionEnd::LocalClose => {
                                    machine.apply(ConnectionEvent::LocallyClosed)
                                }
                                SessionEnd::RemoteClose { server_initiated } => {
                                    machine.apply(ConnectionEvent::RemoteClosed { server_initiated })
                                }
                                SessionEnd::TransportFailed { reason } => {
                                    machine.apply(ConnectionEvent::TransportFailed { reason })
                                }
                            };
                        }
                        Err(e) => {
                            effect = machine.apply(ConnectionEvent::TransportFailed {
                                reason: e.to_string(),
                            });
                        }
                    }
                }
                notify_status(&machine, &notifications);
                effect
            }
            Err(e) => {
                tracing::warn!("Connection attempt failed: {}", e);
                let effect = machine.apply(ConnectionEvent::TransportFailed {
                    reason: e.to_string(),
                });
                notify_status(&machine, &notifications);
                effect
            }
        };

        match effect {
            ConnectionEffect::Reconnect { delay } => {
                if !delay.is_zero() {
                    tracing::info!(
                        "Reconnecting in {:?} (attempt {}/{})",
                        delay,
                        machine.attempts(),
                        machine.max_attempts()
                    );
                }
                match wait_for_reconnect(delay, &mut commands).await {
                    WaitOutcome::Elapsed | WaitOutcome::Retry => {}
                    WaitOutcome::Close => return Ok(()),
                }
                machine.apply(ConnectionEvent::ConnectRequested);
                notify_status(&machine, &notifications);
            }
            ConnectionEffect::GiveUp => {
                tracing::error!(
                    "Giving up after {} reconnection attempts",
                    machine.attempts()
                );
                let _ = notifications.send(ChatNotification::GaveUp {
                    last_error: machine.last_error().map(str::to_string),
                });
                if !wait_for_manual_retry(&mut commands).await {
                    return Ok(());
                }
                machine.apply(ConnectionEvent::RetryRequested);
                notify_status(&machine, &notifications);
            }
            // Local close or a remote close the server did not force:
            // the session is over
            _ => return Ok(()),
        }
    }
}

fn notify_status(
    machine: &ConnectionStateMachine,
    notifications: &mpsc::UnboundedSender<ChatNotification>,
) {
    let _ = notifications.send(ChatNotification::StatusChanged {
        status: machine.status(),
        last_error: machine.last_error().map(str::to_string),
    });
}

enum WaitOutcome {
    Elapsed,
    Retry,
    Close,
}

/// Sleep out the backoff delay, but let a manual retry skip it and a
/// close abort it. Other commands are ignored while disconnected.
async fn wait_for_reconnect(
    delay: std::time::Duration,
    commands: &mut mpsc::UnboundedReceiver<ChatCommand>,
) -> WaitOutcome {
    if delay.is_zero() {
        return WaitOutcome::Elapsed;
    }
    let sleep = tokio::time::sleep(delay);
    tokio::pin!(sleep);
    loop {
        tokio::select! {
            () = &mut sleep => return WaitOutcome::Elapsed,
            maybe_command = commands.recv() => match maybe_command {
                Some(ChatCommand::Retry) => return WaitOutcome::Retry,
                Some(ChatCommand::Close) | None => return WaitOutcome::Close,
                Some(other) => {
                    tracing::debug!("Ignoring {:?} while disconnected", other);
                }
            }
        }
    }
}

/// Block until the user retries or closes. Returns `true` on retry.
async fn wait_for_manual_retry(commands: &mut mpsc::UnboundedReceiver<ChatCommand>) -> bool {
    loop {
        match commands.recv().await {
            Some(ChatCommand::Retry) => return true,
            Some(ChatCommand::Close) | None => return false,
            Some(other) => {
                tracing::debug!("Ignoring {:?} while disconnected", other);
            }
        }
    }
}
