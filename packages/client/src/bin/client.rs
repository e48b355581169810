//! CodeThrone terminal client.
//!
//! Subcommands cover login/logout, the room list and the realtime chat
//! view. The chat view reads lines from stdin and sends them to the
//! active room; lines starting with `/` are client commands:
//!
//! ```not_rust
//! /room <id>    switch the active room
//! /join <id>    join a room you are not a member of
//! /dm <userId>  open a private chat
//! /retry        retry after the connection gave up
//! /quit         leave
//! ```
//!
//! Run with:
//! ```not_rust
//! cargo run --bin codethrone-client -- login -u alice -p secret
//! cargo run --bin codethrone-client -- chat --room general
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use rustyline::error::ReadlineError;
use rustyline::DefaultEditor;
use tokio::sync::mpsc;

use codethrone_client::auth::token_store::FileTokenStore;
use codethrone_client::auth::AuthSession;
use codethrone_client::chat::formatter::MessageFormatter;
use codethrone_client::chat::ui::redisplay_prompt;
use codethrone_client::chat::{run_chat, ChatCommand, ChatNotification};
use codethrone_client::domain::value_object::RoomId;
use codethrone_client::domain::ReconnectPolicy;
use codethrone_client::infrastructure::http::ApiClient;
use codethrone_client::infrastructure::websocket::TungsteniteConnector;
use codethrone_shared::logger::setup_logger;

#[derive(Parser, Debug)]
#[command(name = "codethrone-client")]
#[command(about = "Terminal client for the CodeThrone platform", long_about = None)]
struct Args {
    /// REST API base URL
    #[arg(long, default_value = "http://127.0.0.1:5000")]
    api_url: String,

    /// WebSocket URL for the realtime chat
    #[arg(long, default_value = "ws://127.0.0.1:5000/ws")]
    ws_url: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log in and persist the session token
    Login {
        #[arg(short = 'u', long)]
        username: String,

        #[arg(short = 'p', long)]
        password: String,

        #[arg(long, default_value = "user")]
        role: String,
    },
    /// Clear the persisted session token
    Logout,
    /// List the chat rooms you can see
    Rooms,
    /// Open the realtime chat view
    Chat {
        /// Room to activate on startup
        #[arg(short = 'r', long)]
        room: Option<String>,
    },
}

fn token_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".codethrone").join("token")
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    setup_logger(env!("CARGO_BIN_NAME"), "info");

    let args = Args::parse();

    let mut api = ApiClient::new(args.api_url.clone());
    let store = Arc::new(FileTokenStore::new(token_path()));
    let mut auth = AuthSession::new(store);

    let result = match args.command {
        Command::Login {
            username,
            password,
            role,
        } => login(&mut auth, &mut api, &username, &password, &role).await,
        Command::Logout => logout(&mut auth, &mut api),
        Command::Rooms => list_rooms(&mut auth, &mut api).await,
        Command::Chat { room } => chat(&mut auth, &mut api, &args.ws_url, room).await,
    };

    if let Err(e) = result {
        tracing::error!("Client error: {}", e);
        std::process::exit(1);
    }
}

async fn login(
    auth: &mut AuthSession,
    api: &mut ApiClient,
    username: &str,
    password: &str,
    role: &str,
) -> Result<(), Box<dyn std::error::Error>> {
    let user = auth.login(api, username, password, role).await?;
    println!(
        "Logged in as '{}'{}",
        user.username,
        user.role
            .as_deref()
            .map(|r| format!(" ({})", r))
            .unwrap_or_default()
    );
    Ok(())
}

fn logout(
    auth: &mut AuthSession,
    api: &mut ApiClient,
) -> Result<(), Box<dyn std::error::Error>> {
    auth.logout(api)?;
    println!("Logged out.");
    Ok(())
}

async fn list_rooms(
    auth: &mut AuthSession,
    api: &mut ApiClient,
) -> Result<(), Box<dyn std::error::Error>> {
    require_session(auth, api).await?;
    let rooms: Vec<_> = api
        .chat_rooms()
        .await?
        .into_iter()
        .map(Into::into)
        .collect();
    print!("{}", MessageFormatter::format_room_list(&rooms));
    Ok(())
}

async fn chat(
    auth: &mut AuthSession,
    api: &mut ApiClient,
    ws_url: &str,
    initial_room: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    require_session(auth, api).await?;
    let username = auth
        .user()
        .map(|u| u.username.clone())
        .unwrap_or_else(|| "me".to_string());

    println!(
        "\nYou are '{}'. Type messages and press Enter to send. /quit to exit.\n",
        username
    );

    let (command_tx, command_rx) = mpsc::unbounded_channel::<ChatCommand>();
    let (notify_tx, notify_rx) = mpsc::unbounded_channel::<ChatNotification>();

    if let Some(room) = initial_room
        && let Ok(room_id) = RoomId::new(room)
    {
        let _ = command_tx.send(ChatCommand::SetActiveRoom { room_id });
    }

    // Blocking thread for rustyline (synchronous readline)
    let input_username = username.clone();
    let input_tx = command_tx.clone();
    let _readline_handle = std::thread::spawn(move || {
        let mut rl = match DefaultEditor::new() {
            Ok(rl) => rl,
            Err(e) => {
                eprintln!("Failed to initialize readline: {}", e);
                return;
            }
        };

        let prompt = format!("{}> ", input_username);

        loop {
            match rl.readline(&prompt) {
                Ok(line) => {
                    let line = line.trim();
                    if line.is_empty() {
                        continue;
                    }
                    rl.add_history_entry(line).ok();
                    let Some(command) = parse_input_line(line) else {
                        eprintln!("Unknown command: {}", line);
                        continue;
                    };
                    let is_quit = matches!(command, ChatCommand::Close);
                    if input_tx.send(command).is_err() || is_quit {
                        break;
                    }
                }
                Err(ReadlineError::Interrupted) | Err(ReadlineError::Eof) => {
                    let _ = input_tx.send(ChatCommand::Close);
                    break;
                }
                Err(e) => {
                    tracing::error!("Readline error: {}", e);
                    let _ = input_tx.send(ChatCommand::Close);
                    break;
                }
            }
        }
    });

    // Printer task for server pushes and status changes
    let printer_username = username.clone();
    let printer = tokio::spawn(async move {
        print_notifications(notify_rx, &printer_username).await;
    });

    let connector = TungsteniteConnector::new(ws_url);
    let policy = ReconnectPolicy::default();
    run_chat(
        &connector,
        api,
        auth.token().cloned(),
        auth.user_id().cloned(),
        command_rx,
        notify_tx,
        policy,
    )
    .await?;

    printer.abort();
    Ok(())
}

async fn require_session(
    auth: &mut AuthSession,
    api: &mut ApiClient,
) -> Result<(), Box<dyn std::error::Error>> {
    if !auth.restore(api).await? {
        return Err("no active session; run `login` first".into());
    }
    Ok(())
}

/// Map one input line to a chat command. `None` means an unrecognized
/// `/` command.
fn parse_input_line(line: &str) -> Option<ChatCommand> {
    if !line.starts_with('/') {
        return Some(ChatCommand::SendMessage {
            content: line.to_string(),
        });
    }

    let mut parts = line.splitn(2, ' ');
    let command = parts.next().unwrap_or_default();
    let argument = parts.next().unwrap_or("").trim();

    match command {
        "/quit" => Some(ChatCommand::Close),
        "/retry" => Some(ChatCommand::Retry),
        "/room" => RoomId::new(argument.to_string())
            .ok()
            .map(|room_id| ChatCommand::SetActiveRoom { room_id }),
        "/join" => RoomId::new(argument.to_string())
            .ok()
            .map(|room_id| ChatCommand::JoinRoom { room_id }),
        "/dm" if !argument.is_empty() => Some(ChatCommand::StartPrivateChat {
            target_user_id: argument.to_string(),
        }),
        "/react" => {
            let mut args = argument.splitn(2, ' ');
            let message_id = args.next().unwrap_or("").trim();
            let emoji = args.next().unwrap_or("").trim();
            if message_id.is_empty() || emoji.is_empty() {
                None
            } else {
                Some(ChatCommand::React {
                    message_id: message_id.to_string(),
                    emoji: emoji.to_string(),
                })
            }
        }
        _ => None,
    }
}

async fn print_notifications(
    mut notify_rx: mpsc::UnboundedReceiver<ChatNotification>,
    username: &str,
) {
    while let Some(notification) = notify_rx.recv().await {
        match notification {
            ChatNotification::StatusChanged { status, last_error } => {
                print!(
                    "{}",
                    MessageFormatter::format_status(status, last_error.as_deref())
                );
            }
            ChatNotification::GaveUp { last_error } => {
                print!(
                    "{}",
                    MessageFormatter::format_status(
                        codethrone_client::domain::ConnectionStatus::Error,
                        last_error.as_deref()
                    )
                );
            }
            ChatNotification::MessageReceived(message) => {
                print!("{}", MessageFormatter::format_chat_message(&message));
            }
            ChatNotification::MessageUpdated { .. } => {
                // Edits and reactions repaint on the next full render in a
                // richer UI; the terminal view stays quiet
            }
            ChatNotification::TypingChanged { users, .. } => {
                print!("{}", MessageFormatter::format_typing(&users));
            }
            ChatNotification::OnlineUsers(users) => {
                print!("{}", MessageFormatter::format_online_users(&users));
            }
            ChatNotification::RoomJoined { room_id } => {
                println!("\njoined room {}", room_id.as_str());
            }
            ChatNotification::PrivateRoomCreated(room) => {
                println!("\nprivate room '{}' created", room.name);
            }
            ChatNotification::JoinRequired { room_id } => {
                println!(
                    "\nyou are not a member of {}; use /join {}",
                    room_id.as_str(),
                    room_id.as_str()
                );
            }
            ChatNotification::ServerError(message) => {
                println!("\nserver error: {}", message);
            }
            ChatNotification::SendFailed(reason) => {
                println!("\nsend failed (draft kept): {}", reason);
            }
        }
        redisplay_prompt(username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_line_becomes_send_message() {
        // テスト項目: 通常の行が SendMessage になる
        // given (前提条件):
        let line = "hello world";

        // when (操作):
        let command = parse_input_line(line);

        // then (期待する結果):
        assert!(matches!(
            command,
            Some(ChatCommand::SendMessage { content }) if content == "hello world"
        ));
    }

    #[test]
    fn test_slash_commands_are_parsed() {
        // テスト項目: スラッシュコマンドが対応するコマンドに変換される
        // given (前提条件) / when (操作) / then (期待する結果):
        assert!(matches!(parse_input_line("/quit"), Some(ChatCommand::Close)));
        assert!(matches!(parse_input_line("/retry"), Some(ChatCommand::Retry)));
        assert!(matches!(
            parse_input_line("/room general"),
            Some(ChatCommand::SetActiveRoom { room_id }) if room_id.as_str() == "general"
        ));
        assert!(matches!(
            parse_input_line("/react m1 🎉"),
            Some(ChatCommand::React { message_id, emoji })
                if message_id == "m1" && emoji == "🎉"
        ));
    }

    #[test]
    fn test_unknown_slash_command_is_rejected() {
        // テスト項目: 未知のスラッシュコマンドが None になる
        // given (前提条件):
        let line = "/frobnicate now";

        // when (操作):
        let command = parse_input_line(line);

        // then (期待する結果):
        assert!(command.is_none());
    }
}
