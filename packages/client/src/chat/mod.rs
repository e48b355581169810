//! Realtime chat session manager.
//!
//! One mounted chat view owns exactly one live connection. The pure
//! connection state machine lives in `domain::connection`; this module
//! provides the async driver around it: the reconnect loop (`runner`),
//! the per-connection event loop (`session`), and the terminal rendering
//! helpers (`formatter`, `ui`).

pub mod formatter;
pub mod runner;
pub mod session;
pub mod state;
pub mod ui;

pub use runner::run_chat;
pub use session::{ChatCommand, ChatNotification};
pub use state::ChatState;
