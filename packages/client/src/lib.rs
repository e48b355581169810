//! Client SDK for the CodeThrone coding education platform.
//!
//! CodeThrone is a web platform for problem solving, contests, courses,
//! discussion and real-time chat. All persistence, grading and scoring
//! happens on a remote backend; this crate is purely a client of its
//! REST API and WebSocket event stream.

// layers
pub mod auth;
pub mod chat;
pub mod domain;
pub mod infrastructure;

// shared library
pub mod error;
