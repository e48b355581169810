//! REST API client, one module per backend resource.

pub mod auth;
pub mod chat;
pub mod client;
pub mod contests;
pub mod courses;
pub mod discussions;
pub mod documents;
pub mod problems;
pub mod redeem;

pub use client::{ApiClient, ApiError};
