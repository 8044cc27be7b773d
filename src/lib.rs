#![deny(missing_docs)]
//! Homework status Telegram bot
//!
//! Polls the Practicum homework-status API on a fixed cadence and forwards
//! review-status changes to a Telegram chat. Notifications are idempotent:
//! a message identical to the last successfully delivered one is never
//! re-sent, which also keeps a repeating failure from spamming the chat.

/// Practicum API client
pub mod api;
/// Configuration management
pub mod config;
/// Telegram notifier with duplicate suppression
pub mod notify;
/// The fetch-validate-notify polling loop
pub mod poller;
/// Response validation and verdict extraction
pub mod status;
