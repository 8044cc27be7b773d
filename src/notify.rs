//! Telegram notifier with duplicate suppression
//!
//! Owns the text of the last message that actually reached the chat and
//! refuses to send it twice in a row. A transport failure leaves that state
//! untouched, so the same text is retried on the next cycle instead of being
//! wrongly treated as delivered.

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::types::{ChatId, Recipient};
use thiserror::Error;
use tracing::{debug, error};

/// Errors produced by the outbound message transport
#[derive(Debug, Error)]
pub enum NotifyError {
    /// Telegram rejected or failed to deliver the message.
    #[error("Telegram send error: {0}")]
    Transport(String),

    /// The configured chat identifier is neither numeric nor `@username`.
    #[error("invalid chat id: {0}")]
    BadChatId(String),
}

impl From<teloxide::RequestError> for NotifyError {
    fn from(e: teloxide::RequestError) -> Self {
        Self::Transport(e.to_string())
    }
}

/// The outbound transport seam, so the notifier can be tested against a
/// recording fake.
#[async_trait]
pub trait MessageSender: Send + Sync {
    /// Deliver `text` to the configured chat.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::Transport`] when delivery fails.
    async fn send(&self, text: &str) -> Result<(), NotifyError>;
}

/// Sends messages to one fixed chat through the Telegram Bot API
pub struct TelegramSender {
    bot: Bot,
    chat: Recipient,
}

impl TelegramSender {
    /// Build a sender for `chat_id`: a numeric chat id or an `@channelname`.
    ///
    /// # Errors
    ///
    /// Returns [`NotifyError::BadChatId`] for anything else; the caller
    /// treats that as a startup misconfiguration.
    pub fn new(bot: Bot, chat_id: &str) -> Result<Self, NotifyError> {
        let chat = if chat_id.starts_with('@') {
            Recipient::ChannelUsername(chat_id.to_owned())
        } else {
            chat_id
                .parse::<i64>()
                .map(|id| Recipient::Id(ChatId(id)))
                .map_err(|_| NotifyError::BadChatId(chat_id.to_owned()))?
        };
        Ok(Self { bot, chat })
    }
}

#[async_trait]
impl MessageSender for TelegramSender {
    async fn send(&self, text: &str) -> Result<(), NotifyError> {
        self.bot.send_message(self.chat.clone(), text).await?;
        Ok(())
    }
}

/// Sends a message only when it differs from the last one delivered
pub struct Notifier<S> {
    sender: S,
    last_message: Option<String>,
}

impl<S: MessageSender> Notifier<S> {
    /// Wrap a transport. No message has been delivered yet.
    pub const fn new(sender: S) -> Self {
        Self {
            sender,
            last_message: None,
        }
    }

    /// Send `text` unless it matches the last delivered message.
    ///
    /// Returns `true` only on a confirmed send. A transport failure is
    /// logged here and never propagates: `last_message` stays unchanged so
    /// the next cycle retries the same text.
    pub async fn notify(&mut self, text: &str) -> bool {
        if self.last_message.as_deref() == Some(text) {
            debug!("duplicate message suppressed: \"{text}\"");
            return false;
        }

        match self.sender.send(text).await {
            Ok(()) => {
                debug!("sent message \"{text}\"");
                self.last_message = Some(text.to_owned());
                true
            }
            Err(e) => {
                error!("failed to send message \"{text}\": {e}");
                false
            }
        }
    }

    /// Text of the last successfully delivered message.
    #[must_use]
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::{MessageSender, Notifier, NotifyError};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
    use std::sync::Mutex;

    #[derive(Default)]
    struct RecordingSender {
        sent: Mutex<Vec<String>>,
        attempts: AtomicUsize,
        fail_next: AtomicBool,
    }

    #[async_trait]
    impl MessageSender for RecordingSender {
        async fn send(&self, text: &str) -> Result<(), NotifyError> {
            self.attempts.fetch_add(1, Ordering::SeqCst);
            if self.fail_next.swap(false, Ordering::SeqCst) {
                return Err(NotifyError::Transport("scripted failure".to_owned()));
            }
            self.sent.lock().expect("lock").push(text.to_owned());
            Ok(())
        }
    }

    impl RecordingSender {
        fn sent(&self) -> Vec<String> {
            self.sent.lock().expect("lock").clone()
        }
    }

    #[tokio::test]
    async fn identical_text_is_sent_once() {
        let mut notifier = Notifier::new(RecordingSender::default());

        assert!(notifier.notify("A").await);
        assert!(!notifier.notify("A").await);

        assert_eq!(notifier.sender.sent(), vec!["A"]);
        assert_eq!(notifier.sender.attempts.load(Ordering::SeqCst), 1);
        assert_eq!(notifier.last_message(), Some("A"));
    }

    #[tokio::test]
    async fn changed_text_is_sent_again() {
        let mut notifier = Notifier::new(RecordingSender::default());

        assert!(notifier.notify("A").await);
        assert!(notifier.notify("B").await);
        assert!(notifier.notify("A").await);

        assert_eq!(notifier.sender.sent(), vec!["A", "B", "A"]);
    }

    #[tokio::test]
    async fn failure_does_not_mark_text_as_sent() {
        let sender = RecordingSender::default();
        sender.fail_next.store(true, Ordering::SeqCst);
        let mut notifier = Notifier::new(sender);

        assert!(!notifier.notify("A").await);
        assert_eq!(notifier.last_message(), None);

        // Same text is attempted again, not suppressed as already sent.
        assert!(notifier.notify("A").await);
        assert_eq!(notifier.sender.attempts.load(Ordering::SeqCst), 2);
        assert_eq!(notifier.sender.sent(), vec!["A"]);
        assert_eq!(notifier.last_message(), Some("A"));
    }
}
