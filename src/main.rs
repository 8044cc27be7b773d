use dotenvy::dotenv;
use homework_status_bot::api::StatusClient;
use homework_status_bot::config::Settings;
use homework_status_bot::notify::{Notifier, TelegramSender};
use homework_status_bot::poller::Poller;
use regex::Regex;
use std::io::{self, Write};
use std::sync::Arc;
use tracing::{error, info};
use tracing_subscriber::{prelude::*, EnvFilter};

/// Regex patterns for redacting sensitive data
struct RedactionPatterns {
    bot_url: Regex,
    bot_token: Regex,
    oauth: Regex,
}

impl RedactionPatterns {
    /// Initialize all regex patterns
    ///
    /// # Errors
    ///
    /// Returns an error if any regex pattern is invalid
    fn new() -> Result<Self, regex::Error> {
        Ok(Self {
            bot_url: Regex::new(r"(https?://[^/]+/bot)([0-9]+:[A-Za-z0-9_-]+)(/[^'\s]*)")?,
            bot_token: Regex::new(r"([0-9]{8,10}:[A-Za-z0-9_-]{35})")?,
            oauth: Regex::new(r"(OAuth )[A-Za-z0-9_.\-]+")?,
        })
    }

    fn redact(&self, input: &str) -> String {
        let mut output = input.to_string();
        output = self
            .bot_url
            .replace_all(&output, "$1[TELEGRAM_TOKEN]$3")
            .to_string();
        output = self
            .bot_token
            .replace_all(&output, "[TELEGRAM_TOKEN]")
            .to_string();
        output = self
            .oauth
            .replace_all(&output, "$1[PRACTICUM_TOKEN]")
            .to_string();
        output
    }
}

struct RedactingWriter<W: Write> {
    inner: W,
    patterns: Arc<RedactionPatterns>,
}

impl<W: Write> RedactingWriter<W> {
    const fn new(inner: W, patterns: Arc<RedactionPatterns>) -> Self {
        Self { inner, patterns }
    }
}

impl<W: Write> Write for RedactingWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let s = String::from_utf8_lossy(buf);
        let redacted = self.patterns.redact(&s);
        self.inner.write_all(redacted.as_bytes())?;
        // We return the original buffer length to satisfy the contract,
        // even if the redacted string length differs.
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.inner.flush()
    }
}

struct RedactingMakeWriter<F> {
    make_inner: F,
    patterns: Arc<RedactionPatterns>,
}

impl<F> RedactingMakeWriter<F> {
    const fn new(make_inner: F, patterns: Arc<RedactionPatterns>) -> Self {
        Self {
            make_inner,
            patterns,
        }
    }
}

impl<'a, F, W> tracing_subscriber::fmt::MakeWriter<'a> for RedactingMakeWriter<F>
where
    F: Fn() -> W + 'static,
    W: Write,
{
    type Writer = RedactingWriter<W>;

    fn make_writer(&'a self) -> Self::Writer {
        RedactingWriter::new((self.make_inner)(), Arc::clone(&self.patterns))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenv().ok();

    // Setup logging with token redaction
    let patterns = Arc::new(RedactionPatterns::new()?);
    let make_writer = RedactingMakeWriter::new(io::stderr, patterns);

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(make_writer))
        .init();

    info!("Starting homework status bot...");

    let settings = match Settings::new() {
        Ok(s) => s,
        Err(e) => {
            error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let credentials = match settings.credentials() {
        Ok(c) => {
            info!("Configuration loaded successfully.");
            c
        }
        Err(missing) => {
            // Startup precondition, not a runtime failure: report every
            // missing variable and stop with a clean exit status.
            error!(
                "Missing required environment variables: {}. Forced shutdown.",
                missing.join(", ")
            );
            std::process::exit(0);
        }
    };

    let client = StatusClient::new(&credentials.practicum_token, settings.http_timeout());

    let bot = teloxide::Bot::new(credentials.telegram_token.clone());
    let sender = match TelegramSender::new(bot, &credentials.telegram_chat_id) {
        Ok(s) => s,
        Err(e) => {
            error!("Unusable TELEGRAM_CHAT_ID: {e}. Forced shutdown.");
            std::process::exit(0);
        }
    };

    let mut poller = Poller::new(
        client,
        Notifier::new(sender),
        settings.poll_interval(),
        chrono::Utc::now().timestamp(),
    );

    info!("Bot is running...");
    poller.run().await;

    Ok(())
}
