use regex::{Captures, Regex};
use std::fmt;
use std::sync::LazyLock;

// Match OpenRouter / OpenAI / Anthropic style keys: sk-or-v1-..., sk-ant-..., sk-...
static API_KEY_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"sk-[a-zA-Z0-9][a-zA-Z0-9_-]{15,}").expect("valid regex"));

static BEARER_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"Bearer\s+[a-zA-Z0-9_.\-]+").expect("valid regex"));

static KEY_FIELD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(["']?(?:api_key|apikey|token|secret)["']?\s*[:=]\s*)["']?[a-zA-Z0-9_.\-]{8,}["']?"#)
        .expect("valid regex")
});

/// Redacts credentials from text before it reaches the logs
///
/// Applied to backend error bodies, which can echo request headers or keys.
#[derive(Clone, Copy, Default)]
pub struct SecretScrubber;

impl SecretScrubber {
    pub fn new() -> Self {
        Self
    }

    /// Scrub a message of sensitive data
    pub fn scrub_message(&self, message: &str) -> String {
        let scrubbed = BEARER_PATTERN.replace_all(message, "Bearer [TOKEN_REDACTED]");
        let scrubbed = KEY_FIELD_PATTERN.replace_all(&scrubbed, |caps: &Captures| {
            format!("{}[REDACTED]", &caps[1])
        });
        API_KEY_PATTERN
            .replace_all(&scrubbed, "[API_KEY_REDACTED]")
            .into_owned()
    }
}

impl fmt::Debug for SecretScrubber {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SecretScrubber").finish()
    }
}
