use thiserror::Error;

pub type Result<T> = std::result::Result<T, EngineError>;

/// Errors surfaced by the login workflow and its page driver.
///
/// The run-level boundary only distinguishes two kinds: timeouts get the
/// fixed operator-facing failure text, everything else is stringified.
/// [`EngineError::is_timeout`] is that split.
#[derive(Debug, Error)]
pub enum EngineError {
    /// An awaited browser condition exceeded its allotted wait.
    #[error("timed out after {ms}ms waiting for {condition}")]
    Timeout { ms: u64, condition: String },

    /// The browser process or page context could not be brought up.
    #[error("failed to launch browser: {0}")]
    BrowserLaunch(String),

    /// Navigation failed for a reason other than a timeout.
    #[error("navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    /// A page interaction (lookup, click, fill, evaluate) failed.
    #[error("page operation failed: {0}")]
    Page(String),

    /// The confirmation greeting did not contain a parseable first name.
    #[error("could not read a first name from greeting {0:?}")]
    Greeting(String),
}

impl EngineError {
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_timeout_variant_is_a_timeout() {
        let timeout = EngineError::Timeout {
            ms: 20_000,
            condition: "text containing \"Olá,\"".into(),
        };
        assert!(timeout.is_timeout());
        assert!(!EngineError::Page("boom".into()).is_timeout());
        assert!(!EngineError::Greeting("Bem-vindo!".into()).is_timeout());
    }

    #[test]
    fn timeout_message_names_the_condition() {
        let err = EngineError::Timeout {
            ms: 15_000,
            condition: "#ra-aluno".into(),
        };
        assert_eq!(err.to_string(), "timed out after 15000ms waiting for #ra-aluno");
    }
}
