//! The fixed login workflow.
//!
//! One invocation drives a fresh browser session through the portal's login
//! form and reports everything it does through the injected sink. Errors are
//! never propagated to the caller: every run ends with exactly one terminal
//! event, and the browser session is released on every path.

use std::time::Duration;

use tracing::{info, warn};

use crate::driver::{DriverFactory, PageDriver};
use crate::error::{EngineError, Result};
use crate::sink::{Event, EventSink};
use salabot_protocol::Credentials;

pub const DEFAULT_LOGIN_URL: &str = "https://saladofuturo.educacao.sp.gov.br/login-alunos";

/// User-facing failure text for any timed-out wait.
pub const TIMEOUT_FAILURE: &str = "Tempo de espera esgotado.";

const RA_FIELD: &str = "#ra-aluno";
const RA_DIGIT_FIELD: &str = "#digito-ra-aluno";
const UF_DROPDOWN: &str = "#uf-ra-aluno";
const PASSWORD_FIELD: &str = "#senha-aluno";
const SUBMIT_BUTTON: &str = "#btn-acessar-aluno";

/// Marker the confirmation element must contain, e.g. "Olá, Maria Silva!".
const GREETING_MARKER: &str = "Olá,";

/// Tunables for one run. Defaults reproduce the portal script's original
/// behavior; tests shrink the timeouts and zero the pacing.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub login_url: String,
    /// Initial navigation budget.
    pub nav_timeout: Duration,
    /// Budget for the first form field to appear.
    pub field_timeout: Duration,
    /// Budget for the post-submit confirmation element.
    pub greeting_timeout: Duration,
    /// Cosmetic delay after each progress emission so a human can follow the
    /// live log. Not a rate limit.
    pub pacing: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            login_url: DEFAULT_LOGIN_URL.to_string(),
            nav_timeout: Duration::from_secs(60),
            field_timeout: Duration::from_secs(15),
            greeting_timeout: Duration::from_secs(20),
            pacing: Duration::from_millis(500),
        }
    }
}

/// Run the login script once for `session_id`.
///
/// The sink observes `[Progress*, (Success|Failure)]` followed by one final
/// Progress after the browser session is released. All failures are reported
/// through the sink; this function never returns an error.
pub async fn run_login(
    session_id: &str,
    credentials: &Credentials,
    factory: &dyn DriverFactory,
    sink: &dyn EventSink,
    config: &EngineConfig,
) {
    info!(target = "salabot", %session_id, "automation run starting");
    progress(sink, config.pacing, "▶️ Bests.IA ativado. Iniciando conexão segura...").await;

    let (driver, outcome) = match factory.launch().await {
        Ok(mut driver) => {
            let outcome = run_steps(driver.as_mut(), credentials, sink, config).await;
            (Some(driver), outcome)
        }
        Err(err) => (None, Err(err)),
    };

    match outcome {
        Ok(first_name) => {
            info!(target = "salabot", %session_id, %first_name, "identity confirmed");
            progress(sink, config.pacing, format!("✅ Identidade confirmada: {first_name}")).await;
            sink.emit(Event::Success { first_name });
        }
        Err(err) if err.is_timeout() => {
            warn!(target = "salabot", %session_id, error = %err, "run timed out");
            progress(
                sink,
                config.pacing,
                "❌ Falha na autenticação. Verifique os dados ou o site pode estar offline.",
            )
            .await;
            sink.emit(Event::Failure {
                reason: TIMEOUT_FAILURE.to_string(),
            });
        }
        Err(err) => {
            warn!(target = "salabot", %session_id, error = %err, "run failed");
            progress(sink, config.pacing, format!("❌ Erro inesperado: {err}")).await;
            sink.emit(Event::Failure {
                reason: err.to_string(),
            });
        }
    }

    // Release the session on every path; a launch failure leaves nothing to
    // release.
    if let Some(driver) = driver {
        if let Err(err) = driver.close().await {
            warn!(target = "salabot", %session_id, error = %err, "browser release failed");
        }
    }
    progress(sink, config.pacing, "🔌 Conexão finalizada.").await;
    info!(target = "salabot", %session_id, "automation run finished");
}

async fn run_steps(
    driver: &mut dyn PageDriver,
    credentials: &Credentials,
    sink: &dyn EventSink,
    config: &EngineConfig,
) -> Result<String> {
    progress(sink, config.pacing, "🌍 Navegando para o portal Sala do Futuro...").await;
    driver.goto(&config.login_url, config.nav_timeout).await?;

    progress(sink, config.pacing, "✍️ Preenchendo credenciais...").await;
    driver.wait_for_selector(RA_FIELD, config.field_timeout).await?;
    driver.fill(RA_FIELD, &credentials.ra).await?;
    driver.fill(RA_DIGIT_FIELD, &credentials.digito).await?;
    driver.click(UF_DROPDOWN).await?;
    driver.click_item_with_text(&credentials.uf.to_uppercase()).await?;
    driver.fill(PASSWORD_FIELD, &credentials.senha).await?;

    progress(sink, config.pacing, "🔑 Autenticando...").await;
    driver.click(SUBMIT_BUTTON).await?;

    progress(sink, config.pacing, "🕵️ Verificando identidade...").await;
    let greeting = driver
        .wait_for_text_containing(GREETING_MARKER, config.greeting_timeout)
        .await?;
    first_name_from_greeting(&greeting)
}

async fn progress(sink: &dyn EventSink, pacing: Duration, message: impl Into<String>) {
    sink.emit(Event::Progress {
        message: message.into(),
    });
    if !pacing.is_zero() {
        tokio::time::sleep(pacing).await;
    }
}

/// Parse the student's first name out of the confirmation greeting: the token
/// after the first comma, trimmed and capitalized.
///
/// `"Olá, Maria Silva!"` parses to `"Maria"`.
pub fn first_name_from_greeting(greeting: &str) -> Result<String> {
    let (_, tail) = greeting
        .split_once(',')
        .ok_or_else(|| EngineError::Greeting(greeting.to_string()))?;
    let first = tail
        .split_whitespace()
        .next()
        .ok_or_else(|| EngineError::Greeting(greeting.to_string()))?;
    Ok(capitalize(first))
}

fn capitalize(word: &str) -> String {
    let mut chars = word.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
        None => String::new(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn greeting_parses_first_name() {
        assert_eq!(first_name_from_greeting("Olá, Maria Silva!").unwrap(), "Maria");
        assert_eq!(first_name_from_greeting("Olá, João Pereira").unwrap(), "João");
    }

    #[test]
    fn greeting_parse_capitalizes() {
        assert_eq!(first_name_from_greeting("Olá, joão pereira").unwrap(), "João");
        assert_eq!(first_name_from_greeting("Olá, MARIA").unwrap(), "Maria");
    }

    #[test]
    fn greeting_without_comma_is_a_parse_error() {
        let err = first_name_from_greeting("Bem-vindo de volta!").unwrap_err();
        assert!(matches!(err, EngineError::Greeting(_)));
    }

    #[test]
    fn greeting_with_empty_tail_is_a_parse_error() {
        let err = first_name_from_greeting("Olá,   ").unwrap_err();
        assert!(matches!(err, EngineError::Greeting(_)));
    }

    #[test]
    fn default_config_matches_portal_budgets() {
        let config = EngineConfig::default();
        assert_eq!(config.login_url, DEFAULT_LOGIN_URL);
        assert_eq!(config.nav_timeout, Duration::from_secs(60));
        assert_eq!(config.field_timeout, Duration::from_secs(15));
        assert_eq!(config.greeting_timeout, Duration::from_secs(20));
        assert_eq!(config.pacing, Duration::from_millis(500));
    }
}
