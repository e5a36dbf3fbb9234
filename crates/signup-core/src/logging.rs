//! Logging for signup-rs.
//!
//! [`setup_logging`] installs the global subscriber described by
//! [`Settings`](crate::settings::Settings); every submission attempt runs
//! inside a [`submission_span`].

use tracing_subscriber::fmt;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{EnvFilter, Layer};

use crate::settings::Settings;

/// Targets a bare level such as `debug` applies to.
const SIGNUP_TARGETS: &[&str] = &[
    "signup_core",
    "signup_storage",
    "signup_forms",
    "registration_demo",
];

/// Level for every other target when `log_level` is a bare level.
const DEPENDENCY_LEVEL: &str = "warn";

const FALLBACK_LEVEL: &str = "info";

/// Expands `log_level` into `EnvFilter` directives.
///
/// A bare level is scoped to the signup crates while dependencies stay at
/// `warn`. Anything containing `=` or `,` is taken as a full directive list.
///
/// # Examples
///
/// ```
/// use signup_core::logging::filter_directives;
///
/// assert_eq!(filter_directives("hyper=info"), "hyper=info");
/// assert!(filter_directives("debug").contains("signup_forms=debug"));
/// ```
pub fn filter_directives(log_level: &str) -> String {
    let level = match log_level.trim() {
        "" => FALLBACK_LEVEL,
        level => level,
    };
    if level.contains(['=', ',']) {
        return level.to_string();
    }

    let mut directives = vec![DEPENDENCY_LEVEL.to_string()];
    directives.extend(SIGNUP_TARGETS.iter().map(|target| format!("{target}={level}")));
    directives.join(",")
}

/// Installs the global tracing subscriber.
///
/// Debug mode logs in a pretty, human-readable format with source locations;
/// otherwise each event is a JSON line carrying its current span, so the
/// submission id lands on every entry. An unparsable `log_level` falls back
/// to `info` and is reported once the subscriber is up.
///
/// Returns `false` when a global subscriber was already installed, in which
/// case nothing changes.
pub fn setup_logging(settings: &Settings) -> bool {
    let (filter, rejected) = match EnvFilter::try_new(filter_directives(&settings.log_level)) {
        Ok(filter) => (filter, None),
        Err(e) => (EnvFilter::new(filter_directives(FALLBACK_LEVEL)), Some(e)),
    };

    let output = if settings.debug {
        fmt::layer()
            .pretty()
            .with_target(true)
            .with_file(true)
            .with_line_number(true)
            .boxed()
    } else {
        fmt::layer()
            .json()
            .with_target(true)
            .with_current_span(true)
            .boxed()
    };

    let installed = tracing_subscriber::registry()
        .with(filter)
        .with(output)
        .try_init()
        .is_ok();

    if let (true, Some(e)) = (installed, rejected) {
        tracing::warn!(
            log_level = %settings.log_level,
            error = %e,
            "invalid log level, using info"
        );
    }
    installed
}

/// Creates a tracing span for one submission attempt.
///
/// # Examples
///
/// ```
/// use signup_core::logging::submission_span;
///
/// let span = submission_span("4b1c2f0e");
/// let _guard = span.enter();
/// tracing::info!("validating");
/// ```
pub fn submission_span(submission_id: &str) -> tracing::Span {
    tracing::info_span!("submission", id = submission_id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_level_is_scoped_to_signup_crates() {
        assert_eq!(
            filter_directives("debug"),
            "warn,signup_core=debug,signup_storage=debug,signup_forms=debug,registration_demo=debug"
        );
        assert_eq!(filter_directives("  trace "), filter_directives("trace"));
    }

    #[test]
    fn test_directive_lists_pass_through() {
        assert_eq!(filter_directives("signup_forms=trace"), "signup_forms=trace");
        assert_eq!(filter_directives("info,tokio=warn"), "info,tokio=warn");
    }

    #[test]
    fn test_empty_level_falls_back_to_info() {
        assert_eq!(filter_directives(""), filter_directives("info"));
    }

    #[test]
    fn test_expanded_directives_parse() {
        for level in ["error", "warn", "info", "debug", "trace"] {
            assert!(EnvFilter::try_new(filter_directives(level)).is_ok(), "{level}");
        }
    }

    #[test]
    fn test_second_setup_is_a_no_op() {
        let settings = Settings {
            log_level: "not a [valid filter".to_string(),
            ..Settings::default()
        };
        setup_logging(&settings);
        assert!(!setup_logging(&Settings::default()));
    }

    #[test]
    fn test_submission_span_enters() {
        let span = submission_span("abc-123");
        let _guard = span.enter();
        tracing::debug!("inside submission span");
    }
}
