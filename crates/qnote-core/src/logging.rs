//! Stderr logging for the qnote binary

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Environment variable that overrides any level chosen on the command line
pub const LOG_ENV: &str = "QNOTE_LOG";

/// Filter directives for the CLI flags.
///
/// A bare level applies to both qnote crates; anything containing `=` is
/// passed through untouched.
pub fn cli_directives(verbose: bool, log_level: Option<&str>) -> String {
    match log_level {
        Some(level) if level.contains('=') => level.to_string(),
        Some(level) => format!("qnote={level},qnote_core={level}"),
        None if verbose => "qnote=debug,qnote_core=debug".to_string(),
        None => "qnote=warn,qnote_core=warn".to_string(),
    }
}

/// Install the global subscriber. Logs go to stderr so stdout stays free for
/// exported streams.
pub fn init_tracing(
    verbose: bool,
    log_level: Option<&str>,
    log_json: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let filter = match EnvFilter::try_from_env(LOG_ENV) {
        Ok(filter) => filter,
        Err(_) => EnvFilter::try_new(cli_directives(verbose, log_level))?,
    };

    let layer = fmt::layer().with_writer(std::io::stderr).with_ansi(false);
    let registry = tracing_subscriber::registry().with(filter);
    if log_json {
        registry.with(layer.json()).try_init()?;
    } else {
        registry
            .with(layer.compact().with_target(false).with_thread_names(true))
            .try_init()?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_quiet() {
        assert_eq!(cli_directives(false, None), "qnote=warn,qnote_core=warn");
        assert_eq!(cli_directives(true, None), "qnote=debug,qnote_core=debug");
    }

    #[test]
    fn test_explicit_level_beats_verbose() {
        assert_eq!(
            cli_directives(true, Some("trace")),
            "qnote=trace,qnote_core=trace"
        );
        assert_eq!(
            cli_directives(false, Some("qnote_core::import=debug")),
            "qnote_core::import=debug"
        );
    }
}
