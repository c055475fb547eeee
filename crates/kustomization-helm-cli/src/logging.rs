//! Diagnostic logging to stderr
//!
//! `RUST_LOG` wins when set. Otherwise only warnings are shown, or
//! everything down to `debug` with `--debug`.

use tracing_subscriber::EnvFilter;

pub fn init(debug: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| default_filter(debug));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_ansi(console::Term::stderr().is_term())
        .with_target(false)
        .without_time()
        .try_init();
}

fn default_filter(debug: bool) -> EnvFilter {
    if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    }
}

