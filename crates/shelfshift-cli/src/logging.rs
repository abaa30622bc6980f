use anyhow::Result;
use std::io::{self, IsTerminal};
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Registry};

/// Initialize tracing. `-v` count picks the level; `RUST_LOG` overrides it
/// entirely; JSON output kicks in when stderr is not a terminal or
/// `RUST_LOG_JSON=true`.
pub fn init_logging(verbose_level: u8, quiet: bool) -> Result<()> {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        let default = match verbose_level {
            0 => "info",
            // hyper's connection chatter drowns out our own debug lines
            1 => "debug,hyper::proto::h1=warn,hyper::client::pool=warn",
            _ => "trace",
        };
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default))
    };

    let use_json = std::env::var("RUST_LOG_JSON")
        .map(|value| value == "true")
        .unwrap_or_else(|_| !io::stderr().is_terminal());

    let registry = Registry::default().with(filter);
    if use_json {
        registry
            .with(fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(io::stderr)).init();
    }
    Ok(())
}
