use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

/// Install the global subscriber.
///
/// `RUST_LOG` is honoured when set; otherwise everything at `info` and
/// above is logged. `debug` raises the level so datagram dumps show.
pub fn init_tracing(debug: bool) {
    let mut filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if debug {
        filter = filter.add_directive(LevelFilter::DEBUG.into());
    }

    tracing_subscriber::registry()
        .with(fmt::layer().with_target(true))
        .with(filter)
        .init();
}
