//! Tracing setup for the vaultdrop binaries.

use tracing_subscriber::EnvFilter;

/// Default filter when `RUST_LOG` is unset.
pub const DEFAULT_FILTER: &str = "vaultdrop=info,vaultdrop_server=info,vaultdrop_store=info,tower_http=info";

/// Install the global subscriber.
///
/// `RUST_LOG` selects levels. `LOG_FORMAT=json` switches to JSON lines.
/// Output goes to stderr so stdout stays free for command output.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let json = std::env::var("LOG_FORMAT")
        .map(|f| f.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);
    let _ = if json {
        builder.json().try_init()
    } else {
        builder.try_init()
    };
}
