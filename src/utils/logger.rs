use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Directives used when `RUST_LOG` is unset.
///
/// Version resolution and dataset I/O log from `core`; verbose runs open that
/// up to debug while leaving dependencies at warn.
pub fn default_directives(verbose: bool) -> &'static str {
    if verbose {
        "warn,catalog_datasets=info,catalog_datasets::core=debug,catalog_datasets::app=debug"
    } else {
        "warn,catalog_datasets=info"
    }
}

fn env_filter(verbose: bool) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directives(verbose)))
}

pub fn init_cli_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(verbose)
                .without_time()
                .compact(),
        )
        .init();
}

/// One JSON object per event, for catalog checks run from CI.
pub fn init_json_logger(verbose: bool) {
    tracing_subscriber::registry()
        .with(env_filter(verbose))
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_directives_parse() {
        for verbose in [false, true] {
            assert!(EnvFilter::try_new(default_directives(verbose)).is_ok());
        }
    }

    #[test]
    fn test_verbose_opens_core_to_debug() {
        assert!(default_directives(true).contains("catalog_datasets::core=debug"));
        assert!(!default_directives(false).contains("debug"));
    }
}
