use tracing_subscriber::{fmt::SubscriberBuilder, EnvFilter};

/// HTTP stack crates log at `warn` unless `RUST_LOG` says otherwise.
const HTTP_STACK: &str = "hyper=warn,hyper_util=warn,reqwest=warn,h2=warn";

fn fallback_directives(default_filter: &str) -> String {
    format!("{default_filter},{HTTP_STACK}")
}

/// Sets up the global tracing subscriber. Logs go to stderr; stdout is kept for
/// the import summary table.
///
/// `default_filter` applies when `RUST_LOG` is not set.
pub fn init_tracing(default_filter: &str) -> Result<(), anyhow::Error> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(fallback_directives(default_filter)));

    SubscriberBuilder::default()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fallback_keeps_caller_level_and_quiets_http_stack() {
        let directives = fallback_directives("debug");
        assert!(directives.starts_with("debug,"));
        assert!(directives.contains("reqwest=warn"));
        assert!(EnvFilter::try_new(&directives).is_ok());
    }
}
