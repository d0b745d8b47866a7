use crate::config::Config;
use log::{LevelFilter, SetLoggerError};
use simplelog::{self, ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependency modules that are silenced unless the relay runs at Trace level.
/// The HTTP and WebSocket stacks log every frame and connection at Debug.
const FILTERED_MODULES: &[&str] = &[
    "tower",
    "tracing",
    "hyper",
    "axum",
    "reqwest",
    "tungstenite",
    "mio",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger.
    ///
    /// Fails only if another logger was already installed for this process.
    pub fn init_logger(config: &Config) -> Result<(), SetLoggerError> {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(level != LevelFilter::Trace);

        TermLogger::init(
            level,
            log_config,
            Self::terminal_mode(config),
            ColorChoice::Auto,
        )
    }

    /// Production output goes to stderr only so it can be shipped as one stream.
    fn terminal_mode(config: &Config) -> TerminalMode {
        if config.is_production() {
            TerminalMode::Stderr
        } else {
            TerminalMode::Mixed
        }
    }

    fn build_log_config(filter_dependencies: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder.set_time_format_rfc3339();
        builder.set_target_level(LevelFilter::Error);

        if filter_dependencies {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config_with(args: &[&str]) -> Config {
        let mut argv = vec!["board_relay"];
        argv.extend_from_slice(args);
        Config::from_args(argv)
    }

    #[test]
    fn test_filtered_modules_contains_transport_dependencies() {
        for module in ["tower", "hyper", "axum", "reqwest", "tungstenite"] {
            assert!(
                FILTERED_MODULES.contains(&module),
                "{module} should be filtered"
            );
        }
    }

    #[test]
    fn test_production_logs_to_stderr() {
        let config = config_with(&["--runtime-env", "production"]);
        assert!(matches!(
            Logger::terminal_mode(&config),
            TerminalMode::Stderr
        ));

        let config = config_with(&["--runtime-env", "development"]);
        assert!(matches!(Logger::terminal_mode(&config), TerminalMode::Mixed));
    }

    #[test]
    fn test_build_log_config_does_not_panic() {
        let _filtered = Logger::build_log_config(true);
        let _unfiltered = Logger::build_log_config(false);
    }
}
