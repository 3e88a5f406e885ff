use crate::config::{Config, RustEnv};
use log::LevelFilter;
use simplelog::{ColorChoice, ConfigBuilder, TermLogger, TerminalMode};

/// Dependencies whose logs are dropped unless running at Trace.
const FILTERED_MODULES: &[&str] = &[
    "sqlx",
    "sea_orm",
    "hyper",
    "h2",
    "reqwest",
    "rustls",
    "tower",
];

pub struct Logger {}

impl Logger {
    /// Installs the global terminal logger.
    ///
    /// Every line carries its target so the two workers can be told apart.
    /// Outside development, colors are turned off for log collectors.
    pub fn init_logger(config: &Config) {
        let level = config.log_level_filter;
        let log_config = Self::build_log_config(Self::should_filter_dependencies(level));
        let color = Self::color_choice(&config.runtime_env());

        if let Err(e) = TermLogger::init(level, log_config, TerminalMode::Mixed, color) {
            eprintln!("Logger was already initialized: {e}");
        }
    }

    fn should_filter_dependencies(level: LevelFilter) -> bool {
        level != LevelFilter::Trace
    }

    fn color_choice(env: &RustEnv) -> ColorChoice {
        match env {
            RustEnv::Development => ColorChoice::Auto,
            RustEnv::Staging | RustEnv::Production => ColorChoice::Never,
        }
    }

    fn build_log_config(apply_filters: bool) -> simplelog::Config {
        let mut builder = ConfigBuilder::new();
        builder
            .set_time_format_rfc3339()
            .set_target_level(LevelFilter::Error)
            .set_thread_level(LevelFilter::Off);

        if apply_filters {
            for module in FILTERED_MODULES {
                builder.add_filter_ignore_str(module);
            }
        }

        builder.build()
    }
}
