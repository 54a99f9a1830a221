use std::collections::HashMap;

use anyhow::Result;
use clap::ArgMatches;
use config::{Config as ConfigBuilder, Environment};
use serde::{Deserialize, Serialize};

use mica_core::config::Options;

/// CLI-level settings merged from defaults, environment variables and
/// command-line flags. Site configuration itself lives in `mica.yaml`;
/// the directory fields here are overrides passed down to it.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Configuration file path
    pub config: String,
    /// Content directory override (empty = use mica.yaml)
    pub content: String,
    /// Output directory override (empty = use mica.yaml)
    pub output: String,
    /// Assets directory override (empty = use mica.yaml)
    pub assets: String,
    /// Host for the dev server
    pub host: String,
    /// Port for the dev server
    pub port: u16,
    /// Open browser automatically
    pub open: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            config: "./mica.yaml".to_string(),
            content: String::new(),
            output: String::new(),
            assets: String::new(),
            host: "127.0.0.1".to_string(),
            port: 8080,
            open: false,
        }
    }
}

impl Settings {
    /// Load settings with cascading precedence:
    /// 1. CLI arguments (highest priority)
    /// 2. Environment variables (MICA_*)
    /// 3. Defaults (lowest priority)
    pub fn load(args: &ArgMatches) -> Result<Self> {
        let mut builder = ConfigBuilder::builder();

        builder = builder.add_source(config::Config::try_from(&Settings::default())?);

        builder = builder.add_source(Environment::with_prefix("MICA").prefix_separator("_"));

        let mut cli_overrides: HashMap<String, String> = HashMap::new();

        if let Some(path) = args.get_one::<String>("config") {
            cli_overrides.insert("config".to_string(), path.clone());
        }
        if let Some(dir) = args.get_one::<String>("content") {
            cli_overrides.insert("content".to_string(), dir.clone());
        }
        if let Some(dir) = args.get_one::<String>("output") {
            cli_overrides.insert("output".to_string(), dir.clone());
        }
        if let Some(dir) = args.get_one::<String>("assets") {
            cli_overrides.insert("assets".to_string(), dir.clone());
        }
        // Only present on the serve subcommand
        if let Some(host) = args.try_get_one::<String>("host").unwrap_or(None) {
            cli_overrides.insert("host".to_string(), host.clone());
        }
        if let Some(port) = args.try_get_one::<String>("port").unwrap_or(None) {
            cli_overrides.insert("port".to_string(), port.clone());
        }
        if args.try_get_one::<bool>("open").unwrap_or(None) == Some(&true) {
            cli_overrides.insert("open".to_string(), "true".to_string());
        }

        if !cli_overrides.is_empty() {
            builder = builder.add_source(config::Config::try_from(&cli_overrides)?);
        }

        let settings: Settings = builder.build()?.try_deserialize()?;
        Ok(settings)
    }

    /// The directory overrides to apply on top of `mica.yaml`.
    pub fn core_options(&self) -> Options {
        let non_empty = |s: &str| {
            if s.is_empty() {
                None
            } else {
                Some(s.to_string())
            }
        };

        Options {
            content_dir: non_empty(&self.content),
            output_dir: non_empty(&self.output),
            assets_dir: non_empty(&self.assets),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::{Arg, Command};

    fn test_command() -> Command {
        Command::new("test")
            .arg(Arg::new("config").long("config").value_name("FILE"))
            .arg(Arg::new("content").long("content").value_name("DIR"))
            .arg(Arg::new("output").long("output").value_name("DIR"))
            .arg(Arg::new("assets").long("assets").value_name("DIR"))
    }

    #[test]
    fn defaults_apply_without_flags() {
        let matches = test_command().try_get_matches_from(vec!["test"]).unwrap();
        let settings = Settings::load(&matches).unwrap();
        assert_eq!(settings.config, "./mica.yaml");
        assert_eq!(settings.port, 8080);
        assert!(!settings.open);
        assert_eq!(settings.core_options().output_dir, None);
    }

    #[test]
    fn cli_flags_override_defaults() {
        let matches = test_command()
            .try_get_matches_from(vec!["test", "--config", "site.yaml", "--output", "dist"])
            .unwrap();

        let settings = Settings::load(&matches).unwrap();
        assert_eq!(settings.config, "site.yaml");
        assert_eq!(settings.output, "dist");
        assert_eq!(settings.core_options().output_dir.as_deref(), Some("dist"));
        // untouched fields keep defaults
        assert_eq!(settings.host, "127.0.0.1");
    }
}
