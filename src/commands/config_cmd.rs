use crate::config::{Config, ResolvedConfig};
use crate::error::Result;
use crate::output::Format;
use clap::Subcommand;

#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// Show the current resolved configuration
    #[command(long_about = "Display the current configuration with resolved values.\n\n\
        Shows values from all sources (CLI flags > env vars > config file).\n\
        Token is partially masked.\n\n\
        Example:\n\
        pdc config show")]
    Show,
    /// Set a config value (server, token, format)
    #[command(long_about = "Persist a configuration value to ~/.pdc/config.json.\n\n\
        Valid keys:\n\
          server   REST API root (e.g., https://pdc.example.com/rest_api/v1)\n\
          token    API token sent as `Authorization: Token <token>`\n\
          format   Default output format: json, table, plain\n\n\
        Examples:\n\
        pdc config set server https://pdc.example.com/rest_api/v1\n\
        pdc config set format table")]
    Set {
        /// Config key to set
        key: String,
        /// Value to set
        value: String,
    },
    /// Show the config file path
    #[command(long_about = "Print the path to the config file.\n\n\
        Default: ~/.pdc/config.json\n\n\
        Example:\n\
        pdc config path")]
    Path,
}

pub fn handle(cmd: ConfigCommand, resolved: &ResolvedConfig, format: &Format) -> Result<()> {
    match cmd {
        ConfigCommand::Show => {
            let display = serde_json::json!({
                "server": resolved.server,
                "token": resolved.masked_token(),
                "format": resolved.format,
                "config_file": Config::config_path().to_string_lossy().to_string(),
            });
            crate::output::print_output(&display, format);
        }
        ConfigCommand::Set { key, value } => {
            let mut cfg = Config::load_file();
            cfg.set(&key, value)?;
            cfg.save_file()?;
            crate::output::print_success(&format!("Config '{key}' saved"));
        }
        ConfigCommand::Path => {
            println!("{}", Config::config_path().to_string_lossy());
        }
    }
    Ok(())
}
