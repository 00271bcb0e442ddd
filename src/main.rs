mod client;
mod commands;
mod config;
mod error;
mod output;
mod resource;

use clap::{ArgAction, Parser, Subcommand};
use commands::{
    config_cmd::ConfigCommand, global_component::GlobalComponentCommand,
    release_component::ReleaseComponentCommand,
};
use tracing_subscriber::EnvFilter;

/// PDC CLI: manage global and release components.
///
/// Create and update commands only send the fields you pass. Passing an
/// empty string (e.g. `--dist-git-path ""`) clears a field on the server.
///
/// Setup:
///   pdc config set server https://pdc.example.com/rest_api/v1
///   pdc config set token YOUR_API_TOKEN
///
/// Or via environment variables:
///   export PDC_SERVER=https://pdc.example.com/rest_api/v1
///   export PDC_TOKEN=your-api-token
///
/// Output formats (--format):
///   json   - Pretty JSON (default)
///   table  - Human-readable listing and details
///   plain  - Key=value pairs for piping
///
/// Logging:
///   -v for debug output, -vv for trace; RUST_LOG overrides both.
#[derive(Parser, Debug)]
#[command(name = "pdc", version, about, long_about)]
struct Cli {
    /// REST API root URL
    #[arg(long, global = true, env = "PDC_SERVER")]
    server: Option<String>,

    /// API token
    #[arg(long, global = true, env = "PDC_TOKEN")]
    token: Option<String>,

    /// Output format: json (default), table, plain
    #[arg(long, global = true, env = "PDC_FORMAT")]
    format: Option<String>,

    /// Increase log verbosity
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Global components: list, info, create, update
    #[command(name = "global-component")]
    GlobalComponent {
        #[command(subcommand)]
        cmd: GlobalComponentCommand,
    },
    /// Release components: list, info, create, update
    #[command(name = "release-component")]
    ReleaseComponent {
        #[command(subcommand)]
        cmd: ReleaseComponentCommand,
    },
    /// Manage CLI configuration
    Config {
        #[command(subcommand)]
        cmd: ConfigCommand,
    },
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "debug",
        _ => "trace",
    };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .compact()
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let resolved = config::Config::resolve(
        cli.server.as_deref(),
        cli.token.as_deref(),
        cli.format.as_deref(),
    );

    let client = client::PdcClient::new(resolved.server.clone(), resolved.token.clone());
    tracing::debug!(server = %resolved.server, "resolved configuration");

    let format = output::Format::parse(&resolved.format);
    let result = match cli.command {
        Command::GlobalComponent { cmd } => match format {
            Ok(format) => commands::global_component::handle(cmd, &client, &format).await,
            Err(e) => Err(e),
        },
        Command::ReleaseComponent { cmd } => match format {
            Ok(format) => commands::release_component::handle(cmd, &client, &format).await,
            Err(e) => Err(e),
        },
        // A bad stored format must not lock out `config set format`.
        Command::Config { cmd } => {
            let format = format.unwrap_or(output::Format::Json);
            commands::config_cmd::handle(cmd, &resolved, &format)
        }
    };

    if let Err(e) = result {
        output::print_error(&e.to_string());
        std::process::exit(1);
    }
}
