//! CLI entry point - the composition root.
//!
//! Parses arguments, bootstraps the `CliContext` and dispatches to handlers.

use clap::Parser;
use tracing_subscriber::EnvFilter;

use savekit_cli::{Cli, CliConfig, CliError, Commands, bootstrap, handlers};

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

async fn dispatch(cli: Cli) -> anyhow::Result<Result<(), CliError>> {
    let Some(command) = cli.command else {
        use clap::CommandFactory;
        Cli::command().print_help()?;
        return Ok(Ok(()));
    };

    let os_version = match &command {
        Commands::Save { os_version, .. } => *os_version,
        _ => None,
    };
    let config = CliConfig {
        settings_path: cli.settings,
        downloads_dir: cli.downloads_dir,
        os_version,
    };
    let mut ctx = bootstrap(config)?;

    let result = match command {
        Commands::Save {
            input, name, pick, ..
        } => {
            let args = handlers::save::SaveArgs { input, name, pick };
            handlers::save::execute(&mut ctx, args).await.map(|_| ())
        }
        Commands::Version => {
            handlers::version::execute(&ctx);
            Ok(())
        }
        Commands::Store => handlers::store::execute(&ctx),
        Commands::Paths => {
            handlers::paths::execute(&ctx);
            Ok(())
        }
    };
    Ok(result)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables before anything reads them
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_logging(cli.verbose);

    if let Err(err) = dispatch(cli).await? {
        eprintln!("Error: {err}");
        std::process::exit(err.exit_code());
    }
    Ok(())
}
