use clap::Parser;
use pwstore::cli::{commands, load_settings, Cli, Commands};
use tracing_subscriber::EnvFilter;

/// Environment variable holding the log filter (e.g. `debug`, `pwstore=trace`).
const LOG_ENV: &str = "PWSTORE_LOG";

fn main() {
    init_tracing();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::List => commands::list::execute(&cli),
        Commands::Get { ref name } => commands::get::execute(&cli, name),
        Commands::Put {
            ref name,
            ref file,
            force,
        } => commands::put::execute(&cli, name, file, force),
        Commands::Edit { ref name } => commands::edit::execute(&cli, name),
        Commands::Copy { ref name, username } => commands::copy::execute(&cli, name, username),
        Commands::Gen { length } => {
            load_settings(&cli).and_then(|settings| commands::generate::execute(&settings, length))
        }
        Commands::Completions { shell } => commands::completions::execute(shell),
    };

    if let Err(e) = result {
        tracing::debug!(error = ?e, "command failed");
        pwstore::cli::output::error(&e.to_string());
        std::process::exit(1);
    }
}

/// Logs go to stderr so they never mix with record text on stdout.
fn init_tracing() {
    let filter = EnvFilter::try_from_env(LOG_ENV).unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
