use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;

mod commands;

#[derive(Parser)]
#[command(name = "restock")]
#[command(author, version, about, long_about = None)]
#[command(
    about = "Watch a storefront's product API and alert on tracked-SKU restocks",
    long_about = "Restock drives a headless Chrome session through the shop's landing page to \
                  pick up a valid session, fetches the product API from inside the page, and \
                  sends a Telegram message for every tracked SKU that is back in stock."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run one poll of the product feed and alert on tracked restocks
    Check(commands::check::CheckArgs),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Execute the command
    match cli.command {
        Commands::Check(args) => commands::check::execute(args),
        Commands::Completion { shell } => {
            commands::completion::execute(shell, &mut Cli::command())
        }
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new(
            "restock_cli=debug,restock_core=debug,restock_browser=debug,restock_notify=debug",
        )
    } else {
        EnvFilter::new("restock_cli=info,restock_browser=info,restock_notify=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}
