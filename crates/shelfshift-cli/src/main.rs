use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod logging;
mod output;

#[derive(Parser)]
#[command(name = "shelfshift")]
#[command(about = "Move your record shelf between music cataloging services")]
#[command(version)]
struct Cli {
    /// Enable verbose output (-v for debug, -vv for trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    quiet: bool,

    /// Output format
    #[arg(long, global = true, default_value = "human", value_enum)]
    output: output::OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Export ratings, collection, and wantlist from the source service
    Export {
        /// Session cookie copied from a logged-in browser (falls back to
        /// the stored credential)
        cookie: Option<String>,

        /// Personal access token for the source API (falls back to the
        /// stored credential)
        token: Option<String>,

        /// Also fetch each rated release's master URL (one extra
        /// rate-limited request per record; makes import resolution faster)
        #[arg(long)]
        include_masters: bool,

        /// Directory for the exported JSON files
        #[arg(long)]
        export_dir: Option<PathBuf>,
    },

    /// Import previously exported files into the target service
    Import {
        /// Directory containing the exported JSON files
        import_dir: PathBuf,

        /// Target account username
        username: String,

        /// Target account password (prompted when omitted)
        #[arg(long)]
        password: Option<String>,

        /// Contact address included in the client user agent
        #[arg(long)]
        email: Option<String>,

        /// Collection receiving owned release-groups (created if missing)
        #[arg(long)]
        owned_name: Option<String>,

        /// Collection receiving wished-for release-groups (created if missing)
        #[arg(long)]
        wishlist_name: Option<String>,

        /// Skip the ratings import
        #[arg(long = "no-ratings", action = ArgAction::SetFalse)]
        ratings: bool,

        /// Skip the owned-releases import
        #[arg(long = "no-owned", action = ArgAction::SetFalse)]
        owned: bool,

        /// Skip the wishlist import
        #[arg(long = "no-wishlist", action = ArgAction::SetFalse)]
        wishlist: bool,
    },
}

#[tokio::main]
async fn main() -> color_eyre::Result<()> {
    color_eyre::install()?;

    let cli = Cli::parse();

    logging::init_logging(cli.verbose, cli.quiet)
        .map_err(|e| color_eyre::eyre::eyre!("Failed to initialize logging: {}", e))?;

    let out = output::Output::new(cli.output, cli.quiet);

    match cli.command {
        Commands::Export {
            cookie,
            token,
            include_masters,
            export_dir,
        } => commands::export::run_export(cookie, token, include_masters, export_dir, &out).await,
        Commands::Import {
            import_dir,
            username,
            password,
            email,
            owned_name,
            wishlist_name,
            ratings,
            owned,
            wishlist,
        } => {
            commands::import::run_import(
                &import_dir,
                &username,
                password,
                email.as_deref(),
                owned_name,
                wishlist_name,
                ratings,
                owned,
                wishlist,
                &out,
            )
            .await
        }
    }
}
