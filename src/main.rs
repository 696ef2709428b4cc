mod commands;

use clap::{Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "campus-rentals",
    version,
    about = "Campus marketplace for micro-tasks, item rentals and wanted requests"
)]
struct Cli {
    /// Path to the database file
    #[arg(long, env = "RENTALS_DB", default_value = "database.db", global = true)]
    db: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create or upgrade the database schema
    Init,
    /// Migrate the database, then serve the web app
    Serve {
        /// Address to bind
        #[arg(long, env = "HOST", default_value = "0.0.0.0")]
        host: IpAddr,
        /// Port to listen on
        #[arg(short, long, env = "PORT", default_value_t = 5000)]
        port: u16,
        /// Key used to sign session cookies (random when unset)
        #[arg(long, env = "SESSION_SECRET", hide_env_values = true)]
        session_secret: Option<String>,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Init => commands::init::run(&cli.db),
        Commands::Serve {
            host,
            port,
            session_secret,
        } => commands::serve::run(&cli.db, host, port, session_secret.as_deref()).await,
    };

    if let Err(e) = result {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
