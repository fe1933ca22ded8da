use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use fluster_cli::{commands, CliContext};
use fluster_core::{ServerQuery, ViewState};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

#[derive(Parser)]
#[command(author, version, about)]
struct Cli {
    #[arg(short, long, global = true)]
    verbose: bool,
    /// Address of the privileged executor.
    #[arg(long, global = true, env = "FLUSTER_BACKEND_URL", default_value = fluster_config::DEFAULT_BACKEND_URL)]
    backend: String,
    /// Follow a failed command's retry this many times.
    #[arg(long, global = true, default_value_t = 0)]
    retries: u32,
    #[arg(long, global = true, hide = true)]
    fragment_file: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List catalog versions grouped by install state
    Versions,
    Install {
        id: String,
    },
    Uninstall {
        id: String,
    },
    Launch {
        id: String,
    },
    /// Listen for game servers on the local network
    Servers {
        #[arg(short, long, default_value = "")]
        search: String,
        #[arg(long)]
        version: Option<String>,
        #[arg(long, default_value_t = 5)]
        listen_secs: u64,
    },
    Join {
        server_id: String,
        #[arg(long, default_value_t = fluster_config::DEFAULT_USER_ID)]
        user_id: u64,
        #[arg(long, default_value_t = 10)]
        listen_secs: u64,
    },
    Setup,
    /// Run the startup sequence and show the resulting screen
    #[command(alias = "view")]
    Status {
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Switch the remembered screen (welcome, setup, dashboard, discovery)
    Open {
        view: ViewState,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let default_level = if cli.verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let ctx = CliContext {
        backend: cli.backend,
        retries: cli.retries,
        fragment_path: cli.fragment_file,
    };

    match cli.command {
        Commands::Versions => {
            commands::cmd_versions(&ctx).await?;
        }
        Commands::Install { id } => commands::cmd_install(&ctx, &id).await?,
        Commands::Uninstall { id } => commands::cmd_uninstall(&ctx, &id).await?,
        Commands::Launch { id } => commands::cmd_launch(&ctx, &id).await?,
        Commands::Servers {
            search,
            version,
            listen_secs,
        } => {
            let mut query = ServerQuery::new(search);
            if let Some(v) = version {
                query = query.with_version(v);
            }
            commands::cmd_servers(&ctx, query, Duration::from_secs(listen_secs)).await?;
        }
        Commands::Join {
            server_id,
            user_id,
            listen_secs,
        } => {
            commands::cmd_join(&ctx, &server_id, user_id, Duration::from_secs(listen_secs)).await?
        }
        Commands::Setup => commands::cmd_setup(&ctx).await?,
        Commands::Status { search } => {
            commands::cmd_status(&ctx, &search).await?;
        }
        Commands::Open { view } => commands::cmd_view(&ctx, view).await?,
    }

    Ok(())
}
