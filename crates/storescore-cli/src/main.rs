mod region;
mod store;
mod view;

use std::collections::HashSet;

use clap::{Parser, Subcommand};
use storescore_client::ClientError;
use storescore_core::{AppConfig, DropTarget, RegionId, StoreId};
use storescore_regions::{ManagerError, MoveOutcome, Notice, NoticeLevel, RegionManager};
use tracing_subscriber::EnvFilter;

use crate::region::{run_region, RegionCommands};
use crate::store::{run_store, StoreCommands};
use crate::view::{
    render_departments, render_map, render_members, render_store_table, render_tree, StoreFilter,
    TreeView,
};

#[derive(Debug, Parser)]
#[command(name = "storescore")]
#[command(about = "Manage StoreScore regions and the stores assigned to them")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Show regions, their stores and the unassigned bucket (default)
    Tree {
        /// Fold a region; repeat for several
        #[arg(long = "collapse")]
        collapse: Vec<RegionId>,
        /// Fold every region
        #[arg(long)]
        collapse_all: bool,
        /// Show completed/total walks per store
        #[arg(long)]
        walks: bool,
    },
    /// List stores
    Stores {
        #[arg(long, conflicts_with = "unassigned")]
        region: Option<RegionId>,
        /// Only stores without a region
        #[arg(long)]
        unassigned: bool,
    },
    /// Move a store to another region
    Move {
        store: StoreId,
        #[arg(long, required_unless_present = "unassign", conflicts_with = "unassign")]
        to: Option<RegionId>,
        /// Move the store to the unassigned bucket
        #[arg(long)]
        unassign: bool,
    },
    /// Create, edit and delete regions
    Region {
        #[command(subcommand)]
        command: RegionCommands,
    },
    /// Create and edit stores
    Store {
        #[command(subcommand)]
        command: StoreCommands,
    },
    /// List organization members
    Members {
        /// Only members who can manage a region
        #[arg(long)]
        managers: bool,
    },
    /// List active departments
    Departments,
    /// Show store locations
    Map,
}

impl Commands {
    fn needs_tree(&self) -> bool {
        !matches!(self, Commands::Members { .. } | Commands::Departments)
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    let config = storescore_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();
    tracing::debug!(?config, "configuration loaded");

    let mut manager = RegionManager::from_config(&config)?;
    let command = cli.command.unwrap_or(Commands::Tree {
        collapse: Vec::new(),
        collapse_all: false,
        walks: false,
    });

    if command.needs_tree() {
        manager.refresh().await?;
    }
    let outcome = run(&mut manager, &config, command).await;
    print_notices(manager.notices_mut().drain());
    settle(outcome)
}

async fn run(
    manager: &mut RegionManager,
    config: &AppConfig,
    command: Commands,
) -> Result<(), ManagerError> {
    match command {
        Commands::Tree {
            collapse,
            collapse_all,
            walks,
        } => {
            let counts = if walks {
                Some(manager.walk_counts().await?)
            } else {
                None
            };
            let view = TreeView {
                collapsed: collapse.into_iter().collect::<HashSet<_>>(),
                collapse_all,
                walks: counts.as_ref(),
            };
            println!("{}", render_tree(manager.tree(), &view));
        }
        Commands::Stores { region, unassigned } => {
            let filter = match (region, unassigned) {
                (Some(id), _) => StoreFilter::Region(id),
                (None, true) => StoreFilter::Unassigned,
                (None, false) => StoreFilter::All,
            };
            println!("{}", render_store_table(manager.tree(), filter));
        }
        Commands::Move {
            store,
            to,
            unassign,
        } => {
            let target = if unassign {
                DropTarget::Unassigned
            } else {
                DropTarget::from(to)
            };
            move_store(manager, store, target).await?;
        }
        Commands::Region { command } => run_region(manager, command).await?,
        Commands::Store { command } => run_store(manager, command).await?,
        Commands::Members { managers } => {
            manager.load_directory().await?;
            let members = if managers {
                manager.eligible_managers()
            } else {
                manager.members().iter().collect()
            };
            println!("{}", render_members(&members));
        }
        Commands::Departments => {
            manager.load_directory().await?;
            println!("{}", render_departments(&manager.active_departments()));
        }
        Commands::Map => {
            println!("{}", render_map(manager.tree(), config.maps_enabled()));
        }
    }
    Ok(())
}

/// Run a move through the same drag flow the interactive view uses.
async fn move_store(
    manager: &mut RegionManager,
    store: StoreId,
    target: DropTarget,
) -> Result<(), ManagerError> {
    manager.start_drag(store)?;
    manager.drag_enter(target)?;
    if manager.drop_store().await? == MoveOutcome::Unchanged {
        println!("store {store} is already there; nothing to do");
    }
    Ok(())
}

fn print_notices(notices: Vec<Notice>) {
    for notice in notices {
        match notice.level {
            NoticeLevel::Success => println!("{}", notice.message),
            NoticeLevel::Error => eprintln!("{}", notice.message),
        }
    }
}

/// Operation failures were reported above; only a broken connection or bad
/// configuration makes the process fail.
fn settle(outcome: Result<(), ManagerError>) -> anyhow::Result<()> {
    match outcome {
        Ok(()) => Ok(()),
        Err(e) if is_fatal(&e) => Err(e.into()),
        Err(ManagerError::Backend { .. } | ManagerError::Refused(_)) => Ok(()),
        Err(e @ ManagerError::ConfirmationRequired(_)) => {
            eprintln!("{e}; pass --yes to continue");
            Ok(())
        }
        Err(e) => {
            eprintln!("error: {e}");
            Ok(())
        }
    }
}

fn is_fatal(err: &ManagerError) -> bool {
    matches!(
        err,
        ManagerError::Backend {
            source: ClientError::Http(_) | ClientError::InvalidBaseUrl { .. },
            ..
        }
    )
}
