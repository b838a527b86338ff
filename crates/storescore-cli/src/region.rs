//! `region` command handlers.

use clap::Subcommand;
use storescore_core::{RegionId, UserId, REGION_COLORS};
use storescore_regions::{ManagerError, RegionManager};

use crate::view::render_members;

/// Sub-commands available under `region`.
#[derive(Debug, Subcommand)]
pub enum RegionCommands {
    /// Create a top-level region, or a sub-region with --parent
    Create {
        name: String,
        /// Top-level region to nest the new one under
        #[arg(long)]
        parent: Option<RegionId>,
        /// Colour as #RRGGBB (defaults to the first preset)
        #[arg(long)]
        color: Option<String>,
    },
    /// Rename a region
    Rename { id: RegionId, name: String },
    /// Change a region's colour
    #[command(after_help = color_presets())]
    Color { id: RegionId, color: String },
    /// Delete a region that has no stores left
    Delete { id: RegionId },
    /// Set or clear a region's manager
    Manager {
        id: RegionId,
        /// User id of the new manager
        #[arg(long, required_unless_present = "clear", conflicts_with = "clear")]
        user: Option<UserId>,
        /// Remove the current manager
        #[arg(long)]
        clear: bool,
    },
    /// List members who can manage a region
    Managers,
}

fn color_presets() -> String {
    format!("Presets: {}", REGION_COLORS.join(" "))
}

/// # Errors
///
/// Returns the manager's error; backend failures have already raised a notice.
pub(crate) async fn run_region(
    manager: &mut RegionManager,
    command: RegionCommands,
) -> Result<(), ManagerError> {
    match command {
        RegionCommands::Create {
            name,
            parent,
            color,
        } => {
            let region = manager
                .create_region(&name, parent, color.as_deref())
                .await?;
            println!("{} {}", region.id, region.name);
        }
        RegionCommands::Rename { id, name } => {
            manager.rename_region(id, &name).await?;
        }
        RegionCommands::Color { id, color } => {
            manager.recolor_region(id, &color).await?;
        }
        RegionCommands::Delete { id } => manager.delete_region(id).await?,
        RegionCommands::Manager { id, user, clear } => {
            let manager_id = if clear { None } else { user };
            manager.assign_manager(id, manager_id).await?;
        }
        RegionCommands::Managers => {
            manager.load_directory().await?;
            println!("{}", render_members(&manager.eligible_managers()));
        }
    }
    Ok(())
}
