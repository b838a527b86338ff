//! `store` command handlers.

use std::path::PathBuf;

use clap::{Args, Subcommand};
use rust_decimal::Decimal;
use storescore_core::{CoreError, DepartmentId, RegionId, StoreForm, StoreId, VerificationMethod};
use storescore_regions::{ManagerError, RegionManager};

/// Sub-commands available under `store`.
#[derive(Debug, Subcommand)]
pub enum StoreCommands {
    /// Create a store
    Create {
        #[command(flatten)]
        fields: StoreFields,
    },
    /// Edit a saved store; unspecified fields keep their value
    Edit {
        id: StoreId,
        #[command(flatten)]
        fields: StoreFields,
    },
    /// Look up coordinates for a saved store's address
    Geocode {
        id: StoreId,
        /// Save the coordinates instead of only printing them
        #[arg(long)]
        save: bool,
    },
    /// Show, download or regenerate a store's QR code
    Qr {
        id: StoreId,
        /// Write the QR code PNG to this path
        #[arg(long)]
        output: Option<PathBuf>,
        /// Issue a new token; printed codes stop working
        #[arg(long)]
        regenerate: bool,
        /// Confirm --regenerate
        #[arg(long, requires = "regenerate")]
        yes: bool,
    },
}

/// Editable store fields. On `edit`, only the flags given change the store.
#[derive(Debug, Default, Args)]
pub struct StoreFields {
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub number: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
    #[arg(long, allow_hyphen_values = true)]
    pub lat: Option<Decimal>,
    #[arg(long, allow_hyphen_values = true)]
    pub lng: Option<Decimal>,
    /// gps_only, qr_only, gps_and_qr or either
    #[arg(long)]
    pub verification: Option<VerificationMethod>,
    #[arg(long, conflicts_with = "unassign")]
    pub region: Option<RegionId>,
    /// Remove the store from its region
    #[arg(long)]
    pub unassign: bool,
    /// Department id; repeat for several. Replaces the current selection.
    #[arg(long = "department")]
    pub departments: Vec<DepartmentId>,
    /// Remove every department
    #[arg(long, conflicts_with = "departments")]
    pub no_departments: bool,
    #[arg(long, conflicts_with = "active")]
    pub inactive: bool,
    #[arg(long)]
    pub active: bool,
}

impl StoreFields {
    pub(crate) fn apply(self, form: &mut StoreForm) {
        let text = [
            (self.name, &mut form.name),
            (self.number, &mut form.store_number),
            (self.address, &mut form.address),
            (self.city, &mut form.city),
            (self.state, &mut form.state),
            (self.zip, &mut form.zip_code),
        ];
        for (value, field) in text {
            if let Some(value) = value {
                *field = value;
            }
        }
        if let Some(lat) = self.lat {
            form.latitude = Some(lat);
        }
        if let Some(lng) = self.lng {
            form.longitude = Some(lng);
        }
        if let Some(method) = self.verification {
            form.verification_method = method;
        }
        if self.unassign {
            form.region = None;
        } else if self.region.is_some() {
            form.region = self.region;
        }
        if self.no_departments {
            form.departments.clear();
        } else if !self.departments.is_empty() {
            form.departments = self.departments.into_iter().collect();
        }
        if self.inactive {
            form.is_active = false;
        } else if self.active {
            form.is_active = true;
        }
    }
}

/// # Errors
///
/// Returns the manager's error; backend failures have already raised a notice.
pub(crate) async fn run_store(
    manager: &mut RegionManager,
    command: StoreCommands,
) -> Result<(), ManagerError> {
    match command {
        StoreCommands::Create { fields } => {
            let mut form = StoreForm::new();
            fields.apply(&mut form);
            let store = manager.save_store(&form).await?;
            println!("{} {}", store.id, store.name);
        }
        StoreCommands::Edit { id, fields } => {
            let mut form = saved_form(manager, id)?;
            fields.apply(&mut form);
            manager.save_store(&form).await?;
        }
        StoreCommands::Geocode { id, save } => {
            let mut form = saved_form(manager, id)?;
            let located = manager.geocode(&mut form).await?;
            println!("{}, {}", located.latitude, located.longitude);
            if save {
                manager.save_store(&form).await?;
            }
        }
        StoreCommands::Qr {
            id,
            output,
            regenerate,
            yes,
        } => {
            if regenerate {
                let token = manager.regenerate_qr(id, yes).await?;
                println!("{token}");
            } else if output.is_none() {
                let store = manager
                    .tree()
                    .store(id)
                    .ok_or(CoreError::UnknownStore(id))?;
                println!("{}", store.qr_verification_token);
            }
            if let Some(path) = output {
                let png = manager.qr_image(id).await?;
                if let Err(e) = tokio::fs::write(&path, &png).await {
                    eprintln!("error: could not write {}: {e}", path.display());
                } else {
                    println!("wrote {} bytes to {}", png.len(), path.display());
                }
            }
        }
    }
    Ok(())
}

fn saved_form(manager: &RegionManager, id: StoreId) -> Result<StoreForm, ManagerError> {
    let store = manager
        .tree()
        .store(id)
        .ok_or(CoreError::UnknownStore(id))?;
    Ok(StoreForm::from_store(store))
}
