pub mod app_config;
pub mod config;
pub mod drag;
pub mod ids;
pub mod members;
pub mod regions;
pub mod stores;
pub mod tree;
pub mod walks;

pub use app_config::{AppConfig, Environment};
pub use config::{load_app_config, load_app_config_from_env};
pub use drag::{DragController, DragError, DragState, DropOutcome, DropTarget, MoveRequest};
pub use ids::{DepartmentId, MemberId, OrgId, RegionId, StoreId, TemplateId, UserId, WalkId};
pub use members::{active_departments, eligible_managers, Department, Member, MemberUser, OrgRole};
pub use regions::{
    normalize_color, Region, RegionDraft, RegionPatch, DEFAULT_REGION_COLOR, REGION_COLORS,
};
pub use stores::{Store, StoreDraft, StoreForm, VerificationMethod};
pub use tree::{DeleteRefusal, RegionTree};
pub use walks::{walk_counts, Walk, WalkCounts, WalkStatus};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

/// Input rejected before any request is made.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{0} is required")]
    Required(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CoreError {
    #[error("store {0} not found")]
    UnknownStore(StoreId),

    #[error("region {0} not found")]
    UnknownRegion(RegionId),

    #[error("\"{region}\" is already a sub-region; regions nest one level deep")]
    NestingTooDeep { region: String },
}
