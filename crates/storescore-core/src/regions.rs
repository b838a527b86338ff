use serde::{Deserialize, Serialize};

use crate::ids::{RegionId, UserId};
use crate::ValidationError;

/// Preset swatches offered by the colour picker. Any `#RRGGBB` is accepted.
pub const REGION_COLORS: [&str; 8] = [
    "#D4A84B", "#3B82F6", "#10B981", "#EF4444", "#8B5CF6", "#F59E0B", "#EC4899", "#6B7280",
];

pub const DEFAULT_REGION_COLOR: &str = "#D4A84B";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub id: RegionId,
    pub name: String,
    #[serde(default = "default_color")]
    pub color: String,
    #[serde(default)]
    pub parent: Option<RegionId>,
    #[serde(default)]
    pub manager: Option<UserId>,
    #[serde(default)]
    pub manager_name: Option<String>,
    /// Stores directly assigned to this region, as counted by the backend.
    #[serde(default)]
    pub store_count: u32,
    /// Nested children as sent by the backend. The tree model flattens these.
    #[serde(default)]
    pub children: Vec<Region>,
}

fn default_color() -> String {
    DEFAULT_REGION_COLOR.to_owned()
}

impl Region {
    #[must_use]
    pub fn is_top_level(&self) -> bool {
        self.parent.is_none()
    }
}

/// Payload for creating a region, optionally as a child of a top-level one.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionDraft {
    pub name: String,
    pub parent: Option<RegionId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RegionDraft {
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when the trimmed name is empty.
    pub fn new(name: &str, parent: Option<RegionId>) -> Result<Self, ValidationError> {
        Ok(Self {
            name: require_name(name)?,
            parent,
            color: None,
        })
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidField`] when `color` is not `#RRGGBB`.
    pub fn with_color(mut self, color: &str) -> Result<Self, ValidationError> {
        self.color = Some(normalize_color(color)?);
        Ok(self)
    }
}

/// Single-purpose partial update of a region. Only set fields are sent.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RegionPatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

impl RegionPatch {
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when the trimmed name is empty.
    pub fn rename(name: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: Some(require_name(name)?),
            color: None,
        })
    }

    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidField`] when `color` is not `#RRGGBB`.
    pub fn recolor(color: &str) -> Result<Self, ValidationError> {
        Ok(Self {
            name: None,
            color: Some(normalize_color(color)?),
        })
    }
}

fn require_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::Required("name"));
    }
    Ok(trimmed.to_owned())
}

/// Normalise a hex colour to upper-case `#RRGGBB`. The leading `#` is optional.
///
/// # Errors
///
/// Returns [`ValidationError::InvalidField`] for anything other than six hex digits.
pub fn normalize_color(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    let hex = trimmed.strip_prefix('#').unwrap_or(trimmed);
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return Err(ValidationError::InvalidField {
            field: "color",
            reason: format!("'{raw}' is not a #RRGGBB colour"),
        });
    }
    Ok(format!("#{}", hex.to_ascii_uppercase()))
}
