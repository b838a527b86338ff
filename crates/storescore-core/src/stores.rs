use std::collections::BTreeSet;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ids::{DepartmentId, RegionId, StoreId};
use crate::ValidationError;

/// How a walk at this store proves the evaluator was on site.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationMethod {
    GpsOnly,
    QrOnly,
    GpsAndQr,
    #[default]
    Either,
}

impl VerificationMethod {
    pub const ALL: [VerificationMethod; 4] = [
        VerificationMethod::GpsOnly,
        VerificationMethod::QrOnly,
        VerificationMethod::GpsAndQr,
        VerificationMethod::Either,
    ];

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            VerificationMethod::GpsOnly => "GPS only",
            VerificationMethod::QrOnly => "QR only",
            VerificationMethod::GpsAndQr => "GPS and QR",
            VerificationMethod::Either => "GPS or QR",
        }
    }
}

impl std::fmt::Display for VerificationMethod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VerificationMethod::GpsOnly => write!(f, "gps_only"),
            VerificationMethod::QrOnly => write!(f, "qr_only"),
            VerificationMethod::GpsAndQr => write!(f, "gps_and_qr"),
            VerificationMethod::Either => write!(f, "either"),
        }
    }
}

impl std::str::FromStr for VerificationMethod {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "gps_only" => Ok(VerificationMethod::GpsOnly),
            "qr_only" => Ok(VerificationMethod::QrOnly),
            "gps_and_qr" => Ok(VerificationMethod::GpsAndQr),
            "either" => Ok(VerificationMethod::Either),
            other => Err(ValidationError::InvalidField {
                field: "verification_method",
                reason: format!(
                    "'{other}' is not one of gps_only, qr_only, gps_and_qr, either"
                ),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Store {
    pub id: StoreId,
    pub name: String,
    #[serde(default)]
    pub store_number: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
    #[serde(default)]
    pub latitude: Option<Decimal>,
    #[serde(default)]
    pub longitude: Option<Decimal>,
    #[serde(default = "default_true")]
    pub is_active: bool,
    #[serde(default)]
    pub verification_method: VerificationMethod,
    /// Opaque secret printed on the store's QR code.
    #[serde(default)]
    pub qr_verification_token: String,
    #[serde(default)]
    pub region: Option<RegionId>,
    #[serde(default)]
    pub departments: Vec<DepartmentId>,
}

fn default_true() -> bool {
    true
}

impl Store {
    /// Single-line address for display, skipping empty parts.
    #[must_use]
    pub fn address_line(&self) -> String {
        let state_zip = [self.state.trim(), self.zip_code.trim()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(" ");
        [self.address.trim(), self.city.trim(), state_zip.as_str()]
            .into_iter()
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn has_coordinates(&self) -> bool {
        self.latitude.is_some() && self.longitude.is_some()
    }
}

/// Editable state of the create/edit store form.
///
/// `id` is `None` until the store has been saved once; geocoding is only
/// offered for saved stores because the backend geocodes the stored address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StoreForm {
    pub id: Option<StoreId>,
    pub name: String,
    pub store_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub is_active: bool,
    pub verification_method: VerificationMethod,
    pub region: Option<RegionId>,
    pub departments: BTreeSet<DepartmentId>,
}

impl StoreForm {
    #[must_use]
    pub fn new() -> Self {
        Self {
            is_active: true,
            ..Self::default()
        }
    }

    #[must_use]
    pub fn from_store(store: &Store) -> Self {
        Self {
            id: Some(store.id),
            name: store.name.clone(),
            store_number: store.store_number.clone(),
            address: store.address.clone(),
            city: store.city.clone(),
            state: store.state.clone(),
            zip_code: store.zip_code.clone(),
            latitude: store.latitude,
            longitude: store.longitude,
            is_active: store.is_active,
            verification_method: store.verification_method,
            region: store.region,
            departments: store.departments.iter().copied().collect(),
        }
    }

    #[must_use]
    pub fn is_saved(&self) -> bool {
        self.id.is_some()
    }

    /// Patch the coordinate fields from a geocoding result. Does not save.
    pub fn apply_geocode(&mut self, latitude: Decimal, longitude: Decimal) {
        self.latitude = Some(latitude);
        self.longitude = Some(longitude);
    }

    /// Flip membership of a department in the selection.
    pub fn toggle_department(&mut self, department: DepartmentId) {
        if !self.departments.remove(&department) {
            self.departments.insert(department);
        }
    }

    /// Validate the form and produce the payload sent on save.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Required`] when the trimmed name is empty.
    pub fn validate(&self) -> Result<StoreDraft, ValidationError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(ValidationError::Required("name"));
        }

        Ok(StoreDraft {
            name: name.to_owned(),
            store_number: self.store_number.trim().to_owned(),
            address: self.address.trim().to_owned(),
            city: self.city.trim().to_owned(),
            state: self.state.trim().to_owned(),
            zip_code: self.zip_code.trim().to_owned(),
            latitude: self.latitude,
            longitude: self.longitude,
            is_active: self.is_active,
            verification_method: self.verification_method,
            region: self.region,
            departments: self.departments.iter().copied().collect(),
        })
    }
}

/// Validated store payload for create and update requests.
///
/// `departments` is always the complete selection; the backend replaces the
/// association set rather than applying a diff.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StoreDraft {
    pub name: String,
    pub store_number: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
    pub latitude: Option<Decimal>,
    pub longitude: Option<Decimal>,
    pub is_active: bool,
    pub verification_method: VerificationMethod,
    pub region: Option<RegionId>,
    pub departments: Vec<DepartmentId>,
}
