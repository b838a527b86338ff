//! Wire shapes that are not domain entities: list envelopes and the small
//! request/response bodies of action endpoints.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use storescore_core::{RegionId, UserId};

/// A list endpoint's body: either a bare array or a paginated envelope.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ListResponse<T> {
    Paginated {
        results: Vec<T>,
        #[serde(default)]
        next: Option<String>,
    },
    Plain(Vec<T>),
}

impl<T> ListResponse<T> {
    pub(crate) fn into_parts(self) -> (Vec<T>, Option<String>) {
        match self {
            ListResponse::Paginated { results, next } => (results, next),
            ListResponse::Plain(items) => (items, None),
        }
    }
}

/// Coordinates returned by the geocode action.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct GeocodeResult {
    pub latitude: Decimal,
    pub longitude: Decimal,
}

#[derive(Debug, Deserialize)]
pub(crate) struct QrTokenResponse {
    pub qr_verification_token: String,
}

#[derive(Debug, Serialize)]
pub(crate) struct RegionAssignment {
    pub region: Option<RegionId>,
}

#[derive(Debug, Serialize)]
pub(crate) struct ManagerAssignment {
    pub manager: Option<UserId>,
}
