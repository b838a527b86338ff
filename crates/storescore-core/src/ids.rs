//! Integer identifiers assigned by the backend.
//!
//! Each entity gets its own newtype so a store id can never be passed where a
//! region id is expected. All of them serialize as bare integers.

use serde::{Deserialize, Serialize};

macro_rules! id_type {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub i64);

        impl $name {
            #[must_use]
            pub fn get(self) -> i64 {
                self.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = std::num::ParseIntError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim().parse::<i64>().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }
    };
}

id_type!(
    /// Organization (tenant) id. Every request is scoped to one.
    OrgId
);
id_type!(StoreId);
id_type!(RegionId);
id_type!(
    /// Id of a user account; region managers reference users, not memberships.
    UserId
);
id_type!(MemberId);
id_type!(DepartmentId);
id_type!(WalkId);
id_type!(TemplateId);
