pub mod client;
mod directory;
pub mod error;
mod regions;
mod retry;
mod stores;
pub mod types;

pub use client::StoreScoreClient;
pub use error::ClientError;
pub use types::GeocodeResult;
