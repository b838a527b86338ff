//! Region hierarchy manager: the stateful layer between the StoreScore API
//! client and a view. It owns the region tree, runs the drag-to-reassign
//! flow, and turns every backend outcome into a notice.

mod error;
mod manager;
mod moves;
pub mod notice;
mod region_ops;
pub mod sequence;
mod store_ops;

pub use error::ManagerError;
pub use manager::{RefreshTicket, RegionManager, Settled};
pub use moves::{MoveOutcome, PendingMove};
pub use notice::{Notice, NoticeLevel, NoticeLog};
pub use sequence::CancelHandle;
