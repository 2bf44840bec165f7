pub mod identity;
pub mod page;
pub mod punishment;
pub mod stats;
pub mod status;

pub use identity::*;
pub use page::*;
pub use punishment::*;
pub use stats::*;
pub use status::{derive_status, is_permanent, PunishmentStatus};
