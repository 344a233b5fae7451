mod config;
mod error;
mod store;
mod types;

pub use config::{SAVE_DIR_ENV, default_save_dir};
pub use error::{CoreError, CoreErrorCode};
pub use store::SaveStore;
pub use types::{Inspection, SlotSummary, StateOverview};
