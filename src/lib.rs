mod config;
mod filter;
mod logging;
mod merge;
mod models;
mod render;
mod selection;
mod session;
pub mod sources;
mod utils;

pub use config::{AppConfig, ConfigStore};
pub use filter::{by_location, by_title, future_only};
pub use logging::init as init_logging;
pub use merge::{dedup_selected, source_rank};
pub use models::{Event, EventKey};
pub use render::render;
pub use selection::SelectionStore;
pub use session::{Session, ToggleRow, EXPORT_FILE_NAME};
