pub mod load;
pub mod save;
pub mod types;

pub use load::{discover_presets, load_preset, preset_directory};
pub use save::{add_recent_path, is_valid_preset_name, remove_preset, save_preset, save_settings};
pub use types::{Config, ConvertSettings, Language, MAX_RECENT_PATHS, UserSettings};
