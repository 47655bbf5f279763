pub mod grid_loader;
pub mod toml_loader;

pub use grid_loader::{load_all_grid_files, load_grid_document, GridDocument};
pub use toml_loader::{load_label_overrides, load_labels};
