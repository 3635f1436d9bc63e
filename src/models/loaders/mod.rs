pub mod toml_loader;

pub use toml_loader::{load_all_content_files, load_content_file, ContentFile};
