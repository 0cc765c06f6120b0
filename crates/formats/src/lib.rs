pub mod config;
pub mod country;
pub mod geojson;
pub mod loader;

pub use config::*;
pub use country::*;
pub use geojson::*;
pub use loader::*;
