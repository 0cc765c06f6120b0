pub mod camera;
pub mod containment;
pub mod interaction;
pub mod picking;
pub mod renderer;
pub mod selection;

pub use camera::*;
pub use containment::*;
pub use interaction::*;
pub use picking::*;
pub use renderer::*;
pub use selection::*;
