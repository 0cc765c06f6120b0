pub mod borders;
pub mod countries;
pub mod fill;
pub mod layer;
pub mod mesh;
pub mod pins;

pub use borders::*;
pub use countries::*;
pub use fill::*;
pub use layer::*;
pub use mesh::*;
pub use pins::*;
