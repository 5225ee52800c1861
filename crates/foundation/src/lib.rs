pub mod bounds;
pub mod geo;

// Foundation crate: small, dependency-free geographic primitives only.
pub use bounds::*;
pub use geo::*;
