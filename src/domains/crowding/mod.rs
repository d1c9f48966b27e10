pub mod aggregator;
pub mod analysis;
pub mod classifier;
pub mod estimator;
pub mod events;
pub mod grid;
pub mod mesh;
pub mod ports;
pub mod sampler;
pub mod surface;
pub mod types;

pub use aggregator::*;
pub use analysis::*;
pub use classifier::*;
pub use estimator::*;
pub use events::*;
pub use grid::*;
pub use mesh::*;
pub use ports::*;
pub use sampler::*;
pub use surface::*;
pub use types::*;
