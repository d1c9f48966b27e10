pub mod crowding;
pub mod logger;

pub use crowding::*;
pub use logger::*;
