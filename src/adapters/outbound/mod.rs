pub mod fanout_logger;
pub mod file_logger;
pub mod noop_logger;
pub mod planar_surface;
pub mod scenario_data;
pub mod tracing_logger;

pub use fanout_logger::*;
pub use file_logger::*;
pub use noop_logger::*;
pub use planar_surface::*;
pub use scenario_data::*;
pub use tracing_logger::*;
