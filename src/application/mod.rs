pub mod crowding_service;

pub use crowding_service::*;
