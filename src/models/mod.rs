//! Domain models

pub mod asset;
pub mod assignment;
pub mod audit;
pub mod enums;
pub mod user;
