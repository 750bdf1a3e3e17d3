// Domain module: tool data model, engine contract and value objects

pub mod data_value;
pub mod instance;
pub mod models;
pub mod outcome;
pub mod solver_service;
pub mod value_objects;

pub use data_value::*;
pub use instance::*;
pub use models::*;
pub use outcome::*;
pub use solver_service::*;
pub use value_objects::*;
