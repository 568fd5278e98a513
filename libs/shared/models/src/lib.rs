pub mod auth;
pub mod error;
pub mod family;
pub mod medication;
pub mod patch;
pub mod product;
pub mod task;
pub mod validation;
pub mod vital;
