pub mod vital;

pub use vital::VitalService;
