//! Business logic services for the Battery Service Console

pub mod summary;
pub mod warranty;

pub use summary::SummaryService;
pub use warranty::WarrantyService;
