//! Domain models for the Battery Service Console

mod account;
mod catalog;
mod customer;
mod service_record;
mod warranty;

pub use account::*;
pub use catalog::*;
pub use customer::*;
pub use service_record::*;
pub use warranty::*;
