pub mod driver;
pub mod submission;
