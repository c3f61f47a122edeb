pub mod catalog;
pub mod driver;
