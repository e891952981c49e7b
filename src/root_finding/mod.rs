// common helpers
pub mod algorithms;
pub mod report;
pub mod errors;
pub(crate) mod config;
pub(crate) mod signs;

// derivatives
pub mod difference;

// algorithms
pub mod bisection;
pub mod secant;
pub mod newton;
