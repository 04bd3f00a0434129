//! Mathematical utilities: least squares and log-linear regression.

pub mod ols;

pub use ols::*;
