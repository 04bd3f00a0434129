//! `aqi-ach` library crate.
//!
//! Estimates the indoor/outdoor air change rate (`ach`) of a room from paired
//! AQI readings, together with the continuous decay parameters `(c, r)`.
//!
//! The binary (`ach`) is a thin wrapper around this library so that core
//! logic is testable without spawning processes. The main entry point for
//! library use is [`fit::estimate`].

pub mod app;
pub mod cli;
pub mod data;
pub mod domain;
pub mod error;
pub mod fit;
pub mod io;
pub mod math;
pub mod models;
pub mod plot;
pub mod report;
