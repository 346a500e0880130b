//! VentCtl library.
//!
//! Exposes the decision engine, its port traits and the Linux adapters so
//! the binary and the integration tests share one code path.

#![deny(unused_must_use)]

pub mod adapters;
pub mod app;
pub mod config;
pub mod control;
pub mod drivers;
pub mod error;
pub mod sensors;
