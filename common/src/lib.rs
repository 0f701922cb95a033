//! Shared model and client-side controller for the equipment admin dashboard.
//!
//! Everything here compiles for both the native backend and the wasm32
//! frontend. The controller is single-threaded: store futures are `!Send`
//! and snapshot sinks are `Rc` closures.

pub mod config;
pub mod confirm;
pub mod controller;
pub mod error;
pub mod model;
pub mod notify;
pub mod requests;
pub mod seed;
pub mod session;
pub mod store;
pub mod sync;

#[cfg(test)]
mod testing;
