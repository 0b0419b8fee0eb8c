//! Tiny Acre library crate: re-exports all modules for integration testing.
//!
//! The binary crate (`main.rs`) is the actual game entry point. This library
//! exposes the same modules so that `tests/` can drive the simulation
//! headlessly, without a window or GPU.

pub mod shared;
pub mod calendar;
pub mod world;
pub mod needs;
pub mod actions;
pub mod farming;
pub mod economy;
pub mod player;
pub mod input;
pub mod controller;
pub mod data;
pub mod view;
