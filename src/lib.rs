#[macro_use]
extern crate tracing;

pub mod animation;
pub mod axis;
pub mod cli;
pub mod controller;
pub mod drag_tracker;
pub mod fling;
pub mod geometry;
pub mod input;
pub mod listener;
pub mod replay;
pub mod scheduler;
pub mod utils;
pub mod velocity_tracker;

pub use controller::{DrawerController, DrawerError, DrawerState, Options};
