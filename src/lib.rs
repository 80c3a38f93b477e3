//! sensordash - host-side dashboard for a small door/fan/light sensor device
//!
//! The device exposes eight analog sensor channels and three actuators over a
//! tiny HTTP API. This crate polls it, keeps a rolling per-channel history,
//! renders one line chart per channel and sends actuator commands back.
//!
//! # Modules
//!
//! - [`history`] - bounded per-channel sample buffers
//! - [`chart`] - chart geometry and `embedded-graphics` rendering
//! - [`command`] - the `ret_cmd` bit word and level-based actuator state
//! - [`device`] - HTTP client for `/status`, `/sensor`, `/set_cmd` and `/sse`
//! - [`dashboard`] - shared state mutated by the poller and push listener
//! - [`poller`] - interval polling and push-stream tasks
//! - [`simulator`] - an axum stand-in for the device
//! - [`config`], [`logging`], [`cli`] - the ambient application layer

pub mod chart;
pub mod cli;
pub mod command;
pub mod config;
pub mod dashboard;
pub mod device;
pub mod history;
pub mod logging;
pub mod poller;
pub mod simulator;
