//! # Order Porter dashboard
//! A small HTTP front-end over the order porter engine. It is responsible for:
//! Serving the filtered order view and single orders as JSON.
//! Starting fetch sweeps against the Vivid Seats broker API.
//! Submitting URL transfers, CSV exports and warehouse pushes on the operator's behalf.
//!
//! ## Configuration
//! The server is configured via environment variables. See [config](config/index.html) for more information.
//!
//! ## Routes
//! See [routes](routes/index.html). `/health` returns a 200 OK response and nothing else.

pub mod cli;
pub mod config;
pub mod data_objects;
pub mod errors;
pub mod routes;
pub mod server;
pub mod sweeps;

#[cfg(test)]
mod endpoint_tests;
