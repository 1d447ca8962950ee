//! Weather and air quality dashboard generator.
//!
//! Readings flow one way: [`weather`] fetches a [`Reading`](weather::types::Reading),
//! [`recommend`] picks rules from the tables in [`rules`], [`presentation`]
//! flattens the result into display strings and [`generator`] writes them out.

pub mod config;
pub mod generator;
pub mod presentation;
pub mod recommend;
pub mod render;
pub mod rules;
pub mod utils;
pub mod weather;
