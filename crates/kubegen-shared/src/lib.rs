//! This crate contains various shared helpers and utilities used across other crates in this
//! workspace.

pub mod yaml;
