//! FactSet EDM organisation loader and transformer.
//!
//! The import side streams a vendor archive into SQLite and derives a stable
//! identity for every loaded entity. The serve side reassembles the
//! normalized rows into canonical organisations on each lookup.

pub mod config;
pub mod database;
pub mod errors;
pub mod ingestor;
pub mod models;
pub mod services;
pub mod utils;
pub mod web;
