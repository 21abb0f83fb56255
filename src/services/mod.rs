// src/services/mod.rs

pub mod bootstrap;
pub mod catalog;
pub mod importer;
pub mod results;
pub mod scoring;
