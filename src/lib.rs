//! Migrates a Stash media catalog (tags, studios, performers, scenes, scene
//! markers) into GoonHub without creating duplicates, resumably.

pub mod catalog;
pub mod config;
pub mod importer;
pub mod normalization;
pub mod providers;
pub mod tracing;

pub mod util {
    pub mod env;
}
