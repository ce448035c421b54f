//! Source catalog: a Stash server queried over GraphQL.
//!
//! Every query asks for the full collection (`per_page: -1`), so one request
//! per entity kind yields a complete snapshot.

mod client;
mod types;

pub use client::StashClient;
