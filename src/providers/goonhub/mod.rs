//! Destination catalog: the GoonHub REST API.
//!
//! | operation            | endpoint                              |
//! |----------------------|---------------------------------------|
//! | login                | `POST /api/v1/auth/login`             |
//! | list/create tags     | `GET/POST /api/v1/tags`               |
//! | list studios         | `GET /api/v1/studios`                 |
//! | create/update studio | `POST/PUT /api/v1/admin/studios[/id]` |
//! | list actors          | `GET /api/v1/actors`                  |
//! | create actor         | `POST /api/v1/admin/actors`           |
//! | import scene/marker  | `POST /api/v1/admin/import/{scenes,markers}` |
//! | scene associations   | `PUT /api/v1/scenes/{id}/{tags,actors,studio}` |
//! | marker tags          | `PUT /api/v1/markers/{id}/tags`       |

mod client;
mod types;

pub use client::{GoonhubClient, GoonhubSettings};
