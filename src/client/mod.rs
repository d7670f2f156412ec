//! Administrative command seam.
//!
//! The wire protocol is not implemented here. Callers supply an
//! [`AdminClient`] that can send one command document to one endpoint and
//! hand back the reply document; [`commands`] builds and interprets those
//! documents.

mod admin;
pub mod commands;

pub use admin::*;
pub use commands::*;
