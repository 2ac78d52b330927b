//! Core of the Folio admin console client.
//!
//! - [`slug`]: turn titles into unique, URL-safe slugs.
//! - [`session`]: the credential store and its persistence.
//! - [`client`]: the authorized request pipeline and backend calls.
//! - [`routes`]: the navigation guard for protected views.

pub mod client;
pub mod config;
pub mod models;
pub mod routes;
pub mod session;
pub mod slug;
