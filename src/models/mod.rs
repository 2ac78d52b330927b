//! Wire types for the admin backend.
//!
//! - [`Article`] and [`Category`]: slugged collections. Both implement
//!   [`Slugged`](crate::slug::Slugged) so forms can de-duplicate a freshly
//!   derived slug against what is already loaded.
//! - [`User`]: console users, listed page by page.
//! - [`LoginRequest`] / [`LoginResponse`]: the `/auth/login` exchange.

mod article;
mod auth;
mod category;
mod user;

pub use article::*;
pub use auth::*;
pub use category::*;
pub use user::*;
