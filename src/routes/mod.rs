//! Console routes and the navigation guard.
//!
//! Every destination except the login page requires an active session. The
//! guard answers, per navigation, whether to render the destination or send
//! the user to the login page. A redirect carries the intended destination
//! along so the user can be forwarded there after logging in.

mod guard;

pub use guard::*;

/// Paths of the console's views.
pub mod paths {
    pub const HOME: &str = "/";
    pub const LOGIN: &str = "/login";
    pub const LOGOUT: &str = "/logout";
    pub const DASHBOARD: &str = "/dashboard";
    pub const USERS: &str = "/users";
    pub const ABOUT: &str = "/about";
    pub const CATEGORY: &str = "/category";
    pub const ARTICLES: &str = "/articles";
    pub const ARTICLE_CREATE: &str = "/articles/create";

    pub fn article_edit(slug: &str) -> String {
        format!("/articles/edit/{}", slug)
    }

    pub fn article_preview(slug: &str) -> String {
        format!("/articles/preview/{}", slug)
    }
}
