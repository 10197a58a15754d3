pub mod archive;
pub mod auth;
pub mod handlers;
pub mod queries;
