//! # HTTP Middleware

pub mod actor;
