//! # Request Handlers
//!
//! One module per resource. Each handler takes the application state, the
//! resolved actor, and the validated request, delegates to the engine, and
//! shapes the response. Thin axum wrappers live in [`crate::router`].

pub mod evaluations;
pub mod events;
pub mod health;
pub mod registrations;
pub mod teams;
pub mod users;
