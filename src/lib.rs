//! Dashboard data-retrieval and view-state core for a single business entity.
//!
//! Resolves the entity from the navigation context, fetches its report from
//! the reporting API, normalizes the payload and exposes one coherent
//! `loading | error | ready` state to an external renderer.
pub mod application;
pub mod domain;
pub mod error;
pub mod infrastructure;
pub mod presentation;
