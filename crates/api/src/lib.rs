//! Tamarind API library.
//!
//! This crate provides the REST storefront backend as a library, allowing
//! it to be tested and reused (the CLI shares its repositories and auth
//! service).

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod extract;
pub mod middleware;
pub mod models;
pub mod response;
pub mod routes;
pub mod services;
pub mod state;
pub mod validate;
