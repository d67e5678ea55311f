//! Business logic services.
//!
//! Services sit between the route handlers and the repositories: routes
//! parse and validate the wire shapes, services own the rules (hashing,
//! token issuance, price snapshots, status guards), repositories own SQL.

pub mod auth;
pub mod orders;
pub mod tokens;
