//! # IO Module
//!
//! The HTTP face of the backend. Handlers translate requests into service
//! calls and domain errors into status codes; no business rules live here.
//!
//! ## Supported Operations
//!
//! - **/api/session**: login, logout, current user
//! - **/api/students**, **/api/teachers**: roster management, fee and salary status
//! - **/api/payments**, **/api/expenses**: the money ledger
//! - **/api/attendance**: daily presence
//! - **/api/dashboard**, **/api/reports**, **/api/backup**: read-only views
//! - **/api/schedule**, **/api/settings**: weekly grid and display language

pub mod rest;

pub use rest::create_router;
