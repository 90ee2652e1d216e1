//! HTTP route handlers for lendfront.
//!
//! Routes are organized by concern:
//! - `sys`: health
//! - `settings`: settings groups by name (read, replace, reset, preview)
//! - `backgrounds`: section backgrounds and their custom image lists
//! - `carousel`: carousel slides
//! - `admin`: admin mode, footer clicks, login and logout
//! - `leads`: consultation request intake
//! - `uploads`: image upload and variant generation

pub mod admin;
pub mod backgrounds;
pub mod carousel;
pub mod leads;
pub mod settings;
pub mod sys;
pub mod uploads;
