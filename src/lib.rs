//! Particle Playground core
//!
//! The settings store and the framed palette icon cache. The presentation
//! layer calls into these and renders what they return.

pub mod config;
pub mod constant;
pub mod icon;
pub mod logger;
pub mod messages;
pub mod palette;
pub mod prefetch;
pub mod settings_form;
