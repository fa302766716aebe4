//! Real-time seed dispersal by a running and swimming deer.
//!
//! The world is plain data ([`model::World`]), advanced by the
//! [`engine::Engine`] and painted by the [`render::Renderer`] onto any
//! [`surface::Surface`]. The [`controller::LoopController`] owns the world
//! and runs it one scheduled frame at a time.

pub mod clock;
pub mod config;
pub mod controller;
pub mod engine;
pub mod manager;
pub mod model;
pub mod render;
pub mod scheduler;
pub mod stats;
pub mod surface;
pub mod svg;
