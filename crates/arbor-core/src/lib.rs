//! Arbor Core Types and Definitions
//!
//! This crate provides the foundational types shared by the Arbor diagram
//! engine. It includes:
//!
//! - **Colors**: CSS color handling ([`color::Color`])
//! - **Geometry**: Points, sizes, bounds and insets ([`geometry`] module)
//! - **Draw**: Layered SVG output, strokes and measured text ([`draw`] module)

pub mod color;
pub mod draw;
pub mod geometry;
