#![forbid(unsafe_code)]

//! Core contracts for the weft layout engine.
//!
//! This crate holds the pieces every container and widget agrees on:
//!
//! - [`geometry`] - pixel-space `Point` / `Size` / `Rect` primitives
//! - [`node`] - the `measure` / `arrange` contract ([`LayoutNode`])
//! - [`logging`] - feature-gated tracing facade
//!
//! Everything here is synchronous and allocation-light; layout runs once
//! per frame for every nested container.

pub mod geometry;
pub mod logging;
pub mod node;

pub use geometry::{Point, Rect, Size, UNBOUNDED};
pub use node::LayoutNode;

#[cfg(any(test, feature = "test-helpers"))]
pub use node::ProbeNode;
