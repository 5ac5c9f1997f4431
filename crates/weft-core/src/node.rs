#![forbid(unsafe_code)]

//! The measure/arrange contract between containers and their children.
//!
//! Containers drive layout in two synchronous passes. `measure` asks a
//! child how large it wants to be under a constraint; `arrange` hands the
//! child its final rectangle. Both are plain function calls invoked from
//! the per-frame layout pass; nesting is recursive, so a parent's
//! `arrange` triggers each child's own passes.
//!
//! # Invariants
//!
//! 1. `measure` must not mutate anything a container reads for layout
//!    (in particular a child must not move itself to a different cell
//!    while being measured). Internal caches are fine.
//! 2. The desired size returned by `measure` is non-negative on both
//!    axes; a constraint axis of [`UNBOUNDED`](crate::geometry::UNBOUNDED)
//!    asks for the child's natural extent.
//! 3. `arrange` may receive a rectangle smaller or larger than the
//!    desired size; overflow is clipped by the container, not the child.

use crate::geometry::{Rect, Size};

/// A node that participates in container layout.
pub trait LayoutNode {
    /// Report the desired size under the given constraint.
    fn measure(&mut self, constraint: Size) -> Size;

    /// Accept the final bounds for this frame.
    fn arrange(&mut self, bounds: Rect);
}

impl<T: LayoutNode + ?Sized> LayoutNode for Box<T> {
    fn measure(&mut self, constraint: Size) -> Size {
        (**self).measure(constraint)
    }

    fn arrange(&mut self, bounds: Rect) {
        (**self).arrange(bounds)
    }
}

impl<T: LayoutNode + ?Sized> LayoutNode for &mut T {
    fn measure(&mut self, constraint: Size) -> Size {
        (**self).measure(constraint)
    }

    fn arrange(&mut self, bounds: Rect) {
        (**self).arrange(bounds)
    }
}

/// Test double with a fixed desired size that records layout traffic.
///
/// The desired size is reported as-is even under a smaller constraint,
/// matching widgets with a hard minimum extent; containers clip overflow.
#[cfg(any(test, feature = "test-helpers"))]
#[derive(Debug, Clone, Default)]
pub struct ProbeNode {
    desired: Size,
    /// Bounds from the most recent `arrange`, if any.
    pub arranged: Option<Rect>,
    /// Number of `measure` calls observed.
    pub measure_count: usize,
    /// Constraints seen by `measure`, in call order.
    pub constraints_seen: Vec<Size>,
}

#[cfg(any(test, feature = "test-helpers"))]
impl ProbeNode {
    /// Create a probe that wants the given extent.
    #[must_use]
    pub fn new(width: i32, height: i32) -> Self {
        Self {
            desired: Size::new(width, height),
            ..Default::default()
        }
    }

    /// Replace the desired size (the caller invalidates its container).
    pub fn set_desired(&mut self, width: i32, height: i32) {
        self.desired = Size::new(width, height);
    }
}

#[cfg(any(test, feature = "test-helpers"))]
impl LayoutNode for ProbeNode {
    fn measure(&mut self, constraint: Size) -> Size {
        self.measure_count += 1;
        self.constraints_seen.push(constraint);
        self.desired
    }

    fn arrange(&mut self, bounds: Rect) {
        self.arranged = Some(bounds);
    }
}
