//! Physics subsystem registration point
//!
//! The kernel does not simulate physics. An external implementation
//! registers on the [`crate::Engine`] and is stepped by the host; nothing
//! in the kernel calls into it.

/// External physics subsystem boundary.
pub trait Physics {
    /// Advance the simulation by `delta_seconds`.
    fn step(&mut self, delta_seconds: f32);
}
