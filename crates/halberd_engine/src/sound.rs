//! Sound subsystem registration point
//!
//! The kernel plays no audio. An external implementation registers on the
//! [`crate::Engine`] and is driven by the host; nothing in the kernel
//! calls into it.

/// External sound subsystem boundary.
pub trait Sound {
    /// Per-frame audio update hook.
    fn update(&mut self);
}
