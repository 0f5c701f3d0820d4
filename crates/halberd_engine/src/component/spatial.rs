//! Spatial component: pose plus one external scene-graph node

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::Vec3;
use crate::graphics::{GraphicsBackend, SceneNodeHandle, SceneNodeOptions};

use super::{ComponentDescriptor, ComponentRef, WeakComponentRef};

const DESCRIPTOR: ComponentDescriptor = ComponentDescriptor {
    type_tag: "core",
    subtypes: &["spatial"],
    requires: &[],
};

/// Position and orientation in the scene, mirrored into one external
/// scene-graph node. Setters push the new pose into the node immediately.
pub struct Spatial {
    position: Vec3, // X, Y, Z
    rotation: Vec3, // roll, pitch, yaw
    node: SceneNodeHandle,
    parent: Option<WeakComponentRef>,
}

impl Spatial {
    /// Create a spatial at the origin.
    pub fn new(backend: &dyn GraphicsBackend) -> Rc<RefCell<Self>> {
        Self::with_pose(backend, Vec3::zeros(), Vec3::zeros())
    }

    /// Create a spatial with an explicit pose.
    pub fn with_pose(
        backend: &dyn GraphicsBackend,
        position: Vec3,
        rotation: Vec3,
    ) -> Rc<RefCell<Self>> {
        let node = backend.create_node(SceneNodeOptions {
            position,
            rotation,
            mesh: None,
        });
        Rc::new(RefCell::new(Self {
            position,
            rotation,
            node,
            parent: None,
        }))
    }

    /// Capability metadata for spatials.
    pub const fn descriptor() -> ComponentDescriptor {
        DESCRIPTOR
    }

    /// Current position.
    pub fn position(&self) -> Vec3 {
        self.position
    }

    /// Move the spatial and its node.
    pub fn set_position(&mut self, position: Vec3) {
        self.position = position;
        self.node.borrow_mut().set_position(position);
    }

    /// Current rotation (roll, pitch, yaw).
    pub fn rotation(&self) -> Vec3 {
        self.rotation
    }

    /// Rotate the spatial and its node.
    pub fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
        self.node.borrow_mut().set_rotation(rotation);
    }

    /// The external node this spatial owns.
    pub fn node(&self) -> SceneNodeHandle {
        Rc::clone(&self.node)
    }

    /// The component this spatial was attached under, if it is still alive.
    pub fn parent(&self) -> Option<ComponentRef> {
        self.parent.as_ref().and_then(WeakComponentRef::upgrade)
    }

    pub(super) fn set_parent_ref(&mut self, parent: WeakComponentRef) {
        self.parent = Some(parent);
    }
}
