//! Camera component

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::Vec3;
use crate::graphics::{CameraHandle, GraphicsBackend};

use super::{
    ComponentDescriptor, ComponentError, ComponentKind, ComponentRef, Spatial, WeakComponentRef,
};

const DESCRIPTOR: ComponentDescriptor = ComponentDescriptor {
    type_tag: "graphics",
    subtypes: &["camera"],
    requires: &["spatial"],
};

/// Viewpoint into a scene.
///
/// Requires a [`Spatial`] before it can be positioned or adopt children.
/// The spatial is shared by reference: edits to it are visible through
/// [`Camera::spatial`], and [`Camera::sync_pose`] pushes the current pose
/// into the external camera after such edits.
pub struct Camera {
    handle: CameraHandle,
    spatial: Option<Rc<RefCell<Spatial>>>,
    target: Option<Vec3>,
    parent: Option<WeakComponentRef>,
}

impl Camera {
    /// Create a camera with a fresh backend handle.
    pub fn new(backend: &dyn GraphicsBackend) -> Rc<RefCell<Self>> {
        Self::with_handle(backend.create_camera())
    }

    /// Wrap an existing backend camera.
    pub fn with_handle(handle: CameraHandle) -> Rc<RefCell<Self>> {
        Rc::new(RefCell::new(Self {
            handle,
            spatial: None,
            target: None,
            parent: None,
        }))
    }

    /// Capability metadata for cameras.
    pub const fn descriptor() -> ComponentDescriptor {
        DESCRIPTOR
    }

    /// The external camera handle.
    pub fn handle(&self) -> CameraHandle {
        Rc::clone(&self.handle)
    }

    /// The spatial backing this camera, if one has been set.
    pub fn spatial(&self) -> Option<Rc<RefCell<Spatial>>> {
        self.spatial.as_ref().map(Rc::clone)
    }

    /// Adopt `spatial` as the camera's pose source and push its current
    /// pose into the external camera.
    pub fn set_spatial(&mut self, spatial: &Rc<RefCell<Spatial>>) {
        self.spatial = Some(Rc::clone(spatial));
        self.push_pose();
    }

    /// Re-synchronize the external camera with the shared spatial's pose.
    ///
    /// Call after editing the spatial; fails fast if no spatial is set.
    pub fn sync_pose(&mut self) -> Result<(), ComponentError> {
        if self.spatial.is_none() {
            return Err(ComponentError::UnmetRequirement {
                component: ComponentKind::Camera,
                requirement: "spatial",
            });
        }
        self.push_pose();
        Ok(())
    }

    fn push_pose(&self) {
        if let Some(spatial) = &self.spatial {
            let (position, rotation) = {
                let spatial = spatial.borrow();
                (spatial.position(), spatial.rotation())
            };
            let mut handle = self.handle.borrow_mut();
            handle.set_position(position);
            handle.set_rotation(rotation);
        }
    }

    /// Current look-at target.
    pub fn target(&self) -> Option<Vec3> {
        self.target
    }

    /// Aim the camera at a world-space point.
    pub fn set_target(&mut self, target: Vec3) {
        self.target = Some(target);
        self.handle.borrow_mut().set_target(target);
    }

    /// Check that the camera's required capabilities are attached.
    pub fn validate(&self) -> Result<(), ComponentError> {
        if self.spatial.is_some() {
            Ok(())
        } else {
            Err(ComponentError::UnmetRequirement {
                component: ComponentKind::Camera,
                requirement: "spatial",
            })
        }
    }

    /// The component this camera was attached under, if it is still alive.
    pub fn parent(&self) -> Option<ComponentRef> {
        self.parent.as_ref().and_then(WeakComponentRef::upgrade)
    }

    pub(super) fn set_parent_ref(&mut self, parent: WeakComponentRef) {
        self.parent = Some(parent);
    }
}
