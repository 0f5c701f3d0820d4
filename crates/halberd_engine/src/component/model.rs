//! Model component

use std::cell::RefCell;
use std::rc::Rc;

use crate::graphics::{GraphicsBackend, MaterialRef, MeshRef, SceneNodeHandle, SceneNodeOptions};

use super::{
    ComponentDescriptor, ComponentError, ComponentKind, ComponentRef, Spatial, WeakComponentRef,
};

const DESCRIPTOR: ComponentDescriptor = ComponentDescriptor {
    type_tag: "graphics",
    subtypes: &["model"],
    requires: &["spatial"],
};

/// A renderable mesh instance.
///
/// Owns an external scene-graph node carrying the mesh. Requires a
/// [`Spatial`] for its pose; the spatial is shared by reference, and
/// [`Model::sync_pose`] pushes its current pose into the node after edits.
pub struct Model {
    node: SceneNodeHandle,
    mesh: Option<MeshRef>,
    material: Option<MaterialRef>,
    spatial: Option<Rc<RefCell<Spatial>>>,
    parent: Option<WeakComponentRef>,
}

impl Model {
    /// Create a model rendering `mesh`.
    pub fn new(backend: &dyn GraphicsBackend, mesh: MeshRef) -> Rc<RefCell<Self>> {
        let node = backend.create_node(SceneNodeOptions {
            mesh: Some(mesh.clone()),
            ..SceneNodeOptions::default()
        });
        Rc::new(RefCell::new(Self {
            node,
            mesh: Some(mesh),
            material: None,
            spatial: None,
            parent: None,
        }))
    }

    /// Capability metadata for models.
    pub const fn descriptor() -> ComponentDescriptor {
        DESCRIPTOR
    }

    /// The external node this model owns.
    pub fn node(&self) -> SceneNodeHandle {
        Rc::clone(&self.node)
    }

    /// The spatial backing this model, if one has been set.
    pub fn spatial(&self) -> Option<Rc<RefCell<Spatial>>> {
        self.spatial.as_ref().map(Rc::clone)
    }

    /// Adopt `spatial` as the model's pose source and push its current
    /// pose into the node.
    pub fn set_spatial(&mut self, spatial: &Rc<RefCell<Spatial>>) {
        self.spatial = Some(Rc::clone(spatial));
        self.push_pose();
    }

    /// Re-synchronize the node with the shared spatial's pose.
    pub fn sync_pose(&mut self) -> Result<(), ComponentError> {
        if self.spatial.is_none() {
            return Err(ComponentError::UnmetRequirement {
                component: ComponentKind::Model,
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
            let mut node = self.node.borrow_mut();
            node.set_position(position);
            node.set_rotation(rotation);
        }
    }

    /// Mesh currently rendered by the model.
    pub fn mesh(&self) -> Option<MeshRef> {
        self.mesh.clone()
    }

    /// Swap the mesh and push the change into the node.
    pub fn set_mesh(&mut self, mesh: MeshRef) {
        self.mesh = Some(mesh.clone());
        self.node.borrow_mut().set_mesh(mesh);
    }

    /// Material applied to the model.
    pub fn material(&self) -> Option<MaterialRef> {
        self.material.clone()
    }

    /// Swap the material reference.
    pub fn set_material(&mut self, material: MaterialRef) {
        self.material = Some(material);
    }

    /// Check that the model's required capabilities are attached.
    pub fn validate(&self) -> Result<(), ComponentError> {
        if self.spatial.is_some() {
            Ok(())
        } else {
            Err(ComponentError::UnmetRequirement {
                component: ComponentKind::Model,
                requirement: "spatial",
            })
        }
    }

    /// The component this model was attached under, if it is still alive.
    pub fn parent(&self) -> Option<ComponentRef> {
        self.parent.as_ref().and_then(WeakComponentRef::upgrade)
    }

    pub(super) fn set_parent_ref(&mut self, parent: WeakComponentRef) {
        self.parent = Some(parent);
    }
}
