//! Entity component composition model
//!
//! Components are capability-tagged units (type, subtypes, requirements)
//! that compose into a parent/child tree. Attachment behavior depends on
//! both the parent's and the child's concrete kind, so the protocol is a
//! closed tagged union ([`ComponentRef`]) with one exhaustive
//! `(parent, child)` dispatch rather than virtual single dispatch: a
//! camera attached to a scene becomes its active camera, a model attached
//! to a spatial binds its node underneath, and so on.
//!
//! Every component-layer attach produces exactly one corresponding bind on
//! the external graphics layer, keeping the two trees mirrored node for
//! node. Attachment and requirement failures surface synchronously as
//! [`ComponentError`].

mod camera;
mod model;
mod scene;
mod spatial;

pub use camera::Camera;
pub use model::Model;
pub use scene::Scene;
pub use spatial::Spatial;

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use thiserror::Error;

/// Concrete component kinds, a closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentKind {
    /// Pose plus an external scene-graph node
    Spatial,
    /// Composition-tree root owning a render scene
    Scene,
    /// Viewpoint into a scene
    Camera,
    /// Renderable mesh instance
    Model,
}

impl fmt::Display for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Spatial => "spatial",
            Self::Scene => "scene",
            Self::Camera => "camera",
            Self::Model => "model",
        };
        f.write_str(name)
    }
}

/// Capability metadata shared by every component variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComponentDescriptor {
    /// Broad component family (`"core"`, `"graphics"`)
    pub type_tag: &'static str,
    /// Ordered subtype tags
    pub subtypes: &'static [&'static str],
    /// Capabilities that must be attached before the component is usable
    pub requires: &'static [&'static str],
}

/// Composition failures, surfaced synchronously to the caller.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ComponentError {
    /// A component was used before a required capability was attached.
    #[error("{component} requires a {requirement} component before use")]
    UnmetRequirement {
        /// Kind of the incomplete component
        component: ComponentKind,
        /// The missing capability tag
        requirement: &'static str,
    },
    /// The attachment matrix has no valid edge for this pair.
    #[error("a {child} component cannot be attached under a {parent} component")]
    InvalidAttachment {
        /// Kind of the would-be parent
        parent: ComponentKind,
        /// Kind of the would-be child
        child: ComponentKind,
    },
}

/// Shared handle to a concrete component.
#[derive(Clone)]
pub enum ComponentRef {
    /// A [`Spatial`]
    Spatial(Rc<RefCell<Spatial>>),
    /// A [`Scene`]
    Scene(Rc<RefCell<Scene>>),
    /// A [`Camera`]
    Camera(Rc<RefCell<Camera>>),
    /// A [`Model`]
    Model(Rc<RefCell<Model>>),
}

/// Weak back-reference from a child component to its parent.
#[derive(Clone)]
pub enum WeakComponentRef {
    /// A [`Spatial`]
    Spatial(Weak<RefCell<Spatial>>),
    /// A [`Scene`]
    Scene(Weak<RefCell<Scene>>),
    /// A [`Camera`]
    Camera(Weak<RefCell<Camera>>),
    /// A [`Model`]
    Model(Weak<RefCell<Model>>),
}

impl WeakComponentRef {
    /// Upgrade to a strong handle if the component is still alive.
    pub fn upgrade(&self) -> Option<ComponentRef> {
        match self {
            Self::Spatial(weak) => weak.upgrade().map(ComponentRef::Spatial),
            Self::Scene(weak) => weak.upgrade().map(ComponentRef::Scene),
            Self::Camera(weak) => weak.upgrade().map(ComponentRef::Camera),
            Self::Model(weak) => weak.upgrade().map(ComponentRef::Model),
        }
    }
}

impl ComponentRef {
    /// The concrete kind of the referenced component.
    pub fn kind(&self) -> ComponentKind {
        match self {
            Self::Spatial(_) => ComponentKind::Spatial,
            Self::Scene(_) => ComponentKind::Scene,
            Self::Camera(_) => ComponentKind::Camera,
            Self::Model(_) => ComponentKind::Model,
        }
    }

    /// Capability metadata of the referenced component.
    pub fn descriptor(&self) -> ComponentDescriptor {
        match self {
            Self::Spatial(_) => Spatial::descriptor(),
            Self::Scene(_) => Scene::descriptor(),
            Self::Camera(_) => Camera::descriptor(),
            Self::Model(_) => Model::descriptor(),
        }
    }

    /// Downgrade to a weak back-reference.
    pub fn downgrade(&self) -> WeakComponentRef {
        match self {
            Self::Spatial(strong) => WeakComponentRef::Spatial(Rc::downgrade(strong)),
            Self::Scene(strong) => WeakComponentRef::Scene(Rc::downgrade(strong)),
            Self::Camera(strong) => WeakComponentRef::Camera(Rc::downgrade(strong)),
            Self::Model(strong) => WeakComponentRef::Model(Rc::downgrade(strong)),
        }
    }

    /// Check that every capability the component requires is attached.
    pub fn validate(&self) -> Result<(), ComponentError> {
        match self {
            Self::Camera(camera) => camera.borrow().validate(),
            Self::Model(model) => model.borrow().validate(),
            Self::Spatial(_) | Self::Scene(_) => Ok(()),
        }
    }

    /// Attach `child` under this component.
    ///
    /// The full attachment matrix; each arm mirrors the edge into the
    /// graphics layer.
    pub fn add_child(&self, child: &Self) -> Result<(), ComponentError> {
        match (self, child) {
            // scenes are roots; nothing may adopt one
            (parent, Self::Scene(_)) => Err(ComponentError::InvalidAttachment {
                parent: parent.kind(),
                child: ComponentKind::Scene,
            }),

            // spatial parent: node-bearing children bind under the node,
            // a camera attaches its handle instead
            (Self::Spatial(parent), Self::Spatial(adopted)) => {
                let parent_node = parent.borrow().node();
                let child_node = adopted.borrow().node();
                parent_node.borrow_mut().bind_child(&child_node);
                Ok(())
            }
            (Self::Spatial(parent), Self::Model(adopted)) => {
                let parent_node = parent.borrow().node();
                let child_node = adopted.borrow().node();
                parent_node.borrow_mut().bind_child(&child_node);
                Ok(())
            }
            (Self::Spatial(parent), Self::Camera(adopted)) => {
                let parent_node = parent.borrow().node();
                let handle = adopted.borrow().handle();
                handle.borrow_mut().set_parent(&parent_node);
                Ok(())
            }

            // scene parent: cameras become the active camera, everything
            // else lands under the root spatial
            (Self::Scene(parent), Self::Camera(adopted)) => {
                let render = parent.borrow().render();
                let handle = adopted.borrow().handle();
                render.borrow_mut().bind_camera(&handle);
                Ok(())
            }
            (Self::Scene(parent), other) => {
                let root = parent.borrow().root();
                Self::Spatial(root).add_child(other)
            }

            // camera parent: delegate to the backing spatial
            (Self::Camera(parent), other) => {
                let spatial =
                    parent
                        .borrow()
                        .spatial()
                        .ok_or(ComponentError::UnmetRequirement {
                            component: ComponentKind::Camera,
                            requirement: "spatial",
                        })?;
                Self::Spatial(spatial).add_child(other)
            }

            // model parent: like a spatial, with the model's own node
            (Self::Model(parent), Self::Camera(adopted)) => {
                let parent_node = parent.borrow().node();
                let handle = adopted.borrow().handle();
                handle.borrow_mut().set_parent(&parent_node);
                Ok(())
            }
            (Self::Model(parent), Self::Spatial(adopted)) => {
                let parent_node = parent.borrow().node();
                let child_node = adopted.borrow().node();
                parent_node.borrow_mut().bind_child(&child_node);
                Ok(())
            }
            (Self::Model(parent), Self::Model(adopted)) => {
                let parent_node = parent.borrow().node();
                let child_node = adopted.borrow().node();
                parent_node.borrow_mut().bind_child(&child_node);
                Ok(())
            }
        }
    }

    /// Attach this component under `parent`.
    ///
    /// Parent-initiated linkage is mutual: on success the child records a
    /// weak back-reference to `parent`. Scenes ignore parenting entirely.
    /// On failure no state is touched.
    pub fn set_parent(&self, parent: &Self) -> Result<(), ComponentError> {
        match self {
            // a scene is always a root
            Self::Scene(_) => Ok(()),

            Self::Spatial(child) => {
                parent.add_child(self)?;
                child.borrow_mut().set_parent_ref(parent.downgrade());
                Ok(())
            }

            Self::Model(child) => {
                parent.add_child(self)?;
                child.borrow_mut().set_parent_ref(parent.downgrade());
                Ok(())
            }

            // cameras attach to scenes as the active camera, otherwise
            // bind their handle directly under the parent's node
            Self::Camera(child) => match parent {
                Self::Scene(_) => {
                    parent.add_child(self)?;
                    child.borrow_mut().set_parent_ref(parent.downgrade());
                    Ok(())
                }
                Self::Spatial(target) => {
                    let node = target.borrow().node();
                    let handle = child.borrow().handle();
                    handle.borrow_mut().set_parent(&node);
                    child.borrow_mut().set_parent_ref(parent.downgrade());
                    Ok(())
                }
                Self::Model(target) => {
                    let node = target.borrow().node();
                    let handle = child.borrow().handle();
                    handle.borrow_mut().set_parent(&node);
                    child.borrow_mut().set_parent_ref(parent.downgrade());
                    Ok(())
                }
                Self::Camera(_) => Err(ComponentError::InvalidAttachment {
                    parent: ComponentKind::Camera,
                    child: ComponentKind::Camera,
                }),
            },
        }
    }
}
