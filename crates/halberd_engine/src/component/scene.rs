//! Scene component: a render scene plus its root spatial

use std::cell::RefCell;
use std::rc::Rc;

use crate::graphics::{GraphicsBackend, RenderSceneHandle, SceneOptions};

use super::{ComponentDescriptor, Spatial};

const DESCRIPTOR: ComponentDescriptor = ComponentDescriptor {
    type_tag: "core",
    subtypes: &["scene"],
    requires: &[],
};

/// Root of a composition tree.
///
/// Owns an external render scene and an internal root [`Spatial`]; every
/// non-camera child attaches under that root, cameras become the scene's
/// active camera. A scene is never attached under anything.
pub struct Scene {
    render: RenderSceneHandle,
    root: Rc<RefCell<Spatial>>,
}

impl Scene {
    /// Create a scene and bind its root spatial into the render scene.
    pub fn new(backend: &dyn GraphicsBackend, options: SceneOptions) -> Rc<RefCell<Self>> {
        let render = backend.create_scene(options);
        let root = Spatial::new(backend);
        let root_node = root.borrow().node();
        render.borrow_mut().bind_scene_object(&root_node);
        Rc::new(RefCell::new(Self { render, root }))
    }

    /// Capability metadata for scenes.
    pub const fn descriptor() -> ComponentDescriptor {
        DESCRIPTOR
    }

    /// The spatial that non-camera children bind under.
    pub fn root(&self) -> Rc<RefCell<Spatial>> {
        Rc::clone(&self.root)
    }

    /// The external render scene.
    pub fn render(&self) -> RenderSceneHandle {
        Rc::clone(&self.render)
    }
}
