//! Graphics backend boundary
//!
//! The kernel does not render. It consumes an external graphics backend
//! through the traits below: scene-graph nodes with a pose and child
//! binding, render scenes that adopt scene objects and an active camera,
//! and cameras. Component-layer attachment (see [`crate::component`])
//! mirrors every parent/child edge into this layer, one bind call per
//! attach.

pub mod headless;

pub use headless::HeadlessGraphics;

use std::cell::RefCell;
use std::rc::Rc;

use crate::foundation::math::Vec3;

/// Stable identity a backend assigns to each object it creates, usable for
/// graph introspection and logging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GraphicsId(pub u64);

/// Opaque reference to a mesh asset, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MeshRef(String);

impl MeshRef {
    /// Create a mesh reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Asset name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Opaque reference to a material asset, by name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MaterialRef(String);

impl MaterialRef {
    /// Create a material reference.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Asset name.
    pub fn name(&self) -> &str {
        &self.0
    }
}

/// Shared handle to a backend scene-graph node.
pub type SceneNodeHandle = Rc<RefCell<dyn SceneNode>>;

/// Shared handle to a backend render scene.
pub type RenderSceneHandle = Rc<RefCell<dyn RenderScene>>;

/// Shared handle to a backend camera.
pub type CameraHandle = Rc<RefCell<dyn CameraNode>>;

/// One node in the backend scene graph.
pub trait SceneNode {
    /// Backend identity of this node.
    fn id(&self) -> GraphicsId;

    /// Attach `child` under this node.
    fn bind_child(&mut self, child: &SceneNodeHandle);

    /// Current position.
    fn position(&self) -> Vec3;

    /// Move the node.
    fn set_position(&mut self, position: Vec3);

    /// Current rotation (roll, pitch, yaw).
    fn rotation(&self) -> Vec3;

    /// Rotate the node.
    fn set_rotation(&mut self, rotation: Vec3);

    /// Mesh rendered at this node, if any.
    fn mesh(&self) -> Option<MeshRef>;

    /// Swap the mesh rendered at this node.
    fn set_mesh(&mut self, mesh: MeshRef);
}

/// A renderable scene the backend presents.
pub trait RenderScene {
    /// Backend identity of this scene.
    fn id(&self) -> GraphicsId;

    /// Adopt `node` as a top-level scene object.
    fn bind_scene_object(&mut self, node: &SceneNodeHandle);

    /// Make `camera` the scene's active camera.
    fn bind_camera(&mut self, camera: &CameraHandle);
}

/// A backend camera.
pub trait CameraNode {
    /// Backend identity of this camera.
    fn id(&self) -> GraphicsId;

    /// Attach the camera under a scene-graph node.
    fn set_parent(&mut self, node: &SceneNodeHandle);

    /// Current position.
    fn position(&self) -> Vec3;

    /// Move the camera.
    fn set_position(&mut self, position: Vec3);

    /// Current rotation (roll, pitch, yaw).
    fn rotation(&self) -> Vec3;

    /// Rotate the camera.
    fn set_rotation(&mut self, rotation: Vec3);

    /// Current look-at target, if any.
    fn target(&self) -> Option<Vec3>;

    /// Aim the camera at a world-space point.
    fn set_target(&mut self, target: Vec3);
}

/// Options bag for creating a scene-graph node.
#[derive(Debug, Clone)]
pub struct SceneNodeOptions {
    /// Initial position
    pub position: Vec3,
    /// Initial rotation (roll, pitch, yaw)
    pub rotation: Vec3,
    /// Mesh rendered at the node, if any
    pub mesh: Option<MeshRef>,
}

impl Default for SceneNodeOptions {
    fn default() -> Self {
        Self {
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            mesh: None,
        }
    }
}

/// Options bag for creating a render scene.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneOptions {
    /// Vertical field of view in degrees
    pub fov: f32,
    /// Whether the scene viewport follows window resizes
    pub resizable: bool,
}

impl Default for SceneOptions {
    fn default() -> Self {
        Self {
            fov: 60.0,
            resizable: true,
        }
    }
}

/// Factory the kernel uses to materialize backend objects.
pub trait GraphicsBackend {
    /// Create a scene-graph node.
    fn create_node(&self, options: SceneNodeOptions) -> SceneNodeHandle;

    /// Create a render scene.
    fn create_scene(&self, options: SceneOptions) -> RenderSceneHandle;

    /// Create a camera.
    fn create_camera(&self) -> CameraHandle;
}
