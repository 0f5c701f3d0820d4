//! Recording graphics backend
//!
//! No rendering: every object is a record in a shared registry and every
//! bind call is logged. The query surface (`parent_of`, `scene_objects`,
//! `active_camera`) lets tests and headless hosts assert that the
//! component tree and the backend graph stay mirrored. Sufficient as the
//! reference backend; a real renderer implements the same traits.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use slotmap::{DefaultKey, Key, SlotMap};

use crate::foundation::math::Vec3;
use super::{
    CameraHandle, CameraNode, GraphicsBackend, GraphicsId, MeshRef, RenderScene,
    RenderSceneHandle, SceneNode, SceneNodeHandle, SceneNodeOptions, SceneOptions,
};

#[derive(Debug, Clone, Copy)]
enum ObjectKind {
    Node,
    Scene,
    Camera,
}

#[derive(Default)]
struct GraphLog {
    objects: SlotMap<DefaultKey, ObjectKind>,
    // child -> parent, for nodes and cameras alike
    parents: HashMap<GraphicsId, GraphicsId>,
    scene_objects: HashMap<GraphicsId, Vec<GraphicsId>>,
    active_cameras: HashMap<GraphicsId, GraphicsId>,
    binds: Vec<(GraphicsId, GraphicsId)>,
}

impl GraphLog {
    fn allocate(&mut self, kind: ObjectKind) -> GraphicsId {
        let key = self.objects.insert(kind);
        GraphicsId(key.data().as_ffi())
    }

    fn record_bind(&mut self, parent: GraphicsId, child: GraphicsId) {
        self.parents.insert(child, parent);
        self.binds.push((parent, child));
    }
}

/// In-process recording backend.
///
/// Clones share the same registry, so a host can keep one copy for
/// queries while the engine owns another.
#[derive(Clone, Default)]
pub struct HeadlessGraphics {
    log: Rc<RefCell<GraphLog>>,
}

impl HeadlessGraphics {
    /// Create an empty backend.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parent of `child` in the recorded graph, if it has been bound.
    pub fn parent_of(&self, child: GraphicsId) -> Option<GraphicsId> {
        self.log.borrow().parents.get(&child).copied()
    }

    /// Top-level scene objects bound into `scene`, in bind order.
    pub fn scene_objects(&self, scene: GraphicsId) -> Vec<GraphicsId> {
        self.log
            .borrow()
            .scene_objects
            .get(&scene)
            .cloned()
            .unwrap_or_default()
    }

    /// The camera currently active on `scene`, if one was bound.
    pub fn active_camera(&self, scene: GraphicsId) -> Option<GraphicsId> {
        self.log.borrow().active_cameras.get(&scene).copied()
    }

    /// Chronological log of every (parent, child) bind call.
    pub fn bind_log(&self) -> Vec<(GraphicsId, GraphicsId)> {
        self.log.borrow().binds.clone()
    }

    /// Total number of objects created through this backend.
    pub fn object_count(&self) -> usize {
        self.log.borrow().objects.len()
    }
}

impl GraphicsBackend for HeadlessGraphics {
    fn create_node(&self, options: SceneNodeOptions) -> SceneNodeHandle {
        let id = self.log.borrow_mut().allocate(ObjectKind::Node);
        Rc::new(RefCell::new(HeadlessNode {
            id,
            position: options.position,
            rotation: options.rotation,
            mesh: options.mesh,
            log: Rc::clone(&self.log),
        }))
    }

    fn create_scene(&self, options: SceneOptions) -> RenderSceneHandle {
        let id = self.log.borrow_mut().allocate(ObjectKind::Scene);
        Rc::new(RefCell::new(HeadlessScene {
            id,
            options,
            log: Rc::clone(&self.log),
        }))
    }

    fn create_camera(&self) -> CameraHandle {
        let id = self.log.borrow_mut().allocate(ObjectKind::Camera);
        Rc::new(RefCell::new(HeadlessCamera {
            id,
            position: Vec3::zeros(),
            rotation: Vec3::zeros(),
            target: None,
            log: Rc::clone(&self.log),
        }))
    }
}

/// Recorded scene-graph node.
pub struct HeadlessNode {
    id: GraphicsId,
    position: Vec3,
    rotation: Vec3,
    mesh: Option<MeshRef>,
    log: Rc<RefCell<GraphLog>>,
}

impl SceneNode for HeadlessNode {
    fn id(&self) -> GraphicsId {
        self.id
    }

    fn mesh(&self) -> Option<MeshRef> {
        self.mesh.clone()
    }

    fn bind_child(&mut self, child: &SceneNodeHandle) {
        let child_id = child.borrow().id();
        self.log.borrow_mut().record_bind(self.id, child_id);
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Vec3 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    fn set_mesh(&mut self, mesh: MeshRef) {
        self.mesh = Some(mesh);
    }
}

/// Recorded render scene.
pub struct HeadlessScene {
    id: GraphicsId,
    options: SceneOptions,
    log: Rc<RefCell<GraphLog>>,
}

impl HeadlessScene {
    /// Options the scene was created with.
    pub fn options(&self) -> SceneOptions {
        self.options
    }
}

impl RenderScene for HeadlessScene {
    fn id(&self) -> GraphicsId {
        self.id
    }

    fn bind_scene_object(&mut self, node: &SceneNodeHandle) {
        let node_id = node.borrow().id();
        let mut log = self.log.borrow_mut();
        log.scene_objects.entry(self.id).or_default().push(node_id);
        log.binds.push((self.id, node_id));
    }

    fn bind_camera(&mut self, camera: &CameraHandle) {
        let camera_id = camera.borrow().id();
        let mut log = self.log.borrow_mut();
        log.active_cameras.insert(self.id, camera_id);
        log.binds.push((self.id, camera_id));
    }
}

/// Recorded camera.
pub struct HeadlessCamera {
    id: GraphicsId,
    position: Vec3,
    rotation: Vec3,
    target: Option<Vec3>,
    log: Rc<RefCell<GraphLog>>,
}

impl CameraNode for HeadlessCamera {
    fn id(&self) -> GraphicsId {
        self.id
    }

    fn set_parent(&mut self, node: &SceneNodeHandle) {
        let parent_id = node.borrow().id();
        self.log.borrow_mut().record_bind(parent_id, self.id);
    }

    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_position(&mut self, position: Vec3) {
        self.position = position;
    }

    fn rotation(&self) -> Vec3 {
        self.rotation
    }

    fn set_rotation(&mut self, rotation: Vec3) {
        self.rotation = rotation;
    }

    fn target(&self) -> Option<Vec3> {
        self.target
    }

    fn set_target(&mut self, target: Vec3) {
        self.target = Some(target);
    }
}
