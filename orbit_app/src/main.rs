//! Headless example application
//!
//! Builds a small composition tree against the recording backend, spins
//! the model from a frame task, keeps the camera pose in sync, and
//! terminates after a fixed number of passes.

use std::rc::Rc;

use halberd_engine::prelude::*;

const PASSES: u32 = 240;

fn main() {
    let backend = Rc::new(HeadlessGraphics::new());
    let config = EngineConfig {
        debug: true,
        ..EngineConfig::default()
    };
    let graphics: Rc<dyn GraphicsBackend> = Rc::clone(&backend) as Rc<dyn GraphicsBackend>;
    let mut engine = Engine::new(config, graphics);

    // composition: scene root -> spatial -> model, camera active on the scene
    let scene = Scene::new(backend.as_ref(), engine.scene_options());
    let spatial = Spatial::new(backend.as_ref());
    let model = Model::new(backend.as_ref(), MeshRef::new("orbiter"));
    model.borrow_mut().set_spatial(&spatial);
    model.borrow_mut().set_material(MaterialRef::new("hull-plating"));

    let camera_spatial = Spatial::with_pose(
        backend.as_ref(),
        Vec3::new(0.0, 2.0, 8.0),
        Vec3::zeros(),
    );
    let camera = Camera::new(backend.as_ref());
    camera.borrow_mut().set_spatial(&camera_spatial);
    camera.borrow_mut().set_target(Vec3::zeros());

    let scene_ref = ComponentRef::Scene(Rc::clone(&scene));
    let spatial_ref = ComponentRef::Spatial(Rc::clone(&spatial));
    let model_ref = ComponentRef::Model(Rc::clone(&model));
    let camera_ref = ComponentRef::Camera(Rc::clone(&camera));

    spatial_ref
        .set_parent(&scene_ref)
        .expect("spatial attaches under the scene root");
    model_ref
        .set_parent(&spatial_ref)
        .expect("model attaches under the spatial");
    camera_ref
        .set_parent(&scene_ref)
        .expect("camera becomes the scene's active camera");

    // an entity reacting to translated input
    let player = engine.create_entity();
    player.listen("escape-down", |entity, _arguments| {
        log::info!("entity {} saw escape", entity.id().value());
    });

    // spin the model a quarter turn per second
    let spin_target = Rc::clone(&spatial);
    engine.scheduler().add_named("spin", move |task| {
        let mut spatial = spin_target.borrow_mut();
        let rotation = spatial.rotation()
            + Vec3::new(0.0, std::f32::consts::FRAC_PI_2 * task.delta_secs(), 0.0);
        spatial.set_rotation(rotation);
        Ok(TaskSignal::Continue)
    });

    // push camera pose edits into the backend every frame
    let tracked_camera = Rc::clone(&camera);
    engine.scheduler().add_named("camera-sync", move |_task| {
        tracked_camera
            .borrow_mut()
            .sync_pose()
            .map_err(|error| TaskError::Failed(error.to_string()))?;
        Ok(TaskSignal::Continue)
    });

    // bounded run: count passes, then stop the loop
    let stopper = engine.scheduler().clone();
    let mut remaining = PASSES;
    engine.scheduler().add_named("frame-limit", move |_task| {
        remaining -= 1;
        if remaining == 0 {
            stopper.terminate();
            return Ok(TaskSignal::Done);
        }
        Ok(TaskSignal::Continue)
    });

    // one synthetic keystroke through the input bridge
    engine.key_down(&KeySignal {
        code: 27,
        modifiers: Modifiers::empty(),
    });
    engine.pointer_moved(640.0, 360.0);

    engine.run();

    log::info!(
        "final rotation after {PASSES} passes: {:?}",
        spatial.borrow().rotation()
    );
    log::info!("backend recorded {} bind calls", backend.bind_log().len());
}
