//! Core engine implementation

use std::path::Path;
use std::rc::Rc;

use thiserror::Error;

use crate::config::{ConfigError, EngineConfig, WindowConfig};
use crate::entity::{Entity, EntityAllocator};
use crate::foundation::logging;
use crate::graphics::{GraphicsBackend, SceneOptions};
use crate::input::{ButtonSignal, KeySignal, MouseWatcher, WheelSignal};
use crate::messenger::Messenger;
use crate::physics::Physics;
use crate::scheduler::Scheduler;
use crate::sound::Sound;

/// Main engine struct.
///
/// Wires the kernel subsystems together: the frame [`Scheduler`], the
/// event [`Messenger`], the [`MouseWatcher`], the entity id allocator, and
/// the external collaborator slots (graphics, physics, sound). Host code
/// feeds raw input through the forwarding helpers and drives the frame
/// loop with [`Engine::run`].
pub struct Engine {
    scheduler: Scheduler,
    messenger: Messenger,
    mouse_watcher: MouseWatcher,
    entity_ids: EntityAllocator,
    graphics: Rc<dyn GraphicsBackend>,
    physics: Option<Box<dyn Physics>>,
    sound: Option<Box<dyn Sound>>,
    config: EngineConfig,
}

impl Engine {
    /// Create a new engine instance.
    ///
    /// Installs the logging sink according to `config.debug`.
    pub fn new(config: EngineConfig, graphics: Rc<dyn GraphicsBackend>) -> Self {
        logging::init(config.debug);
        log::info!("initializing engine");
        Self {
            scheduler: Scheduler::new(),
            messenger: Messenger::new(),
            mouse_watcher: MouseWatcher::new(),
            entity_ids: EntityAllocator::new(),
            graphics,
            physics: None,
            sound: None,
            config,
        }
    }

    /// Create an engine from a configuration file (TOML or RON).
    pub fn from_config_file(
        path: impl AsRef<Path>,
        graphics: Rc<dyn GraphicsBackend>,
    ) -> Result<Self, EngineError> {
        Ok(Self::new(EngineConfig::from_file(path)?, graphics))
    }

    /// Create a new entity bound to this engine's messenger.
    pub fn create_entity(&mut self) -> Entity {
        Entity::new(&self.messenger, &mut self.entity_ids)
    }

    /// Run the frame loop until [`Engine::terminate`] is called.
    pub fn run(&self) {
        log::info!("starting main loop");
        self.scheduler.run();
        log::info!("engine shutdown complete");
    }

    /// Stop the frame loop after the pass in flight.
    pub fn terminate(&self) {
        self.scheduler.terminate();
    }

    /// The frame scheduler.
    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    /// The event dispatcher.
    pub fn messenger(&self) -> &Messenger {
        &self.messenger
    }

    /// The cached pointer position reader.
    pub fn mouse_watcher(&self) -> &MouseWatcher {
        &self.mouse_watcher
    }

    /// The graphics backend this engine composes against.
    pub fn graphics(&self) -> Rc<dyn GraphicsBackend> {
        Rc::clone(&self.graphics)
    }

    /// The engine configuration.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Window parameters for the host to apply to its backend.
    pub fn window_config(&self) -> &WindowConfig {
        &self.config.window
    }

    /// Scene creation options derived from the configuration.
    pub fn scene_options(&self) -> SceneOptions {
        self.config.scene.into()
    }

    // --- input forwarding ----------------------------------------------

    /// Forward a raw key press into the event dispatcher.
    pub fn key_down(&self, signal: &KeySignal) {
        self.messenger.key_down(signal);
    }

    /// Forward a raw key release into the event dispatcher.
    pub fn key_up(&self, signal: &KeySignal) {
        self.messenger.key_up(signal);
    }

    /// Forward a raw mouse-button press into the event dispatcher.
    pub fn button_down(&self, signal: &ButtonSignal) {
        self.messenger.button_down(signal);
    }

    /// Forward a raw mouse-button release into the event dispatcher.
    pub fn button_up(&self, signal: &ButtonSignal) {
        self.messenger.button_up(signal);
    }

    /// Forward a raw wheel movement into the event dispatcher.
    pub fn wheel(&self, signal: &WheelSignal) {
        self.messenger.wheel(signal);
    }

    /// Record a pointer movement in the mouse watcher.
    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        self.mouse_watcher.pointer_moved(x, y);
    }

    // --- external subsystem registration -------------------------------

    /// Register the physics subsystem.
    pub fn register_physics(&mut self, physics: Box<dyn Physics>) {
        self.physics = Some(physics);
    }

    /// The registered physics subsystem, if any.
    pub fn physics_mut(&mut self) -> Option<&mut (dyn Physics + 'static)> {
        self.physics.as_deref_mut()
    }

    /// Register the sound subsystem.
    pub fn register_sound(&mut self, sound: Box<dyn Sound>) {
        self.sound = Some(sound);
    }

    /// The registered sound subsystem, if any.
    pub fn sound_mut(&mut self) -> Option<&mut (dyn Sound + 'static)> {
        self.sound.as_deref_mut()
    }
}

/// Engine-level errors.
#[derive(Debug, Error)]
pub enum EngineError {
    /// Configuration loading failed
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphics::HeadlessGraphics;
    use crate::input::Modifiers;
    use crate::messenger::EventValue;
    use crate::scheduler::TaskSignal;
    use std::cell::RefCell;

    fn headless_engine() -> Engine {
        Engine::new(EngineConfig::default(), Rc::new(HeadlessGraphics::new()))
    }

    #[test]
    fn entities_get_sequential_ids() {
        let mut engine = headless_engine();
        let first = engine.create_entity();
        let second = engine.create_entity();
        assert_eq!(first.id().value(), 0);
        assert_eq!(second.id().value(), 1);
    }

    #[test]
    fn run_returns_once_a_task_terminates_the_loop() {
        let engine = headless_engine();
        let scheduler = engine.scheduler().clone();
        let passes = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&passes);

        engine.scheduler().add(move |_| {
            *sink.borrow_mut() += 1;
            if *sink.borrow() == 2 {
                scheduler.terminate();
            }
            Ok(TaskSignal::Continue)
        });

        engine.run();
        assert_eq!(*passes.borrow(), 2);
    }

    #[test]
    fn key_input_reaches_entity_listeners() {
        let mut engine = headless_engine();
        let player = engine.create_entity();
        let fired = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&fired);

        player.listen_with(
            "escape-down",
            move |_, arguments| sink.borrow_mut().push(arguments.to_vec()),
            vec![EventValue::Str("pause".to_string())],
            true,
        );

        engine.key_down(&KeySignal {
            code: 27,
            modifiers: Modifiers::empty(),
        });

        assert_eq!(
            *fired.borrow(),
            vec![vec![EventValue::Str("pause".to_string())]]
        );
    }

    #[test]
    fn pointer_movements_update_the_watcher() {
        let mut engine = headless_engine();
        engine.pointer_moved(5.0, 9.0);
        engine.pointer_moved(8.0, 4.0);
        assert_eq!(engine.mouse_watcher().x(), Some(8.0));
        assert_eq!(engine.mouse_watcher().dy(), Some(5.0));
    }

    #[test]
    fn scene_options_follow_the_config() {
        let config = EngineConfig {
            scene: crate::config::SceneConfig {
                fov: 75.0,
                resizable: false,
            },
            ..EngineConfig::default()
        };
        let engine = Engine::new(config, Rc::new(HeadlessGraphics::new()));
        let options = engine.scene_options();
        assert!(!options.resizable);
        assert!((options.fov - 75.0).abs() < f32::EPSILON);
    }

    #[test]
    fn external_subsystems_can_register() {
        struct NullPhysics;
        impl Physics for NullPhysics {
            fn step(&mut self, _delta_seconds: f32) {}
        }

        let mut engine = headless_engine();
        assert!(engine.physics_mut().is_none());
        engine.register_physics(Box::new(NullPhysics));
        assert!(engine.physics_mut().is_some());
        if let Some(physics) = engine.physics_mut() {
            physics.step(0.016);
        }
    }
}
