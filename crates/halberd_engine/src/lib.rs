//! # Halberd Engine
//!
//! A minimal entity-component game-engine kernel built from three
//! subsystems:
//!
//! - **Scheduler**: a cooperative frame scheduler that ticks named tasks
//!   once per pass, tracking per-task delta time
//! - **Messenger**: publish/subscribe event dispatch between decoupled
//!   listeners, including translation of raw input signals into canonical
//!   event names like `"shift-a-down"`
//! - **Components**: spatials, scenes, cameras, and models composing into
//!   a parent/child tree that mirrors itself into an external graphics
//!   backend
//!
//! Rendering, physics, and sound are external collaborators behind trait
//! boundaries; the crate ships a recording [`graphics::HeadlessGraphics`]
//! backend for tests and headless hosts.
//!
//! ## Quick Start
//!
//! ```rust
//! use halberd_engine::prelude::*;
//! use std::rc::Rc;
//!
//! let backend = Rc::new(HeadlessGraphics::new());
//! let mut engine = Engine::new(EngineConfig::default(), backend);
//!
//! // a frame task that finishes after its first tick
//! engine.scheduler().add(|_task| Ok(TaskSignal::Done));
//!
//! // an entity listening for a semantic input event
//! let player = engine.create_entity();
//! player.listen("escape-down", |entity, _arguments| {
//!     println!("entity {} saw escape", entity.id().value());
//! });
//!
//! engine.scheduler().tick();
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod component;
pub mod config;
pub mod entity;
pub mod foundation;
pub mod graphics;
pub mod input;
pub mod messenger;
pub mod physics;
pub mod scheduler;
pub mod sound;

mod engine;

pub use engine::{Engine, EngineError};

/// Common imports for engine users
pub mod prelude {
    pub use crate::{
        component::{
            Camera, ComponentDescriptor, ComponentError, ComponentKind, ComponentRef, Model,
            Scene, Spatial,
        },
        config::{EngineConfig, SceneConfig, WindowConfig},
        entity::{Entity, EntityAllocator, EntityId},
        foundation::math::Vec3,
        graphics::{
            GraphicsBackend, HeadlessGraphics, MaterialRef, MeshRef, SceneNodeOptions,
            SceneOptions,
        },
        input::{ButtonSignal, KeySignal, Modifiers, MouseWatcher, SignalMode, WheelSignal},
        messenger::{EventValue, Messenger},
        scheduler::{Scheduler, TaskError, TaskId, TaskSignal},
        Engine, EngineError,
    };
}
