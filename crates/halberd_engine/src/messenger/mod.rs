//! Publish/subscribe event dispatch between decoupled listeners
//!
//! An event is an arbitrary string name. Entities register listeners per
//! event through [`Messenger::listen`]; [`Messenger::send`] invokes every
//! listener registered on that name, in registration order, passing the
//! registered parameters followed by the sent parameters. Raw input
//! signals are bridged into the same dispatch path after translation to
//! canonical names (see [`crate::input::translate`]).
//!
//! The messenger is a cheap-clone handle over single-threaded state; it is
//! safe for a listener to call back into the messenger (listen, ignore,
//! send) while a dispatch is in flight.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::{Rc, Weak};

use crate::entity::{Entity, EntityId};
use crate::input::{translate, ButtonSignal, KeySignal, SignalMode, WheelSignal};

/// Argument value passed to listeners.
#[derive(Debug, Clone, PartialEq)]
pub enum EventValue {
    /// Boolean flag
    Bool(bool),
    /// Signed integer
    Int(i64),
    /// Floating point number
    Float(f64),
    /// Owned string
    Str(String),
    /// Opaque identifier (entity ids, handles)
    Id(u64),
}

/// Listener callback: receives the registered entity and the concatenated
/// parameter list (registered parameters first, sent parameters after).
pub type ListenerFn = dyn Fn(&Entity, &[EventValue]);

struct Registration {
    entity: EntityId,
    callback: Rc<ListenerFn>,
    parameters: Vec<EventValue>,
    persistent: bool,
}

/// Bucket order is registration order; one slot per (event, entity).
#[derive(Default)]
struct Registry {
    buckets: HashMap<String, Vec<Registration>>,
}

/// Cheap-clone handle to the event dispatcher.
#[derive(Clone, Default)]
pub struct Messenger {
    inner: Rc<RefCell<Registry>>,
}

/// Non-owning messenger handle held by entities.
#[derive(Debug, Clone)]
pub struct WeakMessenger {
    inner: Weak<RefCell<Registry>>,
}

impl WeakMessenger {
    pub(crate) fn upgrade(&self) -> Option<Messenger> {
        self.inner.upgrade().map(|inner| Messenger { inner })
    }
}

impl Messenger {
    /// Create an empty dispatcher.
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn downgrade(&self) -> WeakMessenger {
        WeakMessenger {
            inner: Rc::downgrade(&self.inner),
        }
    }

    /// Register `callback` for `event`, scoped to `entity`.
    ///
    /// At most one registration exists per (event, entity) pair; a second
    /// `listen` overwrites the first in place, keeping its position in the
    /// dispatch order.
    pub fn listen(
        &self,
        event: &str,
        entity: &Entity,
        callback: impl Fn(&Entity, &[EventValue]) + 'static,
        parameters: Vec<EventValue>,
        persistent: bool,
    ) {
        let registration = Registration {
            entity: entity.id(),
            callback: Rc::new(callback),
            parameters,
            persistent,
        };
        let mut registry = self.inner.borrow_mut();
        let bucket = registry.buckets.entry(event.to_string()).or_default();
        if let Some(slot) = bucket
            .iter_mut()
            .find(|existing| existing.entity == registration.entity)
        {
            log::debug!(
                "replacing listener for '{event}' on entity {}",
                registration.entity.value()
            );
            *slot = registration;
        } else {
            bucket.push(registration);
        }
    }

    /// Remove `entity`'s listener for `event`. Idempotent; unknown pairs
    /// are a silent no-op.
    pub fn ignore(&self, event: &str, entity: &Entity) {
        self.ignore_id(event, entity.id());
    }

    fn ignore_id(&self, event: &str, entity: EntityId) {
        let mut registry = self.inner.borrow_mut();
        if let Some(bucket) = registry.buckets.get_mut(event) {
            bucket.retain(|registration| registration.entity != entity);
            if bucket.is_empty() {
                registry.buckets.remove(event);
            }
        }
    }

    /// Dispatch `event` to every listener currently registered on it.
    ///
    /// The listener set is snapshotted before any callback runs, so a
    /// callback that mutates the registrations for the same event cannot
    /// skip or double-fire its siblings: entries unregistered mid-dispatch
    /// are skipped, and entries registered mid-dispatch fire from the next
    /// `send`. Non-persistent listeners are removed immediately after
    /// their invocation. Sending with no listeners is a silent no-op.
    pub fn send(&self, event: &str, parameters: &[EventValue]) {
        let snapshot: Vec<(EntityId, Rc<ListenerFn>, Vec<EventValue>, bool)> = {
            let registry = self.inner.borrow();
            let Some(bucket) = registry.buckets.get(event) else {
                return;
            };
            bucket
                .iter()
                .map(|registration| {
                    (
                        registration.entity,
                        Rc::clone(&registration.callback),
                        registration.parameters.clone(),
                        registration.persistent,
                    )
                })
                .collect()
        };

        for (entity_id, callback, mut arguments, persistent) in snapshot {
            // an earlier callback in this dispatch may have unregistered it
            let live = self.inner.borrow().buckets.get(event).map_or(false, |bucket| {
                bucket
                    .iter()
                    .any(|registration| registration.entity == entity_id)
            });
            if !live {
                continue;
            }

            arguments.extend_from_slice(parameters);
            let receiver = Entity::from_parts(entity_id, self.downgrade());
            callback(&receiver, &arguments);

            if !persistent {
                self.ignore_id(event, entity_id);
            }
        }
    }

    /// Number of listeners currently registered on `event`.
    pub fn listener_count(&self, event: &str) -> usize {
        self.inner
            .borrow()
            .buckets
            .get(event)
            .map_or(0, Vec::len)
    }

    // --- input bridging ------------------------------------------------

    /// Translate a key press and dispatch the canonical event.
    pub fn key_down(&self, signal: &KeySignal) {
        self.send(&translate::key_event_name(signal, SignalMode::Down), &[]);
    }

    /// Translate a key release and dispatch the canonical event.
    pub fn key_up(&self, signal: &KeySignal) {
        self.send(&translate::key_event_name(signal, SignalMode::Up), &[]);
    }

    /// Translate a mouse-button press and dispatch the canonical event.
    pub fn button_down(&self, signal: &ButtonSignal) {
        self.send(&translate::button_event_name(signal, SignalMode::Down), &[]);
    }

    /// Translate a mouse-button release and dispatch the canonical event.
    pub fn button_up(&self, signal: &ButtonSignal) {
        self.send(&translate::button_event_name(signal, SignalMode::Up), &[]);
    }

    /// Translate a wheel movement and dispatch the canonical event.
    pub fn wheel(&self, signal: &WheelSignal) {
        self.send(&translate::wheel_event_name(signal), &[]);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entity::EntityAllocator;
    use crate::input::Modifiers;

    fn setup() -> (Messenger, EntityAllocator) {
        (Messenger::new(), EntityAllocator::new())
    }

    fn recording_sink() -> (Rc<RefCell<Vec<Vec<EventValue>>>>, Rc<RefCell<Vec<Vec<EventValue>>>>) {
        let sink = Rc::new(RefCell::new(Vec::new()));
        (Rc::clone(&sink), sink)
    }

    #[test]
    fn non_persistent_listener_fires_exactly_once() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);
        let (received, sink) = recording_sink();

        messenger.listen(
            "fire",
            &entity,
            move |_, arguments| sink.borrow_mut().push(arguments.to_vec()),
            vec![EventValue::Int(1)],
            false,
        );

        messenger.send("fire", &[EventValue::Int(2)]);
        messenger.send("fire", &[EventValue::Int(3)]);

        let received = received.borrow();
        assert_eq!(received.len(), 1);
        assert_eq!(received[0], vec![EventValue::Int(1), EventValue::Int(2)]);
        assert_eq!(messenger.listener_count("fire"), 0);
    }

    #[test]
    fn persistent_listener_fires_until_ignored() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);
        let (received, sink) = recording_sink();

        messenger.listen(
            "pulse",
            &entity,
            move |_, arguments| sink.borrow_mut().push(arguments.to_vec()),
            Vec::new(),
            true,
        );

        messenger.send("pulse", &[]);
        messenger.send("pulse", &[]);
        assert_eq!(received.borrow().len(), 2);

        messenger.ignore("pulse", &entity);
        messenger.send("pulse", &[]);
        assert_eq!(received.borrow().len(), 2);
    }

    #[test]
    fn registered_parameters_precede_sent_parameters() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);
        let (received, sink) = recording_sink();

        messenger.listen(
            "combine",
            &entity,
            move |_, arguments| sink.borrow_mut().push(arguments.to_vec()),
            vec![EventValue::Str("bound".to_string()), EventValue::Bool(true)],
            true,
        );

        messenger.send("combine", &[EventValue::Float(0.5)]);

        assert_eq!(
            received.borrow()[0],
            vec![
                EventValue::Str("bound".to_string()),
                EventValue::Bool(true),
                EventValue::Float(0.5),
            ]
        );
    }

    #[test]
    fn second_listen_overwrites_the_slot() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);
        let (received, sink) = recording_sink();

        messenger.listen("swap", &entity, |_, _| {}, Vec::new(), true);
        messenger.listen(
            "swap",
            &entity,
            move |_, arguments| sink.borrow_mut().push(arguments.to_vec()),
            vec![EventValue::Int(7)],
            true,
        );

        assert_eq!(messenger.listener_count("swap"), 1);
        messenger.send("swap", &[]);
        assert_eq!(received.borrow()[0], vec![EventValue::Int(7)]);
    }

    #[test]
    fn callback_receives_the_registered_entity() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);
        let expected = entity.id();
        let seen = Rc::new(RefCell::new(None));
        let sink = Rc::clone(&seen);

        messenger.listen(
            "who",
            &entity,
            move |receiver, _| *sink.borrow_mut() = Some(receiver.id()),
            Vec::new(),
            true,
        );
        messenger.send("who", &[]);

        assert_eq!(*seen.borrow(), Some(expected));
    }

    #[test]
    fn ignore_is_idempotent() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);

        messenger.listen("gone", &entity, |_, _| {}, Vec::new(), true);
        messenger.ignore("gone", &entity);
        messenger.ignore("gone", &entity);
        assert_eq!(messenger.listener_count("gone"), 0);

        // ignoring an event that never existed is also fine
        messenger.ignore("never", &entity);
    }

    #[test]
    fn sending_without_listeners_is_a_noop() {
        let (messenger, _) = setup();
        messenger.send("nobody-home", &[EventValue::Int(9)]);
    }

    #[test]
    fn listener_added_mid_dispatch_waits_for_the_next_send() {
        let (messenger, mut ids) = setup();
        let first = Entity::new(&messenger, &mut ids);
        let second = Entity::new(&messenger, &mut ids);
        let calls = Rc::new(RefCell::new(0u32));

        let reentrant = messenger.clone();
        let late_calls = Rc::clone(&calls);
        messenger.listen(
            "chain",
            &first,
            move |_, _| {
                let inner_calls = Rc::clone(&late_calls);
                reentrant.listen(
                    "chain",
                    &second,
                    move |_, _| *inner_calls.borrow_mut() += 1,
                    Vec::new(),
                    true,
                );
            },
            Vec::new(),
            true,
        );

        messenger.send("chain", &[]);
        assert_eq!(*calls.borrow(), 0);

        messenger.send("chain", &[]);
        assert_eq!(*calls.borrow(), 1);
    }

    #[test]
    fn listener_ignored_mid_dispatch_is_skipped() {
        let (messenger, mut ids) = setup();
        let first = Entity::new(&messenger, &mut ids);
        let second = Entity::new(&messenger, &mut ids);
        let second_fired = Rc::new(RefCell::new(false));

        let reentrant = messenger.clone();
        let victim = second.clone();
        messenger.listen(
            "cull",
            &first,
            move |_, _| reentrant.ignore("cull", &victim),
            Vec::new(),
            true,
        );
        let sink = Rc::clone(&second_fired);
        messenger.listen(
            "cull",
            &second,
            move |_, _| *sink.borrow_mut() = true,
            Vec::new(),
            true,
        );

        messenger.send("cull", &[]);
        assert!(!*second_fired.borrow());
        assert_eq!(messenger.listener_count("cull"), 1);
    }

    #[test]
    fn listeners_fire_in_registration_order() {
        let (messenger, mut ids) = setup();
        let order = Rc::new(RefCell::new(Vec::new()));

        for tag in 0..3i64 {
            let entity = Entity::new(&messenger, &mut ids);
            let sink = Rc::clone(&order);
            messenger.listen(
                "ordered",
                &entity,
                move |_, _| sink.borrow_mut().push(tag),
                Vec::new(),
                true,
            );
        }

        messenger.send("ordered", &[]);
        assert_eq!(*order.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn key_signal_bridges_to_canonical_event() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);
        let fired = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&fired);

        messenger.listen(
            "shift-a-down",
            &entity,
            move |_, _| *sink.borrow_mut() += 1,
            Vec::new(),
            true,
        );

        messenger.key_down(&KeySignal {
            code: 65,
            modifiers: Modifiers::SHIFT,
        });
        messenger.key_up(&KeySignal {
            code: 65,
            modifiers: Modifiers::SHIFT,
        });

        assert_eq!(*fired.borrow(), 1);
    }

    #[test]
    fn wheel_signal_bridges_without_mode_suffix() {
        let (messenger, mut ids) = setup();
        let entity = Entity::new(&messenger, &mut ids);
        let fired = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&fired);

        messenger.listen(
            "wheel-up",
            &entity,
            move |_, _| *sink.borrow_mut() += 1,
            Vec::new(),
            true,
        );

        messenger.wheel(&WheelSignal {
            detail: -3,
            modifiers: Modifiers::empty(),
        });

        assert_eq!(*fired.borrow(), 1);
    }
}
