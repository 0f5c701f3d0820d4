//! Entity identity and messenger facade
//!
//! An entity is a lightweight identity token. Components are composed
//! around it externally; the entity itself only carries its id and a
//! non-owning handle to the messenger so game code can listen for and
//! send events scoped to itself.

use crate::messenger::{EventValue, Messenger, WeakMessenger};

/// Unique entity identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct EntityId(u64);

impl EntityId {
    /// Raw numeric value of the id.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// Allocates unique, monotonically increasing entity ids.
///
/// Owned by whoever creates entities (normally the [`crate::Engine`]).
/// Building a fresh allocator restarts the sequence, which keeps tests
/// reproducible; there is no process-wide counter.
#[derive(Debug, Default)]
pub struct EntityAllocator {
    next: u64,
}

impl EntityAllocator {
    /// Create an allocator starting at id 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand out the next id.
    pub fn allocate(&mut self) -> EntityId {
        let id = EntityId(self.next);
        self.next += 1;
        id
    }
}

/// A basic game object: identity plus event plumbing.
///
/// Cloning an entity clones the token, not any game state. Discarding all
/// clones does not unregister its listeners; callers that retire an entity
/// should `ignore` the events it was listening for.
#[derive(Debug, Clone)]
pub struct Entity {
    id: EntityId,
    messenger: WeakMessenger,
}

impl Entity {
    /// Create a new entity bound to `messenger`.
    pub fn new(messenger: &Messenger, ids: &mut EntityAllocator) -> Self {
        Self {
            id: ids.allocate(),
            messenger: messenger.downgrade(),
        }
    }

    pub(crate) fn from_parts(id: EntityId, messenger: WeakMessenger) -> Self {
        Self { id, messenger }
    }

    /// The immutable identity assigned at construction.
    pub fn id(&self) -> EntityId {
        self.id
    }

    /// Register a persistent listener with no bound parameters.
    pub fn listen(&self, event: &str, callback: impl Fn(&Entity, &[EventValue]) + 'static) {
        self.listen_with(event, callback, Vec::new(), true);
    }

    /// Register a listener with explicit bound parameters and persistence.
    pub fn listen_with(
        &self,
        event: &str,
        callback: impl Fn(&Entity, &[EventValue]) + 'static,
        parameters: Vec<EventValue>,
        persistent: bool,
    ) {
        match self.messenger.upgrade() {
            Some(messenger) => messenger.listen(event, self, callback, parameters, persistent),
            None => log::warn!(
                "entity {} cannot listen for '{event}': messenger is gone",
                self.id.value()
            ),
        }
    }

    /// Remove this entity's listener for `event`, if any.
    pub fn ignore(&self, event: &str) {
        match self.messenger.upgrade() {
            Some(messenger) => messenger.ignore(event, self),
            None => log::warn!(
                "entity {} cannot ignore '{event}': messenger is gone",
                self.id.value()
            ),
        }
    }

    /// Dispatch `event` to every registered listener.
    pub fn send(&self, event: &str, parameters: &[EventValue]) {
        match self.messenger.upgrade() {
            Some(messenger) => messenger.send(event, parameters),
            None => log::warn!(
                "entity {} cannot send '{event}': messenger is gone",
                self.id.value()
            ),
        }
    }
}
