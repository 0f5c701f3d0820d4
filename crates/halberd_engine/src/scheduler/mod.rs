//! Cooperative frame scheduling
//!
//! The scheduler runs a registered set of tasks once per pass, in
//! insertion order, tracking wall-clock delta time per task. `run` drives
//! pass after pass as fast as the host allows until `terminate` is called;
//! `tick` performs exactly one pass and is the hook for tests and external
//! frame drivers.
//!
//! The scheduler is a cheap-clone handle over single-threaded state. A
//! task callback may call back into the scheduler through a cloned handle
//! (add, remove, suspend, terminate) without corrupting the pass that is
//! executing it: pass membership is snapshotted up front and every task is
//! re-checked at its turn.

use std::cell::RefCell;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::time::{Duration, Instant};

use thiserror::Error;

use crate::foundation::time::Timer;

/// Unique identifier for tasks, monotonic per scheduler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TaskId(u64);

impl TaskId {
    /// Raw numeric value of the id.
    pub fn value(self) -> u64 {
        self.0
    }
}

/// What a task callback tells the scheduler after a tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TaskSignal {
    /// Keep ticking this task every pass.
    #[default]
    Continue,
    /// Remove this task; it is never ticked again.
    Done,
    /// Reserved; currently equivalent to [`TaskSignal::Continue`].
    Again,
}

/// Failure raised by a task callback.
///
/// A failing task is logged and removed; the pass and the frame loop
/// continue unaffected.
#[derive(Debug, Error)]
pub enum TaskError {
    /// Task failed with a message.
    #[error("task failed: {0}")]
    Failed(String),
}

/// View of a task handed to its own callback on every tick.
#[derive(Debug)]
pub struct TaskContext {
    id: TaskId,
    delta: Duration,
    enabled: bool,
}

impl TaskContext {
    /// Id of the task being ticked.
    pub fn id(&self) -> TaskId {
        self.id
    }

    /// Wall-clock time elapsed since this task's previous tick.
    pub fn delta(&self) -> Duration {
        self.delta
    }

    /// Delta time in seconds.
    pub fn delta_secs(&self) -> f32 {
        self.delta.as_secs_f32()
    }

    /// Skip this task on future passes until it is resumed.
    pub fn suspend(&mut self) {
        self.enabled = false;
    }

    /// Undo a [`TaskContext::suspend`] issued earlier in the same tick.
    pub fn resume(&mut self) {
        self.enabled = true;
    }
}

type TaskCallback = Box<dyn FnMut(&mut TaskContext) -> Result<TaskSignal, TaskError>>;

struct Task {
    id: TaskId,
    name: Option<String>,
    // taken out of the slot while the callback runs
    callback: Option<TaskCallback>,
    last_tick: Instant,
    delta: Duration,
    enabled: bool,
}

struct Registry {
    // monotonic ids make BTreeMap iteration equal insertion order
    tasks: BTreeMap<u64, Task>,
    names: HashMap<String, TaskId>,
    next_id: u64,
    terminated: bool,
    timer: Timer,
}

impl Registry {
    fn new() -> Self {
        Self {
            tasks: BTreeMap::new(),
            names: HashMap::new(),
            next_id: 0,
            terminated: false,
            timer: Timer::new(),
        }
    }
}

/// Cheap-clone handle to the frame scheduler.
#[derive(Clone)]
pub struct Scheduler {
    inner: Rc<RefCell<Registry>>,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self::new()
    }
}

impl Scheduler {
    /// Create a scheduler with no tasks.
    pub fn new() -> Self {
        Self {
            inner: Rc::new(RefCell::new(Registry::new())),
        }
    }

    /// Register an unnamed task; it starts ticking on the next pass.
    pub fn add(
        &self,
        callback: impl FnMut(&mut TaskContext) -> Result<TaskSignal, TaskError> + 'static,
    ) -> TaskId {
        self.insert(None, Box::new(callback))
    }

    /// Register a named task.
    ///
    /// A name maps to exactly one live task: re-using a name removes the
    /// previous holder from the scheduler entirely (with a warning) rather
    /// than leaving it orphaned in the id table.
    pub fn add_named(
        &self,
        name: &str,
        callback: impl FnMut(&mut TaskContext) -> Result<TaskSignal, TaskError> + 'static,
    ) -> TaskId {
        self.insert(Some(name.to_string()), Box::new(callback))
    }

    fn insert(&self, name: Option<String>, callback: TaskCallback) -> TaskId {
        let mut registry = self.inner.borrow_mut();
        let id = TaskId(registry.next_id);
        registry.next_id += 1;

        if let Some(name) = &name {
            if let Some(previous) = registry.names.insert(name.clone(), id) {
                log::warn!(
                    "task name '{name}' already in use; removing task {}",
                    previous.value()
                );
                registry.tasks.remove(&previous.value());
            }
        }

        registry.tasks.insert(
            id.value(),
            Task {
                id,
                name,
                callback: Some(callback),
                last_tick: Instant::now(),
                delta: Duration::ZERO,
                enabled: true,
            },
        );
        id
    }

    /// Remove a task. Idempotent; unknown ids are a no-op.
    pub fn remove(&self, id: TaskId) {
        let mut registry = self.inner.borrow_mut();
        if let Some(task) = registry.tasks.remove(&id.value()) {
            if let Some(name) = &task.name {
                // the name table may already point at a replacement task
                if registry.names.get(name) == Some(&id) {
                    registry.names.remove(name);
                }
            }
        }
    }

    /// Stop ticking a task without removing it. Its timing state is left
    /// untouched while disabled.
    pub fn suspend(&self, id: TaskId) {
        if let Some(task) = self.inner.borrow_mut().tasks.get_mut(&id.value()) {
            task.enabled = false;
        }
    }

    /// Resume a suspended task. The next delta is computed from the resume
    /// point, not from the tick before suspension.
    pub fn resume(&self, id: TaskId) {
        if let Some(task) = self.inner.borrow_mut().tasks.get_mut(&id.value()) {
            if !task.enabled {
                task.enabled = true;
                task.last_tick = Instant::now();
            }
        }
    }

    /// Request the frame loop to stop after the pass in flight.
    pub fn terminate(&self) {
        self.inner.borrow_mut().terminated = true;
    }

    /// Whether [`Scheduler::terminate`] has been called.
    pub fn is_terminated(&self) -> bool {
        self.inner.borrow().terminated
    }

    /// Drive the frame loop until terminated.
    ///
    /// Passes run back to back, yielding to the OS scheduler between them;
    /// there is no frame-rate lock. The pass in flight when `terminate` is
    /// called still completes.
    pub fn run(&self) {
        log::info!("scheduler loop started");
        while !self.is_terminated() {
            self.tick();
            std::thread::yield_now();
        }
        log::info!("scheduler loop stopped after {} passes", self.pass_count());
    }

    /// Execute one pass over every enabled task, in insertion order.
    ///
    /// Tasks added during the pass first run on the next pass; tasks
    /// removed or suspended during the pass are skipped when their turn
    /// comes.
    pub fn tick(&self) {
        let ids: Vec<u64> = {
            let registry = self.inner.borrow();
            registry
                .tasks
                .iter()
                .filter(|(_, task)| task.enabled)
                .map(|(id, _)| *id)
                .collect()
        };

        for id in ids {
            let Some((mut callback, mut context)) = self.begin_turn(id) else {
                continue;
            };
            let result = callback(&mut context);
            self.finish_turn(id, callback, &context, result);
        }

        self.inner.borrow_mut().timer.update();
    }

    /// Refresh the task's timing state and check out its callback, leaving
    /// the registry unborrowed while user code runs.
    fn begin_turn(&self, id: u64) -> Option<(TaskCallback, TaskContext)> {
        let mut registry = self.inner.borrow_mut();
        let task = registry.tasks.get_mut(&id)?;
        if !task.enabled {
            return None;
        }
        let now = Instant::now();
        task.delta = now.duration_since(task.last_tick);
        task.last_tick = now;
        let callback = task.callback.take()?;
        let context = TaskContext {
            id: task.id,
            delta: task.delta,
            enabled: true,
        };
        Some((callback, context))
    }

    fn finish_turn(
        &self,
        id: u64,
        callback: TaskCallback,
        context: &TaskContext,
        result: Result<TaskSignal, TaskError>,
    ) {
        {
            let mut registry = self.inner.borrow_mut();
            // the callback may have removed its own task mid-turn
            let Some(task) = registry.tasks.get_mut(&id) else {
                return;
            };
            task.callback = Some(callback);
            if !context.enabled {
                task.enabled = false;
            }
        }

        match result {
            Ok(TaskSignal::Done) => self.remove(TaskId(id)),
            Ok(TaskSignal::Continue | TaskSignal::Again) => {}
            Err(error) => {
                log::error!("task {id} failed and was removed: {error}");
                self.remove(TaskId(id));
            }
        }
    }

    /// Number of registered tasks, enabled or not.
    pub fn len(&self) -> usize {
        self.inner.borrow().tasks.len()
    }

    /// Whether no tasks are registered.
    pub fn is_empty(&self) -> bool {
        self.inner.borrow().tasks.is_empty()
    }

    /// Whether `id` names a live task.
    pub fn contains(&self, id: TaskId) -> bool {
        self.inner.borrow().tasks.contains_key(&id.value())
    }

    /// Look up a live task by name.
    pub fn find_named(&self, name: &str) -> Option<TaskId> {
        self.inner.borrow().names.get(name).copied()
    }

    /// Number of completed passes.
    pub fn pass_count(&self) -> u64 {
        self.inner.borrow().timer.frame_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn visit_log() -> (Rc<RefCell<Vec<TaskId>>>, Rc<RefCell<Vec<TaskId>>>) {
        let log = Rc::new(RefCell::new(Vec::new()));
        (Rc::clone(&log), log)
    }

    fn visitor(
        sink: Rc<RefCell<Vec<TaskId>>>,
    ) -> impl FnMut(&mut TaskContext) -> Result<TaskSignal, TaskError> {
        move |task| {
            sink.borrow_mut().push(task.id());
            Ok(TaskSignal::Continue)
        }
    }

    #[test]
    fn a_pass_visits_exactly_the_enabled_tasks_in_insertion_order() {
        let scheduler = Scheduler::new();
        let (visited, sink) = visit_log();

        let first = scheduler.add(visitor(Rc::clone(&sink)));
        let second = scheduler.add(visitor(Rc::clone(&sink)));
        let third = scheduler.add(visitor(sink));
        scheduler.suspend(second);

        scheduler.tick();
        assert_eq!(*visited.borrow(), vec![first, third]);
    }

    #[test]
    fn done_signal_removes_the_task_after_its_tick() {
        let scheduler = Scheduler::new();
        let ticks = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&ticks);

        let id = scheduler.add(move |_| {
            *sink.borrow_mut() += 1;
            Ok(TaskSignal::Done)
        });

        scheduler.tick();
        assert!(!scheduler.contains(id));

        scheduler.tick();
        assert_eq!(*ticks.borrow(), 1);
    }

    #[test]
    fn again_signal_behaves_as_continue() {
        let scheduler = Scheduler::new();
        let ticks = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&ticks);

        let id = scheduler.add(move |_| {
            *sink.borrow_mut() += 1;
            Ok(TaskSignal::Again)
        });

        scheduler.tick();
        scheduler.tick();
        assert_eq!(*ticks.borrow(), 2);
        assert!(scheduler.contains(id));
    }

    #[test]
    fn suspended_task_is_not_ticked_and_resume_gives_a_fresh_delta() {
        let scheduler = Scheduler::new();
        let deltas = Rc::new(RefCell::new(Vec::new()));
        let sink = Rc::clone(&deltas);

        let id = scheduler.add(move |task| {
            sink.borrow_mut().push(task.delta());
            Ok(TaskSignal::Continue)
        });

        scheduler.tick();
        scheduler.suspend(id);
        std::thread::sleep(Duration::from_millis(40));
        scheduler.tick();
        assert_eq!(deltas.borrow().len(), 1);

        scheduler.resume(id);
        scheduler.tick();
        assert_eq!(deltas.borrow().len(), 2);
        // the 40ms spent suspended must not leak into the resumed delta
        assert!(deltas.borrow()[1] < Duration::from_millis(20));
    }

    #[test]
    fn remove_is_idempotent_for_unknown_ids() {
        let scheduler = Scheduler::new();
        let id = scheduler.add(|_| Ok(TaskSignal::Continue));
        scheduler.remove(id);
        scheduler.remove(id);
        assert!(scheduler.is_empty());
    }

    #[test]
    fn reusing_a_task_name_removes_the_previous_holder() {
        let scheduler = Scheduler::new();
        let first = scheduler.add_named("physics", |_| Ok(TaskSignal::Continue));
        let second = scheduler.add_named("physics", |_| Ok(TaskSignal::Continue));

        assert_eq!(scheduler.len(), 1);
        assert!(!scheduler.contains(first));
        assert!(scheduler.contains(second));
        assert_eq!(scheduler.find_named("physics"), Some(second));
    }

    #[test]
    fn removing_a_named_task_clears_the_name_table() {
        let scheduler = Scheduler::new();
        let id = scheduler.add_named("render", |_| Ok(TaskSignal::Continue));
        scheduler.remove(id);
        assert_eq!(scheduler.find_named("render"), None);
    }

    #[test]
    fn task_added_during_a_pass_runs_from_the_next_pass() {
        let scheduler = Scheduler::new();
        let (visited, sink) = visit_log();

        let handle = scheduler.clone();
        let late_sink = Rc::clone(&sink);
        let spawned = Rc::new(RefCell::new(None));
        let spawned_slot = Rc::clone(&spawned);
        scheduler.add(move |task| {
            sink.borrow_mut().push(task.id());
            if spawned_slot.borrow().is_none() {
                let id = handle.add(visitor(Rc::clone(&late_sink)));
                *spawned_slot.borrow_mut() = Some(id);
            }
            Ok(TaskSignal::Continue)
        });

        scheduler.tick();
        assert_eq!(visited.borrow().len(), 1);

        scheduler.tick();
        assert_eq!(visited.borrow().len(), 3);
    }

    #[test]
    fn task_removed_during_a_pass_is_skipped() {
        let scheduler = Scheduler::new();
        let (visited, sink) = visit_log();

        let handle = scheduler.clone();
        let killer_sink = Rc::clone(&sink);
        let victim_slot: Rc<RefCell<Option<TaskId>>> = Rc::new(RefCell::new(None));
        let victim_for_killer = Rc::clone(&victim_slot);
        scheduler.add(move |task| {
            killer_sink.borrow_mut().push(task.id());
            if let Some(victim) = *victim_for_killer.borrow() {
                handle.remove(victim);
            }
            Ok(TaskSignal::Continue)
        });
        let victim = scheduler.add(visitor(sink));
        *victim_slot.borrow_mut() = Some(victim);

        scheduler.tick();
        assert_eq!(visited.borrow().len(), 1);
        assert!(!scheduler.contains(victim));
    }

    #[test]
    fn failing_task_is_isolated_and_removed() {
        let scheduler = Scheduler::new();
        let (visited, sink) = visit_log();

        let failing = scheduler.add(|_| Err(TaskError::Failed("broken".to_string())));
        let healthy = scheduler.add(visitor(sink));

        scheduler.tick();
        assert!(!scheduler.contains(failing));
        assert!(scheduler.contains(healthy));
        assert_eq!(*visited.borrow(), vec![healthy]);

        scheduler.tick();
        assert_eq!(visited.borrow().len(), 2);
    }

    #[test]
    fn self_suspension_through_the_context_sticks() {
        let scheduler = Scheduler::new();
        let ticks = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&ticks);

        let id = scheduler.add(move |task| {
            *sink.borrow_mut() += 1;
            task.suspend();
            Ok(TaskSignal::Continue)
        });

        scheduler.tick();
        scheduler.tick();
        assert_eq!(*ticks.borrow(), 1);

        scheduler.resume(id);
        scheduler.tick();
        assert_eq!(*ticks.borrow(), 2);
    }

    #[test]
    fn run_completes_the_pass_in_flight_after_terminate() {
        let scheduler = Scheduler::new();
        let handle = scheduler.clone();
        let passes = Rc::new(RefCell::new(0u32));
        let sink = Rc::clone(&passes);

        scheduler.add(move |_| {
            *sink.borrow_mut() += 1;
            if *sink.borrow() == 3 {
                handle.terminate();
            }
            Ok(TaskSignal::Continue)
        });

        scheduler.run();
        assert_eq!(*passes.borrow(), 3);
        assert!(scheduler.is_terminated());
        assert_eq!(scheduler.pass_count(), 3);
    }
}
