//! Fine-grained reactive signals
//!
//! A small push-based signal graph for derived UI state:
//! - Signals hold a value and a version counter
//! - Effects re-run when a signal they read during their last run changes
//! - Batches defer effects until the outermost batch ends
//!
//! The graph is single-threaded. Each piece of derived page state (active
//! section, pointer pose, "is scrolled") has exactly one writer, the tracker
//! that owns it, and any number of effects reading it.
//!
//! ```
//! use folio_core::reactive::ReactiveGraph;
//! use std::cell::RefCell;
//! use std::rc::Rc;
//!
//! let mut graph = ReactiveGraph::new();
//! let pose = graph.create_signal("front");
//!
//! let seen = Rc::new(RefCell::new(Vec::new()));
//! let sink = seen.clone();
//! graph.create_effect(move |g| sink.borrow_mut().push(g.get(pose).unwrap_or_default()));
//!
//! graph.set(pose, "right");
//! graph.set(pose, "right"); // unchanged, no effect run
//! assert_eq!(*seen.borrow(), vec!["front", "right"]);
//! ```

use slotmap::{new_key_type, SlotMap};
use smallvec::SmallVec;
use std::any::Any;
use std::cell::{Cell, RefCell};
use std::collections::VecDeque;

new_key_type! {
    /// Unique identifier for a signal
    pub struct SignalId;
    /// Unique identifier for an effect
    pub struct EffectId;
}

/// A reactive signal handle (cheap to copy)
#[derive(Debug)]
pub struct Signal<T> {
    id: SignalId,
    _marker: std::marker::PhantomData<T>,
}

impl<T> Clone for Signal<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Signal<T> {}

impl<T> Signal<T> {
    /// Get the signal's internal ID
    pub fn id(&self) -> SignalId {
        self.id
    }
}

/// An effect handle
#[derive(Debug, Clone, Copy)]
pub struct Effect {
    id: EffectId,
}

impl Effect {
    pub fn id(&self) -> EffectId {
        self.id
    }
}

struct SignalNode {
    value: Box<dyn Any>,
    version: u64,
    subscribers: SmallVec<[EffectId; 4]>,
}

type EffectFn = Box<dyn FnMut(&ReactiveGraph)>;

struct EffectNode {
    /// Taken out of the node while the effect runs
    run: Option<EffectFn>,
    dependencies: SmallVec<[SignalId; 4]>,
    dirty: Cell<bool>,
}

/// The reactive graph that owns all signals and effects
pub struct ReactiveGraph {
    signals: SlotMap<SignalId, SignalNode>,
    effects: SlotMap<EffectId, EffectNode>,
    pending_effects: RefCell<VecDeque<EffectId>>,
    batch_depth: Cell<u32>,
    /// Dependencies recorded by the effect currently running
    tracking: RefCell<Option<Vec<SignalId>>>,
}

impl ReactiveGraph {
    pub fn new() -> Self {
        Self {
            signals: SlotMap::with_key(),
            effects: SlotMap::with_key(),
            pending_effects: RefCell::new(VecDeque::new()),
            batch_depth: Cell::new(0),
            tracking: RefCell::new(None),
        }
    }

    // =========================================================================
    // SIGNALS
    // =========================================================================

    /// Create a new signal with an initial value
    pub fn create_signal<T: 'static>(&mut self, initial: T) -> Signal<T> {
        let id = self.signals.insert(SignalNode {
            value: Box::new(initial),
            version: 0,
            subscribers: SmallVec::new(),
        });
        Signal {
            id,
            _marker: std::marker::PhantomData,
        }
    }

    /// Get the current value of a signal
    ///
    /// Inside an effect, the signal is recorded as a dependency.
    pub fn get<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        if let Some(ref mut deps) = *self.tracking.borrow_mut() {
            if !deps.contains(&signal.id) {
                deps.push(signal.id);
            }
        }
        self.get_untracked(signal)
    }

    /// Get the current value without recording a dependency
    pub fn get_untracked<T: Clone + 'static>(&self, signal: Signal<T>) -> Option<T> {
        self.signals
            .get(signal.id)
            .and_then(|node| node.value.downcast_ref::<T>().cloned())
    }

    /// Set the value of a signal
    ///
    /// Setting a value equal to the current one is a no-op. Returns true
    /// when the value changed.
    pub fn set<T: PartialEq + 'static>(&mut self, signal: Signal<T>, value: T) -> bool {
        let Some(node) = self.signals.get_mut(signal.id) else {
            return false;
        };

        if node.value.downcast_ref::<T>() == Some(&value) {
            return false;
        }

        node.value = Box::new(value);
        node.version += 1;

        let subscribers = node.subscribers.clone();
        for effect_id in subscribers {
            self.mark_dirty(effect_id);
        }

        if self.batch_depth.get() == 0 {
            self.flush_effects();
        }
        true
    }

    /// Update a signal using a function of its current value
    pub fn update<T, F>(&mut self, signal: Signal<T>, f: F) -> bool
    where
        T: Clone + PartialEq + 'static,
        F: FnOnce(T) -> T,
    {
        match self.get_untracked(signal) {
            Some(current) => self.set(signal, f(current)),
            None => false,
        }
    }

    /// Version of a signal, incremented on every change
    pub fn signal_version(&self, id: SignalId) -> Option<u64> {
        self.signals.get(id).map(|n| n.version)
    }

    // =========================================================================
    // EFFECTS
    // =========================================================================

    /// Create an effect; it runs once immediately (or at batch end)
    pub fn create_effect<F>(&mut self, run: F) -> Effect
    where
        F: FnMut(&ReactiveGraph) + 'static,
    {
        let id = self.effects.insert(EffectNode {
            run: Some(Box::new(run)),
            dependencies: SmallVec::new(),
            dirty: Cell::new(true),
        });

        self.pending_effects.borrow_mut().push_back(id);
        if self.batch_depth.get() == 0 {
            self.flush_effects();
        }

        Effect { id }
    }

    /// Dispose of an effect, removing its subscriptions
    pub fn dispose_effect(&mut self, effect: Effect) {
        if let Some(node) = self.effects.remove(effect.id) {
            for &dep_id in &node.dependencies {
                if let Some(sig) = self.signals.get_mut(dep_id) {
                    sig.subscribers.retain(|s| *s != effect.id);
                }
            }
        }
    }

    // =========================================================================
    // BATCHING
    // =========================================================================

    pub fn batch_start(&self) {
        self.batch_depth.set(self.batch_depth.get() + 1);
    }

    pub fn batch_end(&mut self) {
        let depth = self.batch_depth.get();
        if depth > 0 {
            self.batch_depth.set(depth - 1);
            if depth == 1 {
                self.flush_effects();
            }
        }
    }

    /// Run a function in a batch context
    pub fn batch<F, R>(&mut self, f: F) -> R
    where
        F: FnOnce(&mut Self) -> R,
    {
        self.batch_start();
        let result = f(self);
        self.batch_end();
        result
    }

    // =========================================================================
    // INTERNAL
    // =========================================================================

    fn mark_dirty(&mut self, id: EffectId) {
        if let Some(node) = self.effects.get(id) {
            if !node.dirty.get() {
                node.dirty.set(true);
                self.pending_effects.borrow_mut().push_back(id);
            }
        }
    }

    fn flush_effects(&mut self) {
        let mut ran = 0usize;
        loop {
            let next = self.pending_effects.borrow_mut().pop_front();
            match next {
                Some(id) => {
                    self.run_effect(id);
                    ran += 1;
                }
                None => break,
            }
        }
        if ran > 0 {
            tracing::trace!(effects = ran, "effects flushed");
        }
    }

    fn run_effect(&mut self, effect_id: EffectId) {
        let mut run = match self.effects.get_mut(effect_id) {
            Some(node) if node.dirty.get() => {
                node.dirty.set(false);
                match node.run.take() {
                    Some(run) => run,
                    None => return,
                }
            }
            _ => return,
        };

        self.tracking.replace(Some(Vec::new()));
        run(self);
        let deps = self.tracking.take().unwrap_or_default();

        let Some(node) = self.effects.get_mut(effect_id) else {
            return;
        };
        node.run = Some(run);

        for &dep_id in &node.dependencies {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                sig.subscribers.retain(|s| *s != effect_id);
            }
        }
        for &dep_id in &deps {
            if let Some(sig) = self.signals.get_mut(dep_id) {
                if !sig.subscribers.contains(&effect_id) {
                    sig.subscribers.push(effect_id);
                }
            }
        }
        node.dependencies = deps.into_iter().collect();
    }

    /// Number of live signals and effects
    pub fn stats(&self) -> (usize, usize) {
        (self.signals.len(), self.effects.len())
    }
}

impl Default for ReactiveGraph {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::rc::Rc;

    #[test]
    fn test_signal_create_get_set() {
        let mut graph = ReactiveGraph::new();

        let count = graph.create_signal(0i32);
        assert_eq!(graph.get(count), Some(0));

        assert!(graph.set(count, 42));
        assert_eq!(graph.get(count), Some(42));
    }

    #[test]
    fn test_set_same_value_is_noop() {
        let mut graph = ReactiveGraph::new();
        let section = graph.create_signal(String::from("about"));

        assert!(!graph.set(section, String::from("about")));
        assert_eq!(graph.signal_version(section.id()), Some(0));

        assert!(graph.set(section, String::from("skills")));
        assert_eq!(graph.signal_version(section.id()), Some(1));
    }

    #[test]
    fn test_signal_update() {
        let mut graph = ReactiveGraph::new();

        let count = graph.create_signal(10i32);
        graph.update(count, |x| x + 5);
        assert_eq!(graph.get(count), Some(15));
    }

    #[test]
    fn test_effect_runs_on_change() {
        let mut graph = ReactiveGraph::new();
        let runs = Rc::new(RefCell::new(Vec::new()));

        let count = graph.create_signal(0i32);
        let sink = runs.clone();
        graph.create_effect(move |g| {
            sink.borrow_mut().push(g.get(count).unwrap_or(-1));
        });

        graph.set(count, 1);
        graph.set(count, 2);

        assert_eq!(*runs.borrow(), vec![0, 1, 2]);
    }

    #[test]
    fn test_effect_ignores_unrelated_signals() {
        let mut graph = ReactiveGraph::new();
        let runs = Rc::new(Cell::new(0));

        let read = graph.create_signal(0i32);
        let unread = graph.create_signal(0i32);
        let counter = runs.clone();
        graph.create_effect(move |g| {
            let _ = g.get(read);
            counter.set(counter.get() + 1);
        });

        graph.set(unread, 5);
        assert_eq!(runs.get(), 1);

        graph.set(read, 5);
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_batch_defers_effects() {
        let mut graph = ReactiveGraph::new();
        let runs = Rc::new(Cell::new(0));

        let a = graph.create_signal(0i32);
        let b = graph.create_signal(0i32);
        let counter = runs.clone();
        graph.create_effect(move |g| {
            let _ = (g.get(a), g.get(b));
            counter.set(counter.get() + 1);
        });
        assert_eq!(runs.get(), 1);

        graph.batch(|g| {
            g.set(a, 1);
            g.set(b, 2);
        });
        assert_eq!(runs.get(), 2);
    }

    #[test]
    fn test_dispose_effect() {
        let mut graph = ReactiveGraph::new();
        let runs = Rc::new(Cell::new(0));

        let count = graph.create_signal(0i32);
        let counter = runs.clone();
        let effect = graph.create_effect(move |g| {
            let _ = g.get(count);
            counter.set(counter.get() + 1);
        });

        graph.dispose_effect(effect);
        graph.set(count, 1);
        assert_eq!(runs.get(), 1);
        assert_eq!(graph.stats(), (1, 0));
    }
}
