//! # Signals and Slots
//!
//! The typed event bus that lets generated content define reactive behavior
//! without hard-coded game logic. A signal is a named event channel; a slot
//! is a handler subscribed to one channel. Firing a signal invokes every
//! subscribed slot synchronously, in registration order.
//!
//! Signal kinds form a closed enumeration with a fixed payload shape per
//! kind, so a fired event can never silently reach a slot expecting a
//! different shape. Content-defined behavior events (an item's `on_use`
//! effect, say) ride the `Scripted` variant.
//!
//! The [`Dispatcher`] here owns only the subscription table. The dispatch
//! loop itself lives in [`crate::World::fire`], because slots mutate the
//! world they are part of.

use crate::ecs::{EntityId, Position, World};
use crate::RogueResult;
use serde_json::Value;
use std::collections::HashMap;
use std::rc::Rc;

/// Event channel identifier.
///
/// Engine-level events have dedicated variants; anything a content bundle
/// invents is carried by name in [`Signal::Scripted`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Signal {
    /// World construction finished; fired exactly once per session
    GameStart,
    /// One game turn elapsed
    Tick,
    /// The input loop translated a keypress into a named action
    KeyPressed,
    /// The player entity changed position
    PlayerMoved,
    /// An item was applied to a target
    ItemUsed,
    /// Content-defined behavior event, identified by name
    Scripted(String),
}

impl Signal {
    /// Maps a content-bundle signal name to a signal, falling back to
    /// `Scripted` for names the engine does not know.
    pub fn from_name(name: &str) -> Signal {
        match name {
            "game_start" => Signal::GameStart,
            "tick" => Signal::Tick,
            "key_pressed" => Signal::KeyPressed,
            "player_moved" => Signal::PlayerMoved,
            "item_used" => Signal::ItemUsed,
            other => Signal::Scripted(other.to_string()),
        }
    }

    /// True when `payload` has the shape this signal carries.
    pub fn accepts(&self, payload: &SignalPayload) -> bool {
        match self {
            Signal::GameStart => matches!(payload, SignalPayload::Empty),
            Signal::Tick => matches!(payload, SignalPayload::Turn { .. }),
            Signal::KeyPressed => matches!(payload, SignalPayload::Key { .. }),
            Signal::PlayerMoved => matches!(payload, SignalPayload::Movement { .. }),
            Signal::ItemUsed => matches!(payload, SignalPayload::ItemUse { .. }),
            // Scripted events carry whatever the content attached, or nothing.
            Signal::Scripted(_) => {
                matches!(payload, SignalPayload::Empty | SignalPayload::Value { .. })
            }
        }
    }
}

impl std::fmt::Display for Signal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Signal::GameStart => write!(f, "game_start"),
            Signal::Tick => write!(f, "tick"),
            Signal::KeyPressed => write!(f, "key_pressed"),
            Signal::PlayerMoved => write!(f, "player_moved"),
            Signal::ItemUsed => write!(f, "item_used"),
            Signal::Scripted(name) => write!(f, "{name}"),
        }
    }
}

/// Event data passed to every slot of a fire, one shape per signal kind.
#[derive(Debug, Clone, PartialEq)]
pub enum SignalPayload {
    /// No event data
    Empty,
    /// Turn counter for `Tick`
    Turn { turn: u64 },
    /// Named input action for `KeyPressed`
    Key { action: String },
    /// Movement record for `PlayerMoved`
    Movement {
        entity: EntityId,
        from: Option<Position>,
        to: Position,
    },
    /// Application of an effect to a target for `ItemUsed`
    ItemUse { target: EntityId, amount: i64 },
    /// Free-form data for `Scripted` events
    Value {
        entity: Option<EntityId>,
        data: Value,
    },
}

impl SignalPayload {
    /// Short shape name used in mismatch errors.
    pub fn shape(&self) -> &'static str {
        match self {
            SignalPayload::Empty => "Empty",
            SignalPayload::Turn { .. } => "Turn",
            SignalPayload::Key { .. } => "Key",
            SignalPayload::Movement { .. } => "Movement",
            SignalPayload::ItemUse { .. } => "ItemUse",
            SignalPayload::Value { .. } => "Value",
        }
    }
}

/// Handler function type for slots.
pub type SlotFn = dyn Fn(&mut World, &SignalPayload) -> RogueResult<()>;

/// A named handler subscribed to a signal.
///
/// Slot identity is pointer identity: clones of one `Slot` denote the same
/// registration for `disconnect`, while two slots built from identical code
/// are still distinct. Registering the same slot twice is allowed and makes
/// it run twice per fire.
#[derive(Clone)]
pub struct Slot {
    name: String,
    func: Rc<SlotFn>,
}

impl Slot {
    /// Wraps a handler function under a diagnostic name.
    pub fn new(
        name: impl Into<String>,
        func: impl Fn(&mut World, &SignalPayload) -> RogueResult<()> + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            func: Rc::new(func),
        }
    }

    /// The slot's diagnostic name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Invokes the handler.
    pub fn call(&self, world: &mut World, payload: &SignalPayload) -> RogueResult<()> {
        (self.func)(world, payload)
    }

    /// True when `self` and `other` are handles to the identical
    /// registration target.
    pub fn same_slot(&self, other: &Slot) -> bool {
        Rc::ptr_eq(&self.func, &other.func)
    }
}

impl std::fmt::Debug for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Slot").field("name", &self.name).finish()
    }
}

/// One failed slot invocation inside a fire.
#[derive(Debug, Clone)]
pub struct SlotFailure {
    /// Signal being dispatched
    pub signal: Signal,
    /// Diagnostic name of the failing slot
    pub slot: String,
    /// Position of the slot in the dispatch order
    pub index: usize,
    /// Rendered error message
    pub error: String,
}

/// Aggregate outcome of one `fire`, returned after every slot has run.
#[derive(Debug, Clone)]
pub struct DispatchReport {
    /// Signal that was fired
    pub signal: Signal,
    /// How many slot invocations ran (duplicates counted)
    pub invoked: usize,
    /// Failures collected across the dispatch, in invocation order
    pub failures: Vec<SlotFailure>,
}

impl DispatchReport {
    /// True when every slot succeeded.
    pub fn is_clean(&self) -> bool {
        self.failures.is_empty()
    }
}

/// Subscription table: signal → ordered slot list.
///
/// The table is independent of entity lifetime; destroying an entity does
/// not unregister slots that reference it, so slot bodies guard against
/// stale references and report failure through the dispatch report.
#[derive(Debug, Default)]
pub struct Dispatcher {
    subscribers: HashMap<Signal, Vec<Slot>>,
}

impl Dispatcher {
    /// Creates an empty dispatcher.
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Appends `slot` to the subscriber list for `signal`.
    ///
    /// Duplicate registrations are kept: each one runs once per fire, in
    /// registration order.
    pub fn connect(&mut self, signal: Signal, slot: Slot) {
        self.subscribers.entry(signal).or_default().push(slot);
    }

    /// Removes the first registration matching `slot` (pointer identity),
    /// if any. No-op otherwise.
    pub fn disconnect(&mut self, signal: &Signal, slot: &Slot) {
        if let Some(slots) = self.subscribers.get_mut(signal) {
            if let Some(found) = slots.iter().position(|candidate| candidate.same_slot(slot)) {
                slots.remove(found);
            }
        }
    }

    /// The current subscriber list for `signal`, cloned.
    ///
    /// `World::fire` snapshots through this before invoking anything, so a
    /// slot that connects or disconnects mid-dispatch cannot corrupt the
    /// in-flight iteration.
    pub fn snapshot(&self, signal: &Signal) -> Vec<Slot> {
        self.subscribers.get(signal).cloned().unwrap_or_default()
    }

    /// Number of registrations for `signal` (duplicates counted).
    pub fn subscriber_count(&self, signal: &Signal) -> usize {
        self.subscribers.get(signal).map_or(0, Vec::len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_name_maps_known_and_scripted() {
        assert_eq!(Signal::from_name("tick"), Signal::Tick);
        assert_eq!(Signal::from_name("game_start"), Signal::GameStart);
        assert_eq!(
            Signal::from_name("on_use"),
            Signal::Scripted("on_use".into())
        );
    }

    #[test]
    fn test_payload_shapes() {
        assert!(Signal::Tick.accepts(&SignalPayload::Turn { turn: 1 }));
        assert!(!Signal::Tick.accepts(&SignalPayload::Empty));
        assert!(Signal::GameStart.accepts(&SignalPayload::Empty));
        assert!(Signal::Scripted("on_use".into()).accepts(&SignalPayload::Empty));
        assert!(!Signal::Scripted("on_use".into()).accepts(&SignalPayload::Turn { turn: 0 }));
    }

    #[test]
    fn test_duplicate_connect_kept() {
        let mut dispatcher = Dispatcher::new();
        let slot = Slot::new("noop", |_, _| Ok(()));
        dispatcher.connect(Signal::Tick, slot.clone());
        dispatcher.connect(Signal::Tick, slot.clone());
        assert_eq!(dispatcher.subscriber_count(&Signal::Tick), 2);
    }

    #[test]
    fn test_disconnect_removes_one_registration() {
        let mut dispatcher = Dispatcher::new();
        let slot = Slot::new("noop", |_, _| Ok(()));
        dispatcher.connect(Signal::Tick, slot.clone());
        dispatcher.connect(Signal::Tick, slot.clone());
        dispatcher.disconnect(&Signal::Tick, &slot);
        assert_eq!(dispatcher.subscriber_count(&Signal::Tick), 1);
        // Disconnecting a never-registered slot is a no-op.
        let other = Slot::new("noop", |_, _| Ok(()));
        dispatcher.disconnect(&Signal::Tick, &other);
        assert_eq!(dispatcher.subscriber_count(&Signal::Tick), 1);
    }

    #[test]
    fn test_identity_is_pointer_not_name() {
        let a = Slot::new("same", |_, _| Ok(()));
        let b = Slot::new("same", |_, _| Ok(()));
        assert!(a.same_slot(&a.clone()));
        assert!(!a.same_slot(&b));
    }

    #[test]
    fn test_snapshot_of_unknown_signal_is_empty() {
        let dispatcher = Dispatcher::new();
        assert!(dispatcher.snapshot(&Signal::GameStart).is_empty());
    }
}
