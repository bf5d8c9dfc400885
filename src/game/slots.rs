//! # Builtin Slots
//!
//! The fixed slot vocabulary. Generated pipelines never ship code; every
//! scripted action names one of the builtins here and binds its arguments at
//! generation time. Keeping the vocabulary small and total is what makes
//! arbitrary LLM output safe to wire into the dispatcher.
//!
//! Entity arguments are entity names (the names the generator gave its
//! global entities), resolved through [`World::find_named`] at dispatch
//! time. A missing entity or attribute is a slot failure that surfaces in
//! the dispatch report; it never aborts sibling slots or crashes the turn.

use crate::content::ScriptedAction;
use crate::ecs::{Attributes, Health, Position, SignalPayload, Slot, Tag, World};
use crate::{CompletionState, EntityId, RogueError, RogueResult};
use serde_json::Value;
use std::collections::HashMap;

/// Names of every builtin slot, in no particular order.
pub const BUILTIN_SLOTS: &[&str] = &[
    "set_value",
    "change_value",
    "end_game",
    "move_entity",
    "add_to_map",
    "remove_from_map",
    "add_to_list",
    "decrement_health",
];

/// True when `name` is a builtin slot name.
pub fn is_builtin(name: &str) -> bool {
    BUILTIN_SLOTS.contains(&name)
}

/// Resolves a scripted action into a callable slot.
///
/// Fails with [`RogueError::UnknownSlot`] for names outside the builtin
/// vocabulary; argument problems are deferred to dispatch time so one bad
/// action cannot prevent the rest of a bundle from loading.
pub fn resolve(action: &ScriptedAction) -> RogueResult<Slot> {
    let args = action.args.clone();
    match action.name.as_str() {
        "set_value" => Ok(set_value(args)),
        "change_value" => Ok(change_value(args)),
        "end_game" => Ok(end_game()),
        "move_entity" => Ok(move_entity(args)),
        "add_to_map" => Ok(add_to_map(args)),
        "remove_from_map" => Ok(remove_from_map(args)),
        "add_to_list" => Ok(add_to_list(args)),
        "decrement_health" => Ok(decrement_health()),
        other => Err(RogueError::UnknownSlot(other.to_string())),
    }
}

/// Sets an attribute on the named entity to a fixed value.
pub fn set_value(args: HashMap<String, Value>) -> Slot {
    Slot::new("set_value", move |world, _| {
        let entity = named_entity(world, &args)?;
        let attribute = str_arg(&args, "attribute")?;
        let value = value_arg(&args, "value")?;
        attributes_mut(world, entity)?.0.insert(attribute, value);
        Ok(())
    })
}

/// Adds a signed amount to a numeric attribute on the named entity.
pub fn change_value(args: HashMap<String, Value>) -> Slot {
    Slot::new("change_value", move |world, _| {
        let entity = named_entity(world, &args)?;
        let attribute = str_arg(&args, "attribute")?;
        let amount = value_arg(&args, "amount")?;
        let attributes = attributes_mut(world, entity)?;
        let current = attributes.0.get(&attribute).ok_or_else(|| {
            RogueError::SlotFailed(format!("attribute '{attribute}' is not set"))
        })?;
        let updated = add_numbers(current, &amount).ok_or_else(|| {
            RogueError::SlotFailed(format!("attribute '{attribute}' is not numeric"))
        })?;
        attributes.0.insert(attribute, updated);
        Ok(())
    })
}

/// Ends the game session.
pub fn end_game() -> Slot {
    Slot::new("end_game", |world, _| {
        world.set_completion(CompletionState::Over);
        Ok(())
    })
}

/// Moves the named entity to fixed coordinates, through the sanctioned
/// position path so the spatial tag stays in sync.
pub fn move_entity(args: HashMap<String, Value>) -> Slot {
    Slot::new("move_entity", move |world, _| {
        let entity = named_entity(world, &args)?;
        let x = i64_arg(&args, "x")? as i32;
        let y = i64_arg(&args, "y")? as i32;
        world.set_component(entity, Position::new(x, y))?;
        Ok(())
    })
}

/// Puts the named entity on the map.
pub fn add_to_map(args: HashMap<String, Value>) -> Slot {
    Slot::new("add_to_map", move |world, _| {
        let entity = named_entity(world, &args)?;
        world.add_tag(entity, Tag::OnMap)?;
        Ok(())
    })
}

/// Takes the named entity off the map.
pub fn remove_from_map(args: HashMap<String, Value>) -> Slot {
    Slot::new("remove_from_map", move |world, _| {
        let entity = named_entity(world, &args)?;
        world.remove_tag(entity, &Tag::OnMap);
        Ok(())
    })
}

/// Appends a value to a list attribute on the named entity, creating the
/// list when absent.
pub fn add_to_list(args: HashMap<String, Value>) -> Slot {
    Slot::new("add_to_list", move |world, _| {
        let entity = named_entity(world, &args)?;
        let attribute = str_arg(&args, "attribute")?;
        let value = value_arg(&args, "value")?;
        let attributes = attributes_mut(world, entity)?;
        match attributes.0.entry(attribute.clone()).or_insert_with(|| Value::Array(Vec::new())) {
            Value::Array(list) => {
                list.push(value);
                Ok(())
            }
            _ => Err(RogueError::SlotFailed(format!(
                "attribute '{attribute}' is not a list"
            ))),
        }
    })
}

/// Payload-driven effect: on `ItemUse { target, amount }`, subtracts
/// `amount` from the target's health.
pub fn decrement_health() -> Slot {
    Slot::new("decrement_health", |world, payload| {
        let (target, amount) = match payload {
            SignalPayload::ItemUse { target, amount } => (*target, *amount),
            other => {
                return Err(RogueError::SlotFailed(format!(
                    "decrement_health needs an ItemUse payload, got {}",
                    other.shape()
                )))
            }
        };
        let health = world
            .component_mut::<Health>(target)
            .ok_or_else(|| RogueError::SlotFailed(format!("entity {target} has no health")))?;
        health.current -= amount;
        Ok(())
    })
}

// --- argument helpers ----------------------------------------------------

fn named_entity(world: &World, args: &HashMap<String, Value>) -> RogueResult<EntityId> {
    let name = str_arg(args, "entity")?;
    world
        .find_named(&name)
        .ok_or_else(|| RogueError::SlotFailed(format!("no entity named '{name}'")))
}

fn str_arg(args: &HashMap<String, Value>, key: &str) -> RogueResult<String> {
    match args.get(key) {
        Some(Value::String(value)) => Ok(value.clone()),
        Some(other) => Err(RogueError::SlotFailed(format!(
            "argument '{key}' should be a string, got {other}"
        ))),
        None => Err(RogueError::SlotFailed(format!("missing argument '{key}'"))),
    }
}

fn i64_arg(args: &HashMap<String, Value>, key: &str) -> RogueResult<i64> {
    args.get(key)
        .and_then(Value::as_i64)
        .ok_or_else(|| RogueError::SlotFailed(format!("argument '{key}' should be an integer")))
}

fn value_arg(args: &HashMap<String, Value>, key: &str) -> RogueResult<Value> {
    args.get(key)
        .cloned()
        .ok_or_else(|| RogueError::SlotFailed(format!("missing argument '{key}'")))
}

fn attributes_mut<'a>(world: &'a mut World, entity: EntityId) -> RogueResult<&'a mut Attributes> {
    if world.component::<Attributes>(entity).is_none() {
        world.set_component(entity, Attributes::default())?;
    }
    world
        .component_mut::<Attributes>(entity)
        .ok_or(RogueError::UnknownEntity(entity))
}

/// Integer addition when both sides are integers, float addition otherwise.
fn add_numbers(current: &Value, amount: &Value) -> Option<Value> {
    if let (Some(a), Some(b)) = (current.as_i64(), amount.as_i64()) {
        return Some(Value::from(a + b));
    }
    match (current.as_f64(), amount.as_f64()) {
        (Some(a), Some(b)) => Some(Value::from(a + b)),
        _ => None,
    }
}
