//! # Tag Index
//!
//! Derived markers per entity, kept consistent with component state and
//! queried as sets. Two kinds exist: plain marker tags (`IsPlayer`,
//! `OnMap`, generated categories) and the coordinate-keyed position tag,
//! which mirrors the `Position` component for O(1) "what occupies cell
//! (x, y)" lookups.
//!
//! The position tag is the most error-prone invariant in the engine: it must
//! always equal the entity's current `Position` component. The only
//! sanctioned writers are [`TagIndex::set_position_tag`] and
//! [`TagIndex::clear_position_tag`], and the only code that calls them is
//! [`crate::World`], as part of component mutation.

use crate::ecs::{EntityId, Position};
use crate::{RogueError, RogueResult};
use std::collections::{HashMap, HashSet};

/// Categorical marker attached to an entity.
///
/// Fixed markers cover the categories the engine itself cares about;
/// `Custom` carries category tags invented by generated content.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Tag {
    /// The player-controlled entity
    IsPlayer,
    /// Entities that take turns
    IsActor,
    /// Pickupable items
    IsItem,
    /// Entities currently drawn on the map
    OnMap,
    /// Content-defined category tag
    Custom(String),
}

impl std::fmt::Display for Tag {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Tag::IsPlayer => write!(f, "IsPlayer"),
            Tag::IsActor => write!(f, "IsActor"),
            Tag::IsItem => write!(f, "IsItem"),
            Tag::OnMap => write!(f, "OnMap"),
            Tag::Custom(name) => write!(f, "{name}"),
        }
    }
}

/// Entity ↔ tag associations, including the spatial (position) tag.
///
/// The index is the single authority for tag-based queries: nothing else in
/// the engine stores tag membership.
#[derive(Debug, Default)]
pub struct TagIndex {
    by_tag: HashMap<Tag, HashSet<EntityId>>,
    by_entity: HashMap<EntityId, HashSet<Tag>>,
    at_position: HashMap<Position, HashSet<EntityId>>,
    position_of: HashMap<EntityId, Position>,
}

impl TagIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `tag` to `entity`. Idempotent.
    pub fn add_tag(&mut self, entity: EntityId, tag: Tag) {
        self.by_tag.entry(tag.clone()).or_default().insert(entity);
        self.by_entity.entry(entity).or_default().insert(tag);
    }

    /// Removes `tag` from `entity`. Idempotent.
    pub fn remove_tag(&mut self, entity: EntityId, tag: &Tag) {
        if let Some(members) = self.by_tag.get_mut(tag) {
            members.remove(&entity);
            if members.is_empty() {
                self.by_tag.remove(tag);
            }
        }
        if let Some(tags) = self.by_entity.get_mut(&entity) {
            tags.remove(tag);
            if tags.is_empty() {
                self.by_entity.remove(&entity);
            }
        }
    }

    /// True when `entity` carries `tag`.
    pub fn has_tag(&self, entity: EntityId, tag: &Tag) -> bool {
        self.by_entity
            .get(&entity)
            .is_some_and(|tags| tags.contains(tag))
    }

    /// Tags currently attached to `entity`.
    pub fn tags_of(&self, entity: EntityId) -> HashSet<Tag> {
        self.by_entity.get(&entity).cloned().unwrap_or_default()
    }

    /// Moves `entity`'s coordinate key to `coord`: the prior mapping (if
    /// any) is removed and the new one inserted in one step. This is the
    /// single sanctioned path for position-tag mutation.
    pub fn set_position_tag(&mut self, entity: EntityId, coord: Position) {
        self.clear_position_tag(entity);
        self.at_position.entry(coord).or_default().insert(entity);
        self.position_of.insert(entity, coord);
    }

    /// Removes `entity`'s coordinate key, if present.
    pub fn clear_position_tag(&mut self, entity: EntityId) {
        if let Some(prior) = self.position_of.remove(&entity) {
            if let Some(occupants) = self.at_position.get_mut(&prior) {
                occupants.remove(&entity);
                if occupants.is_empty() {
                    self.at_position.remove(&prior);
                }
            }
        }
    }

    /// The coordinate key currently recorded for `entity`.
    pub fn position_of(&self, entity: EntityId) -> Option<Position> {
        self.position_of.get(&entity).copied()
    }

    /// Entities occupying `coord`. Empty when the cell is vacant.
    pub fn entities_at(&self, coord: Position) -> HashSet<EntityId> {
        self.at_position.get(&coord).cloned().unwrap_or_default()
    }

    /// Entities carrying ALL of `required` (intersection semantics).
    ///
    /// An empty required set is an input error: "match everything" is never
    /// implied silently. Callers that want every entity should ask the
    /// registry, not the tag index.
    pub fn query(&self, required: &[Tag]) -> RogueResult<HashSet<EntityId>> {
        let (first, rest) = match required.split_first() {
            Some(split) => split,
            None => {
                return Err(RogueError::AmbiguousQuery(
                    "tag query requires at least one tag".into(),
                ))
            }
        };
        // Unknown tags are an existence check miss, not a schema error.
        let mut result = match self.by_tag.get(first) {
            Some(members) => members.clone(),
            None => return Ok(HashSet::new()),
        };
        for tag in rest {
            match self.by_tag.get(tag) {
                Some(members) => result.retain(|entity| members.contains(entity)),
                None => return Ok(HashSet::new()),
            }
            if result.is_empty() {
                break;
            }
        }
        Ok(result)
    }

    /// Drops every tag and the coordinate key for `entity`.
    pub fn remove_entity(&mut self, entity: EntityId) {
        if let Some(tags) = self.by_entity.remove(&entity) {
            for tag in tags {
                if let Some(members) = self.by_tag.get_mut(&tag) {
                    members.remove(&entity);
                    if members.is_empty() {
                        self.by_tag.remove(&tag);
                    }
                }
            }
        }
        self.clear_position_tag(entity);
    }
}
