//! # Content Model
//!
//! The structured bundle the LLM generation pipeline produces: theme, title,
//! plot, mechanics, items, and scripted global entities. The pipeline itself
//! (prompt chains, provider calls, output parsing) lives outside this crate;
//! what arrives here is finished JSON, deserialized into these types and
//! validated before any entity is created from it.
//!
//! Scripted behavior is expressed as pipelines: a signal name plus an
//! ordered list of actions, where every action references one of the builtin
//! slots in [`crate::game::slots`]. Generated content never ships code, only
//! data that composes the fixed slot vocabulary.

use crate::{RogueError, RogueResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// One generated item: what it is called, how it is drawn, what it does.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Item {
    pub name: String,
    /// A single ASCII character representing the item on the map
    pub ascii_symbol: String,
    pub description: String,
}

impl std::fmt::Display for Item {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}: {}", self.ascii_symbol, self.name, self.description)
    }
}

/// The generated item list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Items {
    pub items: Vec<Item>,
}

/// One generated game mechanic.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameMechanic {
    pub name: String,
    pub description: String,
}

impl std::fmt::Display for GameMechanic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.name, self.description)
    }
}

/// The ordered mechanic list the items hang off.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameMechanics {
    pub mechanics: Vec<GameMechanic>,
}

/// A reference to a builtin slot plus bound arguments.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScriptedAction {
    /// Builtin slot name (see [`crate::game::slots::BUILTIN_SLOTS`])
    pub name: String,
    /// Arguments bound at generation time
    #[serde(default)]
    pub args: HashMap<String, Value>,
}

/// Generated reactive behavior: when `signal` fires, run `actions` in order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Pipeline {
    /// Signal name, mapped through [`crate::Signal::from_name`]
    pub signal: String,
    pub actions: Vec<ScriptedAction>,
}

/// A named bag of generated state and behavior on an entity.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ComponentModel {
    pub name: String,
    #[serde(default)]
    pub attributes: HashMap<String, Value>,
    #[serde(default)]
    pub pipelines: Vec<Pipeline>,
}

/// A generated global entity (the "Game" entity, NPCs, locations).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityModel {
    pub name: String,
    #[serde(default)]
    pub components: Vec<ComponentModel>,
}

/// The complete content bundle for one generated game.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WorldModel {
    pub theme: String,
    pub title: String,
    pub plot: String,
    #[serde(default)]
    pub mechanics: GameMechanics,
    #[serde(default)]
    pub items: Items,
    #[serde(default)]
    pub global_entities: Vec<EntityModel>,
}

impl WorldModel {
    /// Deserializes a bundle from JSON text.
    pub fn from_json_str(json: &str) -> RogueResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Checks the bundle is materializable: item symbols are single
    /// characters and every scripted action names a known builtin slot.
    pub fn validate(&self) -> RogueResult<()> {
        for item in &self.items.items {
            if item.ascii_symbol.chars().count() != 1 {
                return Err(RogueError::InvalidContent(format!(
                    "item '{}' has symbol '{}', expected a single character",
                    item.name, item.ascii_symbol
                )));
            }
        }
        for entity in &self.global_entities {
            for component in &entity.components {
                for pipeline in &component.pipelines {
                    for action in &pipeline.actions {
                        if !crate::game::slots::is_builtin(&action.name) {
                            return Err(RogueError::InvalidContent(format!(
                                "entity '{}' pipeline '{}' references unknown slot '{}'",
                                entity.name, pipeline.signal, action.name
                            )));
                        }
                    }
                }
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for WorldModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Theme: {}\n", self.theme)?;
        writeln!(f, "Title: {}\n", self.title)?;
        writeln!(f, "Plot: {}\n", self.plot)?;
        writeln!(f, "Game mechanics:")?;
        for mechanic in &self.mechanics.mechanics {
            writeln!(f, "- {mechanic}")?;
        }
        writeln!(f, "Items:")?;
        for item in &self.items.items {
            writeln!(f, "- {item}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_bundle() -> WorldModel {
        WorldModel {
            theme: "clockwork ruins".into(),
            title: "Gears Below".into(),
            plot: "Reach the mainspring before it winds down.".into(),
            mechanics: GameMechanics {
                mechanics: vec![GameMechanic {
                    name: "Winding".into(),
                    description: "Every action costs tension.".into(),
                }],
            },
            items: Items {
                items: vec![Item {
                    name: "brass key".into(),
                    ascii_symbol: "k".into(),
                    description: "Opens one gearbox.".into(),
                }],
            },
            global_entities: vec![],
        }
    }

    #[test]
    fn test_round_trip_json() {
        let bundle = sample_bundle();
        let json = serde_json::to_string(&bundle).unwrap();
        assert_eq!(WorldModel::from_json_str(&json).unwrap(), bundle);
    }

    #[test]
    fn test_missing_optional_sections_default() {
        let bundle =
            WorldModel::from_json_str(r#"{"theme": "t", "title": "i", "plot": "p"}"#).unwrap();
        assert!(bundle.items.items.is_empty());
        assert!(bundle.global_entities.is_empty());
    }

    #[test]
    fn test_validate_rejects_multichar_symbol() {
        let mut bundle = sample_bundle();
        bundle.items.items[0].ascii_symbol = "key".into();
        assert!(matches!(
            bundle.validate(),
            Err(RogueError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_validate_rejects_unknown_slot() {
        let mut bundle = sample_bundle();
        bundle.global_entities.push(EntityModel {
            name: "Game".into(),
            components: vec![ComponentModel {
                name: "main".into(),
                attributes: HashMap::new(),
                pipelines: vec![Pipeline {
                    signal: "tick".into(),
                    actions: vec![ScriptedAction {
                        name: "summon_dragon".into(),
                        args: HashMap::new(),
                    }],
                }],
            }],
        });
        assert!(matches!(
            bundle.validate(),
            Err(RogueError::InvalidContent(_))
        ));
    }

    #[test]
    fn test_display_lists_sections() {
        let rendered = sample_bundle().to_string();
        assert!(rendered.contains("Theme: clockwork ruins"));
        assert!(rendered.contains("- Winding: Every action costs tension."));
        assert!(rendered.contains("- [k] brass key: Opens one gearbox."));
    }
}
