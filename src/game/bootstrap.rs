//! # World Bootstrap
//!
//! Turns a finished content bundle into a live [`World`]: the player, one
//! entity per generated global entity (with its attributes merged and its
//! pipelines wired into the dispatcher), and a scatter of generated items on
//! the map. Construction completes before the first game-loop tick runs;
//! the core provides no isolation between concurrent writers.

use crate::content::{Pipeline, WorldModel};
use crate::ecs::{
    Attributes, Description, Gold, Graphic, Name, Position, Signal, SignalPayload, Slot, Tag,
    World,
};
use crate::game::slots;
use crate::{config, RogueError, RogueResult};
use log::{info, warn};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::Rng;

/// Builds a fresh world from `bundle`.
///
/// The bundle is validated first; an invalid bundle (multi-character item
/// symbol, pipeline naming an unknown slot) fails construction outright.
/// Slot failures during the initial `game_start` fire are logged and
/// tolerated, matching the fail-soft dispatch policy.
pub fn build_world(bundle: &WorldModel, rng: &mut StdRng) -> RogueResult<World> {
    bundle.validate()?;
    let mut world = World::new();

    spawn_player(&mut world)?;
    for model in &bundle.global_entities {
        spawn_global_entity(&mut world, model)?;
    }
    scatter_items(&mut world, bundle, rng)?;

    let report = world.fire(Signal::GameStart, SignalPayload::Empty)?;
    if !report.is_clean() {
        for failure in &report.failures {
            warn!(
                "game_start slot '{}' failed: {}",
                failure.slot, failure.error
            );
        }
    }
    info!(
        "world built: {} entities, {} game_start slots",
        world.entity_count(),
        report.invoked
    );
    Ok(world)
}

fn spawn_player(world: &mut World) -> RogueResult<()> {
    let (x, y) = config::PLAYER_START;
    let player = world.spawn();
    world.set_component(player, Position::new(x, y))?;
    world.set_component(player, Graphic::new('@'))?;
    world.set_component(player, Gold(0))?;
    world.add_tag(player, Tag::IsPlayer)?;
    world.add_tag(player, Tag::IsActor)?;
    Ok(())
}

fn spawn_global_entity(world: &mut World, model: &crate::content::EntityModel) -> RogueResult<()> {
    let entity = world.spawn();
    world.set_component(entity, Name(model.name.clone()))?;

    // Attributes from all of the entity's component models are merged into
    // one bag; later components win on duplicate names.
    let mut attributes = Attributes::default();
    for component in &model.components {
        for (key, value) in &component.attributes {
            attributes.0.insert(key.clone(), value.clone());
        }
    }
    world.set_component(entity, attributes)?;

    for component in &model.components {
        for pipeline in &component.pipelines {
            let signal = Signal::from_name(&pipeline.signal);
            let slot = compile_pipeline(&model.name, pipeline)?;
            world.connect(signal, slot);
        }
    }
    Ok(())
}

/// Compiles a pipeline into one composite slot that runs its actions in
/// order, stopping at the first failing action.
fn compile_pipeline(entity_name: &str, pipeline: &Pipeline) -> RogueResult<Slot> {
    let actions: Vec<Slot> = pipeline
        .actions
        .iter()
        .map(slots::resolve)
        .collect::<RogueResult<_>>()?;
    let name = format!("{entity_name}:{}", pipeline.signal);
    Ok(Slot::new(name, move |world, payload| {
        for action in &actions {
            action.call(world, payload)?;
        }
        Ok(())
    }))
}

fn scatter_items(world: &mut World, bundle: &WorldModel, rng: &mut StdRng) -> RogueResult<()> {
    if bundle.items.items.is_empty() {
        return Ok(());
    }
    for _ in 0..config::ITEM_SCATTER_COUNT {
        let model = bundle
            .items
            .items
            .choose(rng)
            .ok_or_else(|| RogueError::InvalidContent("empty item list".into()))?;
        let symbol = model
            .ascii_symbol
            .chars()
            .next()
            .ok_or_else(|| RogueError::InvalidContent("empty item symbol".into()))?;

        let item = world.spawn();
        let position = Position::new(
            rng.gen_range(0..=config::SCATTER_EXTENT),
            rng.gen_range(0..=config::SCATTER_EXTENT),
        );
        world.set_component(item, position)?;
        world.set_component(item, Graphic::with_fg(symbol, (255, 255, 0)))?;
        world.set_component(item, Name(model.name.clone()))?;
        world.set_component(item, Description(model.description.clone()))?;
        world.add_tag(item, Tag::IsItem)?;
        world.add_tag(item, Tag::OnMap)?;
    }
    Ok(())
}
