//! Integration test: a complete JSON content bundle, written to disk the way
//! the generation pipeline delivers it, loaded and materialized into a world
//! with its scripted pipelines live.

use airogue::{
    build_world, Attributes, CompletionState, Signal, SignalPayload, Tag, WorldModel,
};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::io::Write;

const BUNDLE: &str = r#"{
    "theme": "drowned observatory",
    "title": "Tidewatch",
    "plot": "Chart the flooded halls before the lens shatters.",
    "mechanics": {
        "mechanics": [
            {"name": "Tide", "description": "Water rises every turn."}
        ]
    },
    "items": {
        "items": [
            {"name": "sextant", "ascii_symbol": "/", "description": "Reads the stars through water."},
            {"name": "air bladder", "ascii_symbol": "o", "description": "One extra breath."}
        ]
    },
    "global_entities": [
        {
            "name": "Game",
            "components": [
                {
                    "name": "main",
                    "attributes": {"time": 0, "tide_level": 1},
                    "pipelines": [
                        {
                            "signal": "tick",
                            "actions": [
                                {"name": "change_value", "args": {"entity": "Game", "attribute": "time", "amount": 1}}
                            ]
                        },
                        {
                            "signal": "lens_shattered",
                            "actions": [
                                {"name": "end_game", "args": {}}
                            ]
                        }
                    ]
                }
            ]
        }
    ]
}"#;

fn load_bundle_from_disk() -> WorldModel {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(BUNDLE.as_bytes()).unwrap();
    let json = std::fs::read_to_string(file.path()).unwrap();
    WorldModel::from_json_str(&json).unwrap()
}

#[test]
fn bundle_materializes_into_a_playable_world() {
    let bundle = load_bundle_from_disk();
    bundle.validate().unwrap();
    let mut rng = StdRng::seed_from_u64(42);
    let world = build_world(&bundle, &mut rng).unwrap();

    assert_eq!(world.query_tags(&[Tag::IsPlayer]).unwrap().len(), 1);
    assert_eq!(
        world.query_tags(&[Tag::IsItem, Tag::OnMap]).unwrap().len(),
        airogue::config::ITEM_SCATTER_COUNT
    );
    let game = world.find_named("Game").unwrap();
    let attributes = world.component::<Attributes>(game).unwrap();
    assert_eq!(attributes.0["tide_level"], serde_json::json!(1));
}

#[test]
fn scripted_tick_pipeline_advances_time_through_dispatch() {
    let bundle = load_bundle_from_disk();
    let mut rng = StdRng::seed_from_u64(42);
    let mut world = build_world(&bundle, &mut rng).unwrap();

    for turn in 1..=3 {
        let report = world
            .fire(Signal::Tick, SignalPayload::Turn { turn })
            .unwrap();
        assert!(report.is_clean());
    }

    let game = world.find_named("Game").unwrap();
    let attributes = world.component::<Attributes>(game).unwrap();
    assert_eq!(attributes.0["time"], serde_json::json!(3));
}

#[test]
fn scripted_end_pipeline_finishes_the_session() {
    let bundle = load_bundle_from_disk();
    let mut rng = StdRng::seed_from_u64(42);
    let mut world = build_world(&bundle, &mut rng).unwrap();
    assert_eq!(world.completion(), CompletionState::Playing);

    let report = world
        .fire(
            Signal::Scripted("lens_shattered".into()),
            SignalPayload::Empty,
        )
        .unwrap();
    assert!(report.is_clean());
    assert_eq!(world.completion(), CompletionState::Over);
}
