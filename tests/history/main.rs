//! Command history integration tests.
//!
//! Exercises the public history API against the live atlas:
//! - Replay equivalence and the undo/redo round trip over generated scripts
//!   covering every command kind
//! - Cursor truncation
//! - Durable layout and restart through the file-backed store

use std::collections::BTreeMap;

use atlas_editor::{
    Atlas, Change, CommandHistory, CommandKind, District, FileKeyValueStore, HistoryKeys,
    InMemoryKeyValueStore, KeyValueStore, LiveState, Media, MediaType, Period, Province,
};
use proptest::prelude::*;
use serde_json::Value;

const PROVINCE: &str = "p";

fn province(id: &str) -> Province {
    Province {
        id: id.into(),
        name: id.to_uppercase(),
        created_by: "alice".into(),
        version: 1,
        ..Province::default()
    }
}

fn district(id: &str, name: &str) -> District {
    District {
        id: id.into(),
        name: name.into(),
        created_by: "alice".into(),
        version: 1,
        historical_periods: vec![Period::new("1900s", "#aa0000")],
        ..District::default()
    }
}

/// Every province with its districts, keyed by id, versions zeroed.
type Content = BTreeMap<String, (Province, BTreeMap<String, District>)>;

fn content(atlas: &Atlas) -> Content {
    atlas
        .provinces()
        .iter()
        .map(|p| {
            let mut province = p.clone();
            province.version = 0;
            let districts = atlas
                .districts(&p.id)
                .iter()
                .map(|d| {
                    let mut district = d.clone();
                    district.version = 0;
                    (district.id.clone(), district)
                })
                .collect();
            (p.id.clone(), (province, districts))
        })
        .collect()
}

/// Live state rebuilt from scratch by applying the applied prefix.
fn replay<S: KeyValueStore>(history: &CommandHistory<S>) -> Atlas {
    let mut atlas = Atlas::new();
    for command in history.pending() {
        atlas.apply(command);
    }
    atlas
}

fn record<S: KeyValueStore>(history: &mut CommandHistory<S>, atlas: &mut Atlas, change: Change) {
    let command = history.record(change).unwrap();
    atlas.apply(command);
}

fn fresh_history() -> CommandHistory<InMemoryKeyValueStore> {
    CommandHistory::open(InMemoryKeyValueStore::new(), HistoryKeys::default()).unwrap()
}

/// One scripted editor action. Indices pick among the live entities.
#[derive(Debug, Clone)]
enum Op {
    AddProvince,
    UpdateProvince(usize),
    AddDistrict(usize),
    UpdateDistrict(usize),
    UploadMedia(usize),
    UploadMapImage(usize),
    Undo,
    Redo,
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        1 => Just(Op::AddProvince),
        1 => (0..8usize).prop_map(Op::UpdateProvince),
        2 => (0..8usize).prop_map(Op::AddDistrict),
        1 => (0..16usize).prop_map(Op::UpdateDistrict),
        1 => (0..16usize).prop_map(Op::UploadMedia),
        1 => (0..16usize).prop_map(Op::UploadMapImage),
        2 => Just(Op::Undo),
        2 => Just(Op::Redo),
    ]
}

/// Drives a history and its live atlas through a script of ops.
struct Script {
    history: CommandHistory<InMemoryKeyValueStore>,
    atlas: Atlas,
    provinces: usize,
    districts: usize,
}

impl Script {
    fn new() -> Self {
        Script {
            history: fresh_history(),
            atlas: Atlas::new(),
            provinces: 0,
            districts: 0,
        }
    }

    fn live_districts(&self) -> Vec<(String, District)> {
        self.atlas
            .provinces()
            .iter()
            .flat_map(|p| {
                self.atlas
                    .districts(&p.id)
                    .iter()
                    .map(move |d| (p.id.clone(), d.clone()))
            })
            .collect()
    }

    fn pick_district(&self, pick: usize) -> Option<(String, District)> {
        let live = self.live_districts();
        if live.is_empty() {
            return None;
        }
        Some(live[pick % live.len()].clone())
    }

    fn record(&mut self, change: Change) {
        record(&mut self.history, &mut self.atlas, change);
    }

    fn run(&mut self, step: usize, op: &Op) {
        match op {
            Op::AddProvince => {
                self.provinces += 1;
                let id = format!("p{}", self.provinces);
                self.record(Change::AddProvince {
                    new_state: province(&id),
                });
            }
            Op::UpdateProvince(pick) => {
                let live = self.atlas.provinces();
                if live.is_empty() {
                    return;
                }
                let previous = live[pick % live.len()].clone();
                let mut next = previous.clone();
                next.description = format!("step-{}", step);
                next.version += 1;
                self.record(Change::UpdateProvince {
                    new_state: next,
                    previous_state: previous,
                });
            }
            Op::AddDistrict(pick) => {
                let live = self.atlas.provinces();
                if live.is_empty() {
                    return;
                }
                let province_id = live[pick % live.len()].id.clone();
                self.districts += 1;
                let id = format!("d{}", self.districts);
                self.record(Change::AddDistrict {
                    province_id,
                    new_state: district(&id, "new"),
                });
            }
            Op::UpdateDistrict(pick) => {
                let Some((province_id, previous)) = self.pick_district(*pick) else {
                    return;
                };
                let mut next = previous.clone();
                next.name = format!("step-{}", step);
                next.version += 1;
                self.record(Change::UpdateDistrict {
                    province_id,
                    new_state: next,
                    previous_state: previous,
                });
            }
            Op::UploadMedia(pick) => {
                let Some((province_id, previous)) = self.pick_district(*pick) else {
                    return;
                };
                let url = format!(
                    "memory://media/{}/{}/1900s/{}.png",
                    province_id, previous.id, step
                );
                let mut next = previous.clone();
                let Some(period) = next.period_mut("1900s") else {
                    return;
                };
                period.media.push(Media {
                    kind: MediaType::Image,
                    url,
                    description: String::new(),
                });
                next.version += 1;
                self.record(Change::UploadMedia {
                    province_id,
                    era: "1900s".into(),
                    new_state: next,
                    previous_state: previous,
                });
            }
            Op::UploadMapImage(pick) => {
                let Some((province_id, previous)) = self.pick_district(*pick) else {
                    return;
                };
                let mut next = previous.clone();
                next.map_image_url = Some(format!(
                    "memory://maps/{}/{}/{}.png",
                    province_id, next.id, step
                ));
                next.version += 1;
                self.record(Change::UploadMapImage {
                    province_id,
                    new_state: next,
                    previous_state: previous,
                });
            }
            Op::Undo => {
                self.history.undo(&mut self.atlas).unwrap();
            }
            Op::Redo => {
                self.history.redo(&mut self.atlas).unwrap();
            }
        }
    }
}

// ============================================================================
// Laws
// ============================================================================

proptest! {
    /// After any sequence of edits, undos and redos, the live state equals
    /// a fresh replay of the applied prefix, and undoing then redoing the
    /// latest command changes nothing.
    #[test]
    fn live_state_always_equals_replay_of_applied_prefix(
        ops in prop::collection::vec(op(), 1..60)
    ) {
        let mut script = Script::new();

        for (step, op) in ops.iter().enumerate() {
            script.run(step, op);

            prop_assert_eq!(content(&script.atlas), content(&replay(&script.history)));
            prop_assert!(script.history.history_index() >= -1);
            prop_assert!(script.history.history_index() < script.history.len() as i64);

            if script.history.can_undo() {
                let before = content(&script.atlas);
                let index = script.history.history_index();
                script.history.undo(&mut script.atlas).unwrap();
                script.history.redo(&mut script.atlas).unwrap();
                prop_assert_eq!(content(&script.atlas), before);
                prop_assert_eq!(script.history.history_index(), index);
            }
        }
    }
}

#[test]
fn undo_then_redo_leaves_live_state_unchanged_for_every_kind() {
    let mut script = Script::new();
    let ops = [
        Op::AddProvince,
        Op::UpdateProvince(0),
        Op::AddDistrict(0),
        Op::UpdateDistrict(0),
        Op::UploadMedia(0),
        Op::UploadMapImage(0),
    ];
    for (step, op) in ops.iter().enumerate() {
        script.run(step, op);
    }

    let kinds: Vec<CommandKind> = script.history.commands().iter().map(|c| c.kind()).collect();
    assert_eq!(
        kinds,
        vec![
            CommandKind::AddProvince,
            CommandKind::UpdateProvince,
            CommandKind::AddDistrict,
            CommandKind::UpdateDistrict,
            CommandKind::UploadMedia,
            CommandKind::UploadMapImage,
        ]
    );

    let harbor = script.atlas.district("p1", "d1").unwrap();
    assert_eq!(harbor.period("1900s").unwrap().media.len(), 1);
    assert!(harbor.map_image_url.is_some());

    while script.history.can_undo() {
        let before = content(&script.atlas);
        script.history.undo(&mut script.atlas).unwrap();
        script.history.redo(&mut script.atlas).unwrap();
        assert_eq!(content(&script.atlas), before);
        script.history.undo(&mut script.atlas).unwrap();
    }
    assert!(script.atlas.provinces().is_empty());
    assert!(script.atlas.districts("p1").is_empty());
}

#[test]
fn undoing_a_province_creation_drops_its_districts() {
    let mut history = fresh_history();
    let mut atlas = Atlas::new();

    record(
        &mut history,
        &mut atlas,
        Change::AddProvince {
            new_state: province(PROVINCE),
        },
    );
    // A district that reached the live state outside this history.
    atlas.upsert_district(PROVINCE, district("d1", "Harbor"));
    assert_eq!(atlas.districts(PROVINCE).len(), 1);

    history.undo(&mut atlas).unwrap();
    assert!(atlas.province(PROVINCE).is_none());
    assert!(atlas.districts(PROVINCE).is_empty());

    history.redo(&mut atlas).unwrap();
    assert_eq!(atlas.province(PROVINCE).unwrap().name, "P");
    assert!(atlas.districts(PROVINCE).is_empty());
}

#[test]
fn recording_after_undo_truncates() {
    let mut history =
        CommandHistory::open(InMemoryKeyValueStore::new(), HistoryKeys::default()).unwrap();
    let mut atlas = Atlas::new();
    for name in ["A", "B", "C"] {
        record(
            &mut history,
            &mut atlas,
            Change::AddDistrict {
                province_id: PROVINCE.into(),
                new_state: district(name, name),
            },
        );
    }

    history.undo(&mut atlas).unwrap();
    assert_eq!(history.history_index(), 1);
    record(
        &mut history,
        &mut atlas,
        Change::AddDistrict {
            province_id: PROVINCE.into(),
            new_state: district("D", "D"),
        },
    );

    let ids: Vec<&str> = history
        .commands()
        .iter()
        .map(|c| match &c.change {
            Change::AddDistrict { new_state, .. } => new_state.id.as_str(),
            other => panic!("unexpected change: {other:?}"),
        })
        .collect();
    assert_eq!(ids, vec!["A", "B", "D"]);
    assert_eq!(history.history_index(), 2);
    assert!(history.redo(&mut atlas).unwrap().is_none());
}

// ============================================================================
// Durable layout and restart
// ============================================================================

#[test]
fn file_store_survives_restart() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("history.json");

    {
        let mut history =
            CommandHistory::open(FileKeyValueStore::new(&path), HistoryKeys::default()).unwrap();
        let mut atlas = Atlas::new();
        record(
            &mut history,
            &mut atlas,
            Change::AddDistrict {
                province_id: PROVINCE.into(),
                new_state: district("d1", "Harbor"),
            },
        );
        record(
            &mut history,
            &mut atlas,
            Change::UpdateDistrict {
                province_id: PROVINCE.into(),
                new_state: district("d1", "Docks"),
                previous_state: district("d1", "Harbor"),
            },
        );
        history.undo(&mut atlas).unwrap();
    }

    let store = FileKeyValueStore::new(&path);
    assert_eq!(store.get("editorHistoryIndex").unwrap().as_deref(), Some("0"));

    let raw: Value = serde_json::from_str(&store.get("editorHistory").unwrap().unwrap()).unwrap();
    let entries = raw.as_array().unwrap();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0]["kind"], "addDistrict");
    assert_eq!(entries[0]["sequenceId"], 1);
    assert!(entries[0].get("previousState").is_none());
    assert_eq!(entries[1]["kind"], "updateDistrict");
    assert_eq!(entries[1]["previousState"]["name"], "Harbor");
    assert!(entries[1].get("timestamp").is_some());

    let mut history = CommandHistory::open(store, HistoryKeys::default()).unwrap();
    assert_eq!(history.history_index(), 0);
    assert_eq!(history.commands()[1].kind(), CommandKind::UpdateDistrict);

    let mut atlas = replay(&history);
    assert_eq!(atlas.district(PROVINCE, "d1").unwrap().name, "Harbor");
    history.redo(&mut atlas).unwrap();
    assert_eq!(atlas.district(PROVINCE, "d1").unwrap().name, "Docks");

    // New sequence ids continue after the stored ones.
    let command = history
        .record(Change::UpdateDistrict {
            province_id: PROVINCE.into(),
            new_state: district("d1", "Quay"),
            previous_state: district("d1", "Docks"),
        })
        .unwrap();
    assert_eq!(command.sequence_id, 3);
}
