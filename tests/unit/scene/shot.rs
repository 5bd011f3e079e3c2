use super::*;
use crate::scene::load::EffectsOnLoad;
use serde_json::json;

fn ids(v: &[&str]) -> Vec<SourceId> {
    v.iter().map(|s| (*s).to_owned()).collect()
}

#[test]
fn new_shot_defaults() {
    let shot = Shot::new(Some(5.0));
    assert_eq!(shot.timestamp(), Some(5.0));
    assert_eq!(shot.layout(), "single");
    assert!(shot.video_sources().is_empty());
    assert!(shot.audio_sources().is_empty());
    assert!(shot.video_effects().is_empty());
    assert!(shot.background().is_none());
    assert!(!shot.skipped());
}

#[test]
fn shots_do_not_share_source_lists() {
    let mut a = Shot::default();
    let b = Shot::default();
    a.set_video_sources(ids(&["v1"]));
    assert_eq!(a.video_sources(), ["v1"]);
    assert!(b.video_sources().is_empty());
}

#[test]
fn zero_effect_removes_entry() {
    let mut shot = Shot::with_sources(Some(0.0), ids(&["v1", "v2"]), vec![]);
    shot.set_video_effects(1, 0.5, -0.25);
    assert_eq!(
        shot.video_effect(1),
        Some(VideoEffect {
            brightness: 0.5,
            contrast: -0.25
        })
    );

    shot.set_video_effects(1, 0.0, 0.0);
    assert!(shot.video_effects().is_empty());

    // Removing an absent entry is a no-op.
    shot.set_video_effects(0, 0.0, 0.0);
    assert!(shot.video_effects().is_empty());

    let v = shot.to_json().unwrap();
    assert!(v["Sources"]["Video"][1].get("Effects").is_none());
}

#[test]
fn effect_overwrites_previous_value() {
    let mut shot = Shot::with_sources(Some(0.0), ids(&["v1"]), vec![]);
    shot.set_video_effects(0, 1.0, 1.0);
    shot.set_video_effects(0, 0.0, 2.0);
    assert_eq!(shot.video_effect(0).unwrap().brightness, 0.0);
    assert_eq!(shot.video_effect(0).unwrap().contrast, 2.0);
}

#[test]
fn background_is_last_write_wins() {
    let mut shot = Shot::default();
    shot.set_background_image("img-1", "Logo");
    shot.set_background_color("#112233");
    assert_eq!(
        shot.background(),
        Some(&Background::Color {
            color: json!("#112233")
        })
    );
    shot.clear_background();
    assert!(shot.background().is_none());
}

#[test]
fn to_json_matches_wire_shape() {
    let mut shot = Shot::with_sources(Some(12.5), ids(&["v1", "v2"]), ids(&["a1"]));
    shot.set_video_effects(1, 0.2, 0.3);
    shot.set_background_image("img-1", "Logo");
    shot.set_skipped(true);

    let v = shot.to_json().unwrap();
    assert_eq!(
        v,
        json!({
            "Sources": {
                "Audio": [{"ID": "a1"}],
                "Video": [
                    {"ID": "v1"},
                    {"ID": "v2", "Effects": {"Brightness": 0.2, "Contrast": 0.3}}
                ],
                "Background": {"Type": "Image", "Image": {"ID": "img-1", "Name": "Logo"}}
            },
            "Layout": "single",
            "Skip": true,
            "Time": 12.5
        })
    );
}

#[test]
fn to_json_omits_background_when_unset_and_emits_empty_lists() {
    let v = Shot::new(Some(1.0)).to_json().unwrap();
    assert_eq!(v["Sources"], json!({"Audio": [], "Video": []}));
}

#[test]
fn effects_past_the_last_source_are_not_emitted() {
    let mut shot = Shot::with_sources(Some(0.0), ids(&["v1"]), vec![]);
    shot.set_video_effects(3, 1.0, 0.0);
    let v = shot.to_json().unwrap();
    assert_eq!(v["Sources"]["Video"], json!([{"ID": "v1"}]));
}

#[test]
fn from_json_rejects_non_object() {
    let err = Shot::from_json(&json!([1, 2])).unwrap_err();
    assert!(matches!(err, AvStudioError::Schema(_)));
}

#[test]
fn from_json_requires_time_skip_layout() {
    for missing in ["Time", "Skip", "Layout", "Sources"] {
        let mut v = json!({
            "Sources": {"Audio": [], "Video": []},
            "Layout": "single",
            "Skip": false,
            "Time": 1.0
        });
        v.as_object_mut().unwrap().remove(missing);
        let err = Shot::from_json(&v).unwrap_err();
        assert!(
            err.to_string().contains(missing),
            "error for missing {missing}: {err}"
        );
    }
}

#[test]
fn from_json_reads_present_source_lists_only() {
    let v = json!({
        "Sources": {"Video": [{"ID": "v1"}, {"ID": "v2"}]},
        "Layout": "pip",
        "Skip": true,
        "Time": 3
    });
    let shot = Shot::from_json(&v).unwrap();
    assert_eq!(shot.video_sources(), ["v1", "v2"]);
    assert!(shot.audio_sources().is_empty());
    assert_eq!(shot.layout(), "pip");
    assert!(shot.skipped());
    assert_eq!(shot.timestamp(), Some(3.0));
}

#[test]
fn from_json_reads_background_inside_sources_and_legacy_position() {
    let inside = json!({
        "Sources": {"Background": {"Type": "Color", "Color": "#000000"}},
        "Layout": "single", "Skip": false, "Time": 0
    });
    let shot = Shot::from_json(&inside).unwrap();
    assert_eq!(
        shot.background(),
        Some(&Background::Color {
            color: json!("#000000")
        })
    );

    let legacy = json!({
        "Sources": {},
        "Background": {"Type": "Image", "Image": {"ID": "i", "Name": "n"}},
        "Layout": "single", "Skip": false, "Time": 0
    });
    let shot = Shot::from_json(&legacy).unwrap();
    assert!(matches!(shot.background(), Some(Background::Image { .. })));
}

#[test]
fn from_json_rejects_unknown_background_type() {
    let v = json!({
        "Sources": {"Background": {"Type": "Video", "Video": "x"}},
        "Layout": "single", "Skip": false, "Time": 0
    });
    assert!(matches!(
        Shot::from_json(&v).unwrap_err(),
        AvStudioError::Schema(_)
    ));
}

#[test]
fn effects_are_dropped_on_load_by_default() {
    let mut shot = Shot::with_sources(Some(0.0), ids(&["v1", "v2"]), vec![]);
    shot.set_video_effects(0, 0.1, 0.2);
    let v = shot.to_json().unwrap();

    let dropped = Shot::from_json(&v).unwrap();
    assert!(dropped.video_effects().is_empty());

    let opts = LoadOptions {
        effects: EffectsOnLoad::Restore,
        ..LoadOptions::default()
    };
    let restored = Shot::from_json_with(&v, opts).unwrap();
    assert_eq!(restored, shot);
}
