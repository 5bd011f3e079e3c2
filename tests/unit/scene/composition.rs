use super::*;
use crate::foundation::core::SourceKind;
use crate::scene::load::EffectsOnLoad;
use serde_json::json;

fn ids(v: &[&str]) -> Vec<SourceId> {
    v.iter().map(|s| (*s).to_owned()).collect()
}

fn timestamps(scene: &Scene) -> Vec<f64> {
    scene.shots().iter().filter_map(Shot::timestamp).collect()
}

#[test]
fn new_scene_defaults() {
    let scene = Scene::new();
    assert!(scene.id().is_none());
    assert!(scene.name().starts_with("AUTO "));
    assert_eq!(scene.scene_range(), DEFAULT_SCENE_RANGE);
    assert_eq!(scene.view_range(), DEFAULT_SCENE_RANGE);
    assert_eq!(scene.aspect_ratio(), AspectRatio::new(16, 9));
    assert_eq!(scene.shot_count(), 0);
    assert!(scene.preroll().is_none());
    assert!(scene.postroll().is_none());
}

#[test]
fn add_shot_keeps_timeline_sorted() {
    let mut scene = Scene::new();
    for t in [30.0, 10.0, 50.0, 10.0, 0.0, 40.0] {
        scene.add_shot(Some(t), vec![], vec![]);
    }
    let ts = timestamps(&scene);
    assert!(ts.windows(2).all(|w| w[0] <= w[1]), "{ts:?}");
    assert_eq!(ts.len(), 6);
}

#[test]
fn add_shot_returns_the_inserted_shot() {
    let mut scene = Scene::new();
    scene.add_shot(Some(10.0), ids(&["first"]), vec![]);
    scene.add_shot(Some(30.0), ids(&["last"]), vec![]);

    let shot = scene.add_shot(Some(20.0), ids(&["mid"]), vec![]);
    shot.set_video_effects(0, 0.4, 0.0);
    shot.set_layout("pip");

    let mid = scene.shot(1).unwrap();
    assert_eq!(mid.video_sources(), ["mid"]);
    assert_eq!(mid.layout(), "pip");
    assert!(mid.video_effect(0).is_some());

    let v = scene.to_json().unwrap();
    assert_eq!(v["Shots"][1]["Sources"]["Video"][0]["Effects"]["Brightness"], 0.4);
}

#[test]
fn add_shot_with_equal_timestamp_returns_newest() {
    let mut scene = Scene::new();
    scene.add_shot(Some(5.0), ids(&["old"]), vec![]);
    let shot = scene.add_shot(Some(5.0), ids(&["new"]), vec![]);
    assert_eq!(shot.video_sources(), ["new"]);
    assert_eq!(scene.shot(0).unwrap().video_sources(), ["old"]);
}

#[test]
fn add_shot_without_timestamp_uses_scene_begin() {
    let mut scene = Scene::new();
    scene.set_scene_range((100.0, 200.0));
    let shot = scene.add_shot(None, vec![], vec![]);
    assert_eq!(shot.timestamp(), Some(100.0));
}

#[test]
fn shot_index_out_of_range() {
    let mut scene = Scene::new();
    scene.add_shot(Some(1.0), vec![], vec![]);
    assert!(scene.shot(0).is_ok());
    let err = scene.shot(1).unwrap_err();
    assert!(matches!(err, AvStudioError::Index { index: 1, len: 1 }));
    assert!(scene.shot_mut(7).is_err());
    assert!(scene.remove_shot(1).is_err());
}

#[test]
fn scene_range_derives_view_range_one_way() {
    let mut scene = Scene::new();
    scene.set_scene_range((100.0, 200.0));
    assert_eq!(scene.view_range(), TimeRange::new(90.0, 210.0));

    scene.set_view_range((0.0, 0.0));
    assert_eq!(scene.view_range(), TimeRange::new(0.0, 0.0));
    assert_eq!(scene.scene_range(), TimeRange::new(100.0, 200.0));

    // Setting the scene range again clobbers the explicit view range.
    scene.set_scene_range((100.0, 200.0));
    assert_eq!(scene.view_range(), TimeRange::new(90.0, 210.0));
}

#[test]
fn end_to_end_example() {
    let mut scene = Scene::new();
    scene.add_shot(Some(50.0), ids(&["v1"]), ids(&["a1"]));
    scene.add_shot(Some(10.0), ids(&["v2"]), vec![]);
    assert_eq!(timestamps(&scene), [10.0, 50.0]);

    let v = scene.to_json().unwrap();
    let mut sources: Vec<(String, String)> = v["Sources"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| {
            assert_eq!(s["TimeOffset"], 0);
            assert_eq!(s["Position"], "");
            (
                s["SourceID"].as_str().unwrap().to_owned(),
                s["SourceType"].as_str().unwrap().to_owned(),
            )
        })
        .collect();
    sources.sort();
    assert_eq!(
        sources,
        [
            ("a1".to_owned(), "audio".to_owned()),
            ("v1".to_owned(), "video".to_owned()),
            ("v2".to_owned(), "video".to_owned()),
        ]
    );
}

#[test]
fn shared_source_is_listed_once() {
    let mut scene = Scene::new();
    scene.add_shot(Some(1.0), ids(&["A"]), vec![]);
    scene.add_shot(Some(2.0), ids(&["A", "B"]), vec![]);
    let a: Vec<_> = scene
        .sources()
        .into_iter()
        .filter(|s| s.source_id == "A" && s.source_type == SourceKind::Video)
        .collect();
    assert_eq!(a.len(), 1);
}

#[test]
fn to_json_top_level_shape() {
    let mut scene = Scene::new();
    scene.set_name("demo");
    scene.set_scene_range((10.0, 20.0));
    scene.set_preroll(Some("intro".to_owned()));

    let v = scene.to_json().unwrap();
    assert_eq!(v["SceneApiVersion"], "2t");
    assert_eq!(v["SceneID"], serde_json::Value::Null);
    assert_eq!(v["Name"], "demo");
    assert_eq!(v["Preroll"], json!({"ID": "intro"}));
    assert_eq!(v["Postroll"], json!({"ID": ""}));
    assert_eq!(v["Sources"], json!([]));
    assert_eq!(v["SceneRange"], json!({"Begin": 10.0, "End": 20.0}));
    assert_eq!(v["ViewRange"], json!({"Begin": 0.0, "End": 30.0}));
    assert_eq!(v["Shots"], json!([]));
    assert_eq!(v["AspectRatio"], json!({"w": 16, "h": 9}));
}

#[test]
fn round_trip_preserves_everything_but_effects() {
    let mut scene = Scene::new();
    scene.set_id(Some("sc-1".to_owned()));
    scene.set_name("round trip");
    scene.set_scene_range((100.0, 160.0));
    scene.set_view_range((95.0, 170.0));
    scene.set_aspect_ratio(AspectRatio::new(4, 3));
    scene.set_postroll(Some("outro".to_owned()));
    {
        let shot = scene.add_shot(Some(120.0), ids(&["v1", "v2"]), ids(&["a1"]));
        shot.set_video_effects(1, 0.3, 0.1);
        shot.set_background_color("#ffffff");
        shot.set_skipped(true);
    }
    scene
        .add_shot(Some(100.0), ids(&["v3"]), vec![])
        .set_background_image("img", "Backdrop");

    let v = scene.to_json().unwrap();
    let loaded = Scene::from_json(&v).unwrap();

    assert_eq!(loaded.id(), Some("sc-1"));
    assert_eq!(loaded.name(), "round trip");
    assert_eq!(loaded.scene_range(), scene.scene_range());
    assert_eq!(loaded.view_range(), TimeRange::new(95.0, 170.0));
    assert_eq!(loaded.aspect_ratio(), AspectRatio::new(4, 3));
    assert_eq!(loaded.preroll(), None);
    assert_eq!(loaded.postroll(), Some("outro"));
    assert_eq!(loaded.shot_count(), 2);
    for (a, b) in scene.shots().iter().zip(loaded.shots()) {
        assert_eq!(a.timestamp(), b.timestamp());
        assert_eq!(a.layout(), b.layout());
        assert_eq!(a.skipped(), b.skipped());
        assert_eq!(a.video_sources(), b.video_sources());
        assert_eq!(a.audio_sources(), b.audio_sources());
        assert_eq!(a.background(), b.background());
        assert!(b.video_effects().is_empty());
    }

    let strict = Scene::from_json_with(&v, LoadOptions::strict()).unwrap();
    assert_eq!(strict, scene);
}

#[test]
fn version_gate_rejects_other_versions() {
    for version in [json!("1"), json!("2"), json!(null), json!("2T")] {
        let v = json!({
            "SceneApiVersion": version,
            "SceneID": "x",
            "Name": "n",
            "SceneRange": {"Begin": 0, "End": 1},
            "ViewRange": {"Begin": 0, "End": 1}
        });
        let err = Scene::from_json(&v).unwrap_err();
        assert!(matches!(err, AvStudioError::Schema(_)), "{err}");
    }
}

#[test]
fn from_json_rejects_non_object() {
    assert!(matches!(
        Scene::from_json(&json!("scene")).unwrap_err(),
        AvStudioError::Schema(_)
    ));
}

fn minimal() -> serde_json::Value {
    json!({
        "SceneApiVersion": "2t",
        "SceneID": null,
        "Name": "minimal",
        "SceneRange": {"Begin": 100, "End": 200},
        "ViewRange": {"Begin": 0, "End": 500}
    })
}

#[test]
fn from_json_minimal_document_uses_defaults() {
    let scene = Scene::from_json(&minimal()).unwrap();
    assert!(scene.id().is_none());
    assert_eq!(scene.name(), "minimal");
    assert_eq!(scene.aspect_ratio(), AspectRatio::new(16, 9));
    assert_eq!(scene.shot_count(), 0);
    // The payload view range wins over the derived one.
    assert_eq!(scene.view_range(), TimeRange::new(0.0, 500.0));
}

#[test]
fn from_json_requires_ranges_id_and_name() {
    for key in ["SceneRange", "ViewRange", "SceneID", "Name"] {
        let mut v = minimal();
        v.as_object_mut().unwrap().remove(key);
        let err = Scene::from_json(&v).unwrap_err();
        assert!(matches!(err, AvStudioError::Schema(_)), "{key}: {err}");
        assert!(err.to_string().contains(key), "{key}: {err}");
    }
}

#[test]
fn from_json_coerces_aspect_ratio() {
    let mut v = minimal();
    v["AspectRatio"] = json!({"w": "21", "h": 9.0});
    let scene = Scene::from_json(&v).unwrap();
    assert_eq!(scene.aspect_ratio(), AspectRatio::new(21, 9));

    v["AspectRatio"] = json!({"w": "wide", "h": 9});
    let err = Scene::from_json(&v).unwrap_err();
    assert!(matches!(err, AvStudioError::TypeConversion(_)));
}

#[test]
fn negative_aspect_ratio_loads_and_fails_validation() {
    let mut v = minimal();
    v["AspectRatio"] = json!({"w": -16, "h": "9"});
    let scene = Scene::from_json(&v).unwrap();
    assert_eq!(scene.aspect_ratio(), AspectRatio::new(-16, 9));

    let paths: Vec<_> = scene.issues().into_iter().map(|i| i.path).collect();
    assert_eq!(paths, ["$.AspectRatio.w"]);
    assert_eq!(scene.to_json().unwrap()["AspectRatio"], json!({"w": -16, "h": 9}));
}

#[test]
fn empty_roll_ids_clear_the_roll() {
    let mut scene = Scene::new();
    scene.set_preroll(Some(String::new()));
    scene.set_postroll(Some("outro".to_owned()));
    assert_eq!(scene.preroll(), None);

    let back = Scene::from_json(&scene.to_json().unwrap()).unwrap();
    assert_eq!(back.preroll(), scene.preroll());
    assert_eq!(back.postroll(), Some("outro"));

    scene.set_postroll(Some(String::new()));
    assert_eq!(scene.postroll(), None);
}

#[test]
fn to_json_succeeds_for_non_finite_values() {
    let mut scene = Scene::new();
    scene.set_scene_range((f64::NAN, f64::INFINITY));
    scene.add_shot(Some(f64::NAN), ids(&["v1"]), vec![]);
    let v = scene.to_json().unwrap();
    assert_eq!(v["SceneRange"]["Begin"], serde_json::Value::Null);
    assert_eq!(v["Shots"][0]["Time"], serde_json::Value::Null);
    assert!(scene.shots()[0].to_json().is_ok());
}

#[test]
fn from_json_reports_failing_shot_path() {
    let mut v = minimal();
    v["Shots"] = json!([
        {"Sources": {}, "Layout": "single", "Skip": false, "Time": 1},
        {"Sources": {}, "Skip": false, "Time": 2}
    ]);
    let err = Scene::from_json(&v).unwrap_err();
    let msg = err.to_string();
    assert!(msg.contains("$.Shots[1]"), "{msg}");
    assert!(msg.contains("Layout"), "{msg}");
}

#[test]
fn from_json_keeps_payload_order_unless_asked() {
    let mut v = minimal();
    v["Shots"] = json!([
        {"Sources": {}, "Layout": "single", "Skip": false, "Time": 30},
        {"Sources": {}, "Layout": "single", "Skip": false, "Time": 10}
    ]);

    let mut scene = Scene::from_json(&v).unwrap();
    assert_eq!(timestamps(&scene), [30.0, 10.0]);
    scene.resort();
    assert_eq!(timestamps(&scene), [10.0, 30.0]);

    let opts = LoadOptions {
        resort_shots: true,
        effects: EffectsOnLoad::Drop,
    };
    let sorted = Scene::from_json_with(&v, opts).unwrap();
    assert_eq!(timestamps(&sorted), [10.0, 30.0]);
}

#[test]
fn from_json_ignores_payload_sources() {
    let mut v = minimal();
    v["Sources"] = json!([
        {"SourceID": "stale", "TimeOffset": 0, "SourceType": "video", "Position": ""}
    ]);
    let scene = Scene::from_json(&v).unwrap();
    assert!(scene.sources().is_empty());
}

#[test]
fn validate_collects_issues() {
    let mut scene = Scene::new();
    scene.set_aspect_ratio(AspectRatio::new(0, 9));
    let shot = scene.add_shot(Some(1.0), ids(&["v1"]), vec![]);
    shot.set_layout("");
    shot.set_video_effects(2, 1.0, 1.0);

    let issues = scene.issues();
    let paths: Vec<_> = issues.iter().map(|i| i.path.as_str()).collect();
    assert_eq!(
        paths,
        ["$.AspectRatio.w", "$.Shots[0].Layout", "$.Shots[0].Sources"]
    );
    assert!(matches!(
        scene.validate().unwrap_err(),
        AvStudioError::Validation(_)
    ));

    assert!(Scene::new().validate().is_ok());
}

#[test]
fn file_round_trip() {
    let dir = std::path::PathBuf::from("target").join("scene_unit");
    std::fs::create_dir_all(&dir).unwrap();
    let path = dir.join("scene.json");

    let mut scene = Scene::new();
    scene.add_shot(Some(3.0), ids(&["v"]), ids(&["a"]));
    scene.to_path(&path).unwrap();

    let loaded = Scene::from_path(&path, LoadOptions::default()).unwrap();
    assert_eq!(loaded, scene);
}
