use super::*;
use crate::foundation::core::AspectRatio;

#[test]
fn format_path_fields_and_indices() {
    assert_eq!(format_path(&[]), "$");
    assert_eq!(
        format_path(&[
            SchemaPathElem::Field("Shots"),
            SchemaPathElem::Index(3),
            SchemaPathElem::Field("Time"),
        ]),
        "$.Shots[3].Time"
    );
}

#[test]
fn schema_error_at_prefixes_path() {
    let err = schema_error_at(&[SchemaPathElem::Field("Name")], "missing field");
    assert_eq!(err.to_string(), "schema error: $.Name: missing field");
}

#[test]
fn default_scene_has_no_issues() {
    assert!(validate_scene(&Scene::new()).is_empty());
}

#[test]
fn reversed_and_non_finite_ranges_are_reported() {
    let mut scene = Scene::new();
    scene.set_scene_range((20.0, 10.0));
    scene.set_view_range((f64::NAN, 0.0));
    let issues = validate_scene(&scene);
    assert_eq!(issues.len(), 2);
    assert_eq!(issues[0].path, "$.SceneRange");
    assert!(issues[0].message.contains("must be <="));
    assert_eq!(issues[1].path, "$.ViewRange");
    assert!(issues[1].message.contains("finite"));
}

#[test]
fn empty_roll_id_is_reported() {
    let mut scene = Scene::new();
    scene.set_preroll(Some("  ".to_owned()));
    let issues = validate_scene(&scene);
    assert_eq!(issues.len(), 1);
    assert_eq!(issues[0].to_string(), "$.Preroll.ID: roll id must be non-empty when set");
}

#[test]
fn unplaced_shot_and_zero_height_are_reported() {
    let mut scene = Scene::new();
    scene.set_aspect_ratio(AspectRatio::new(16, 0));
    scene.add_shot(Some(1.0), vec![], vec![]).set_timestamp(None);
    let paths: Vec<_> = validate_scene(&scene)
        .into_iter()
        .map(|i| i.path)
        .collect();
    assert_eq!(paths, ["$.AspectRatio.h", "$.Shots[0].Time"]);
}
