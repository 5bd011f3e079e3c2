use crate::foundation::core::TimeRange;
use crate::foundation::error::AvStudioError;
use crate::scene::composition::Scene;
use crate::scene::shot::Shot;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum SchemaPathElem {
    Field(&'static str),
    Index(usize),
}

pub(crate) fn format_path(path: &[SchemaPathElem]) -> String {
    let mut s = String::from("$");
    for p in path {
        match *p {
            SchemaPathElem::Field(name) => {
                s.push('.');
                s.push_str(name);
            }
            SchemaPathElem::Index(i) => {
                s.push('[');
                s.push_str(&i.to_string());
                s.push(']');
            }
        }
    }
    s
}

/// Build a [`AvStudioError::Schema`] located at `path`.
pub(crate) fn schema_error_at(
    path: &[SchemaPathElem],
    message: impl fmt::Display,
) -> AvStudioError {
    AvStudioError::schema(format!("{}: {message}", format_path(path)))
}

/// One inconsistency found by [`Scene::validate`], located by JSON path in the wire document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaIssue {
    /// JSON path of the offending value, e.g. `$.Shots[0].Layout`.
    pub path: String,
    /// What is wrong with it.
    pub message: String,
}

impl SchemaIssue {
    fn at(path: &[SchemaPathElem], message: impl Into<String>) -> Self {
        Self {
            path: format_path(path),
            message: message.into(),
        }
    }
}

impl fmt::Display for SchemaIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.path, self.message)
    }
}

pub(crate) fn validate_scene(scene: &Scene) -> Vec<SchemaIssue> {
    let mut issues = Vec::new();

    validate_range(scene.scene_range(), "SceneRange", &mut issues);
    validate_range(scene.view_range(), "ViewRange", &mut issues);

    let ar = scene.aspect_ratio();
    for (field, value) in [("w", ar.w), ("h", ar.h)] {
        if value <= 0 {
            issues.push(SchemaIssue::at(
                &[
                    SchemaPathElem::Field("AspectRatio"),
                    SchemaPathElem::Field(field),
                ],
                format!("aspect ratio component must be > 0, got {value}"),
            ));
        }
    }

    for (name, roll) in [("Preroll", scene.preroll()), ("Postroll", scene.postroll())] {
        if roll.is_some_and(|id| id.trim().is_empty()) {
            issues.push(SchemaIssue::at(
                &[SchemaPathElem::Field(name), SchemaPathElem::Field("ID")],
                "roll id must be non-empty when set",
            ));
        }
    }

    for (i, shot) in scene.shots().iter().enumerate() {
        let path = [SchemaPathElem::Field("Shots"), SchemaPathElem::Index(i)];
        validate_shot(shot, &path, &mut issues);
    }

    issues
}

fn validate_range(r: TimeRange, field: &'static str, issues: &mut Vec<SchemaIssue>) {
    if !r.begin.is_finite() || !r.end.is_finite() {
        issues.push(SchemaIssue::at(
            &[SchemaPathElem::Field(field)],
            "range bounds must be finite",
        ));
    } else if r.begin > r.end {
        issues.push(SchemaIssue::at(
            &[SchemaPathElem::Field(field)],
            format!("Begin ({}) must be <= End ({})", r.begin, r.end),
        ));
    }
}

fn validate_shot(shot: &Shot, path: &[SchemaPathElem], issues: &mut Vec<SchemaIssue>) {
    let mut at = |field: &'static str, message: String| {
        let mut p = path.to_vec();
        p.push(SchemaPathElem::Field(field));
        issues.push(SchemaIssue::at(&p, message));
    };

    match shot.timestamp() {
        None => at("Time", "shot timestamp is not set".to_owned()),
        Some(t) if !t.is_finite() => at("Time", "shot timestamp must be finite".to_owned()),
        Some(_) => {}
    }

    if shot.layout().trim().is_empty() {
        at("Layout", "layout must be non-empty".to_owned());
    }

    let n = shot.video_sources().len();
    for &pos in shot.video_effects().keys() {
        if pos >= n {
            at(
                "Sources",
                format!("video effect at position {pos} has no video source (shot has {n})"),
            );
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/schema/validate.rs"]
mod tests;
