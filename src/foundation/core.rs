use crate::foundation::error::{AvStudioError, AvStudioResult};

/// Opaque id of a video or audio source in the remote asset catalog.
pub type SourceId = String;

/// Opaque id of an asset (pre/post-roll, background image) in the remote catalog.
pub type AssetId = String;

/// Scene id assigned by the service.
pub type SceneId = String;

/// Closed time interval `[begin, end]` on the scene timeline.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct TimeRange {
    /// Range start.
    #[serde(rename = "Begin")]
    pub begin: f64,
    /// Range end.
    #[serde(rename = "End")]
    pub end: f64,
}

impl TimeRange {
    /// Build a range without validation; see [`TimeRange::is_ordered`].
    pub const fn new(begin: f64, end: f64) -> Self {
        Self { begin, end }
    }

    /// Length of the range (`end - begin`).
    pub fn duration(self) -> f64 {
        self.end - self.begin
    }

    /// Return `true` when both bounds are finite and `begin <= end`.
    pub fn is_ordered(self) -> bool {
        self.begin.is_finite() && self.end.is_finite() && self.begin <= self.end
    }

    /// Widen both bounds by `margin`.
    pub fn pad(self, margin: f64) -> Self {
        Self {
            begin: self.begin - margin,
            end: self.end + margin,
        }
    }
}

impl From<(f64, f64)> for TimeRange {
    fn from((begin, end): (f64, f64)) -> Self {
        Self { begin, end }
    }
}

/// Output aspect ratio as integer `w:h`.
///
/// Components are signed so any integral payload loads; [`crate::Scene::validate`] reports
/// components that are not positive.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize)]
pub struct AspectRatio {
    /// Width component.
    pub w: i32,
    /// Height component.
    pub h: i32,
}

impl AspectRatio {
    /// Build an aspect ratio from integer components.
    pub const fn new(w: i32, h: i32) -> Self {
        Self { w, h }
    }

    /// Coerce two textual components to integers.
    ///
    /// Accepts integer text (`"16"`, `"-1"`) and integral decimals (`"16.0"`); anything else,
    /// or a value outside the `i32` range, is a [`AvStudioError::TypeConversion`].
    pub fn parse(w: &str, h: &str) -> AvStudioResult<Self> {
        Ok(Self {
            w: coerce_component("w", &serde_json::Value::from(w))?,
            h: coerce_component("h", &serde_json::Value::from(h))?,
        })
    }

    /// Coerce two JSON values (numbers or numeric strings) to integers.
    pub fn from_json_components(
        w: &serde_json::Value,
        h: &serde_json::Value,
    ) -> AvStudioResult<Self> {
        Ok(Self {
            w: coerce_component("w", w)?,
            h: coerce_component("h", h)?,
        })
    }

    /// Return `true` when both components are strictly positive.
    pub fn is_positive(self) -> bool {
        self.w > 0 && self.h > 0
    }
}

impl Default for AspectRatio {
    fn default() -> Self {
        Self::new(16, 9)
    }
}

fn coerce_component(name: &str, v: &serde_json::Value) -> AvStudioResult<i32> {
    let n = match v {
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                i as f64
            } else {
                n.as_f64().map(f64::trunc).ok_or_else(|| {
                    AvStudioError::type_conversion(format!(
                        "aspect ratio {name}: {n} is not numeric"
                    ))
                })?
            }
        }
        serde_json::Value::String(s) => {
            let t = s.trim();
            if let Ok(i) = t.parse::<i64>() {
                i as f64
            } else {
                match t.parse::<f64>() {
                    Ok(f) if f.is_finite() && f.fract() == 0.0 => f,
                    _ => {
                        return Err(AvStudioError::type_conversion(format!(
                            "aspect ratio {name}: \"{s}\" is not an integer"
                        )));
                    }
                }
            }
        }
        other => {
            return Err(AvStudioError::type_conversion(format!(
                "aspect ratio {name}: expected number or numeric string, got {other}"
            )));
        }
    };

    if !(f64::from(i32::MIN)..=f64::from(i32::MAX)).contains(&n) {
        return Err(AvStudioError::type_conversion(format!(
            "aspect ratio {name}: {n} is out of range"
        )));
    }
    Ok(n as i32)
}

/// Kind of a referenced source.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// Video track.
    Video,
    /// Audio track.
    Audio,
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
