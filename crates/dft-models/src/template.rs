//! Overlay templates.
//!
//! A template declares text, effect and filter entries that are laid over
//! an assembled timeline. Placements are in seconds; an entry flagged
//! `is_full_duration` (or with a non-positive end) spans to the end of the
//! timeline, whatever its length turns out to be.

use chrono::Utc;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

/// Template validation error.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum TemplateError {
    #[error("Template name cannot be empty")]
    EmptyName,

    #[error("Text entry {0} has no text")]
    EmptyText(usize),

    #[error("{kind} entry {index} has no effect type")]
    EmptyEffectType { kind: &'static str, index: usize },

    #[error("{kind} entry {index} has an invalid placement")]
    InvalidPlacement { kind: &'static str, index: usize },
}

/// A stored overlay template.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Template {
    pub id: String,
    pub name: String,
    /// Creation time, epoch milliseconds
    #[serde(default)]
    pub created_at: i64,
    /// Last update time, epoch milliseconds
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub tracks: TemplateTracks,
}

/// Partial update applied to an existing template.
#[derive(Debug, Clone, Default, Serialize, Deserialize, JsonSchema)]
pub struct TemplateUpdate {
    pub name: Option<String>,
    pub tracks: Option<TemplateTracks>,
}

impl Template {
    /// Create a new template with a fresh id.
    pub fn new(name: impl Into<String>, tracks: TemplateTracks) -> Self {
        let now = Utc::now().timestamp_millis();
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: now,
            updated_at: now,
            tracks,
        }
    }

    /// Apply a partial update. The id never changes; `updated_at` is bumped.
    pub fn apply_update(&mut self, update: TemplateUpdate) {
        if let Some(name) = update.name {
            self.name = name;
        }
        if let Some(tracks) = update.tracks {
            self.tracks = tracks;
        }
        self.updated_at = Utc::now().timestamp_millis();
    }

    /// Validate the template.
    pub fn validate(&self) -> Result<(), TemplateError> {
        if self.name.trim().is_empty() {
            return Err(TemplateError::EmptyName);
        }
        self.tracks.validate()
    }
}

/// Overlay entries grouped by kind.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TemplateTracks {
    pub texts: Vec<TextEntry>,
    pub effects: Vec<EffectEntry>,
    pub filters: Vec<FilterEntry>,
}

impl TemplateTracks {
    pub fn is_empty(&self) -> bool {
        self.texts.is_empty() && self.effects.is_empty() && self.filters.is_empty()
    }

    pub fn len(&self) -> usize {
        self.texts.len() + self.effects.len() + self.filters.len()
    }

    /// All entries in application order: texts, then effects, then filters.
    pub fn entries(&self) -> Vec<OverlayEntry> {
        self.texts
            .iter()
            .cloned()
            .map(OverlayEntry::Text)
            .chain(self.effects.iter().cloned().map(OverlayEntry::Effect))
            .chain(self.filters.iter().cloned().map(OverlayEntry::Filter))
            .collect()
    }

    pub fn validate(&self) -> Result<(), TemplateError> {
        for (index, text) in self.texts.iter().enumerate() {
            if text.text.trim().is_empty() {
                return Err(TemplateError::EmptyText(index));
            }
            if !text.placement.is_well_formed() {
                return Err(TemplateError::InvalidPlacement { kind: "text", index });
            }
        }
        for (index, effect) in self.effects.iter().enumerate() {
            if effect.effect_type.trim().is_empty() {
                return Err(TemplateError::EmptyEffectType { kind: "effect", index });
            }
            if !effect.placement.is_well_formed() {
                return Err(TemplateError::InvalidPlacement { kind: "effect", index });
            }
        }
        for (index, filter) in self.filters.iter().enumerate() {
            if filter.effect_type.trim().is_empty() {
                return Err(TemplateError::EmptyEffectType { kind: "filter", index });
            }
            if !filter.placement.is_well_formed() {
                return Err(TemplateError::InvalidPlacement { kind: "filter", index });
            }
        }
        Ok(())
    }
}

/// Start/end of an overlay entry, in seconds.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Placement {
    pub start: f64,
    pub end: f64,
    pub is_full_duration: bool,
}

impl Placement {
    /// Placement spanning the whole timeline.
    pub fn full_duration() -> Self {
        Self {
            start: 0.0,
            end: 0.0,
            is_full_duration: true,
        }
    }

    pub fn fixed(start: f64, end: f64) -> Self {
        Self {
            start,
            end,
            is_full_duration: false,
        }
    }

    fn is_well_formed(&self) -> bool {
        self.start.is_finite() && self.end.is_finite()
    }

    /// Resolve to concrete `(start, end)` seconds against the timeline total.
    ///
    /// The end is the total when the entry is flagged full-duration or its
    /// literal end is non-positive; otherwise the literal end is kept as-is.
    pub fn resolve(&self, total_secs: f64) -> (f64, f64) {
        let start = self.start.max(0.0);
        let end = if self.is_full_duration || self.end <= 0.0 {
            total_secs
        } else {
            self.end
        };
        (start, end)
    }
}

/// One entry of a template, tagged by kind.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum OverlayEntry {
    Text(TextEntry),
    Effect(EffectEntry),
    Filter(FilterEntry),
}

impl OverlayEntry {
    pub fn kind(&self) -> &'static str {
        match self {
            OverlayEntry::Text(_) => "text",
            OverlayEntry::Effect(_) => "effect",
            OverlayEntry::Filter(_) => "filter",
        }
    }

    pub fn placement(&self) -> &Placement {
        match self {
            OverlayEntry::Text(t) => &t.placement,
            OverlayEntry::Effect(e) => &e.placement,
            OverlayEntry::Filter(f) => &f.placement,
        }
    }

    /// Short label for logs.
    pub fn label(&self) -> &str {
        match self {
            OverlayEntry::Text(t) => &t.text,
            OverlayEntry::Effect(e) => &e.effect_type,
            OverlayEntry::Filter(f) => &f.effect_type,
        }
    }
}

fn default_font_size() -> f64 {
    8.0
}

fn default_font_color() -> String {
    "#FFFFFF".to_string()
}

fn default_black() -> String {
    "#000000".to_string()
}

fn default_one() -> f64 {
    1.0
}

fn default_align() -> u8 {
    1
}

fn default_shadow_alpha() -> f64 {
    0.9
}

fn default_shadow_angle() -> f64 {
    -45.0
}

fn default_shadow_distance() -> f64 {
    5.0
}

fn default_shadow_smoothing() -> f64 {
    0.15
}

/// A text overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextEntry {
    pub text: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub track_name: Option<String>,
    #[serde(default)]
    pub font: Option<String>,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_color")]
    pub font_color: String,
    #[serde(default = "default_one")]
    pub font_alpha: f64,
    #[serde(default)]
    pub bold: bool,
    #[serde(default)]
    pub italic: bool,
    #[serde(default)]
    pub underline: bool,
    /// 0 = left, 1 = center, 2 = right
    #[serde(default = "default_align")]
    pub align: u8,
    #[serde(default)]
    pub letter_spacing: f64,
    #[serde(default)]
    pub line_spacing: f64,
    #[serde(default)]
    pub vertical: bool,
    #[serde(default)]
    pub transform_x: f64,
    #[serde(default)]
    pub transform_y: f64,

    // Outline, applied only when border_width > 0
    #[serde(default = "default_one")]
    pub border_alpha: f64,
    #[serde(default = "default_black")]
    pub border_color: String,
    #[serde(default)]
    pub border_width: f64,

    // Drop shadow
    #[serde(default)]
    pub shadow_enabled: bool,
    #[serde(default = "default_shadow_alpha")]
    pub shadow_alpha: f64,
    #[serde(default = "default_shadow_angle")]
    pub shadow_angle: f64,
    #[serde(default = "default_black")]
    pub shadow_color: String,
    #[serde(default = "default_shadow_distance")]
    pub shadow_distance: f64,
    #[serde(default = "default_shadow_smoothing")]
    pub shadow_smoothing: f64,

    /// Per-character-range overrides layered over the base style
    #[serde(default)]
    pub text_styles: Vec<TextStyleRangeEntry>,
}

impl TextEntry {
    /// Text entry with default styling.
    pub fn new(text: impl Into<String>, placement: Placement) -> Self {
        Self {
            text: text.into(),
            placement,
            track_name: None,
            font: None,
            font_size: default_font_size(),
            font_color: default_font_color(),
            font_alpha: 1.0,
            bold: false,
            italic: false,
            underline: false,
            align: default_align(),
            letter_spacing: 0.0,
            line_spacing: 0.0,
            vertical: false,
            transform_x: 0.0,
            transform_y: 0.0,
            border_alpha: 1.0,
            border_color: default_black(),
            border_width: 0.0,
            shadow_enabled: false,
            shadow_alpha: default_shadow_alpha(),
            shadow_angle: default_shadow_angle(),
            shadow_color: default_black(),
            shadow_distance: default_shadow_distance(),
            shadow_smoothing: default_shadow_smoothing(),
            text_styles: Vec::new(),
        }
    }
}

/// Style override for a character range of a text entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TextStyleRangeEntry {
    /// First character (inclusive)
    pub start: usize,
    /// Last character (exclusive)
    pub end: usize,
    #[serde(default)]
    pub style: Option<TextStyleOverride>,
    #[serde(default)]
    pub border: Option<BorderOverride>,
    #[serde(default)]
    pub font: Option<String>,
}

/// Optional style fields; unset fields inherit from the entry's base style.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct TextStyleOverride {
    pub size: Option<f64>,
    pub bold: Option<bool>,
    pub italic: Option<bool>,
    pub underline: Option<bool>,
    pub color: Option<String>,
    pub alpha: Option<f64>,
    pub align: Option<u8>,
    pub vertical: Option<bool>,
    pub letter_spacing: Option<f64>,
    pub line_spacing: Option<f64>,
}

/// Optional outline fields for a character range.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct BorderOverride {
    pub alpha: Option<f64>,
    pub color: Option<String>,
    pub width: Option<f64>,
}

/// A scene/character effect overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EffectEntry {
    pub effect_type: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub track_name: Option<String>,
    /// Effect parameters (0-100 each), in the effect's declared order
    #[serde(default)]
    pub params: Vec<f64>,
}

impl EffectEntry {
    pub fn new(effect_type: impl Into<String>, placement: Placement) -> Self {
        Self {
            effect_type: effect_type.into(),
            placement,
            track_name: None,
            params: Vec::new(),
        }
    }
}

/// A filter overlay.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FilterEntry {
    pub effect_type: String,
    #[serde(flatten)]
    pub placement: Placement,
    #[serde(default)]
    pub track_name: Option<String>,
    /// Filter strength (0-100)
    #[serde(default)]
    pub intensity: Option<f64>,
}

impl FilterEntry {
    pub fn new(effect_type: impl Into<String>, placement: Placement) -> Self {
        Self {
            effect_type: effect_type.into(),
            placement,
            track_name: None,
            intensity: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_duration_overrides_literal_end() {
        let placement = Placement {
            start: 0.0,
            end: 2.0,
            is_full_duration: true,
        };
        assert_eq!(placement.resolve(7.5), (0.0, 7.5));
    }

    #[test]
    fn test_non_positive_end_means_full_duration() {
        assert_eq!(Placement::fixed(1.0, 0.0).resolve(7.5), (1.0, 7.5));
        assert_eq!(Placement::fixed(1.0, -3.0).resolve(7.5), (1.0, 7.5));
    }

    #[test]
    fn test_literal_end_kept_as_is() {
        // Literal ends past the total are not clamped.
        assert_eq!(Placement::fixed(0.5, 9.0).resolve(7.5), (0.5, 9.0));
        assert_eq!(Placement::fixed(-1.0, 3.0).resolve(7.5), (0.0, 3.0));
    }

    #[test]
    fn test_template_json_from_editor() {
        let json = r##"{
            "id": "tpl-1",
            "name": "Promo",
            "updated_at": 1700000000000,
            "tracks": {
                "texts": [{"text": "Hello", "start": 0, "end": 5, "is_full_duration": true,
                           "font_size": 8.0, "font_color": "#FFFFFF"}],
                "effects": [{"effect_type": "圣诞星光", "start": 0, "end": 5}],
                "filters": [{"effect_type": "高清", "start": 1, "end": 3, "track_name": "hd"}]
            }
        }"##;

        let template: Template = serde_json::from_str(json).unwrap();
        assert_eq!(template.tracks.len(), 3);
        assert!(template.tracks.texts[0].placement.is_full_duration);
        assert_eq!(template.tracks.texts[0].align, 1);
        assert_eq!(template.tracks.filters[0].track_name.as_deref(), Some("hd"));
        assert_eq!(template.created_at, 0);
        assert!(template.validate().is_ok());

        let kinds: Vec<&str> = template.tracks.entries().iter().map(|e| e.kind()).collect();
        assert_eq!(kinds, vec!["text", "effect", "filter"]);
    }

    #[test]
    fn test_validate_rejects_empty_fields() {
        let mut tracks = TemplateTracks::default();
        tracks.effects.push(EffectEntry::new(" ", Placement::full_duration()));
        let template = Template::new("x", tracks);
        assert_eq!(
            template.validate(),
            Err(TemplateError::EmptyEffectType { kind: "effect", index: 0 })
        );

        let unnamed = Template::new("", TemplateTracks::default());
        assert_eq!(unnamed.validate(), Err(TemplateError::EmptyName));
    }

    #[test]
    fn test_apply_update_keeps_id() {
        let mut template = Template::new("a", TemplateTracks::default());
        let id = template.id.clone();
        template.apply_update(TemplateUpdate {
            name: Some("b".into()),
            tracks: None,
        });
        assert_eq!(template.id, id);
        assert_eq!(template.name, "b");
        assert!(template.updated_at >= template.created_at);
    }
}
