//! Template overlay resolution.
//!
//! Turns template entries into text, effect and filter segments on an
//! assembled timeline. Each entry is applied on its own: a failing entry is
//! logged and counted, and the remaining entries still go through.

use dft_models::{
    EffectEntry, FilterEntry, Micros, OverlayEntry, Placement, TemplateTracks, TextEntry,
    TextStyleRangeEntry,
};
use dft_timeline::{
    Color, TextBorder, TextSegment, TextShadow, TextStyle, TextStyleRange, TimeRange, Timeline,
    TimelineResult,
};
use serde::Serialize;
use tracing::{debug, warn};

use crate::metrics;

/// Outcome of applying a set of overlay entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct OverlayReport {
    pub applied: usize,
    pub failed: usize,
    pub failures: Vec<OverlayFailure>,
}

/// One entry that could not be applied.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OverlayFailure {
    pub kind: &'static str,
    pub label: String,
    pub error: String,
}

impl OverlayReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0
    }
}

/// The overlay laid over drafts generated without a template.
pub fn default_overlay() -> TemplateTracks {
    let mut watermark = TextEntry::new("@水印", Placement::full_duration());
    watermark.track_name = Some("watermark_track".into());
    watermark.transform_y = 0.8;
    watermark.font_size = 10.0;
    watermark.font_alpha = 0.8;

    let mut disclaimer = TextEntry::new("故事虚构 请勿模仿", Placement::full_duration());
    disclaimer.track_name = Some("disclaimer_track".into());
    disclaimer.transform_y = 0.85;
    disclaimer.font_size = 6.0;
    disclaimer.font_color = "#CCCCCC".into();

    let mut title = TextEntry::new("通用模板", Placement::full_duration());
    title.track_name = Some("template_track".into());
    title.transform_y = -0.8;
    title.font_size = 8.0;

    let mut hd = FilterEntry::new("高清", Placement::full_duration());
    hd.track_name = Some("filter_hd".into());

    let mut sparkle = EffectEntry::new("星火", Placement::full_duration());
    sparkle.track_name = Some("effect_sparkle".into());

    let mut ripple = EffectEntry::new("波纹扭曲", Placement::full_duration());
    ripple.track_name = Some("effect_ripple".into());

    TemplateTracks {
        texts: vec![watermark, disclaimer, title],
        effects: vec![sparkle, ripple],
        filters: vec![hd],
    }
}

/// Apply every entry of `tracks` to `timeline`, resolving full-duration
/// placements against `total`.
pub fn apply_overlay(timeline: &mut Timeline, tracks: &TemplateTracks, total: Micros) -> OverlayReport {
    let total_secs = total.as_secs_f64();
    let mut report = OverlayReport::default();

    // Unnamed entries each get their own track so full-duration siblings
    // never collide.
    let mut counters = [0usize; 3];

    for entry in tracks.entries() {
        let slot = match &entry {
            OverlayEntry::Text(_) => 0,
            OverlayEntry::Effect(_) => 1,
            OverlayEntry::Filter(_) => 2,
        };
        counters[slot] += 1;
        let fallback_track = format!("{}_{}", entry.kind(), counters[slot]);

        match apply_entry(timeline, &entry, total_secs, &fallback_track) {
            Ok(()) => {
                report.applied += 1;
                debug!(kind = entry.kind(), label = %entry.label(), "Applied overlay entry");
            }
            Err(e) => {
                warn!(
                    kind = entry.kind(),
                    label = %entry.label(),
                    error = %e,
                    "Skipping overlay entry"
                );
                metrics::record_overlay_failure(entry.kind());
                report.failed += 1;
                report.failures.push(OverlayFailure {
                    kind: entry.kind(),
                    label: entry.label().to_string(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}

pub(crate) fn apply_entry(
    timeline: &mut Timeline,
    entry: &OverlayEntry,
    total_secs: f64,
    fallback_track: &str,
) -> TimelineResult<()> {
    let (start, end) = entry.placement().resolve(total_secs);
    let range = TimeRange::from_secs(start, end)?;

    match entry {
        OverlayEntry::Text(text) => {
            let segment = text_segment(text, range)?;
            let track = text.track_name.as_deref().unwrap_or(fallback_track);
            timeline.add_text(segment, Some(track))
        }
        OverlayEntry::Effect(effect) => {
            let track = effect.track_name.as_deref().unwrap_or(fallback_track);
            timeline.add_effect(&effect.effect_type, range, &effect.params, Some(track))
        }
        OverlayEntry::Filter(filter) => {
            let track = filter.track_name.as_deref().unwrap_or(fallback_track);
            timeline.add_filter(&filter.effect_type, range, filter.intensity, Some(track))
        }
    }
}

pub(crate) fn text_segment(entry: &TextEntry, range: TimeRange) -> TimelineResult<TextSegment> {
    let style = TextStyle {
        size: entry.font_size,
        bold: entry.bold,
        italic: entry.italic,
        underline: entry.underline,
        color: Color::from_hex(&entry.font_color)?,
        alpha: entry.font_alpha,
        align: entry.align,
        vertical: entry.vertical,
        letter_spacing: entry.letter_spacing,
        line_spacing: entry.line_spacing,
    };

    let border = if entry.border_width > 0.0 {
        Some(TextBorder {
            alpha: entry.border_alpha,
            color: Color::from_hex(&entry.border_color)?,
            width: entry.border_width,
        })
    } else {
        None
    };

    let shadow = if entry.shadow_enabled {
        Some(TextShadow {
            alpha: entry.shadow_alpha,
            color: Color::from_hex(&entry.shadow_color)?,
            angle: entry.shadow_angle,
            distance: entry.shadow_distance,
            smoothing: entry.shadow_smoothing,
        })
    } else {
        None
    };

    let mut segment = TextSegment::new(entry.text.clone(), range)
        .with_font(entry.font.clone())
        .with_style(style.clone())
        .with_border(border.clone())
        .with_shadow(shadow)
        .with_transform(entry.transform_x, entry.transform_y);

    for range_entry in &entry.text_styles {
        let range_style = text_style_range(range_entry, &style, border.as_ref(), entry)?;
        segment.add_range_style(range_style)?;
    }

    Ok(segment)
}

/// Layer a range override over the entry's base style and border.
fn text_style_range(
    range: &TextStyleRangeEntry,
    base: &TextStyle,
    base_border: Option<&TextBorder>,
    entry: &TextEntry,
) -> TimelineResult<TextStyleRange> {
    let mut style = base.clone();
    if let Some(o) = &range.style {
        if let Some(size) = o.size {
            style.size = size;
        }
        if let Some(bold) = o.bold {
            style.bold = bold;
        }
        if let Some(italic) = o.italic {
            style.italic = italic;
        }
        if let Some(underline) = o.underline {
            style.underline = underline;
        }
        if let Some(color) = &o.color {
            style.color = Color::from_hex(color)?;
        }
        if let Some(alpha) = o.alpha {
            style.alpha = alpha;
        }
        if let Some(align) = o.align {
            style.align = align;
        }
        if let Some(vertical) = o.vertical {
            style.vertical = vertical;
        }
        if let Some(spacing) = o.letter_spacing {
            style.letter_spacing = spacing;
        }
        if let Some(spacing) = o.line_spacing {
            style.line_spacing = spacing;
        }
    }

    let border = match &range.border {
        Some(o) => {
            let width = o.width.unwrap_or(entry.border_width);
            if width > 0.0 {
                let color = o.color.as_deref().unwrap_or(&entry.border_color);
                Some(TextBorder {
                    alpha: o.alpha.unwrap_or(entry.border_alpha),
                    color: Color::from_hex(color)?,
                    width,
                })
            } else {
                None
            }
        }
        None => base_border.cloned(),
    };

    Ok(TextStyleRange {
        start: range.start,
        end: range.end,
        style,
        border,
        font: range.font.clone().or_else(|| entry.font.clone()),
    })
}
