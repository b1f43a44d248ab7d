//! Text segments and their styling.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{TimelineError, TimelineResult};
use crate::range::TimeRange;

/// RGB color with components in `0.0..=1.0`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f64,
    pub g: f64,
    pub b: f64,
}

impl Color {
    pub const WHITE: Color = Color {
        r: 1.0,
        g: 1.0,
        b: 1.0,
    };
    pub const BLACK: Color = Color {
        r: 0.0,
        g: 0.0,
        b: 0.0,
    };

    /// Parse `#RRGGBB` (the leading `#` is optional).
    pub fn from_hex(hex: &str) -> TimelineResult<Self> {
        let digits = hex.trim().trim_start_matches('#');
        if digits.len() != 6 || !digits.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(TimelineError::InvalidColor(hex.to_string()));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .map(|v| v as f64 / 255.0)
                .map_err(|_| TimelineError::InvalidColor(hex.to_string()))
        };
        Ok(Self {
            r: channel(0)?,
            g: channel(2)?,
            b: channel(4)?,
        })
    }
}

/// Base character style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyle {
    pub size: f64,
    pub bold: bool,
    pub italic: bool,
    pub underline: bool,
    pub color: Color,
    pub alpha: f64,
    /// 0 = left, 1 = center, 2 = right
    pub align: u8,
    pub vertical: bool,
    pub letter_spacing: f64,
    pub line_spacing: f64,
}

impl Default for TextStyle {
    fn default() -> Self {
        Self {
            size: 8.0,
            bold: false,
            italic: false,
            underline: false,
            color: Color::WHITE,
            alpha: 1.0,
            align: 0,
            vertical: false,
            letter_spacing: 0.0,
            line_spacing: 0.0,
        }
    }
}

/// Text outline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextBorder {
    pub alpha: f64,
    pub color: Color,
    pub width: f64,
}

/// Drop shadow.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextShadow {
    pub alpha: f64,
    pub color: Color,
    pub angle: f64,
    pub distance: f64,
    pub smoothing: f64,
}

/// Style applied to characters `[start, end)` of a text segment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextStyleRange {
    pub start: usize,
    pub end: usize,
    pub style: TextStyle,
    pub border: Option<TextBorder>,
    pub font: Option<String>,
}

/// Position offset of the text box, in half-canvas units.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct TextTransform {
    pub x: f64,
    pub y: f64,
}

/// A text occurrence on a text track.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextSegment {
    pub id: String,
    pub text: String,
    pub font: Option<String>,
    pub style: TextStyle,
    pub border: Option<TextBorder>,
    pub shadow: Option<TextShadow>,
    pub transform: TextTransform,
    pub range_styles: Vec<TextStyleRange>,
    pub target_range: TimeRange,
}

impl TextSegment {
    pub fn new(text: impl Into<String>, target_range: TimeRange) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            text: text.into(),
            font: None,
            style: TextStyle::default(),
            border: None,
            shadow: None,
            transform: TextTransform::default(),
            range_styles: Vec::new(),
            target_range,
        }
    }

    pub fn with_style(mut self, style: TextStyle) -> Self {
        self.style = style;
        self
    }

    pub fn with_font(mut self, font: Option<String>) -> Self {
        self.font = font;
        self
    }

    pub fn with_border(mut self, border: Option<TextBorder>) -> Self {
        self.border = border;
        self
    }

    pub fn with_shadow(mut self, shadow: Option<TextShadow>) -> Self {
        self.shadow = shadow;
        self
    }

    pub fn with_transform(mut self, x: f64, y: f64) -> Self {
        self.transform = TextTransform { x, y };
        self
    }

    /// Layer a style over a character range.
    pub fn add_range_style(&mut self, range: TextStyleRange) -> TimelineResult<()> {
        let len = self.text.chars().count();
        if range.start >= range.end || range.end > len {
            return Err(TimelineError::InvalidStyleRange {
                start: range.start,
                end: range.end,
                len,
            });
        }
        self.range_styles.push(range);
        Ok(())
    }
}
