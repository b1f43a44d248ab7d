use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Image crop expressed as four normalized corners (0.0 to 1.0).
///
/// The default covers the whole frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct CropSettings {
    pub upper_left_x: f64,
    pub upper_left_y: f64,
    pub upper_right_x: f64,
    pub upper_right_y: f64,
    pub lower_left_x: f64,
    pub lower_left_y: f64,
    pub lower_right_x: f64,
    pub lower_right_y: f64,
}

impl Default for CropSettings {
    fn default() -> Self {
        Self {
            upper_left_x: 0.0,
            upper_left_y: 0.0,
            upper_right_x: 1.0,
            upper_right_y: 0.0,
            lower_left_x: 0.0,
            lower_left_y: 1.0,
            lower_right_x: 1.0,
            lower_right_y: 1.0,
        }
    }
}

impl CropSettings {
    /// Axis-aligned crop from a top-left corner and a size.
    pub fn from_rect(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self {
            upper_left_x: x,
            upper_left_y: y,
            upper_right_x: x + width,
            upper_right_y: y,
            lower_left_x: x,
            lower_left_y: y + height,
            lower_right_x: x + width,
            lower_right_y: y + height,
        }
    }

    fn corners(&self) -> [f64; 8] {
        [
            self.upper_left_x,
            self.upper_left_y,
            self.upper_right_x,
            self.upper_right_y,
            self.lower_left_x,
            self.lower_left_y,
            self.lower_right_x,
            self.lower_right_y,
        ]
    }

    /// Check every coordinate lies within 0.0-1.0.
    pub fn is_valid(&self) -> bool {
        self.corners()
            .iter()
            .all(|c| c.is_finite() && (0.0..=1.001).contains(c)) // Allow small epsilon for float precision
    }

    /// Whether this crop keeps the whole frame.
    pub fn is_full_frame(&self) -> bool {
        *self == Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_full_frame() {
        let crop = CropSettings::default();
        assert!(crop.is_valid());
        assert!(crop.is_full_frame());
    }

    #[test]
    fn test_from_rect() {
        let crop = CropSettings::from_rect(0.1, 0.2, 0.5, 0.5);
        assert!(crop.is_valid());
        assert!(!crop.is_full_frame());
        assert!((crop.lower_right_x - 0.6).abs() < 1e-9);
        assert!((crop.lower_right_y - 0.7).abs() < 1e-9);
    }

    #[test]
    fn test_out_of_range_is_invalid() {
        let crop = CropSettings {
            upper_left_x: -0.2,
            ..CropSettings::default()
        };
        assert!(!crop.is_valid());
    }

    #[test]
    fn test_partial_json_fills_defaults() {
        let crop: CropSettings = serde_json::from_str(r#"{"upper_left_x": 0.25}"#).unwrap();
        assert_eq!(crop.upper_left_x, 0.25);
        assert_eq!(crop.lower_right_y, 1.0);
    }
}
