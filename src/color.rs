/// Filter-effect color math for the local preview
///
/// This module implements the CSS filter functions used by the Adjust and
/// Filters tools, following the W3C Filter Effects matrices:
/// - brightness / contrast (per-channel linear transfer)
/// - grayscale / sepia / saturate / hue-rotate (3x3 color matrices)
///
/// Operations apply in order and clamp to [0, 1] after each step, the same way
/// a chained `filter:` declaration renders.
use std::fmt;

use cgmath::{Matrix3, Vector3};

/// Rec. 709 luma weights used by the W3C saturate/hue-rotate matrices
const LUMA: [f32; 3] = [0.213, 0.715, 0.072];

/// One filter function. Amounts are fractions (1.0 = 100%), hue in degrees.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum FilterOp {
    Brightness(f32),
    Contrast(f32),
    Grayscale(f32),
    Sepia(f32),
    Saturate(f32),
    HueRotate(f32),
}

impl FilterOp {
    fn is_identity(&self) -> bool {
        const EPSILON: f32 = 0.0001;
        match *self {
            FilterOp::Brightness(a) | FilterOp::Contrast(a) | FilterOp::Saturate(a) => {
                (a - 1.0).abs() < EPSILON
            }
            FilterOp::Grayscale(a) | FilterOp::Sepia(a) => a.abs() < EPSILON,
            FilterOp::HueRotate(deg) => (deg % 360.0).abs() < EPSILON,
        }
    }

    fn apply(&self, rgb: Vector3<f32>) -> Vector3<f32> {
        let out = match *self {
            FilterOp::Brightness(a) => rgb * a,
            FilterOp::Contrast(a) => rgb.map(|c| (c - 0.5) * a + 0.5),
            FilterOp::Grayscale(a) => grayscale_matrix(a) * rgb,
            FilterOp::Sepia(a) => sepia_matrix(a) * rgb,
            FilterOp::Saturate(a) => saturate_matrix(a) * rgb,
            FilterOp::HueRotate(deg) => hue_rotate_matrix(deg) * rgb,
        };
        out.map(|c| c.clamp(0.0, 1.0))
    }
}

impl fmt::Display for FilterOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            FilterOp::Brightness(a) => write!(f, "brightness({}%)", percent(a)),
            FilterOp::Contrast(a) => write!(f, "contrast({}%)", percent(a)),
            FilterOp::Grayscale(a) => write!(f, "grayscale({}%)", percent(a)),
            FilterOp::Sepia(a) => write!(f, "sepia({}%)", percent(a)),
            FilterOp::Saturate(a) => write!(f, "saturate({}%)", percent(a)),
            FilterOp::HueRotate(deg) => write!(f, "hue-rotate({}deg)", round2(deg)),
        }
    }
}

fn round2(value: f32) -> f32 {
    (value * 100.0).round() / 100.0
}

fn percent(amount: f32) -> f32 {
    round2(amount * 100.0)
}

/// Build a cgmath matrix from row-major rows (cgmath is column-major)
fn from_rows(r: [[f32; 3]; 3]) -> Matrix3<f32> {
    Matrix3::new(
        r[0][0], r[1][0], r[2][0], // Column 0
        r[0][1], r[1][1], r[2][1], // Column 1
        r[0][2], r[1][2], r[2][2], // Column 2
    )
}

fn grayscale_matrix(amount: f32) -> Matrix3<f32> {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    from_rows([
        [0.2126 + 0.7874 * s, 0.7152 - 0.7152 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 + 0.2848 * s, 0.0722 - 0.0722 * s],
        [0.2126 - 0.2126 * s, 0.7152 - 0.7152 * s, 0.0722 + 0.9278 * s],
    ])
}

fn sepia_matrix(amount: f32) -> Matrix3<f32> {
    let s = 1.0 - amount.clamp(0.0, 1.0);
    from_rows([
        [0.393 + 0.607 * s, 0.769 - 0.769 * s, 0.189 - 0.189 * s],
        [0.349 - 0.349 * s, 0.686 + 0.314 * s, 0.168 - 0.168 * s],
        [0.272 - 0.272 * s, 0.534 - 0.534 * s, 0.131 + 0.869 * s],
    ])
}

fn saturate_matrix(amount: f32) -> Matrix3<f32> {
    let s = amount.max(0.0);
    let [r, g, b] = LUMA;
    from_rows([
        [r + (1.0 - r) * s, g - g * s, b - b * s],
        [r - r * s, g + (1.0 - g) * s, b - b * s],
        [r - r * s, g - g * s, b + (1.0 - b) * s],
    ])
}

fn hue_rotate_matrix(degrees: f32) -> Matrix3<f32> {
    let (sin, cos) = degrees.to_radians().sin_cos();
    from_rows([
        [
            0.213 + cos * 0.787 - sin * 0.213,
            0.715 - cos * 0.715 - sin * 0.715,
            0.072 - cos * 0.072 + sin * 0.928,
        ],
        [
            0.213 - cos * 0.213 + sin * 0.143,
            0.715 + cos * 0.285 + sin * 0.140,
            0.072 - cos * 0.072 - sin * 0.283,
        ],
        [
            0.213 - cos * 0.213 - sin * 0.787,
            0.715 - cos * 0.715 + sin * 0.715,
            0.072 + cos * 0.928 + sin * 0.072,
        ],
    ])
}

/// An ordered list of filter operations
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FilterChain {
    ops: Vec<FilterOp>,
}

impl FilterChain {
    pub fn new(ops: Vec<FilterOp>) -> Self {
        Self { ops }
    }

    pub fn ops(&self) -> &[FilterOp] {
        &self.ops
    }

    /// True when rendering the chain would leave every pixel unchanged
    pub fn is_identity(&self) -> bool {
        self.ops.iter().all(FilterOp::is_identity)
    }

    /// Apply the chain to one RGB pixel in [0, 1]
    pub fn apply(&self, rgb: [f32; 3]) -> [f32; 3] {
        let out = self
            .ops
            .iter()
            .filter(|op| !op.is_identity())
            .fold(Vector3::from(rgb), |acc, op| op.apply(acc));
        out.into()
    }

    /// Apply the chain in place to 8-bit RGBA pixels (alpha untouched)
    pub fn apply_rgba(&self, pixels: &mut [u8]) {
        if self.is_identity() {
            return;
        }

        for px in pixels.chunks_exact_mut(4) {
            let rgb = [
                f32::from(px[0]) / 255.0,
                f32::from(px[1]) / 255.0,
                f32::from(px[2]) / 255.0,
            ];
            let [r, g, b] = self.apply(rgb);
            px[0] = (r * 255.0).round() as u8;
            px[1] = (g * 255.0).round() as u8;
            px[2] = (b * 255.0).round() as u8;
        }
    }
}

impl fmt::Display for FilterChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.ops.is_empty() {
            return f.write_str("none");
        }
        for (i, op) in self.ops.iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{op}")?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: [f32; 3], b: [f32; 3]) -> bool {
        a.iter().zip(b.iter()).all(|(x, y)| (x - y).abs() < 0.002)
    }

    #[test]
    fn test_full_grayscale_equalizes_channels() {
        let chain = FilterChain::new(vec![FilterOp::Grayscale(1.0)]);
        let [r, g, b] = chain.apply([1.0, 0.0, 0.0]);
        assert!((r - 0.2126).abs() < 0.001);
        assert!((r - g).abs() < 0.001 && (g - b).abs() < 0.001);
    }

    #[test]
    fn test_zero_amounts_are_identity() {
        let chain = FilterChain::new(vec![
            FilterOp::Grayscale(0.0),
            FilterOp::Sepia(0.0),
            FilterOp::Saturate(1.0),
            FilterOp::HueRotate(0.0),
            FilterOp::Brightness(1.0),
            FilterOp::Contrast(1.0),
        ]);
        assert!(chain.is_identity());
        assert!(close(chain.apply([0.3, 0.6, 0.9]), [0.3, 0.6, 0.9]));
    }

    #[test]
    fn test_brightness_clamps() {
        let chain = FilterChain::new(vec![FilterOp::Brightness(2.0)]);
        assert!(close(chain.apply([0.8, 0.25, 0.0]), [1.0, 0.5, 0.0]));
    }

    #[test]
    fn test_contrast_pivots_on_mid_gray() {
        let chain = FilterChain::new(vec![FilterOp::Contrast(1.5)]);
        assert!(close(chain.apply([0.5, 0.6, 0.4]), [0.5, 0.65, 0.35]));
    }

    #[test]
    fn test_full_hue_turn_is_identity() {
        let chain = FilterChain::new(vec![FilterOp::HueRotate(360.0)]);
        assert!(chain.is_identity());
    }

    #[test]
    fn test_rgba_alpha_untouched() {
        let chain = FilterChain::new(vec![FilterOp::Sepia(1.0)]);
        let mut pixels = vec![255, 255, 255, 17];
        chain.apply_rgba(&mut pixels);
        assert_eq!(pixels[3], 17);
        // Sepia of white keeps red saturated and darkens blue
        assert_eq!(pixels[0], 255);
        assert!(pixels[2] < 255);
    }

    #[test]
    fn test_display_renders_css() {
        let chain = FilterChain::new(vec![
            FilterOp::Brightness(1.1),
            FilterOp::HueRotate(-40.0),
        ]);
        assert_eq!(chain.to_string(), "brightness(110%) hue-rotate(-40deg)");
        assert_eq!(FilterChain::default().to_string(), "none");
    }
}
