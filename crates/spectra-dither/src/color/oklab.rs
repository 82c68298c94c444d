//! Oklab perceptual color space
//!
//! Björn Ottosson, "A perceptual color space for image processing"
//! <https://bottosson.github.io/posts/oklab/>

use super::linear_rgb::LinearRgb;

/// A color in Oklab.
///
/// - `l`: lightness, 0.0 (black) to 1.0 (white)
/// - `a`: green (-) to red (+)
/// - `b`: blue (-) to yellow (+)
///
/// Values are not clamped; pixels carrying diffused error may be out of gamut.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Oklab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Oklab {
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance, for comparisons only.
    ///
    /// ```
    /// use spectra_dither::Oklab;
    ///
    /// let white = Oklab::new(1.0, 0.0, 0.0);
    /// let black = Oklab::new(0.0, 0.0, 0.0);
    /// let grey = Oklab::new(0.5, 0.0, 0.0);
    /// assert!((grey.distance_squared(black) - grey.distance_squared(white)).abs() < 1e-6);
    /// ```
    #[inline]
    pub fn distance_squared(self, other: Oklab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl * dl + da * da + db * db
    }

    /// Chroma magnitude `sqrt(a² + b²)`.
    #[inline]
    pub fn chroma(self) -> f32 {
        (self.a * self.a + self.b * self.b).sqrt()
    }
}

impl From<LinearRgb> for Oklab {
    /// 2021-01-25 matrices.
    fn from(c: LinearRgb) -> Self {
        let l = 0.412_221_470_8 * c.r + 0.536_332_536_3 * c.g + 0.051_445_992_9 * c.b;
        let m = 0.211_903_498_2 * c.r + 0.680_699_545_1 * c.g + 0.107_396_956_6 * c.b;
        let s = 0.088_302_461_9 * c.r + 0.281_718_837_6 * c.g + 0.629_978_700_5 * c.b;

        let l_ = l.cbrt();
        let m_ = m.cbrt();
        let s_ = s.cbrt();

        Self {
            l: 0.210_454_255_3 * l_ + 0.793_617_785_0 * m_ - 0.004_072_046_8 * s_,
            a: 1.977_998_495_1 * l_ - 2.428_592_205_0 * m_ + 0.450_593_709_9 * s_,
            b: 0.025_904_037_1 * l_ + 0.782_771_766_2 * m_ - 0.808_675_766_0 * s_,
        }
    }
}
