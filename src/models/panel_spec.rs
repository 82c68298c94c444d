use serde::{Deserialize, Serialize};

/// Pixel dimensions of an e-paper panel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSpec {
    pub width: u32,
    pub height: u32,
}

impl PanelSpec {
    /// 13.3" Spectra 6 panel in portrait orientation: 1200x1600
    pub const SPECTRA6_13IN3: Self = Self {
        width: 1200,
        height: 1600,
    };

    /// 7.3" Spectra 6 panel: 800x480
    pub const SPECTRA6_7IN3: Self = Self {
        width: 800,
        height: 480,
    };

    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    /// Size of a packed 4-bit frame: two pixels per byte, rows padded to a
    /// whole byte.
    pub fn packed_len(&self) -> usize {
        (self.width as usize).div_ceil(2) * self.height as usize
    }

    pub fn matches(&self, width: u32, height: u32) -> bool {
        self.width == width && self.height == height
    }
}

impl Default for PanelSpec {
    fn default() -> Self {
        Self::SPECTRA6_13IN3
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_13in3_portrait() {
        let spec = PanelSpec::default();
        assert_eq!((spec.width, spec.height), (1200, 1600));
        assert_eq!(spec.pixel_count(), 1_920_000);
    }

    #[test]
    fn test_packed_len() {
        assert_eq!(PanelSpec::SPECTRA6_13IN3.packed_len(), 960_000);
        assert_eq!(PanelSpec::SPECTRA6_7IN3.packed_len(), 192_000);
        // odd widths round up per row
        assert_eq!(PanelSpec::new(3, 2).packed_len(), 4);
    }

    #[test]
    fn test_matches() {
        let spec = PanelSpec::new(10, 20);
        assert!(spec.matches(10, 20));
        assert!(!spec.matches(20, 10));
    }
}
