use crate::models::PanelSpec;
use image::{ImageFormat, Rgb, RgbImage};
use spectra_dither::{Palette, PALETTE_SIZE};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum DriverError {
    #[error("Panel used before init")]
    NotInitialized,

    #[error("Frame is {actual_width}x{actual_height}, panel is {width}x{height}")]
    DimensionMismatch {
        width: u32,
        height: u32,
        actual_width: u32,
        actual_height: u32,
    },

    #[error("Pixel ({x}, {y}) has no ink code: {rgb:?}")]
    UnmappedColor { x: u32, y: u32, rgb: [u8; 3] },

    #[error("Frame encode error: {0}")]
    Encode(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Low-level panel control.
///
/// Implementations are stateful and must not be driven concurrently; the
/// device gate owns the single instance.
pub trait DisplayDriver: Send {
    fn width(&self) -> u32;
    fn height(&self) -> u32;

    /// Wake the panel and make it ready for commands.
    fn init(&mut self) -> Result<(), DriverError>;

    /// Blank the panel to white.
    fn clear(&mut self) -> Result<(), DriverError>;

    /// Transfer and refresh a device-color frame.
    fn send(&mut self, frame: &RgbImage) -> Result<(), DriverError>;

    /// Put the panel into deep sleep.
    fn sleep(&mut self) -> Result<(), DriverError>;

    fn panel(&self) -> PanelSpec {
        PanelSpec::new(self.width(), self.height())
    }
}

/// Panel nibble for each palette index: black, white, yellow, red, blue,
/// green. Code 0x4 is unused by Spectra 6 controllers.
pub const INK_CODES: [u8; PALETTE_SIZE] = [0x0, 0x1, 0x2, 0x3, 0x5, 0x6];

const WHITE_INDEX: usize = 1;

/// Device color to 4-bit ink code, following the palette's device table by
/// index.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InkMap {
    device: [[u8; 3]; PALETTE_SIZE],
}

impl InkMap {
    pub fn from_palette(palette: &Palette) -> Self {
        Self {
            device: std::array::from_fn(|idx| palette.device(idx).to_bytes()),
        }
    }

    pub fn spectra6() -> Self {
        Self::from_palette(&Palette::spectra6())
    }

    /// Ink code for a device color, if it is one of the six.
    pub fn code(&self, rgb: [u8; 3]) -> Option<u8> {
        self.device
            .iter()
            .position(|&d| d == rgb)
            .map(|idx| INK_CODES[idx])
    }

    /// Device color of the white ink.
    pub fn white(&self) -> [u8; 3] {
        self.device[WHITE_INDEX]
    }
}

impl Default for InkMap {
    fn default() -> Self {
        Self::spectra6()
    }
}

/// Pack a device-color frame into the panel's 4-bit format.
///
/// Two pixels per byte, high nibble first. Odd widths pad each row with a
/// white nibble.
pub fn pack_frame(frame: &RgbImage, panel: PanelSpec, inks: &InkMap) -> Result<Vec<u8>, DriverError> {
    let (w, h) = frame.dimensions();
    if !panel.matches(w, h) {
        return Err(DriverError::DimensionMismatch {
            width: panel.width,
            height: panel.height,
            actual_width: w,
            actual_height: h,
        });
    }

    let code_at = |x: u32, y: u32| {
        let rgb = frame.get_pixel(x, y).0;
        inks.code(rgb).ok_or(DriverError::UnmappedColor { x, y, rgb })
    };

    let mut packed = Vec::with_capacity(panel.packed_len());
    for y in 0..h {
        let mut x = 0;
        while x < w {
            let hi = code_at(x, y)?;
            let lo = if x + 1 < w {
                code_at(x + 1, y)?
            } else {
                INK_CODES[WHITE_INDEX]
            };
            packed.push((hi << 4) | lo);
            x += 2;
        }
    }
    Ok(packed)
}

/// Driver that renders to files instead of hardware.
///
/// Every refresh writes `frame.png` (what the panel shows) and `frame.bin`
/// (the packed bytes a real panel would receive) to the output directory.
pub struct SimulatedPanel {
    panel: PanelSpec,
    inks: InkMap,
    output_dir: PathBuf,
    awake: bool,
    refreshes: u64,
}

impl SimulatedPanel {
    pub fn new(panel: PanelSpec, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            panel,
            inks: InkMap::spectra6(),
            output_dir: output_dir.into(),
            awake: false,
            refreshes: 0,
        }
    }

    /// Use the device colors of a configured palette.
    pub fn with_inks(mut self, inks: InkMap) -> Self {
        self.inks = inks;
        self
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    pub fn is_awake(&self) -> bool {
        self.awake
    }

    /// Completed clear/send operations since creation.
    pub fn refreshes(&self) -> u64 {
        self.refreshes
    }

    fn write_frame(&mut self, frame: &RgbImage) -> Result<(), DriverError> {
        if !self.awake {
            return Err(DriverError::NotInitialized);
        }
        let packed = pack_frame(frame, self.panel, &self.inks)?;

        std::fs::write(self.output_dir.join("frame.bin"), &packed)?;
        frame
            .save_with_format(self.output_dir.join("frame.png"), ImageFormat::Png)
            .map_err(|e| DriverError::Encode(e.to_string()))?;

        self.refreshes += 1;
        Ok(())
    }
}

impl DisplayDriver for SimulatedPanel {
    fn width(&self) -> u32 {
        self.panel.width
    }

    fn height(&self) -> u32 {
        self.panel.height
    }

    fn init(&mut self) -> Result<(), DriverError> {
        std::fs::create_dir_all(&self.output_dir)?;
        self.awake = true;
        tracing::debug!(dir = %self.output_dir.display(), "Simulated panel awake");
        Ok(())
    }

    fn clear(&mut self) -> Result<(), DriverError> {
        let blank = RgbImage::from_pixel(self.panel.width, self.panel.height, Rgb(self.inks.white()));
        self.write_frame(&blank)
    }

    fn send(&mut self, frame: &RgbImage) -> Result<(), DriverError> {
        self.write_frame(frame)?;
        tracing::info!(
            width = frame.width(),
            height = frame.height(),
            refreshes = self.refreshes,
            "Simulated panel refreshed"
        );
        Ok(())
    }

    fn sleep(&mut self) -> Result<(), DriverError> {
        self.awake = false;
        Ok(())
    }
}
