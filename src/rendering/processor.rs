use crate::error::ProcessError;
use crate::models::{AppConfig, PanelSpec};
use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, ImageFormat, RgbImage, Rgba, RgbaImage};
use spectra_dither::{DitheredImage, Ditherer, PaletteError, PaletteTarget, Srgb};
use std::io::Cursor;

/// Output of the upload pipeline.
///
/// `device` and `preview` come from one dither run and differ only in which
/// palette table the indices were looked up in.
#[derive(Debug, Clone)]
pub struct PreparedImage {
    /// Panel-sized frame in raw device colors
    pub device: RgbImage,
    /// Same frame in perceptual colors, for on-screen preview
    pub preview: RgbImage,
    /// Downscaled, undithered view of the scaled canvas
    pub thumbnail: RgbImage,
}

/// Turns arbitrary photos into panel-ready 6-color frames.
pub struct ImageProcessor {
    ditherer: Ditherer,
    panel: PanelSpec,
    thumb_max: (u32, u32),
}

impl ImageProcessor {
    pub fn new(ditherer: Ditherer, panel: PanelSpec, thumb_max_width: u32, thumb_max_height: u32) -> Self {
        Self {
            ditherer,
            panel,
            thumb_max: (thumb_max_width, thumb_max_height),
        }
    }

    /// Build from config, targeting `panel`.
    pub fn from_config(config: &AppConfig, panel: PanelSpec) -> Result<Self, PaletteError> {
        let ditherer = Ditherer::new(config.build_palette()?)
            .algorithm(config.dither.algorithm)
            .serpentine(config.dither.serpentine);

        tracing::debug!(
            algorithm = %config.dither.algorithm,
            serpentine = config.dither.serpentine,
            width = panel.width,
            height = panel.height,
            "Configured image processor"
        );

        Ok(Self::new(
            ditherer,
            panel,
            config.thumbnail.max_width,
            config.thumbnail.max_height,
        ))
    }

    pub fn panel(&self) -> PanelSpec {
        self.panel
    }

    pub fn ditherer(&self) -> &Ditherer {
        &self.ditherer
    }

    /// Decode any format the `image` crate understands.
    pub fn decode(bytes: &[u8]) -> Result<DynamicImage, ProcessError> {
        image::load_from_memory(bytes).map_err(|e| ProcessError::Decode(e.to_string()))
    }

    /// Fill a `target_width x target_height` canvas with `image`.
    ///
    /// The source is scaled by `max(tw/sw, th/sh)` so it covers the canvas,
    /// and the centered overflow is cropped. Transparent areas become white.
    pub fn scale_and_center(
        image: &DynamicImage,
        target_width: u32,
        target_height: u32,
    ) -> Result<RgbImage, ProcessError> {
        let (src_w, src_h) = image.dimensions();
        if src_w == 0 || src_h == 0 {
            return Err(ProcessError::DegenerateImage {
                width: src_w,
                height: src_h,
            });
        }
        if target_width == 0 || target_height == 0 {
            return Err(ProcessError::DegenerateImage {
                width: target_width,
                height: target_height,
            });
        }

        let ratio = f64::max(
            target_width as f64 / src_w as f64,
            target_height as f64 / src_h as f64,
        );

        // Crop to the visible region before resampling so extreme aspect
        // ratios never allocate the full overflowing intermediate.
        let crop_w = ((target_width as f64 / ratio).round() as u32).clamp(1, src_w);
        let crop_h = ((target_height as f64 / ratio).round() as u32).clamp(1, src_h);
        let crop_x = (src_w - crop_w) / 2;
        let crop_y = (src_h - crop_h) / 2;

        let visible = image.crop_imm(crop_x, crop_y, crop_w, crop_h).to_rgba8();
        let scaled = imageops::resize(&visible, target_width, target_height, FilterType::Lanczos3);

        let mut canvas = RgbaImage::from_pixel(target_width, target_height, Rgba([255, 255, 255, 255]));
        let offset_x = (i64::from(target_width) - i64::from(scaled.width())) / 2;
        let offset_y = (i64::from(target_height) - i64::from(scaled.height())) / 2;
        imageops::overlay(&mut canvas, &scaled, offset_x, offset_y);

        Ok(DynamicImage::ImageRgba8(canvas).to_rgb8())
    }

    /// Dither `canvas` to the 6-ink palette.
    ///
    /// With `use_device_palette` the indices are written out through the
    /// device table instead of the perceptual one.
    pub fn quantize(&self, canvas: &RgbImage, use_device_palette: bool) -> Result<RgbImage, ProcessError> {
        let target = if use_device_palette {
            PaletteTarget::Device
        } else {
            PaletteTarget::Perceptual
        };
        to_frame(&self.dither(canvas), target)
    }

    /// Dither once and return `(device, preview)`.
    pub fn quantize_both(&self, canvas: &RgbImage) -> Result<(RgbImage, RgbImage), ProcessError> {
        let dithered = self.dither(canvas);
        let device = to_frame(&dithered, PaletteTarget::Device)?;
        let preview = to_frame(&dithered, PaletteTarget::Perceptual)?;
        Ok((device, preview))
    }

    fn dither(&self, canvas: &RgbImage) -> DitheredImage {
        let pixels: Vec<Srgb> = canvas.pixels().map(|p| Srgb::from_bytes(p.0)).collect();
        self.ditherer
            .dither(&pixels, canvas.width() as usize, canvas.height() as usize)
    }

    /// Aspect-preserving downscale into `max_width x max_height`.
    ///
    /// Never upscales; the result is at least 1x1.
    pub fn thumbnail(image: &RgbImage, max_width: u32, max_height: u32) -> RgbImage {
        let (w, h) = image.dimensions();
        let (max_width, max_height) = (max_width.max(1), max_height.max(1));
        if w <= max_width && h <= max_height {
            return image.clone();
        }

        let ratio = f64::min(max_width as f64 / w as f64, max_height as f64 / h as f64);
        let new_w = ((w as f64 * ratio).round() as u32).clamp(1, max_width);
        let new_h = ((h as f64 * ratio).round() as u32).clamp(1, max_height);
        imageops::resize(image, new_w, new_h, FilterType::Lanczos3)
    }

    /// Full upload pipeline: decode, fill the panel, dither, thumbnail.
    pub fn prepare(&self, bytes: &[u8]) -> Result<PreparedImage, ProcessError> {
        let started = std::time::Instant::now();
        let source = Self::decode(bytes)?;
        let (src_w, src_h) = source.dimensions();

        let canvas = Self::scale_and_center(&source, self.panel.width, self.panel.height)?;
        let thumbnail = Self::thumbnail(&canvas, self.thumb_max.0, self.thumb_max.1);
        let (device, preview) = self.quantize_both(&canvas)?;

        tracing::debug!(
            src_width = src_w,
            src_height = src_h,
            width = self.panel.width,
            height = self.panel.height,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Prepared image"
        );

        Ok(PreparedImage {
            device,
            preview,
            thumbnail,
        })
    }
}

fn to_frame(dithered: &DitheredImage, target: PaletteTarget) -> Result<RgbImage, ProcessError> {
    let (width, height) = (dithered.width(), dithered.height());
    RgbImage::from_raw(width as u32, height as u32, dithered.to_rgb(target)).ok_or_else(|| {
        ProcessError::Encode(format!("dithered buffer does not fill {width}x{height}"))
    })
}

/// Encode as an uncompressed 24-bit BMP.
pub fn encode_bmp(image: &RgbImage) -> Result<Vec<u8>, ProcessError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Bmp)
        .map_err(|e| ProcessError::Encode(e.to_string()))?;
    Ok(buf)
}

/// Encode as PNG.
pub fn encode_png(image: &RgbImage) -> Result<Vec<u8>, ProcessError> {
    let mut buf = Vec::new();
    image
        .write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .map_err(|e| ProcessError::Encode(e.to_string()))?;
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::Rgb;
    use spectra_dither::Palette;
    use std::collections::HashSet;

    fn processor(width: u32, height: u32) -> ImageProcessor {
        ImageProcessor::new(
            Ditherer::new(Palette::spectra6()),
            PanelSpec::new(width, height),
            16,
            16,
        )
    }

    fn gradient(width: u32, height: u32) -> RgbImage {
        RgbImage::from_fn(width, height, |x, y| {
            Rgb([
                (x * 255 / width.max(1)) as u8,
                (y * 255 / height.max(1)) as u8,
                128,
            ])
        })
    }

    fn png_bytes(image: &RgbImage) -> Vec<u8> {
        encode_png(image).unwrap()
    }

    fn colors(image: &RgbImage) -> HashSet<[u8; 3]> {
        image.pixels().map(|p| p.0).collect()
    }

    #[test]
    fn test_decode_rejects_garbage() {
        let err = ImageProcessor::decode(b"definitely not an image").unwrap_err();
        assert!(matches!(err, ProcessError::Decode(_)));
    }

    #[test]
    fn test_decode_png() {
        let decoded = ImageProcessor::decode(&png_bytes(&gradient(7, 5))).unwrap();
        assert_eq!(decoded.dimensions(), (7, 5));
    }

    #[test]
    fn test_scale_and_center_exact_dimensions() {
        let cases = [(100, 100), (4000, 10), (10, 4000), (3, 7), (1, 1), (1200, 1600)];
        for (w, h) in cases {
            let source = DynamicImage::ImageRgb8(gradient(w, h));
            let canvas = ImageProcessor::scale_and_center(&source, 60, 80).unwrap();
            assert_eq!(canvas.dimensions(), (60, 80), "source {w}x{h}");
        }
    }

    #[test]
    fn test_scale_and_center_rejects_zero_size() {
        let source = DynamicImage::ImageRgb8(RgbImage::new(0, 10));
        let err = ImageProcessor::scale_and_center(&source, 60, 80).unwrap_err();
        assert!(matches!(
            err,
            ProcessError::DegenerateImage {
                width: 0,
                height: 10
            }
        ));
    }

    #[test]
    fn test_scale_and_center_crops_centered_overflow() {
        // Left third red, middle third green, right third blue; a portrait
        // target keeps only the middle.
        let source = RgbImage::from_fn(300, 100, |x, _| match x {
            0..=99 => Rgb([255, 0, 0]),
            100..=199 => Rgb([0, 255, 0]),
            _ => Rgb([0, 0, 255]),
        });
        let canvas =
            ImageProcessor::scale_and_center(&DynamicImage::ImageRgb8(source), 30, 30).unwrap();

        let center = canvas.get_pixel(15, 15).0;
        assert!(center[1] > 200 && center[0] < 50 && center[2] < 50, "{center:?}");
    }

    #[test]
    fn test_transparent_pixels_become_white() {
        let source = RgbaImage::from_pixel(10, 10, Rgba([0, 0, 0, 0]));
        let canvas =
            ImageProcessor::scale_and_center(&DynamicImage::ImageRgba8(source), 20, 20).unwrap();
        assert!(canvas.pixels().all(|p| p.0 == [255, 255, 255]));
    }

    #[test]
    fn test_quantize_uses_only_palette_colors() {
        let p = processor(40, 30);
        let canvas = gradient(40, 30);
        let palette = Palette::spectra6();

        let device: HashSet<[u8; 3]> = palette.device_table().iter().map(|c| c.to_bytes()).collect();
        let perceptual: HashSet<[u8; 3]> =
            palette.perceptual_table().iter().map(|c| c.to_bytes()).collect();

        assert!(colors(&p.quantize(&canvas, true).unwrap()).is_subset(&device));
        assert!(colors(&p.quantize(&canvas, false).unwrap()).is_subset(&perceptual));
    }

    #[test]
    fn test_quantize_is_deterministic() {
        let p = processor(40, 30);
        let canvas = gradient(40, 30);
        assert_eq!(p.quantize(&canvas, true).unwrap(), p.quantize(&canvas, true).unwrap());
    }

    #[test]
    fn test_device_and_preview_share_indices() {
        let p = processor(24, 24);
        let canvas = gradient(24, 24);
        let palette = Palette::spectra6();
        let (device, preview) = p.quantize_both(&canvas).unwrap();

        for (d, v) in device.pixels().zip(preview.pixels()) {
            let di = palette.device_table().iter().position(|c| c.to_bytes() == d.0);
            let vi = palette.perceptual_table().iter().position(|c| c.to_bytes() == v.0);
            assert_eq!(di, vi);
        }
    }

    #[test]
    fn test_frames_are_dithered_output_in_raster_order() {
        let p = processor(7, 5);
        let canvas = gradient(7, 5);
        let dithered = p.dither(&canvas);
        let (device, preview) = p.quantize_both(&canvas).unwrap();

        assert_eq!(device.dimensions(), (7, 5));
        assert_eq!(device.into_raw(), dithered.to_rgb(PaletteTarget::Device));
        assert_eq!(preview.into_raw(), dithered.to_rgb(PaletteTarget::Perceptual));
    }

    #[test]
    fn test_white_canvas_stays_white() {
        let p = processor(8, 8);
        let canvas = RgbImage::from_pixel(8, 8, Rgb([255, 255, 255]));
        let device = p.quantize(&canvas, true).unwrap();
        assert!(device.pixels().all(|px| px.0 == [255, 255, 255]));
    }

    #[test]
    fn test_thumbnail_preserves_aspect() {
        let thumb = ImageProcessor::thumbnail(&gradient(1200, 1600), 150, 150);
        assert_eq!(thumb.dimensions(), (113, 150));
    }

    #[test]
    fn test_thumbnail_never_upscales() {
        let thumb = ImageProcessor::thumbnail(&gradient(40, 20), 150, 150);
        assert_eq!(thumb.dimensions(), (40, 20));
    }

    #[test]
    fn test_thumbnail_at_least_one_pixel() {
        let thumb = ImageProcessor::thumbnail(&gradient(5000, 2), 100, 100);
        assert_eq!(thumb.dimensions(), (100, 1));

        let thumb = ImageProcessor::thumbnail(&gradient(50, 50), 0, 0);
        assert_eq!(thumb.dimensions(), (1, 1));
    }

    #[test]
    fn test_prepare() {
        let p = processor(30, 40);
        let prepared = p.prepare(&png_bytes(&gradient(200, 100))).unwrap();

        assert_eq!(prepared.device.dimensions(), (30, 40));
        assert_eq!(prepared.preview.dimensions(), (30, 40));
        assert_eq!(prepared.thumbnail.dimensions(), (12, 16));
    }

    #[test]
    fn test_prepare_rejects_undecodable() {
        let p = processor(30, 40);
        assert!(matches!(
            p.prepare(b"GIF89a-truncated"),
            Err(ProcessError::Decode(_))
        ));
    }

    #[test]
    fn test_encode_bmp_roundtrip() {
        let frame = gradient(9, 4);
        let bytes = encode_bmp(&frame).unwrap();
        assert_eq!(&bytes[..2], b"BM");

        let decoded = image::load_from_memory_with_format(&bytes, ImageFormat::Bmp)
            .unwrap()
            .to_rgb8();
        assert_eq!(decoded, frame);
    }

    #[test]
    fn test_from_config_uses_panel() {
        let config = AppConfig::default();
        let p = ImageProcessor::from_config(&config, PanelSpec::SPECTRA6_7IN3).unwrap();
        assert_eq!(p.panel(), PanelSpec::SPECTRA6_7IN3);
    }
}
