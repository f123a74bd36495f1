//! Screenshot pixel access
//!
//! Detectors never touch the image directly; they request one row at a
//! time through [`ScanlineSampler`], so platforms that keep the bitmap on
//! the other side of a bridge can serve rows without copying the frame.

use image::{ImageBuffer, Rgb, RgbaImage};

use super::VisionError;

/// Row-oriented pixel source
pub trait ScanlineSampler {
    /// Image dimensions as `(width, height)`
    fn dimensions(&self) -> (u32, u32);

    /// Sample `sample_count` evenly spaced pixels from row `y`, covering
    /// `width` pixels starting at `x_start`
    fn sample_scan_line(
        &self,
        y: u32,
        x_start: u32,
        width: u32,
        sample_count: u32,
    ) -> Result<Vec<Rgb<u8>>, VisionError>;

    /// The full row `y`, one pixel per column
    fn full_row(&self, y: u32) -> Result<Vec<Rgb<u8>>, VisionError> {
        let (width, _) = self.dimensions();
        self.sample_scan_line(y, 0, width, width)
    }
}

/// Sampler over an in-memory RGBA frame
pub struct FrameSampler<'a> {
    frame: &'a RgbaImage,
}

impl<'a> FrameSampler<'a> {
    pub fn new(frame: &'a RgbaImage) -> Self {
        Self { frame }
    }
}

impl ScanlineSampler for FrameSampler<'_> {
    fn dimensions(&self) -> (u32, u32) {
        self.frame.dimensions()
    }

    fn sample_scan_line(
        &self,
        y: u32,
        x_start: u32,
        width: u32,
        sample_count: u32,
    ) -> Result<Vec<Rgb<u8>>, VisionError> {
        let (frame_width, frame_height) = self.frame.dimensions();
        if y >= frame_height || x_start.saturating_add(width) > frame_width {
            return Err(VisionError::RowOutOfBounds { y, x_start, width });
        }
        if width == 0 || sample_count == 0 {
            return Ok(Vec::new());
        }

        let samples = (0..sample_count)
            .map(|i| {
                let x = x_start + (i as u64 * width as u64 / sample_count as u64) as u32;
                let pixel = self.frame.get_pixel(x, y);
                Rgb([pixel[0], pixel[1], pixel[2]])
            })
            .collect();

        Ok(samples)
    }
}

/// Build an RGBA frame from raw bytes received over the platform bridge
pub fn frame_from_raw(
    frame_data: &[u8],
    width: u32,
    height: u32,
) -> Result<RgbaImage, VisionError> {
    // Validate frame data size
    let expected_size = width as usize * height as usize * 4; // RGBA
    if frame_data.len() != expected_size || expected_size == 0 {
        return Err(VisionError::InvalidFrameData);
    }

    ImageBuffer::from_raw(width, height, frame_data.to_vec()).ok_or(VisionError::InvalidFrameData)
}
