//! Scanline blob detection
//!
//! Rows of the search band are sampled at a fixed step, near-white runs are
//! pulled out of each row as [`Segment`]s, and segments that touch across
//! nearby rows are grouped into [`Blob`]s.
//!
//! The clustering works on a flat arena of segments addressed by index, with
//! a `used` bitmap standing in for visited marks, so a blob is just the set of
//! indices reached by one breadth-first walk.

use std::collections::VecDeque;

use image::Rgb;

use super::capture::ScanlineSampler;
use super::VisionError;
use crate::config::{SegmentSettings, Settings, WhiteThreshold};

/// Perceived luminance on the 0-255 scale
pub fn luminance(pixel: &Rgb<u8>) -> f64 {
    0.299 * pixel[0] as f64 + 0.587 * pixel[1] as f64 + 0.114 * pixel[2] as f64
}

/// Near-white, low-saturation pixel test
pub fn is_white(pixel: &Rgb<u8>, threshold: &WhiteThreshold) -> bool {
    let max = pixel[0].max(pixel[1]).max(pixel[2]);
    let min = pixel[0].min(pixel[1]).min(pixel[2]);
    luminance(pixel) > threshold.min_luminance && max - min < threshold.max_chroma
}

/// A maximal near-white run within one sampled row
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    pub y: u32,
    pub x_start: u32,
    /// Exclusive
    pub x_end: u32,
    /// Average luminance of the run, normalized to 0.0-1.0
    pub score: f64,
}

impl Segment {
    pub fn width(&self) -> u32 {
        self.x_end - self.x_start
    }

    /// Whether the x-ranges overlap once each side is widened by `tolerance`
    fn overlaps(&self, other: &Segment, tolerance: u32) -> bool {
        self.x_start <= other.x_end + tolerance && other.x_start <= self.x_end + tolerance
    }
}

/// Extract the near-white runs of one row. Runs narrower than
/// `min_run_width` are dropped.
pub fn find_segments(
    y: u32,
    row: &[Rgb<u8>],
    threshold: &WhiteThreshold,
    min_run_width: u32,
) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut run_start: Option<u32> = None;
    let mut luminance_sum = 0.0;

    let close_run = |start: u32, end: u32, sum: f64, segments: &mut Vec<Segment>| {
        let width = end - start;
        if width >= min_run_width.max(1) {
            segments.push(Segment {
                y,
                x_start: start,
                x_end: end,
                score: sum / width as f64 / 255.0,
            });
        }
    };

    for (x, pixel) in row.iter().enumerate() {
        let x = x as u32;
        if is_white(pixel, threshold) {
            if run_start.is_none() {
                run_start = Some(x);
                luminance_sum = 0.0;
            }
            luminance_sum += luminance(pixel);
        } else if let Some(start) = run_start.take() {
            close_run(start, x, luminance_sum, &mut segments);
        }
    }

    if let Some(start) = run_start {
        close_run(start, row.len() as u32, luminance_sum, &mut segments);
    }

    segments
}

/// A connected group of segments.
///
/// `max_x` is one past the last white column. `min_y` and `max_y` are the
/// first and last sampled rows, so a blob seen on a single row has zero
/// height.
#[derive(Debug, Clone, PartialEq)]
pub struct Blob {
    pub min_x: u32,
    pub max_x: u32,
    pub min_y: u32,
    pub max_y: u32,
    pub center_x: f64,
    pub center_y: f64,
    /// Sum of member segment scores
    pub score: f64,
    pub segment_count: usize,
}

impl Blob {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y
    }

    /// Width over height
    pub fn aspect_ratio(&self) -> f64 {
        if self.height() == 0 {
            return 0.0;
        }
        self.width() as f64 / self.height() as f64
    }

    /// Mean segment score
    pub fn brightness(&self) -> f64 {
        if self.segment_count == 0 {
            return 0.0;
        }
        self.score / self.segment_count as f64
    }
}

/// Group segments into blobs.
///
/// Two segments are linked when their rows are at most
/// `row_gap_factor * row_step` apart and their x-ranges overlap within the
/// configured tolerance. Every segment ends up in exactly one blob.
pub fn cluster_segments(
    segments: &[Segment],
    row_step: u32,
    settings: &SegmentSettings,
) -> Vec<Blob> {
    let mut order: Vec<usize> = (0..segments.len()).collect();
    order.sort_by_key(|&idx| (segments[idx].y, segments[idx].x_start));
    let sorted: Vec<Segment> = order.iter().map(|&idx| segments[idx]).collect();

    let max_gap = settings.row_gap_factor * row_step as f64;
    let mut used = vec![false; sorted.len()];
    let mut blobs = Vec::new();
    let mut queue = VecDeque::new();

    for seed in 0..sorted.len() {
        if used[seed] {
            continue;
        }
        used[seed] = true;
        queue.push_back(seed);

        let mut members = Vec::new();
        while let Some(current) = queue.pop_front() {
            members.push(current);
            let segment = &sorted[current];

            for (candidate, other) in sorted.iter().enumerate() {
                if used[candidate] {
                    continue;
                }
                let dy = segment.y.abs_diff(other.y) as f64;
                if dy <= max_gap && segment.overlaps(other, settings.overlap_tolerance) {
                    used[candidate] = true;
                    queue.push_back(candidate);
                }
            }
        }

        blobs.push(build_blob(&sorted, &members));
    }

    blobs
}

fn build_blob(segments: &[Segment], members: &[usize]) -> Blob {
    let mut min_x = u32::MAX;
    let mut max_x = 0;
    let mut min_y = u32::MAX;
    let mut max_y = 0;
    let mut score = 0.0;

    for &idx in members {
        let segment = &segments[idx];
        min_x = min_x.min(segment.x_start);
        max_x = max_x.max(segment.x_end);
        min_y = min_y.min(segment.y);
        max_y = max_y.max(segment.y);
        score += segment.score;
    }

    Blob {
        min_x,
        max_x,
        min_y,
        max_y,
        center_x: (min_x + max_x) as f64 / 2.0,
        center_y: (min_y + max_y) as f64 / 2.0,
        score,
        segment_count: members.len(),
    }
}

/// Samples the search band and clusters what it finds
pub struct BlobDetector<'a> {
    settings: &'a Settings,
}

impl<'a> BlobDetector<'a> {
    pub fn new(settings: &'a Settings) -> Self {
        Self { settings }
    }

    /// Collect every segment in the search band, one row at a time
    pub fn scan_segments(
        &self,
        sampler: &dyn ScanlineSampler,
    ) -> Result<Vec<Segment>, VisionError> {
        let (_, height) = sampler.dimensions();
        let (top, bottom) = self.settings.band.rows(height);
        let step = self.settings.band.row_step.max(1);

        let mut segments = Vec::new();
        for y in (top..bottom).step_by(step as usize) {
            let row = sampler.full_row(y)?;
            segments.extend(find_segments(
                y,
                &row,
                &self.settings.white,
                self.settings.segments.min_run_width,
            ));
        }

        Ok(segments)
    }

    /// Find all blobs in the search band. An empty band yields no blobs.
    pub fn detect(&self, sampler: &dyn ScanlineSampler) -> Result<Vec<Blob>, VisionError> {
        let segments = self.scan_segments(sampler)?;
        let blobs = cluster_segments(
            &segments,
            self.settings.band.row_step.max(1),
            &self.settings.segments,
        );

        log::debug!(
            "Blob scan found {} segments in {} blobs",
            segments.len(),
            blobs.len()
        );

        Ok(blobs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vision::capture::FrameSampler;
    use image::{ImageBuffer, Rgba, RgbaImage};
    use imageproc::drawing::draw_filled_rect_mut;
    use imageproc::rect::Rect;

    const WHITE: Rgb<u8> = Rgb([250, 250, 250]);
    const DARK: Rgb<u8> = Rgb([40, 60, 80]);

    fn row_with_run(len: usize, start: usize, end: usize) -> Vec<Rgb<u8>> {
        (0..len)
            .map(|x| if x >= start && x < end { WHITE } else { DARK })
            .collect()
    }

    fn segment(y: u32, x_start: u32, x_end: u32) -> Segment {
        Segment {
            y,
            x_start,
            x_end,
            score: 0.98,
        }
    }

    #[test]
    fn test_white_predicate() {
        let threshold = WhiteThreshold::default();

        assert!(is_white(&Rgb([255, 255, 255]), &threshold));
        assert!(is_white(&Rgb([230, 235, 240]), &threshold));
        // Bright but tinted
        assert!(!is_white(&Rgb([255, 255, 200]), &threshold));
        // Grey
        assert!(!is_white(&Rgb([200, 200, 200]), &threshold));
    }

    #[test]
    fn test_single_run_yields_one_segment() {
        let row = row_with_run(40, 10, 20);
        let segments = find_segments(7, &row, &WhiteThreshold::default(), 3);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].y, 7);
        assert_eq!(segments[0].x_start, 10);
        assert_eq!(segments[0].x_end, 20);
        assert!((segments[0].score - luminance(&WHITE) / 255.0).abs() < 1e-9);
    }

    #[test]
    fn test_narrow_run_is_noise() {
        let row = row_with_run(40, 10, 12);
        assert!(find_segments(0, &row, &WhiteThreshold::default(), 3).is_empty());
    }

    #[test]
    fn test_run_reaching_row_end() {
        let row = row_with_run(30, 25, 30);
        let segments = find_segments(0, &row, &WhiteThreshold::default(), 3);

        assert_eq!(segments.len(), 1);
        assert_eq!(segments[0].x_end, 30);
    }

    #[test]
    fn test_multiple_runs() {
        let mut row = row_with_run(60, 5, 15);
        for pixel in row.iter_mut().take(50).skip(30) {
            *pixel = WHITE;
        }
        let segments = find_segments(0, &row, &WhiteThreshold::default(), 3);

        let ranges: Vec<(u32, u32)> = segments.iter().map(|s| (s.x_start, s.x_end)).collect();
        assert_eq!(ranges, vec![(5, 15), (30, 50)]);
    }

    #[test]
    fn test_nearby_rows_merge() {
        let segments = [segment(100, 20, 35), segment(105, 22, 38)];
        let blobs = cluster_segments(&segments, 5, &SegmentSettings::default());

        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].segment_count, 2);
        assert_eq!((blobs[0].min_x, blobs[0].max_x), (20, 38));
        assert_eq!((blobs[0].min_y, blobs[0].max_y), (100, 105));
        assert_eq!(blobs[0].height(), 5);
        assert_eq!(blobs[0].center_x, 29.0);
        assert_eq!(blobs[0].center_y, 102.5);
    }

    #[test]
    fn test_single_row_blob_is_flat() {
        let blobs = cluster_segments(&[segment(100, 20, 35)], 5, &SegmentSettings::default());

        assert_eq!(blobs[0].height(), 0);
        assert_eq!(blobs[0].aspect_ratio(), 0.0);
    }

    #[test]
    fn test_distant_rows_stay_separate() {
        let segments = [segment(100, 20, 35), segment(150, 20, 35)];
        let blobs = cluster_segments(&segments, 5, &SegmentSettings::default());

        assert_eq!(blobs.len(), 2);
    }

    #[test]
    fn test_overlap_tolerance() {
        let settings = SegmentSettings::default();

        // Two-pixel gap is bridged
        let close = [segment(0, 0, 10), segment(5, 12, 20)];
        assert_eq!(cluster_segments(&close, 5, &settings).len(), 1);

        // Three-pixel gap is not
        let apart = [segment(0, 0, 10), segment(5, 13, 20)];
        assert_eq!(cluster_segments(&apart, 5, &settings).len(), 2);
    }

    #[test]
    fn test_chain_through_intermediate_rows() {
        // Unsorted input, linked only through the middle segment
        let segments = [
            segment(10, 30, 40),
            segment(0, 0, 12),
            segment(5, 10, 32),
        ];
        let blobs = cluster_segments(&segments, 5, &SegmentSettings::default());

        assert_eq!(blobs.len(), 1);
        assert_eq!(blobs[0].segment_count, 3);
    }

    #[test]
    fn test_every_segment_in_one_blob() {
        let segments = [
            segment(0, 0, 10),
            segment(5, 5, 15),
            segment(0, 100, 110),
            segment(40, 0, 10),
        ];
        let blobs = cluster_segments(&segments, 5, &SegmentSettings::default());

        let total: usize = blobs.iter().map(|b| b.segment_count).sum();
        assert_eq!(blobs.len(), 3);
        assert_eq!(total, segments.len());
    }

    #[test]
    fn test_detect_square_in_band() {
        let settings = Settings::default();
        let mut frame: RgbaImage = ImageBuffer::from_pixel(200, 400, Rgba([30, 40, 60, 255]));
        // Band is rows 40..180
        draw_filled_rect_mut(
            &mut frame,
            Rect::at(90, 100).of_size(20, 20),
            Rgba([255, 255, 255, 255]),
        );

        let sampler = FrameSampler::new(&frame);
        let blobs = BlobDetector::new(&settings).detect(&sampler).unwrap();

        assert_eq!(blobs.len(), 1);
        let blob = &blobs[0];
        assert_eq!((blob.min_x, blob.max_x), (90, 110));
        assert_eq!(blob.segment_count, 4);
        // Rows 100, 105, 110 and 115 are sampled
        assert_eq!((blob.min_y, blob.max_y), (100, 115));
        assert_eq!(blob.height(), 15);
        assert!((blob.brightness() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_detect_ignores_outside_band() {
        let settings = Settings::default();
        let mut frame: RgbaImage = ImageBuffer::from_pixel(200, 400, Rgba([30, 40, 60, 255]));
        // Below the 45% cutoff, where the creature art sits
        draw_filled_rect_mut(
            &mut frame,
            Rect::at(90, 300).of_size(20, 20),
            Rgba([255, 255, 255, 255]),
        );

        let sampler = FrameSampler::new(&frame);
        let blobs = BlobDetector::new(&settings).detect(&sampler).unwrap();
        assert!(blobs.is_empty());
    }
}
