use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat, Luma};

/// Side length of the square raster every figure is drawn on.
pub const CANVAS_SIDE: usize = 200;

/// Length of the projection feature vector: one count per column plus one
/// per row.
pub const FEATURE_WIDTH: usize = 2 * CANVAS_SIDE;

/// A square black-and-white raster, indexed `[x][y]`.
#[derive(Debug, Clone)]
pub struct Canvas {
    pixels: Vec<bool>,
}

impl Default for Canvas {
    fn default() -> Self {
        Canvas::new()
    }
}

impl Canvas {
    pub fn new() -> Canvas {
        Canvas { pixels: vec![false; CANVAS_SIDE * CANVAS_SIDE] }
    }

    pub fn clear(&mut self) {
        self.pixels.iter_mut().for_each(|p| *p = false);
    }

    pub fn get(&self, x: usize, y: usize) -> bool {
        x < CANVAS_SIDE && y < CANVAS_SIDE && self.pixels[x * CANVAS_SIDE + y]
    }

    /// Sets one pixel; coordinates outside the canvas are ignored.
    pub fn plot(&mut self, x: i64, y: i64) {
        let side = CANVAS_SIDE as i64;
        if (0..side).contains(&x) && (0..side).contains(&y) {
            self.pixels[x as usize * CANVAS_SIDE + y as usize] = true;
        }
    }

    pub fn filled(&self) -> usize {
        self.pixels.iter().filter(|p| **p).count()
    }

    /// Draws a straight segment with Bresenham's integer line walk; both end
    /// points are included.
    pub fn line(&mut self, x0: i64, y0: i64, x1: i64, y1: i64) {
        let w = x1 - x0;
        let h = y1 - y0;
        let (dx1, dy1) = (w.signum(), h.signum());
        let (mut dx2, mut dy2) = (w.signum(), 0);
        let mut longest = w.abs();
        let mut shortest = h.abs();
        if longest <= shortest {
            std::mem::swap(&mut longest, &mut shortest);
            dx2 = 0;
            dy2 = h.signum();
        }

        let (mut x, mut y) = (x0, y0);
        let mut numerator = longest >> 1;
        for _ in 0..=longest {
            self.plot(x, y);
            numerator += shortest;
            if numerator >= longest {
                numerator -= longest;
                x += dx1;
                y += dy1;
            } else {
                x += dx2;
                y += dy2;
            }
        }
    }

    /// Projects the raster onto both axes: entry `x` counts the set pixels in
    /// column `x`, entry `CANVAS_SIDE + y` those in row `y`.
    ///
    /// With `normalize` the counts are divided by the side length.
    pub fn projection(&self, normalize: bool) -> Vec<f64> {
        let mut features = vec![0.0; FEATURE_WIDTH];
        for x in 0..CANVAS_SIDE {
            for y in 0..CANVAS_SIDE {
                if self.pixels[x * CANVAS_SIDE + y] {
                    features[x] += 1.0;
                    features[CANVAS_SIDE + y] += 1.0;
                }
            }
        }
        if normalize {
            let scale = CANVAS_SIDE as f64;
            features.iter_mut().for_each(|f| *f /= scale);
        }
        features
    }

    /// Black figure on a white background.
    pub fn to_image(&self) -> GrayImage {
        let side = CANVAS_SIDE as u32;
        GrayImage::from_fn(side, side, |x, y| {
            if self.get(x as usize, y as usize) { Luma([0u8]) } else { Luma([255u8]) }
        })
    }

    pub fn to_png(&self) -> Result<Vec<u8>, image::ImageError> {
        let mut bytes = Vec::new();
        DynamicImage::ImageLuma8(self.to_image())
            .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)?;
        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_line_includes_both_ends() {
        let mut canvas = Canvas::new();
        canvas.line(10, 20, 15, 20);
        assert_eq!(canvas.filled(), 6);
        assert!(canvas.get(10, 20) && canvas.get(15, 20));
    }

    #[test]
    fn steep_line_visits_every_row() {
        let mut canvas = Canvas::new();
        canvas.line(50, 10, 53, 30);
        assert_eq!(canvas.filled(), 21);
        assert!(canvas.get(50, 10) && canvas.get(53, 30));
    }

    #[test]
    fn reversed_diagonal_is_symmetric() {
        let mut a = Canvas::new();
        a.line(0, 0, 9, 9);
        let mut b = Canvas::new();
        b.line(9, 9, 0, 0);
        assert_eq!(a.filled(), 10);
        assert_eq!(b.filled(), 10);
        assert!((0..10).all(|i| a.get(i, i) && b.get(i, i)));
    }

    #[test]
    fn plot_ignores_outside_pixels() {
        let mut canvas = Canvas::new();
        canvas.plot(-1, 5);
        canvas.plot(5, CANVAS_SIDE as i64);
        assert_eq!(canvas.filled(), 0);
    }

    #[test]
    fn projection_counts_columns_then_rows() {
        let mut canvas = Canvas::new();
        canvas.line(3, 7, 3, 9);
        let features = canvas.projection(false);
        assert_eq!(features.len(), FEATURE_WIDTH);
        assert_eq!(features[3], 3.0);
        assert_eq!(features[CANVAS_SIDE + 7], 1.0);
        assert_eq!(features[CANVAS_SIDE + 9], 1.0);
        assert_eq!(features.iter().sum::<f64>(), 6.0);

        let scaled = canvas.projection(true);
        assert!((scaled[3] - 3.0 / CANVAS_SIDE as f64).abs() < 1e-12);
    }

    #[test]
    fn clear_resets_everything() {
        let mut canvas = Canvas::new();
        canvas.line(0, 0, 100, 50);
        canvas.clear();
        assert_eq!(canvas.filled(), 0);
    }

    #[test]
    fn png_export_has_signature() {
        let mut canvas = Canvas::new();
        canvas.line(0, 0, 199, 199);
        let png = canvas.to_png().unwrap();
        assert_eq!(&png[..8], &[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]);
    }
}
