//! PNG bar charts.
//!
//! Charts are deliberately plain: one bar per value on a white canvas, with
//! the x and y axes drawn in black. Labels are printed in the markdown
//! report instead of on the image.

use std::path::{Path, PathBuf};

use image::{Rgb, RgbImage};

use crate::AnalyticsError;
use crate::queries::{LabelCount, YearMean};

/// File name of the genre distribution chart.
pub const GENRE_CHART_FILE: &str = "distribucion_generos.png";

/// File name of the mean rating per premiere year chart.
pub const YEAR_CHART_FILE: &str = "puntaje_promedio_por_año.png";

const WIDTH: u32 = 1200;
const HEIGHT: u32 = 600;
const MARGIN: u32 = 40;
/// One pixel column per bar at most.
const MAX_BARS: usize = (WIDTH - 2 * MARGIN) as usize;

const BACKGROUND: Rgb<u8> = Rgb([255, 255, 255]);
const AXIS: Rgb<u8> = Rgb([0, 0, 0]);
const BAR: Rgb<u8> = Rgb([135, 206, 235]);

/// Renders `values` as a bar chart. Negative values are drawn as empty bars.
///
/// Only the first [`MAX_BARS`] values are drawn.
#[must_use]
#[allow(
    clippy::cast_possible_truncation,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss
)]
pub fn render_bars(values: &[f64]) -> RgbImage {
    let mut img = RgbImage::from_pixel(WIDTH, HEIGHT, BACKGROUND);

    let plot_left = MARGIN;
    let plot_right = WIDTH - MARGIN;
    let baseline = HEIGHT - MARGIN;
    let plot_height = HEIGHT - 2 * MARGIN;

    if values.len() > MAX_BARS {
        log::warn!("Chart has {} values; drawing the first {MAX_BARS}", values.len());
    }
    let values = &values[..values.len().min(MAX_BARS)];

    let max = values.iter().copied().fold(0.0_f64, f64::max);
    if !values.is_empty() && max > 0.0 {
        let slot = (plot_right - plot_left) / values.len() as u32;
        let bar_width = (slot * 4 / 5).max(1);
        let gap = slot.saturating_sub(bar_width) / 2;

        for (i, value) in values.iter().enumerate() {
            let height = ((value.max(0.0) / max) * f64::from(plot_height)).round() as u32;
            if height == 0 {
                continue;
            }
            let left = plot_left + i as u32 * slot + gap;
            fill_rect(&mut img, left, baseline - height, bar_width, height, BAR);
            outline_rect(&mut img, left, baseline - height, bar_width, height, AXIS);
        }
    }

    // Axes last so bars never cover them.
    fill_rect(&mut img, plot_left, MARGIN, 2, plot_height, AXIS);
    fill_rect(&mut img, plot_left, baseline, plot_right - plot_left, 2, AXIS);

    img
}

/// Writes the genre distribution chart into `dir`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the directory or the PNG cannot be written.
pub fn write_genre_chart(counts: &[LabelCount], dir: &Path) -> Result<PathBuf, AnalyticsError> {
    #[allow(clippy::cast_precision_loss)]
    let values: Vec<f64> = counts.iter().map(|c| c.count as f64).collect();
    save(&render_bars(&values), &dir.join(GENRE_CHART_FILE))
}

/// Writes the mean rating per premiere year chart into `dir`.
///
/// # Errors
///
/// Returns [`AnalyticsError`] if the directory or the PNG cannot be written.
pub fn write_year_chart(means: &[YearMean], dir: &Path) -> Result<PathBuf, AnalyticsError> {
    let values: Vec<f64> = means.iter().map(|m| m.mean).collect();
    save(&render_bars(&values), &dir.join(YEAR_CHART_FILE))
}

fn save(img: &RgbImage, path: &Path) -> Result<PathBuf, AnalyticsError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }
    img.save(path)?;
    log::info!("Chart written to {}", path.display());
    Ok(path.to_path_buf())
}

fn fill_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    for py in y..(y + height).min(img.height()) {
        for px in x..(x + width).min(img.width()) {
            img.put_pixel(px, py, color);
        }
    }
}

fn outline_rect(img: &mut RgbImage, x: u32, y: u32, width: u32, height: u32, color: Rgb<u8>) {
    fill_rect(img, x, y, width, 1, color);
    fill_rect(img, x, y + height - 1, width, 1, color);
    fill_rect(img, x, y, 1, height, color);
    fill_rect(img, x + width - 1, y, 1, height, color);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tallest_bar_fills_plot_height() {
        let img = render_bars(&[1.0, 2.0]);
        assert_eq!(img.dimensions(), (WIDTH, HEIGHT));

        let slot = (WIDTH - 2 * MARGIN) / 2;
        let center_second = MARGIN + slot + slot / 2;
        assert_eq!(*img.get_pixel(center_second, MARGIN + 5), BAR);

        let center_first = MARGIN + slot / 2;
        assert_eq!(*img.get_pixel(center_first, MARGIN + 5), BACKGROUND);
        assert_eq!(*img.get_pixel(center_first, HEIGHT - MARGIN - 5), BAR);
    }

    #[test]
    fn more_values_than_pixels_are_truncated() {
        let values = vec![1.0; MAX_BARS + 500];
        let img = render_bars(&values);
        assert_ne!(*img.get_pixel(MARGIN + 10, HEIGHT / 2), BACKGROUND);
        assert_eq!(*img.get_pixel(WIDTH - MARGIN + 5, HEIGHT / 2), BACKGROUND);
    }

    #[test]
    fn empty_chart_only_has_axes() {
        let img = render_bars(&[]);
        assert_eq!(*img.get_pixel(MARGIN, HEIGHT / 2), AXIS);
        assert_eq!(*img.get_pixel(WIDTH / 2, HEIGHT / 2), BACKGROUND);
    }

    #[test]
    fn writes_png_files() {
        let dir = std::env::temp_dir().join("series_tv_chart_test");
        let _ = std::fs::remove_dir_all(&dir);

        let counts = vec![
            LabelCount {
                label: "Drama".to_string(),
                count: 3,
            },
            LabelCount {
                label: "Comedia".to_string(),
                count: 1,
            },
        ];
        let path = write_genre_chart(&counts, &dir).unwrap();
        assert!(path.ends_with(GENRE_CHART_FILE));
        let bytes = std::fs::read(&path).unwrap();
        assert_eq!(&bytes[1..4], b"PNG");

        let path = write_year_chart(&[YearMean { year: 2020, mean: 3.5 }], &dir).unwrap();
        assert!(path.exists());

        let _ = std::fs::remove_dir_all(&dir);
    }
}
