//! Renders the recent-spending line chart as an in-memory PNG.

use image::{ExtendedColorType, ImageEncoder, codecs::png::PngEncoder};
use plotters::prelude::*;

use crate::{Error, report::DayTotal};

const CHART_WIDTH: u32 = 800;
const CHART_HEIGHT: u32 = 400;
const LINE_COLOR: RGBColor = RGBColor(54, 162, 235);

/// Draw the daily totals as a line chart and encode it as a PNG.
///
/// Each point is one day with recorded spending, in ascending date order and
/// labelled `DD.MM`. Days without spending are not drawn.
///
/// # Errors
///
/// Returns [Error::EmptyChart] when `series` is empty, or
/// [Error::ChartError] when drawing or encoding fails.
pub fn render_series_chart(series: &[DayTotal]) -> Result<Vec<u8>, Error> {
    if series.is_empty() {
        return Err(Error::EmptyChart);
    }

    let labels: Vec<String> = series
        .iter()
        .map(|day| format!("{:02}.{:02}", day.date.day(), u8::from(day.date.month())))
        .collect();
    let ceiling = series.iter().map(|day| day.total).fold(0.0, f64::max) * 1.15;

    let mut buffer = vec![0u8; (CHART_WIDTH * CHART_HEIGHT * 3) as usize];
    let mut png_buffer = Vec::new();
    {
        let root =
            BitMapBackend::with_buffer(&mut buffer, (CHART_WIDTH, CHART_HEIGHT)).into_drawing_area();

        root.fill(&WHITE)
            .map_err(|error| Error::ChartError(error.to_string()))?;

        let mut chart = ChartBuilder::on(&root)
            .caption("Витрати за 7 днів", ("sans-serif", 24).into_font())
            .margin(12)
            .x_label_area_size(36)
            .y_label_area_size(56)
            .build_cartesian_2d(0..series.len(), 0.0..ceiling)
            .map_err(|error| Error::ChartError(error.to_string()))?;

        chart
            .configure_mesh()
            .light_line_style(&BLACK.mix(0.1))
            .y_desc("грн")
            .x_labels(series.len())
            .x_label_formatter(&|index| labels.get(*index).cloned().unwrap_or_default())
            .draw()
            .map_err(|error| Error::ChartError(error.to_string()))?;

        chart
            .draw_series(LineSeries::new(
                series
                    .iter()
                    .enumerate()
                    .map(|(index, day)| (index, day.total)),
                LINE_COLOR.stroke_width(2),
            ))
            .map_err(|error| Error::ChartError(error.to_string()))?;

        chart
            .draw_series(
                series
                    .iter()
                    .enumerate()
                    .map(|(index, day)| Circle::new((index, day.total), 4, LINE_COLOR.filled())),
            )
            .map_err(|error| Error::ChartError(error.to_string()))?;

        root.present()
            .map_err(|error| Error::ChartError(error.to_string()))?;
    }

    let encoder = PngEncoder::new(&mut png_buffer);
    encoder
        .write_image(&buffer, CHART_WIDTH, CHART_HEIGHT, ExtendedColorType::Rgb8)
        .map_err(|error| Error::ChartError(error.to_string()))?;

    Ok(png_buffer)
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::{Error, chart::render_series_chart, report::DayTotal};

    #[test]
    fn empty_series_is_an_error() {
        assert_eq!(render_series_chart(&[]), Err(Error::EmptyChart));
    }

    #[test]
    fn series_renders_to_a_png() {
        let series = vec![
            DayTotal {
                date: date!(2025 - 06 - 13),
                total: 150.0,
            },
            DayTotal {
                date: date!(2025 - 06 - 14),
                total: 80.5,
            },
            DayTotal {
                date: date!(2025 - 06 - 16),
                total: 310.0,
            },
        ];

        let png = render_series_chart(&series).unwrap();

        assert!(png.starts_with(&[0x89, b'P', b'N', b'G']));
    }
}
