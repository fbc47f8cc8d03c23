use crate::domain::model::{ChartConfig, ChartPoint, LegendPosition};
use crate::utils::error::{DashError, Result};
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::fs::remove_file;

const SERIES_NAME: &str = "Annual Cost";

/// Output dimensions for locally rendered charts.
#[derive(Debug, Clone, Copy)]
pub struct RenderDimensions {
    pub width: u32,
    pub height: u32,
}

impl Default for RenderDimensions {
    fn default() -> Self {
        Self {
            width: 900,
            height: 500,
        }
    }
}

fn render_err<E: std::fmt::Display>(e: E) -> DashError {
    DashError::RenderError {
        message: e.to_string(),
    }
}

/// Renders a comparative bar chart as PNG bytes.
///
/// Pure function of the series and the style configuration: fill color, bar
/// width, opacity, legend position and font are taken verbatim from the
/// configuration (which guarantees its own ranges). Category labels are
/// rotated for readability and bar values carry a formatted cost label.
pub fn render_bar_chart(
    data: &[ChartPoint],
    config: &ChartConfig,
    title: &str,
    dimensions: RenderDimensions,
) -> Result<Vec<u8>> {
    if data.is_empty() {
        return Err(DashError::RenderError {
            message: "empty series".to_string(),
        });
    }

    // BitMapBackend 先寫暫存檔，完成後讀回 bytes 再刪掉
    let tmp_path = std::env::temp_dir().join(format!(
        "chart_dash_render_{}.png",
        std::process::id()
    ));
    let tmp = tmp_path.to_string_lossy().into_owned();

    {
        let root =
            BitMapBackend::new(&tmp, (dimensions.width, dimensions.height)).into_drawing_area();
        root.fill(&WHITE).map_err(render_err)?;

        let n = data.len() as i32;
        let max_value = data.iter().map(|p| p.value).fold(0.0_f64, f64::max);
        let y_max = if max_value > 0.0 { max_value * 1.15 } else { 1.0 };

        let (r, g, b) = config.fill_rgb();
        let fill = RGBColor(r, g, b).mix(config.opacity);

        let font = (config.font_family.as_str(), config.font_size).into_font();
        let label_font = TextStyle::from(font.clone()).color(&BLACK);

        let mut chart = ChartBuilder::on(&root)
            .caption(title, font.clone().resize(config.font_size as f64 + 6.0))
            .margin(10)
            .x_label_area_size(80)
            .y_label_area_size(70)
            .build_cartesian_2d((0..n).into_segmented(), 0.0..y_max)
            .map_err(render_err)?;

        let categories: Vec<String> = data.iter().map(|p| p.category.clone()).collect();

        chart
            .configure_mesh()
            .y_desc(SERIES_NAME)
            .axis_desc_style(label_font.clone())
            .x_labels(data.len())
            // 類別名稱轉 90 度，長名稱也不會互相蓋住
            .x_label_style(label_font.clone().transform(FontTransform::Rotate90))
            .x_label_formatter(&|seg| match seg {
                SegmentValue::CenterOf(i) | SegmentValue::Exact(i) => categories
                    .get(*i as usize)
                    .cloned()
                    .unwrap_or_default(),
                SegmentValue::Last => String::new(),
            })
            .y_label_style(label_font.clone())
            .y_label_formatter(&|v| format_cost(*v))
            .draw()
            .map_err(render_err)?;

        // 由畫布像素寬換算 bar 的邊距，讓 bar_width 以像素為單位生效
        let (x_pixels, _) = chart.plotting_area().get_pixel_range();
        let slot_px = ((x_pixels.end - x_pixels.start).max(1) as u32) / (n as u32).max(1);
        let margin_px = bar_margin_px(slot_px, config.bar_width);

        chart
            .draw_series(data.iter().enumerate().map(|(i, point)| {
                let i = i as i32;
                let mut rect = Rectangle::new(
                    [
                        (SegmentValue::Exact(i), 0.0),
                        (SegmentValue::Exact(i + 1), point.value),
                    ],
                    fill.filled(),
                );
                rect.set_margin(0, 0, margin_px, margin_px);
                rect
            }))
            .map_err(render_err)?
            .label(SERIES_NAME)
            .legend(move |(x, y)| {
                Rectangle::new([(x, y - 5), (x + 12, y + 5)], fill.filled())
            });

        // 每根 bar 上方標出格式化後的金額
        let value_style = label_font
            .clone()
            .pos(Pos::new(HPos::Center, VPos::Bottom));
        chart
            .draw_series(data.iter().enumerate().map(|(i, point)| {
                Text::new(
                    format_cost(point.value),
                    (SegmentValue::CenterOf(i as i32), point.value),
                    value_style.clone(),
                )
            }))
            .map_err(render_err)?;

        let legend_position = match config.legend_position {
            LegendPosition::Top => SeriesLabelPosition::UpperMiddle,
            LegendPosition::Bottom => SeriesLabelPosition::LowerMiddle,
        };

        chart
            .configure_series_labels()
            .position(legend_position)
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .label_font(label_font)
            .draw()
            .map_err(render_err)?;

        root.present().map_err(render_err)?;
    }

    let png_data = std::fs::read(&tmp_path)?;
    remove_file(&tmp_path)?;
    Ok(png_data)
}

/// Pixel margin applied to each side of a bar so that the bar occupies
/// `bar_width` pixels of its slot (full slot when the slot is narrower).
fn bar_margin_px(slot_px: u32, bar_width: u32) -> u32 {
    slot_px.saturating_sub(bar_width) / 2
}

/// Formats a cost value with thousands separators and the currency suffix,
/// e.g. `1234567.0` -> `"1,234,567 €"`.
pub fn format_cost(value: f64) -> String {
    let rounded = value.round() as i64;
    let negative = rounded < 0;
    let digits = rounded.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3 + 2);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    if negative {
        format!("-{} €", grouped)
    } else {
        format!("{} €", grouped)
    }
}

/// Reads a chart series from CSV with a `category,value` header.
pub fn load_series_from_csv<R: std::io::Read>(reader: R) -> Result<Vec<ChartPoint>> {
    let mut csv_reader = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
    let mut points = Vec::new();
    for record in csv_reader.deserialize() {
        let point: ChartPoint = record?;
        points.push(point);
    }
    Ok(points)
}

/// Serializes a chart series back to `category,value` CSV, for bundling the
/// rendered data next to the image.
pub fn series_to_csv(data: &[ChartPoint]) -> Result<String> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    for point in data {
        writer.serialize(point)?;
    }
    let bytes = writer
        .into_inner()
        .map_err(|e| DashError::RenderError {
            message: e.to_string(),
        })?;
    String::from_utf8(bytes).map_err(|e| DashError::RenderError {
        message: e.to_string(),
    })
}
