use crate::domain::model::{ChartConfig, FontFamily, LegendPosition};

/// Per-field style changes collected from the control surface (CLI flags or
/// the TOML `[style]` table). Applying them builds a brand-new `ChartConfig`
/// through the clamping constructors; fields are never mutated in place, so
/// the renderer always observes a fully valid configuration.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StyleOverrides {
    pub fill_color: Option<String>,
    pub bar_width: Option<u32>,
    pub opacity: Option<f64>,
    pub legend_position: Option<LegendPosition>,
    pub font_family: Option<FontFamily>,
    pub font_size: Option<u32>,
}

impl StyleOverrides {
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }

    /// Produces the replacement configuration.
    pub fn apply(&self, base: ChartConfig) -> ChartConfig {
        let mut config = base;
        if let Some(color) = &self.fill_color {
            config = config.with_fill_color(color.clone());
        }
        if let Some(width) = self.bar_width {
            config = config.with_bar_width(width);
        }
        if let Some(opacity) = self.opacity {
            config = config.with_opacity(opacity);
        }
        if let Some(position) = self.legend_position {
            config = config.with_legend_position(position);
        }
        if let Some(family) = self.font_family {
            config = config.with_font_family(family);
        }
        if let Some(size) = self.font_size {
            config = config.with_font_size(size);
        }
        config
    }
}
