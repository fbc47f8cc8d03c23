use crate::utils::error::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One user-chosen spreadsheet, held in memory for the duration of a
/// selection. Dropped on remove/clear.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectedFile {
    pub name: String,
    pub size: u64,
    pub bytes: Vec<u8>,
}

impl SelectedFile {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        let size = bytes.len() as u64;
        Self { name, size, bytes }
    }

    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path)?;
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("upload.xlsx")
            .to_string();
        Ok(Self::new(name, bytes))
    }

    /// Scenario label shown in comparative charts: the filename with its
    /// final extension stripped ("Q1.xlsx" -> "Q1").
    pub fn scenario_label(&self) -> String {
        match self.name.rsplit_once('.') {
            Some((stem, _)) if !stem.is_empty() => stem.to_string(),
            _ => self.name.clone(),
        }
    }
}

/// Opaque reference to the server-side artifact derived from one uploaded
/// spreadsheet (the upload endpoint's `json_path`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProcessedFileRef(pub String);

impl ProcessedFileRef {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// One generated chart, as returned by the generation endpoint. The server
/// answers with either absolute URLs or server-relative paths depending on
/// deployment; both shapes resolve to a fetchable URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartResult {
    Url(String),
    Path(String),
}

impl ChartResult {
    /// Resolve to an absolute URL against the chart base address. Path
    /// variants keep only the trailing segment and are served from
    /// `<base>/charts/`; some deployments put absolute URLs under the path
    /// key, which pass through unchanged.
    pub fn resolve(&self, base: &str) -> String {
        match self {
            ChartResult::Url(url) => url.clone(),
            ChartResult::Path(path) => {
                if path.starts_with("http://") || path.starts_with("https://") {
                    return path.clone();
                }
                let segment = path.rsplit('/').next().unwrap_or(path);
                format!("{}/charts/{}", base.trim_end_matches('/'), segment)
            }
        }
    }

    /// Local filename to store the chart under.
    pub fn file_name(&self, index: usize) -> String {
        let raw = match self {
            ChartResult::Url(url) => url.as_str(),
            ChartResult::Path(path) => path.as_str(),
        };
        let segment = raw.rsplit('/').next().unwrap_or(raw);
        // 去掉查詢字串（Supabase 公開 URL 會帶 token）
        let segment = segment.split('?').next().unwrap_or(segment);
        if segment.is_empty() {
            format!("chart_{}.png", index + 1)
        } else {
            segment.to_string()
        }
    }
}

/// One bar of a locally rendered comparative chart.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub category: String,
    pub value: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum LegendPosition {
    #[default]
    Top,
    Bottom,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
pub enum FontFamily {
    #[default]
    Arial,
    Helvetica,
    #[serde(rename = "Times New Roman")]
    TimesNewRoman,
    #[serde(rename = "sans-serif")]
    SansSerif,
}

impl FontFamily {
    pub fn as_str(&self) -> &'static str {
        match self {
            FontFamily::Arial => "Arial",
            FontFamily::Helvetica => "Helvetica",
            FontFamily::TimesNewRoman => "Times New Roman",
            FontFamily::SansSerif => "sans-serif",
        }
    }
}

pub const BAR_WIDTH_RANGE: (u32, u32) = (1, 50);
pub const FONT_SIZE_RANGE: (u32, u32) = (8, 24);

/// Chart styling. Every field is always present and within its documented
/// range; mutation happens by whole-object replacement through the `with_*`
/// constructors, so a renderer never observes a half-updated value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartConfig {
    pub fill_color: String,
    pub bar_width: u32,
    pub opacity: f64,
    pub legend_position: LegendPosition,
    pub font_family: FontFamily,
    pub font_size: u32,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            fill_color: "#8884d8".to_string(),
            bar_width: 30,
            opacity: 0.8,
            legend_position: LegendPosition::Top,
            font_family: FontFamily::Arial,
            font_size: 12,
        }
    }
}

impl ChartConfig {
    /// Replaces the fill color. An unparseable value keeps the previous
    /// color so the configuration stays valid.
    pub fn with_fill_color(self, color: impl Into<String>) -> Self {
        let color = color.into();
        if parse_hex_color(&color).is_some() {
            Self {
                fill_color: color,
                ..self
            }
        } else {
            self
        }
    }

    pub fn with_bar_width(self, width: u32) -> Self {
        Self {
            bar_width: width.clamp(BAR_WIDTH_RANGE.0, BAR_WIDTH_RANGE.1),
            ..self
        }
    }

    pub fn with_opacity(self, opacity: f64) -> Self {
        Self {
            opacity: opacity.clamp(0.0, 1.0),
            ..self
        }
    }

    pub fn with_legend_position(self, position: LegendPosition) -> Self {
        Self {
            legend_position: position,
            ..self
        }
    }

    pub fn with_font_family(self, family: FontFamily) -> Self {
        Self {
            font_family: family,
            ..self
        }
    }

    pub fn with_font_size(self, size: u32) -> Self {
        Self {
            font_size: size.clamp(FONT_SIZE_RANGE.0, FONT_SIZE_RANGE.1),
            ..self
        }
    }

    pub fn fill_rgb(&self) -> (u8, u8, u8) {
        // 建構子保證顏色永遠可解析
        parse_hex_color(&self.fill_color).unwrap_or((0x88, 0x84, 0xd8))
    }
}

/// Parses a `#RRGGBB` color string.
pub fn parse_hex_color(value: &str) -> Option<(u8, u8, u8)> {
    let hex = value.strip_prefix('#')?;
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

/// Authenticated session, injected explicitly into everything that needs a
/// user identity. There is no process-wide current user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    pub access_token: String,
    pub user_id: String,
}

/// Row in the `uploads` table. Ids and timestamps are server-generated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadRecord {
    pub id: String,
    pub user_id: String,
    pub filename: String,
    pub file_path: String,
    pub json_path: String,
    pub created_at: DateTime<Utc>,
}

/// Row in the `charts` table; references the upload it was generated from.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartRecord {
    pub id: String,
    pub user_id: String,
    pub upload_id: String,
    pub chart_path: String,
    pub chart_type: String,
    pub created_at: DateTime<Utc>,
}

/// Row in the `user_data` table. The preferences blob is opaque to this
/// client and handed back to the store verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UserDataRecord {
    pub id: String,
    pub user_id: String,
    pub preferences: serde_json::Value,
    pub created_at: DateTime<Utc>,
}
