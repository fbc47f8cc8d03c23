use crate::core::style::StyleOverrides;
use crate::domain::model::{FontFamily, LegendPosition};
use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashError, Result};
use crate::utils::validation::Validate;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    pub dashboard: DashboardMeta,
    pub api: ApiConfig,
    pub files: FilesConfig,
    pub style: Option<StyleConfig>,
    pub output: OutputConfig,
    pub persistence: Option<PersistenceConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardMeta {
    pub name: String,
    pub description: String,
    pub version: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    pub base_url: String,
    pub chart_base_url: Option<String>,
    pub health_check: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FilesConfig {
    pub inputs: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StyleConfig {
    pub fill_color: Option<String>,
    pub bar_width: Option<u32>,
    pub opacity: Option<f64>,
    pub legend_position: Option<LegendPosition>,
    pub font_family: Option<FontFamily>,
    pub font_size: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub path: String,
    pub archive: Option<bool>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PersistenceConfig {
    pub supabase_url: String,
    pub supabase_key: String,
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_format: Option<String>,
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(DashError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        // 處理環境變數替換
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| DashError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${SUPABASE_KEY})
    fn substitute_env_vars(content: &str) -> Result<String> {
        use regex::Regex;
        let re = Regex::new(r"\$\{([^}]+)\}").unwrap();

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        crate::utils::validation::validate_url("api.base_url", &self.api.base_url)?;
        if let Some(chart_base) = &self.api.chart_base_url {
            crate::utils::validation::validate_url("api.chart_base_url", chart_base)?;
        }

        crate::utils::validation::validate_path("output.path", &self.output.path)?;
        crate::utils::validation::validate_spreadsheet_files("files.inputs", &self.files.inputs)?;

        if let Some(persistence) = &self.persistence {
            crate::utils::validation::validate_url(
                "persistence.supabase_url",
                &persistence.supabase_url,
            )?;
            crate::utils::validation::validate_non_empty_string(
                "persistence.supabase_key",
                &persistence.supabase_key,
            )?;
        }

        // 風格值在套用時也會被夾住，這裡先擋掉明顯寫錯的配置
        if let Some(style) = &self.style {
            if let Some(width) = style.bar_width {
                crate::utils::validation::validate_range("style.bar_width", width, 1, 50)?;
            }
            if let Some(opacity) = style.opacity {
                crate::utils::validation::validate_range("style.opacity", opacity, 0.0, 1.0)?;
            }
            if let Some(size) = style.font_size {
                crate::utils::validation::validate_range("style.font_size", size, 8, 24)?;
            }
        }

        Ok(())
    }

    pub fn health_check_enabled(&self) -> bool {
        self.api.health_check.unwrap_or(true)
    }

    pub fn archive_enabled(&self) -> bool {
        self.output.archive.unwrap_or(false)
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn json_logging(&self) -> bool {
        self.monitoring
            .as_ref()
            .and_then(|m| m.log_format.as_deref())
            .map(|format| format.eq_ignore_ascii_case("json"))
            .unwrap_or(false)
    }

    /// 把 [style] 表轉成可套用的覆寫集合
    pub fn style_overrides(&self) -> StyleOverrides {
        match &self.style {
            Some(style) => StyleOverrides {
                fill_color: style.fill_color.clone(),
                bar_width: style.bar_width,
                opacity: style.opacity,
                legend_position: style.legend_position,
                font_family: style.font_family,
                font_size: style.font_size,
            },
            None => StyleOverrides::default(),
        }
    }
}

impl ConfigProvider for TomlConfig {
    fn api_base(&self) -> &str {
        &self.api.base_url
    }

    fn chart_base(&self) -> &str {
        self.api
            .chart_base_url
            .as_deref()
            .unwrap_or(&self.api.base_url)
    }

    fn output_path(&self) -> &str {
        &self.output.path
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}
