use crate::domain::ports::ConfigProvider;
use crate::utils::error::{DashError, Result};
use crate::utils::validation::{
    validate_path, validate_spreadsheet_files, validate_url, Validate,
};
use clap::Parser;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, Parser)]
#[command(name = "chart-dash")]
#[command(about = "Upload spreadsheet exports and fetch the generated comparative charts")]
pub struct CliConfig {
    /// Base address of the processing service
    #[arg(long, default_value = "http://localhost:5000")]
    pub api_base: String,

    /// Base address charts are served from (defaults to --api-base)
    #[arg(long)]
    pub chart_base: Option<String>,

    /// Spreadsheet files to process (.xls/.xlsx, comma separated)
    #[arg(long, value_delimiter = ',')]
    pub files: Vec<String>,

    /// Directory the downloaded charts are written to
    #[arg(long, default_value = "./charts")]
    pub output_path: String,

    /// Bundle the downloaded charts into charts_bundle.zip
    #[arg(long)]
    pub archive: bool,

    /// Skip the processing-service health probe before uploading
    #[arg(long)]
    pub skip_health_check: bool,

    /// Supabase project URL (enables run recording)
    #[arg(long)]
    pub supabase_url: Option<String>,

    /// Supabase anon API key
    #[arg(long)]
    pub supabase_key: Option<String>,

    /// Account email for sign-in
    #[arg(long)]
    pub email: Option<String>,

    /// Account password for sign-in
    #[arg(long)]
    pub password: Option<String>,

    #[arg(long, help = "Enable verbose output")]
    pub verbose: bool,

    #[arg(long, help = "Log process CPU/memory statistics")]
    pub monitor: bool,
}

impl CliConfig {
    /// Whether the run should be recorded in the hosted store.
    pub fn persistence_enabled(&self) -> bool {
        self.supabase_url.is_some()
    }
}

impl ConfigProvider for CliConfig {
    fn api_base(&self) -> &str {
        &self.api_base
    }

    fn chart_base(&self) -> &str {
        self.chart_base.as_deref().unwrap_or(&self.api_base)
    }

    fn output_path(&self) -> &str {
        &self.output_path
    }
}

impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        validate_url("api_base", &self.api_base)?;
        if let Some(chart_base) = &self.chart_base {
            validate_url("chart_base", chart_base)?;
        }
        validate_path("output_path", &self.output_path)?;
        validate_spreadsheet_files("files", &self.files)?;

        // Supabase 參數要嘛全有，要嘛全沒有
        if self.persistence_enabled() {
            let url = self.supabase_url.as_deref().unwrap_or_default();
            validate_url("supabase_url", url)?;
            if self.supabase_key.is_none() {
                return Err(DashError::MissingConfigError {
                    field: "supabase_key".to_string(),
                });
            }
            if self.email.is_none() || self.password.is_none() {
                return Err(DashError::MissingConfigError {
                    field: "email/password".to_string(),
                });
            }
        }

        Ok(())
    }
}
