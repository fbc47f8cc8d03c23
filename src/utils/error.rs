use thiserror::Error;

#[derive(Error, Debug)]
pub enum DashError {
    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Zip operation failed: {0}")]
    ZipError(#[from] zip::result::ZipError),

    #[error("no files selected")]
    NoFilesSelected,

    #[error("upload of '{filename}' rejected with status {status}")]
    UploadFailed { filename: String, status: u16 },

    #[error("chart generation rejected with status {status}: {message}")]
    GenerationFailed { status: u16, message: String },

    #[error("authentication rejected")]
    AuthFailed,

    #[error("store request failed with status {status}: {message}")]
    StoreError { status: u16, message: String },

    #[error("chart rendering failed: {message}")]
    RenderError { message: String },

    #[error("Invalid value for {field}: '{value}' ({reason})")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Config,
    Network,
    Processing,
    Auth,
    Store,
    Render,
    Io,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl DashError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            DashError::ApiError(_) => ErrorCategory::Network,
            DashError::IoError(_) | DashError::ZipError(_) => ErrorCategory::Io,
            DashError::SerializationError(_) | DashError::CsvError(_) => ErrorCategory::Processing,
            DashError::NoFilesSelected
            | DashError::UploadFailed { .. }
            | DashError::GenerationFailed { .. } => ErrorCategory::Processing,
            DashError::AuthFailed => ErrorCategory::Auth,
            DashError::StoreError { .. } => ErrorCategory::Store,
            DashError::RenderError { .. } => ErrorCategory::Render,
            DashError::InvalidConfigValueError { .. }
            | DashError::MissingConfigError { .. }
            | DashError::ConfigValidationError { .. } => ErrorCategory::Config,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            // 使用者可以直接修正的錯誤
            DashError::NoFilesSelected => ErrorSeverity::Low,
            DashError::InvalidConfigValueError { .. }
            | DashError::MissingConfigError { .. }
            | DashError::ConfigValidationError { .. } => ErrorSeverity::Medium,
            DashError::ApiError(_)
            | DashError::UploadFailed { .. }
            | DashError::GenerationFailed { .. }
            | DashError::AuthFailed
            | DashError::StoreError { .. } => ErrorSeverity::High,
            DashError::IoError(_)
            | DashError::ZipError(_)
            | DashError::SerializationError(_)
            | DashError::CsvError(_)
            | DashError::RenderError { .. } => ErrorSeverity::Critical,
        }
    }

    /// One generic line per error kind, safe to show to the user. Detailed
    /// diagnostics stay in the log at the call sites.
    pub fn user_friendly_message(&self) -> String {
        match self {
            DashError::NoFilesSelected => "Please select files to process".to_string(),
            DashError::ApiError(_)
            | DashError::UploadFailed { .. }
            | DashError::GenerationFailed { .. } => "Error processing files".to_string(),
            DashError::AuthFailed => "Failed to sign in".to_string(),
            DashError::StoreError { .. } => "Could not reach the data store".to_string(),
            DashError::RenderError { .. } => "Could not render the chart".to_string(),
            DashError::InvalidConfigValueError { field, .. }
            | DashError::MissingConfigError { field }
            | DashError::ConfigValidationError { field, .. } => {
                format!("Configuration problem: {}", field)
            }
            DashError::IoError(_) | DashError::ZipError(_) => {
                "Could not write output files".to_string()
            }
            DashError::SerializationError(_) | DashError::CsvError(_) => {
                "Could not read the input data".to_string()
            }
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            DashError::NoFilesSelected => {
                "Pass at least one .xls/.xlsx file via --files".to_string()
            }
            DashError::ApiError(_) => {
                "Check that the processing service is running and --api-base is correct"
                    .to_string()
            }
            DashError::UploadFailed { filename, .. } => {
                format!("Verify that '{}' is a valid spreadsheet export", filename)
            }
            DashError::GenerationFailed { .. } => {
                "Re-run with --verbose and inspect the processing service logs".to_string()
            }
            DashError::AuthFailed => "Check the email/password and Supabase key".to_string(),
            DashError::StoreError { .. } => {
                "Check the Supabase URL, API key and table policies".to_string()
            }
            DashError::RenderError { .. } => {
                "Check that the series data is non-empty and the output path is writable"
                    .to_string()
            }
            DashError::InvalidConfigValueError { reason, .. } => reason.clone(),
            DashError::MissingConfigError { field } => {
                format!("Provide '{}' via flag, config file or environment", field)
            }
            DashError::ConfigValidationError { message, .. } => message.clone(),
            DashError::IoError(_) | DashError::ZipError(_) => {
                "Check permissions on the output directory".to_string()
            }
            DashError::SerializationError(_) | DashError::CsvError(_) => {
                "Check the format of the input data".to_string()
            }
        }
    }
}

pub type Result<T> = std::result::Result<T, DashError>;
