pub mod dashboard;
pub mod gallery;
pub mod records;
pub mod renderer;
pub mod selection;
pub mod style;

pub use crate::domain::model::{
    ChartConfig, ChartPoint, ChartResult, ProcessedFileRef, SelectedFile,
};
pub use crate::domain::ports::{ConfigProvider, DashboardRepository, ProcessingApi, Storage};
pub use crate::utils::error::Result;
