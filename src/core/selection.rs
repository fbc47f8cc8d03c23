use crate::domain::model::SelectedFile;

/// In-memory file selection for one upload session: no network side
/// effects, order preserved, never null. Dropped entries are gone for good.
#[derive(Debug, Default)]
pub struct FileSelection {
    files: Vec<SelectedFile>,
}

impl FileSelection {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the current selection with the given files.
    pub fn select_files(&mut self, files: Vec<SelectedFile>) {
        self.files = files;
    }

    /// Removes one entry, preserving the order of the rest. Out-of-range
    /// indices are ignored.
    pub fn remove_file(&mut self, index: usize) {
        if index < self.files.len() {
            self.files.remove(index);
        }
    }

    pub fn clear(&mut self) {
        self.files.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn files(&self) -> &[SelectedFile] {
        &self.files
    }

    /// Scenario labels for the generation request, positionally aligned with
    /// the selected files.
    pub fn scenario_labels(&self) -> Vec<String> {
        self.files.iter().map(|f| f.scenario_label()).collect()
    }
}
