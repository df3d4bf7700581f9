use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceEntry {
    pub filename: String,
    pub bytes: u64,
    pub sha256: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SourceInventoryManifest {
    pub manifest_version: u32,
    pub generated_at: String,
    pub source_directory: String,
    pub document_count: usize,
    pub documents: Vec<SourceEntry>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractPaths {
    pub html_dir: String,
    pub db_path: String,
    pub manifest_path: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableStatus {
    Rebuilt,
    Empty,
    Failed,
}

#[derive(Debug, Clone, Serialize)]
pub struct TableOutcome {
    pub table: String,
    pub document: String,
    pub document_sha256: Option<String>,
    pub status: TableStatus,
    pub records: usize,
    pub statements: usize,
    pub columns: Vec<String>,
    pub failure_reason: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ExtractRunManifest {
    pub manifest_version: u32,
    pub run_id: String,
    pub status: String,
    pub started_at: String,
    pub updated_at: String,
    pub strict_text: bool,
    pub paths: ExtractPaths,
    pub tables: Vec<TableOutcome>,
    pub notes: Vec<String>,
}
