use axum::body::Bytes;

use crate::{
    error::{AppError, Result},
    ingest::{
        columns::{self, ImportDefaults},
        tabular::{self, FileFormat},
    },
    models::student::Student,
    repositories::store::DirectoryStore,
    state::ImportLimiter,
    validation::student_row::{self, RowError},
};

/// How an import treats the records already in the store.
///
/// Chosen by the route that received the upload, never by the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImportMode {
    /// Wipe the collection, then insert the batch.
    ReplaceAll,
    /// Insert the batch next to the existing records.
    Append,
}

/// An uploaded file as received from the multipart form.
#[derive(Debug, Clone)]
pub struct Upload {
    pub file_name: Option<String>,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

/// Why a parsed batch was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportRejection {
    /// At least one row failed validation; one entry per failing row.
    InvalidRows(Vec<RowError>),
    /// The file held no data rows.
    EmptyBatch,
}

/// The result of a batch import.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImportOutcome {
    Rejected(ImportRejection),
    Committed { count: usize, records: Vec<Student> },
}

impl ImportOutcome {
    /// Converts a rejection into the matching `AppError`, passing commits through.
    pub fn into_result(self) -> Result<(usize, Vec<Student>)> {
        match self {
            ImportOutcome::Committed { count, records } => Ok((count, records)),
            ImportOutcome::Rejected(ImportRejection::EmptyBatch) => Err(AppError::EmptyBatch),
            ImportOutcome::Rejected(ImportRejection::InvalidRows(errors)) => Err(
                AppError::ImportRejected(errors.into_iter().map(|e| e.message).collect()),
            ),
        }
    }
}

/// Runs parse → normalize → validate → commit for one uploaded file.
///
/// Every row is validated before the store is touched, so a rejected batch
/// leaves the store exactly as it was in both modes.
///
/// # Arguments
///
/// * `store` - The record store to commit into.
/// * `limiter` - Serializes the commit step across concurrent imports.
/// * `upload` - The uploaded file.
/// * `mode` - Whether existing records are replaced or kept.
/// * `defaults` - Course and batch for rows that lack them.
///
/// # Returns
///
/// `Err` for unsupported formats, unparseable files and store failures;
/// otherwise the `ImportOutcome`.
pub async fn import_batch(
    store: &dyn DirectoryStore,
    limiter: &ImportLimiter,
    upload: Upload,
    mode: ImportMode,
    defaults: &ImportDefaults,
) -> Result<ImportOutcome> {
    let format = FileFormat::detect(upload.file_name.as_deref(), upload.content_type.as_deref())?;

    tracing::info!(
        "📥 Import started - file: {:?}, format: {:?}, size: {} bytes, mode: {:?}",
        upload.file_name,
        format,
        upload.bytes.len(),
        mode
    );

    let bytes = upload.bytes;
    let rows = tokio::task::spawn_blocking(move || tabular::parse(&bytes, format))
        .await
        .map_err(|e| AppError::Internal(format!("Parser task failed: {}", e)))??;

    let mut errors = Vec::new();
    let mut records = Vec::with_capacity(rows.len());
    for (row_index, row) in rows.iter().enumerate() {
        let candidate = columns::normalize(row, defaults);
        match student_row::validate(candidate, row_index) {
            Ok(record) => records.push(record),
            Err(error) => errors.push(error),
        }
    }

    if !errors.is_empty() {
        tracing::warn!(
            "❌ Import rejected - {} of {} rows invalid, nothing committed",
            errors.len(),
            rows.len()
        );
        return Ok(ImportOutcome::Rejected(ImportRejection::InvalidRows(errors)));
    }

    if records.is_empty() {
        tracing::warn!("❌ Import rejected - no data rows");
        return Ok(ImportOutcome::Rejected(ImportRejection::EmptyBatch));
    }

    let _permit = limiter.acquire().await?;
    let committed = match mode {
        ImportMode::ReplaceAll => store.replace_all(records).await?,
        ImportMode::Append => store.bulk_insert(records).await?,
    };

    tracing::info!("✅ Import committed - {} students ({:?})", committed.len(), mode);

    Ok(ImportOutcome::Committed {
        count: committed.len(),
        records: committed,
    })
}
