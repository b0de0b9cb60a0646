use crate::web::error::AppError;
use smartcore::linalg::basic::matrix::DenseMatrix;
use std::path::Path;

/// Target column the dataset must contain.
pub const TARGET_COLUMN: &str = "Price";

/// Feature columns the dataset must contain, in the order they are fed to the
/// estimators.
pub const FEATURE_COLUMNS: [&str; 4] = ["Mileage", "Cylinders", "Airbags", "Prod year"];

/// Loads the `;`-delimited car price dataset and splits it into a feature
/// matrix and the target vector. Columns are selected by name, so extra
/// columns in the file are ignored. The file is re-read on every call.
pub fn load_dataset(path: &Path) -> Result<(DenseMatrix<f64>, Vec<f64>), AppError> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .from_path(path)
        .map_err(|e| {
            AppError::Dataset(format!("Failed to open dataset at {}: {e}", path.display()))
        })?;

    let headers = reader
        .headers()
        .map_err(|e| AppError::Dataset(format!("Failed to read dataset header: {e}")))?
        .clone();

    let target_idx = column_index(&headers, TARGET_COLUMN)?;
    let feature_idx = FEATURE_COLUMNS
        .iter()
        .map(|name| column_index(&headers, name))
        .collect::<Result<Vec<_>, _>>()?;

    let mut features: Vec<Vec<f64>> = Vec::new();
    let mut target: Vec<f64> = Vec::new();

    for (i, record) in reader.records().enumerate() {
        // Header is line 1, so data rows start at line 2.
        let line = i + 2;
        let record =
            record.map_err(|e| AppError::Dataset(format!("Failed to read row {line}: {e}")))?;

        let mut row = Vec::with_capacity(feature_idx.len());
        for (&idx, name) in feature_idx.iter().zip(FEATURE_COLUMNS.iter()) {
            row.push(parse_cell(&record, idx, name, line)?);
        }
        features.push(row);
        target.push(parse_cell(&record, target_idx, TARGET_COLUMN, line)?);
    }

    if features.is_empty() {
        return Err(AppError::Dataset(format!(
            "Dataset at {} contains no data rows",
            path.display()
        )));
    }

    let x = DenseMatrix::from_2d_vec(&features)
        .map_err(|e| AppError::Dataset(format!("Failed to build feature matrix: {e}")))?;
    Ok((x, target))
}

fn column_index(headers: &csv::StringRecord, name: &str) -> Result<usize, AppError> {
    headers
        .iter()
        .position(|h| h == name)
        .ok_or_else(|| AppError::Dataset(format!("Dataset is missing required column '{name}'")))
}

fn parse_cell(
    record: &csv::StringRecord,
    idx: usize,
    column: &str,
    line: usize,
) -> Result<f64, AppError> {
    let raw = record.get(idx).ok_or_else(|| {
        AppError::Dataset(format!("Row {line} is missing a value for column '{column}'"))
    })?;
    raw.trim().parse::<f64>().map_err(|_| {
        AppError::Dataset(format!(
            "Row {line}, column '{column}': '{raw}' is not a number"
        ))
    })
}
