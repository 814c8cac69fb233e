use orgchart_core::{DataFetchError, Dataset};
use std::fs::File;
use std::io::BufReader;
use std::path::Path;

/// Reads and decodes an employee JSON file.
pub fn load_dataset_from_path(path: &Path) -> Result<Dataset, DataFetchError> {
    let file = File::open(path).map_err(|source| DataFetchError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let dataset = Dataset::from_reader(BufReader::new(file))?;
    tracing::info!(
        "Read {} records from {}",
        dataset.records.len(),
        path.display()
    );
    Ok(dataset)
}
