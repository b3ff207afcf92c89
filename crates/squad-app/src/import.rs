// CSV import of match performance records for the admin screen.
//
// Expected header: player_id, goals, assists, clean_sheet, goals_conceded,
// yellow_cards, red_cards, minutes_played, bonus_points. Extra columns (a
// player name, for instance) are ignored.

use std::io::Read;
use std::path::Path;

use tracing::{info, warn};

use crate::api::model::PerformanceRecord;

#[derive(Debug, thiserror::Error)]
pub enum ImportError {
    #[error("failed to read file {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("CSV error in {path}: {source}")]
    Csv { path: String, source: csv::Error },

    #[error("{path} contains no usable performance rows")]
    Empty { path: String },
}

/// Parse rows, skipping (and logging) any that fail to deserialise.
fn records_from_reader<R: Read>(rdr: R) -> Result<Vec<PerformanceRecord>, csv::Error> {
    let mut reader = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(rdr);
    let mut records = Vec::new();
    for (i, result) in reader.deserialize::<PerformanceRecord>().enumerate() {
        match result {
            Ok(r) if r.player_id == 0 => warn!(row = i + 1, "skipping row without player_id"),
            Ok(r) => records.push(r),
            Err(e) => warn!(row = i + 1, "skipping malformed performance row: {e}"),
        }
    }
    Ok(records)
}

pub fn load_performance_csv(path: &Path) -> Result<Vec<PerformanceRecord>, ImportError> {
    let shown = path.display().to_string();
    let file = std::fs::File::open(path).map_err(|e| ImportError::Io {
        path: shown.clone(),
        source: e,
    })?;
    let records = records_from_reader(file).map_err(|e| ImportError::Csv {
        path: shown.clone(),
        source: e,
    })?;
    if records.is_empty() {
        return Err(ImportError::Empty { path: shown });
    }
    info!(path = %shown, count = records.len(), "imported performance records");
    Ok(records)
}
