pub mod writer;

use std::io;
use thiserror::Error;

pub use writer::CsvWriter;

pub type CsvExportResult<T> = Result<T, CsvExportError>;

#[derive(Error, Debug)]
pub enum CsvExportError {
    #[error("error exporting csv: {0}")]
    Csv(#[from] csv::Error),

    #[error("error exporting csv: {0}")]
    Io(#[from] io::Error),
}
