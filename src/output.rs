//! Output file writing.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use miette::Diagnostic;
use thiserror::Error;

use crate::record::AuthorRecord;

#[derive(Debug, Error, Diagnostic)]
pub enum OutputError {
    #[error("failed to write output file: {path}")]
    #[diagnostic(
        code(census::output::io),
        help("Check that the output directory is writable and the disk is not full.")
    )]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize author records: {message}")]
    #[diagnostic(code(census::output::serialize))]
    Serialize { message: String },
}

pub type OutputResult<T> = std::result::Result<T, OutputError>;

/// Write `records` as a JSON array to `path`, replacing any previous content.
pub fn write_records(path: &Path, records: &[AuthorRecord]) -> OutputResult<()> {
    let io_err = |source: std::io::Error| OutputError::Io {
        path: path.display().to_string(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, records).map_err(|e| {
        if e.is_io() {
            OutputError::Io {
                path: path.display().to_string(),
                source: e.into(),
            }
        } else {
            OutputError::Serialize {
                message: e.to_string(),
            }
        }
    })?;
    writer.flush().map_err(io_err)?;

    tracing::info!(path = %path.display(), records = records.len(), "wrote output");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gender::{Categorization, GenderCategory};
    use crate::profile::NameTriple;

    fn record(id: &str) -> AuthorRecord {
        AuthorRecord::new(
            id,
            NameTriple {
                first: Some("Jo".into()),
                middle: None,
                last: Some("Doe".into()),
            },
            Categorization {
                declared: Some("M".into()),
                category: GenderCategory::Male,
            },
        )
    }

    #[test]
    fn writes_json_array() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("out.json");
        write_records(&path, &[record("a@x.com"), record("b@x.com")]).unwrap();

        let parsed: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        let array = parsed.as_array().unwrap();
        assert_eq!(array.len(), 2);
        assert_eq!(array[1]["author_id"], "b@x.com");
        assert_eq!(array[0]["gender_category"], "male");
    }

    #[test]
    fn empty_run_writes_empty_array() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("nested/dir/out.json");
        write_records(&path, &[]).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "[]");
    }
}
