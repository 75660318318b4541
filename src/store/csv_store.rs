use async_trait::async_trait;
use std::fs::File;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use tracing::{debug, info, warn};
use crate::error::{Result, TurkError};
use crate::store::{new_columns, Record, TabularStore};

/// Read a CSV file with a header row.
///
/// A missing or empty file yields no rows and no columns. Blank lines are
/// skipped and short rows simply lack their trailing columns.
pub fn load(path: &Path) -> Result<(Vec<Record>, Vec<String>)> {
    let file = match File::open(path) {
        Ok(f) => f,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            debug!(path = %path.display(), "CSV file does not exist, treating as empty");
            return Ok((Vec::new(), Vec::new()));
        }
        Err(e) => return Err(TurkError::io(path, e)),
    };

    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(file);
    let headers = reader.headers().map_err(|e| TurkError::csv(path, e))?.clone();
    let columns: Vec<String> = headers.iter().map(str::to_string).collect();

    let mut rows = Vec::new();
    for row in reader.records() {
        let row = row.map_err(|e| TurkError::csv(path, e))?;
        let record: Record = columns
            .iter()
            .zip(row.iter())
            .map(|(k, v)| (k.clone(), v.to_string()))
            .collect();
        rows.push(record);
    }

    info!(path = %path.display(), rows = rows.len(), columns = columns.len(), "Read CSV file");
    Ok((rows, columns))
}

/// Serialize `records` against `columns`; absent values become empty cells.
fn encode<'a>(
    path: &Path,
    columns: &[String],
    records: impl IntoIterator<Item = &'a Record>,
    header: bool,
) -> Result<Vec<u8>> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(Vec::new());

    if header {
        writer.write_record(columns).map_err(|e| TurkError::csv(path, e))?;
    }
    for record in records {
        let cells = columns
            .iter()
            .map(|c| record.get(c).map(String::as_str).unwrap_or(""));
        writer.write_record(cells).map_err(|e| TurkError::csv(path, e))?;
    }

    writer
        .into_inner()
        .map_err(|e| TurkError::io(path, e.into_error()))
}

/// Cut `file` back to `len` bytes after a failed write.
async fn truncate_to(file: &tokio::fs::File, len: u64) {
    let restored = async {
        file.set_len(len).await?;
        file.sync_all().await
    }
    .await;
    if let Err(e) = restored {
        warn!(error = %e, len, "Could not roll back partial append");
    }
}

/// CSV-backed output table.
#[derive(Debug)]
pub struct CsvStore {
    path: PathBuf,
    rows: Vec<Record>,
    columns: Vec<String>,
}

impl CsvStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let (rows, columns) = load(&path)?;
        Ok(Self { path, rows, columns })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append `bytes`; on failure the file is cut back to its previous
    /// length so no partial row is left behind.
    async fn append_rows(&self, bytes: &[u8]) -> Result<()> {
        let mut file = tokio::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|e| TurkError::io(&self.path, e))?;
        let len = file
            .metadata()
            .await
            .map_err(|e| TurkError::io(&self.path, e))?
            .len();

        let written = async {
            file.write_all(bytes).await?;
            file.sync_all().await
        }
        .await;

        if let Err(e) = written {
            truncate_to(&file, len).await;
            return Err(TurkError::io(&self.path, e));
        }
        Ok(())
    }

    /// Replace the whole file via a synced sibling temp file, so a failed
    /// rewrite leaves the committed rows in place.
    async fn rewrite(&self, bytes: &[u8]) -> Result<()> {
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        let written = async {
            let mut file = tokio::fs::File::create(&tmp).await?;
            file.write_all(bytes).await?;
            file.sync_all().await?;
            tokio::fs::rename(&tmp, &self.path).await
        }
        .await;

        if let Err(e) = written {
            let _ = tokio::fs::remove_file(&tmp).await;
            return Err(TurkError::io(&self.path, e));
        }
        Ok(())
    }
}

#[async_trait]
impl TabularStore for CsvStore {
    fn records(&self) -> &[Record] {
        &self.rows
    }

    fn columns(&self) -> &[String] {
        &self.columns
    }

    async fn append(&mut self, records: Vec<Record>) -> Result<()> {
        if records.is_empty() {
            return Ok(());
        }

        let added = new_columns(&self.columns, &records);
        if added.is_empty() {
            let bytes = encode(&self.path, &self.columns, &records, false)?;
            self.append_rows(&bytes).await?;
        } else {
            let mut columns = self.columns.clone();
            columns.extend(added.iter().cloned());
            let bytes = encode(&self.path, &columns, self.rows.iter().chain(&records), true)?;
            self.rewrite(&bytes).await?;
            info!(path = %self.path.display(), new_columns = ?added, "Rewrote output with widened header");
            self.columns = columns;
        }

        self.rows.extend(records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn truncate_to_drops_partial_row() {
        let temp_dir = tempfile::tempdir().unwrap();
        let path = temp_dir.path().join("out.csv");
        std::fs::write(&path, "q,ans\na,x\n").unwrap();
        let len = std::fs::metadata(&path).unwrap().len();

        let mut file = tokio::fs::OpenOptions::new().append(true).open(&path).await.unwrap();
        file.write_all(b"b,hal").await.unwrap();
        file.flush().await.unwrap();
        truncate_to(&file, len).await;

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "q,ans\na,x\n");
        let (rows, _) = load(&path).unwrap();
        assert_eq!(rows.len(), 1);
    }
}
