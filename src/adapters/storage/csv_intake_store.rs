//! CSV Intake Store Adapter
//!
//! Appends completed registrations to a CSV file with columns `nome,idade`.
//! The header is written only when the file is absent or empty. Fields are
//! quoted per RFC 4180 and records end with CRLF.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs::{self, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;

use crate::domain::intake::PersistedIntakeRow;
use crate::ports::{IntakeStore, IntakeStoreError};

pub const CSV_HEADER: [&str; 2] = ["nome", "idade"];

const LINE_END: &str = "\r\n";

/// Append-only CSV storage for intake rows
#[derive(Debug)]
pub struct CsvIntakeStore {
    path: PathBuf,
    // Serialises open-write-flush so rows from concurrent sessions never interleave.
    write_lock: Mutex<()>,
}

impl CsvIntakeStore {
    /// Create a store writing to `path`
    ///
    /// # Example
    /// ```ignore
    /// let store = CsvIntakeStore::new("files/cadastros.csv");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn needs_header(&self) -> bool {
        match fs::metadata(&self.path).await {
            Ok(meta) => meta.len() == 0,
            Err(_) => true,
        }
    }
}

/// Quotes a field when it contains a separator, quote or line break.
fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

fn encode_record(fields: &[&str]) -> String {
    let mut line = fields
        .iter()
        .map(|f| escape_field(f))
        .collect::<Vec<_>>()
        .join(",");
    line.push_str(LINE_END);
    line
}

/// Parses CSV text into records, honouring quoted fields.
fn parse_records(text: &str) -> Vec<Vec<String>> {
    let mut records = Vec::new();
    let mut record = Vec::new();
    let mut field = String::new();
    let mut in_quotes = false;
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        if in_quotes {
            match c {
                '"' if chars.peek() == Some(&'"') => {
                    field.push('"');
                    chars.next();
                }
                '"' => in_quotes = false,
                _ => field.push(c),
            }
            continue;
        }
        match c {
            '"' => in_quotes = true,
            ',' => record.push(std::mem::take(&mut field)),
            '\r' => {}
            '\n' => {
                record.push(std::mem::take(&mut field));
                records.push(std::mem::take(&mut record));
            }
            _ => field.push(c),
        }
    }
    if !field.is_empty() || !record.is_empty() {
        record.push(field);
        records.push(record);
    }
    records
}

#[async_trait]
impl IntakeStore for CsvIntakeStore {
    async fn persist(&self, row: &PersistedIntakeRow) -> Result<(), IntakeStoreError> {
        let _guard = self.write_lock.lock().await;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir).await?;
        }

        let mut payload = String::new();
        if self.needs_header().await {
            payload.push_str(&encode_record(&CSV_HEADER));
        }
        let age = row.age.to_string();
        payload.push_str(&encode_record(&[row.name.as_str(), age.as_str()]));

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await?;
        file.write_all(payload.as_bytes()).await?;
        file.flush().await?;

        tracing::info!(path = %self.path.display(), "persisted intake row");
        Ok(())
    }

    async fn rows(&self) -> Result<Vec<PersistedIntakeRow>, IntakeStoreError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        parse_records(&text)
            .into_iter()
            .skip(1)
            .filter(|r| r.iter().any(|f| !f.is_empty()))
            .map(|r| {
                let name = r.first().cloned().unwrap_or_default();
                let age = r
                    .get(1)
                    .and_then(|a| a.trim().parse::<u8>().ok())
                    .ok_or_else(|| IntakeStoreError::Encoding(format!("invalid age in row {:?}", r)))?;
                Ok(PersistedIntakeRow { name, age })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn row(name: &str, age: u8) -> PersistedIntakeRow {
        PersistedIntakeRow {
            name: name.to_string(),
            age,
        }
    }

    #[tokio::test]
    async fn first_write_creates_file_with_header_and_one_row() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("files").join("cadastros.csv");
        let store = CsvIntakeStore::new(&path);

        store.persist(&row("Ana", 22)).await.unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert_eq!(content, "nome,idade\r\nAna,22\r\n");
    }

    #[tokio::test]
    async fn header_written_once() {
        let dir = TempDir::new().unwrap();
        let store = CsvIntakeStore::new(dir.path().join("cadastros.csv"));

        store.persist(&row("Ana", 22)).await.unwrap();
        store.persist(&row("Ana", 22)).await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches("nome,idade").count(), 1);
        assert_eq!(store.rows().await.unwrap(), vec![row("Ana", 22), row("Ana", 22)]);
    }

    #[tokio::test]
    async fn empty_existing_file_gets_header() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cadastros.csv");
        std::fs::write(&path, "").unwrap();

        CsvIntakeStore::new(&path).persist(&row("Bia", 5)).await.unwrap();

        assert!(std::fs::read_to_string(&path).unwrap().starts_with("nome,idade\r\n"));
    }

    #[tokio::test]
    async fn special_characters_are_quoted() {
        let dir = TempDir::new().unwrap();
        let store = CsvIntakeStore::new(dir.path().join("c.csv"));

        store.persist(&row("Silva, \"Zé\"", 40)).await.unwrap();

        let content = std::fs::read_to_string(store.path()).unwrap();
        assert!(content.contains("\"Silva, \"\"Zé\"\"\",40"));
        assert_eq!(store.rows().await.unwrap(), vec![row("Silva, \"Zé\"", 40)]);
    }

    #[tokio::test]
    async fn missing_file_has_no_rows() {
        let dir = TempDir::new().unwrap();
        let store = CsvIntakeStore::new(dir.path().join("nada.csv"));
        assert!(store.rows().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn concurrent_appends_do_not_interleave() {
        let dir = TempDir::new().unwrap();
        let store = Arc::new(CsvIntakeStore::new(dir.path().join("c.csv")));

        let mut tasks = Vec::new();
        for i in 0..20u8 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store.persist(&row(&format!("Pessoa {}", i), i)).await.unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        let rows = store.rows().await.unwrap();
        assert_eq!(rows.len(), 20);
        let content = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(content.matches("nome,idade").count(), 1);
    }

    #[test]
    fn parses_lf_and_crlf_records() {
        let records = parse_records("nome,idade\nAna,22\r\n\"B, C\",3");
        assert_eq!(records.len(), 3);
        assert_eq!(records[2], vec!["B, C".to_string(), "3".to_string()]);
    }
}
