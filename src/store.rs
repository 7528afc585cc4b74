use std::fs::{self, OpenOptions};
use std::io::{self, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::models::{StoredRecord, SurveyResponse};

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to write response log {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to encode response record: {0}")]
    Encode(#[from] serde_json::Error),
    #[error("{path} holds a legacy JSON array; migrate it with import-legacy before appending")]
    LegacyLog { path: PathBuf },
    #[error("legacy response file {path} is not a JSON array of records: {source}")]
    Legacy {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// What the first read of the log found.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// No log file yet.
    Missing,
    Loaded { records: usize },
    /// The log path holds a pretty-printed JSON array from the old format.
    LegacyArray,
    /// The log was unreadable or had lines that did not parse. Parseable records were kept.
    Degraded {
        records: usize,
        skipped: usize,
        reason: String,
    },
}

/// One session's view of the response log: loaded lazily once, then appended to.
///
/// The file holds one JSON-encoded [`StoredRecord`] per line. Appends write a
/// single line in append mode; existing lines are never rewritten.
#[derive(Debug)]
pub struct ResponseStore {
    path: PathBuf,
    records: Option<Vec<StoredRecord>>,
    outcome: Option<LoadOutcome>,
}

impl ResponseStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            records: None,
            outcome: None,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn load(&mut self) -> &[StoredRecord] {
        self.loaded()
    }

    /// `None` until the first [`load`](Self::load) or append.
    pub fn load_outcome(&self) -> Option<&LoadOutcome> {
        self.outcome.as_ref()
    }

    pub fn append(&mut self, response: SurveyResponse) -> Result<StoredRecord, StoreError> {
        let record = StoredRecord::stamp(response);
        self.ensure_writable()?;
        self.write_lines(std::slice::from_ref(&record))?;
        self.loaded().push(record.clone());
        tracing::info!(
            path = %self.path.display(),
            email = %record.responses.work_email,
            "response appended"
        );
        Ok(record)
    }

    /// Copies every record of a pretty-printed JSON array file into the log, keeping
    /// their original timestamps and order.
    pub fn import_legacy(&mut self, legacy_path: &Path) -> Result<usize, StoreError> {
        let raw = fs::read_to_string(legacy_path).map_err(|source| StoreError::Io {
            path: legacy_path.to_path_buf(),
            source,
        })?;
        let records: Vec<StoredRecord> =
            serde_json::from_str(&raw).map_err(|source| StoreError::Legacy {
                path: legacy_path.to_path_buf(),
                source,
            })?;

        self.ensure_writable()?;
        self.write_lines(&records)?;
        let imported = records.len();
        self.loaded().extend(records);
        tracing::info!(
            from = %legacy_path.display(),
            to = %self.path.display(),
            imported,
            "legacy responses imported"
        );
        Ok(imported)
    }

    fn ensure_writable(&mut self) -> Result<(), StoreError> {
        self.loaded();
        if self.outcome == Some(LoadOutcome::LegacyArray) {
            return Err(StoreError::LegacyLog {
                path: self.path.clone(),
            });
        }
        Ok(())
    }

    fn loaded(&mut self) -> &mut Vec<StoredRecord> {
        let path = &self.path;
        let outcome = &mut self.outcome;
        self.records.get_or_insert_with(|| {
            let (records, result) = read_log(path);
            *outcome = Some(result);
            records
        })
    }

    fn write_lines(&self, records: &[StoredRecord]) -> Result<(), StoreError> {
        if records.is_empty() {
            return Ok(());
        }

        let mut payload = String::new();
        for record in records {
            payload.push_str(&serde_json::to_string(record)?);
            payload.push('\n');
        }

        let io_error = |source: io::Error| StoreError::Io {
            path: self.path.clone(),
            source,
        };

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(io_error)?;
        }

        let mut file = OpenOptions::new()
            .read(true)
            .append(true)
            .create(true)
            .open(&self.path)
            .map_err(io_error)?;

        if ends_mid_line(&mut file).map_err(io_error)? {
            payload.insert(0, '\n');
        }

        file.write_all(payload.as_bytes()).map_err(io_error)?;
        file.flush().map_err(io_error)?;
        Ok(())
    }
}

/// True when a previous writer left a partial final line behind.
fn ends_mid_line(file: &mut fs::File) -> io::Result<bool> {
    if file.metadata()?.len() == 0 {
        return Ok(false);
    }
    let mut last = [0u8; 1];
    file.seek(SeekFrom::End(-1))?;
    file.read_exact(&mut last)?;
    Ok(last[0] != b'\n')
}

fn read_log(path: &Path) -> (Vec<StoredRecord>, LoadOutcome) {
    let raw = match fs::read(path) {
        Ok(value) => value,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return (Vec::new(), LoadOutcome::Missing);
        }
        Err(error) => {
            tracing::warn!(
                path = %path.display(),
                error = %error,
                "failed to read response log; starting with no responses"
            );
            return (
                Vec::new(),
                LoadOutcome::Degraded {
                    records: 0,
                    skipped: 0,
                    reason: format!("failed to read {}: {error}", path.display()),
                },
            );
        }
    };

    if raw.trim_ascii_start().starts_with(b"[") {
        tracing::warn!(
            path = %path.display(),
            "response log is a legacy JSON array; run import-legacy to migrate it"
        );
        return (Vec::new(), LoadOutcome::LegacyArray);
    }

    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut first_error = None;

    for (index, line) in raw.split(|byte| *byte == b'\n').enumerate() {
        if line.trim_ascii().is_empty() {
            continue;
        }
        match serde_json::from_slice::<StoredRecord>(line) {
            Ok(record) => records.push(record),
            Err(error) => {
                tracing::warn!(
                    path = %path.display(),
                    line = index + 1,
                    error = %error,
                    "skipping unparsable response record"
                );
                skipped += 1;
                first_error.get_or_insert_with(|| format!("line {}: {error}", index + 1));
            }
        }
    }

    let outcome = match first_error {
        None => LoadOutcome::Loaded {
            records: records.len(),
        },
        Some(reason) => LoadOutcome::Degraded {
            records: records.len(),
            skipped,
            reason,
        },
    };
    (records, outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BuildOutcome, Expectation};

    fn response(email: &str) -> SurveyResponse {
        SurveyResponse::with_email(email)
    }

    #[test]
    fn missing_file_loads_empty() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut store = ResponseStore::open(dir.path().join("responses.jsonl"));
        assert!(store.load().is_empty());
        assert_eq!(store.load_outcome(), Some(&LoadOutcome::Missing));
    }

    #[test]
    fn append_writes_one_line_per_record() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("responses.jsonl");
        let mut store = ResponseStore::open(&path);

        let mut first = response("a@b.com");
        first.expectations = Expectation::More;
        first.built_something = vec![BuildOutcome::CustomCode];
        store.append(first.clone()).unwrap();
        store.append(response("c@d.com")).unwrap();

        let raw = fs::read_to_string(&path).unwrap();
        assert_eq!(raw.lines().count(), 2);
        assert!(raw.lines().next().unwrap().contains(r#""built_something":["I wrote some custom code"]"#));
        assert_eq!(store.load().len(), 2);
        assert_eq!(store.load()[0].responses, first);
    }

    #[test]
    fn load_is_cached_for_the_session() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.jsonl");
        let mut store = ResponseStore::open(&path);
        assert!(store.load().is_empty());

        let mut other = ResponseStore::open(&path);
        other.append(response("late@b.com")).unwrap();

        assert!(store.load().is_empty());
        assert_eq!(ResponseStore::open(&path).load().len(), 1);
    }

    #[test]
    fn partial_last_line_is_skipped_and_reported() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.jsonl");
        ResponseStore::open(&path).append(response("a@b.com")).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(br#"{"timestamp":"2024-06-03T1"#).unwrap();

        let mut store = ResponseStore::open(&path);
        assert_eq!(store.load().len(), 1);
        match store.load_outcome() {
            Some(LoadOutcome::Degraded {
                records, skipped, ..
            }) => {
                assert_eq!(*records, 1);
                assert_eq!(*skipped, 1);
            }
            other => panic!("expected degraded load, got {other:?}"),
        }

        store.append(response("c@d.com")).unwrap();
        let reloaded: Vec<_> = ResponseStore::open(&path)
            .load()
            .iter()
            .map(|record| record.responses.work_email.clone())
            .collect();
        assert_eq!(reloaded, vec!["a@b.com", "c@d.com"]);
    }

    #[test]
    fn line_torn_inside_a_multibyte_character_is_skipped() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.jsonl");
        ResponseStore::open(&path).append(response("a@b.com")).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        let mut fragment = br#"{"timestamp":"2024-06-03T10:00:00","responses":{"work_email":"c@d.com","what_created":"caf"#.to_vec();
        fragment.push("é".as_bytes()[0]);
        file.write_all(&fragment).unwrap();

        let mut store = ResponseStore::open(&path);
        assert_eq!(store.load().len(), 1);
        assert!(matches!(
            store.load_outcome(),
            Some(LoadOutcome::Degraded {
                records: 1,
                skipped: 1,
                ..
            })
        ));
    }

    #[test]
    fn invalid_utf8_line_between_records_counts_as_one_skip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.jsonl");
        let mut writer = ResponseStore::open(&path);
        writer.append(response("a@b.com")).unwrap();
        let mut file = OpenOptions::new().append(true).open(&path).unwrap();
        file.write_all(b"\xff\xfe\n").unwrap();
        writer.append(response("c@d.com")).unwrap();

        let mut store = ResponseStore::open(&path);
        let emails: Vec<_> = store
            .load()
            .iter()
            .map(|record| record.responses.work_email.clone())
            .collect();
        assert_eq!(emails, vec!["a@b.com", "c@d.com"]);
        assert!(matches!(
            store.load_outcome(),
            Some(LoadOutcome::Degraded {
                records: 2,
                skipped: 1,
                ..
            })
        ));
    }

    #[test]
    fn legacy_array_is_imported_in_order() {
        let dir = tempfile::tempdir().expect("tempdir");
        let legacy = dir.path().join("genai_survey_responses.json");
        fs::write(
            &legacy,
            r#"[
  {
    "timestamp": "2024-05-01T09:00:00.000001",
    "responses": {"work_email": "first@b.com", "expectations": "Not sure"}
  },
  {
    "timestamp": "2024-05-02T10:30:00",
    "responses": {"work_email": "second@b.com", "built_something": []}
  }
]"#,
        )
        .unwrap();

        let path = dir.path().join("responses.jsonl");
        let mut store = ResponseStore::open(&path);
        assert_eq!(store.import_legacy(&legacy).unwrap(), 2);

        let mut fresh = ResponseStore::open(&path);
        let records = fresh.load();
        assert_eq!(records.len(), 2);
        assert_eq!(records[0].responses.work_email, "first@b.com");
        assert_eq!(records[0].responses.expectations, Expectation::NotSure);
        assert_eq!(records[1].timestamp.to_string(), "2024-05-02 10:30:00");
    }

    #[test]
    fn malformed_legacy_file_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let legacy = dir.path().join("legacy.json");
        fs::write(&legacy, "{not json").unwrap();
        let mut store = ResponseStore::open(dir.path().join("responses.jsonl"));
        assert!(matches!(
            store.import_legacy(&legacy),
            Err(StoreError::Legacy { .. })
        ));
        assert!(store.load().is_empty());
    }

    #[test]
    fn legacy_array_at_log_path_refuses_appends() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("responses.jsonl");
        fs::write(&path, "[]").unwrap();
        let mut store = ResponseStore::open(&path);
        assert!(store.load().is_empty());
        assert_eq!(store.load_outcome(), Some(&LoadOutcome::LegacyArray));
        assert!(matches!(
            store.append(response("a@b.com")),
            Err(StoreError::LegacyLog { .. })
        ));
        assert_eq!(fs::read_to_string(&path).unwrap(), "[]");
    }
}
