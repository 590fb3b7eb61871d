use polars::prelude::*;
use std::collections::HashSet;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::domain::TableError;
use crate::record::{self, Record};

#[derive(Debug, PartialEq)]
enum FileType {
    Csv,
    Parquet,
    Arrow,
}

/// The immutable record set shown by the table. Cloning is cheap, the
/// records themselves are shared.
#[derive(Debug, Clone)]
pub struct Dataset {
    name: String,
    records: Arc<Vec<Record>>,
}

impl Dataset {
    pub fn builtin() -> Result<Self, TableError> {
        Dataset::from_records("built-in", record::builtin_records()?)
    }

    pub fn from_records(name: &str, records: Vec<Record>) -> Result<Self, TableError> {
        let mut seen = HashSet::with_capacity(records.len());
        for r in records.iter() {
            if !seen.insert(r.id) {
                return Err(TableError::DuplicateId(r.id));
            }
        }
        Ok(Self {
            name: name.to_string(),
            records: Arc::new(records),
        })
    }

    pub fn load(path: PathBuf) -> Result<Self, TableError> {
        let file_type = Dataset::check_file(&path)?;
        let start_time = Instant::now();

        let frame = match file_type {
            FileType::Csv => Dataset::load_csv(&path)?,
            FileType::Parquet => Dataset::load_parquet(&path)?,
            FileType::Arrow => Dataset::load_arrow(&path)?,
        };
        let df = frame.collect()?;
        let records = Dataset::records_from_frame(&df)?;

        info!(
            "Loaded {} records from {:?} in {}ms",
            records.len(),
            path,
            start_time.elapsed().as_millis()
        );

        let name = path
            .file_name()
            .and_then(|s| s.to_str())
            .unwrap_or("???")
            .to_string();
        Dataset::from_records(&name, records)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn get(&self, idx: usize) -> Option<&Record> {
        self.records.get(idx)
    }

    fn records_from_frame(df: &DataFrame) -> Result<Vec<Record>, TableError> {
        let ids = Dataset::id_column(df)?;
        let names = Dataset::string_column(df, &["name"])?;
        let emails = Dataset::string_column(df, &["email"])?;
        let categories = Dataset::string_column(df, &["category"])?;
        let kinds = Dataset::string_column(df, &["type"])?;
        let statuses = Dataset::string_column(df, &["status"])?;
        let dates = Dataset::string_column(df, &["joinDate", "join_date"])?;

        let mut records = Vec::with_capacity(df.height());
        for (row, id) in ids.into_iter().enumerate() {
            let id = id.ok_or_else(|| TableError::MissingValue {
                row,
                column: "id".to_string(),
            })?;
            let record = Record::new(
                id,
                &names[row],
                &emails[row],
                &categories[row],
                &kinds[row],
                &statuses[row],
                &dates[row],
            )?;
            debug!("Loaded record {}", record.id);
            records.push(record);
        }
        Ok(records)
    }

    fn column<'a>(df: &'a DataFrame, names: &[&str]) -> Result<&'a Column, TableError> {
        names
            .iter()
            .find_map(|name| df.column(name).ok())
            .ok_or_else(|| TableError::MissingColumn(names[0].to_string()))
    }

    // Only integer columns are taken as is. Anything else, e.g. a float
    // column holding `1.7`, has to parse as an integer value by value.
    fn id_column(df: &DataFrame) -> Result<Vec<Option<i64>>, TableError> {
        let column = Dataset::column(df, &["id"])?;
        if column.dtype().is_integer() {
            let ids = column.cast(&DataType::Int64)?;
            return Ok(ids.i64()?.into_iter().collect());
        }
        let raw = column.cast(&DataType::String)?;
        raw.str()?
            .into_iter()
            .enumerate()
            .map(|(row, value)| match value {
                None => Ok(None),
                Some(v) => v.trim().parse::<i64>().map(Some).map_err(|_| TableError::InvalidId {
                    row,
                    value: v.to_string(),
                }),
            })
            .collect()
    }

    fn string_column(df: &DataFrame, names: &[&str]) -> Result<Vec<String>, TableError> {
        let col = Dataset::column(df, names)?.cast(&DataType::String)?;
        let series = col.str()?;
        series
            .into_iter()
            .enumerate()
            .map(|(row, value)| {
                value.map(str::to_string).ok_or_else(|| TableError::MissingValue {
                    row,
                    column: names[0].to_string(),
                })
            })
            .collect()
    }

    fn detect_file_type(path: &Path) -> Result<FileType, TableError> {
        match path
            .extension()
            .and_then(|s| s.to_str())
            .map(|s| s.to_uppercase())
            .as_deref()
        {
            Some("CSV") => Ok(FileType::Csv),
            Some("PARQUET") | Some("PQ") => Ok(FileType::Parquet),
            Some("ARROW") | Some("IPC") | Some("FEATHER") => Ok(FileType::Arrow),
            _ => Err(TableError::UnknownFileType),
        }
    }

    fn check_file(path: &Path) -> Result<FileType, TableError> {
        let metadata = fs::metadata(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => TableError::FileNotFound,
            ErrorKind::PermissionDenied => TableError::PermissionDenied,
            _ => TableError::IoError(e),
        })?;
        if !metadata.is_file() {
            return Err(TableError::LoadingFailed("Not a file!".into()));
        }
        Dataset::detect_file_type(path)
    }

    fn load_csv(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyCsvReader::new(PlPath::Local(path.into()))
            .with_has_header(true)
            .finish()
    }

    fn load_parquet(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_parquet(PlPath::Local(path.into()), ScanArgsParquet::default())
    }

    fn load_arrow(path: &Path) -> Result<LazyFrame, PolarsError> {
        LazyFrame::scan_ipc(
            PlPath::Local(path.into()),
            polars::io::ipc::IpcScanOptions,
            UnifiedScanArgs::default(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_csv(content: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".csv").tempfile().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn builtin_dataset_has_unique_ids() {
        let ds = Dataset::builtin().unwrap();
        assert_eq!(ds.len(), 10);
        assert_eq!(ds.name(), "built-in");
    }

    #[test]
    fn rejects_duplicate_ids() {
        let mut records = record::builtin_records().unwrap();
        records[1].id = 1;
        assert!(matches!(
            Dataset::from_records("dup", records),
            Err(TableError::DuplicateId(1))
        ));
    }

    #[test]
    fn loads_csv_file() {
        let file = write_csv(
            "id,name,email,category,type,status,joinDate\n\
             1,Ann <b>,ann@example.com,Premium,Business,Active,2024-03-04\n\
             2,Ben,ben@example.com,Gold,Personal,Pending,2023-01-30\n",
        );
        let ds = Dataset::load(file.path().to_path_buf()).unwrap();
        assert_eq!(ds.len(), 2);
        let first = ds.get(0).unwrap();
        assert_eq!(first.name, "Ann <b>");
        assert_eq!(first.kind, "Business");
        assert_eq!(ds.get(1).unwrap().category, "Gold");
    }

    #[test]
    fn accepts_snake_case_date_column() {
        let file = write_csv(
            "id,name,email,category,type,status,join_date\n\
             4,Dee,dee@example.com,Standard,Academic,Inactive,2022-06-01\n",
        );
        let ds = Dataset::load(file.path().to_path_buf()).unwrap();
        assert_eq!(ds.get(0).unwrap().join_date.to_string(), "2022-06-01");
    }

    #[test]
    fn reports_missing_column() {
        let file = write_csv("id,name,email\n1,Ann,ann@example.com\n");
        match Dataset::load(file.path().to_path_buf()) {
            Err(TableError::MissingColumn(name)) => assert_eq!(name, "category"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn reports_bad_date() {
        let file = write_csv(
            "id,name,email,category,type,status,joinDate\n\
             9,Ann,ann@example.com,Premium,Business,Active,yesterday\n",
        );
        assert!(matches!(
            Dataset::load(file.path().to_path_buf()),
            Err(TableError::InvalidDate { id: 9, .. })
        ));
    }

    #[test]
    fn reports_non_integer_id() {
        let file = write_csv(
            "id,name,email,category,type,status,joinDate\n\
             1.7,Ann,ann@example.com,Premium,Business,Active,2024-03-04\n",
        );
        match Dataset::load(file.path().to_path_buf()) {
            Err(TableError::InvalidId { row, value }) => {
                assert_eq!(row, 0);
                assert_eq!(value, "1.7");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn fractional_id_does_not_collide_with_integer_id() {
        let file = write_csv(
            "id,name,email,category,type,status,joinDate\n\
             1,Ann,ann@example.com,Premium,Business,Active,2024-03-04\n\
             1.2,Ben,ben@example.com,Standard,Personal,Pending,2023-01-30\n",
        );
        assert!(matches!(
            Dataset::load(file.path().to_path_buf()),
            Err(TableError::InvalidId { row: 1, .. })
        ));
    }

    #[test]
    fn reports_null_field() {
        let file = write_csv(
            "id,name,email,category,type,status,joinDate\n\
             1,Ann,ann@example.com,Premium,Business,Active,2024-03-04\n\
             2,Ben,,Standard,Personal,Pending,2023-01-30\n",
        );
        match Dataset::load(file.path().to_path_buf()) {
            Err(TableError::MissingValue { row, column }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "email");
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unknown_extension_is_rejected() {
        let file = tempfile::Builder::new().suffix(".txt").tempfile().unwrap();
        assert!(matches!(
            Dataset::load(file.path().to_path_buf()),
            Err(TableError::UnknownFileType)
        ));
    }

    #[test]
    fn missing_file_is_reported() {
        assert!(matches!(
            Dataset::load(PathBuf::from("/does/not/exist.csv")),
            Err(TableError::FileNotFound)
        ));
    }
}
