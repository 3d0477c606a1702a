use std::fs::File;
use std::path::Path;
use std::sync::Arc;

use arrow::array::{Array, ArrayRef, AsArray};
use arrow::compute::cast;
use arrow::datatypes::{DataType, Float64Type};
use arrow::record_batch::RecordBatch;
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;
use serde_json::{Map, Value as JsonValue};

use super::error::DataLoadError;
use super::model::{
    SkillDataset, SkillRecord, COL_CATEGORY, COL_DEMAND, COL_EXPOSURE, COL_HALF_LIFE,
    COL_INDUSTRY, COL_LEARNING_MODE, COL_RESKILLING, COL_RISK, COL_SKILL_NAME, REQUIRED_COLUMNS,
};

// ---------------------------------------------------------------------------
// Public entry-point
// ---------------------------------------------------------------------------

/// Load a skill dataset from a file.  Dispatch by extension.
///
/// Supported formats:
/// * `.csv`     – header row with the required column names (recommended)
/// * `.json`    – `[{ "skill_category": "...", "ai_exposure_level": 42.0, ... }, ...]`
/// * `.parquet` – flat table, numeric columns of any int/float type
///
/// Every row is validated before the dataset is returned, so downstream
/// filtering and aggregation never see malformed values.
pub fn load_file(path: &Path) -> Result<SkillDataset, DataLoadError> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or("")
        .to_ascii_lowercase();

    let records = match ext.as_str() {
        "csv" => load_csv(path)?,
        "json" => load_json(path)?,
        "parquet" | "pq" => load_parquet(path)?,
        other => return Err(DataLoadError::UnsupportedExtension(other.to_string())),
    };

    Ok(SkillDataset::from_records(records))
}

fn open(path: &Path) -> Result<File, DataLoadError> {
    File::open(path).map_err(|source| DataLoadError::Io {
        path: path.to_path_buf(),
        source,
    })
}

// ---------------------------------------------------------------------------
// Row access shared by every format
// ---------------------------------------------------------------------------

/// One source row, whatever the file format.
trait RowSource {
    /// 1-based data row number; the CSV header does not count.
    fn row(&self) -> usize;

    /// Raw cell text, `None` when the cell is null / absent.
    fn text(&self, column: &str) -> Result<Option<String>, DataLoadError>;

    /// Numeric cell. Implementations may override when the format is typed.
    fn number(&self, column: &str) -> Result<f64, DataLoadError> {
        let raw = self.text(column)?.unwrap_or_default();
        raw.trim()
            .parse::<f64>()
            .map_err(|_| invalid(self.row(), column, &raw))
    }

    fn required_text(&self, column: &str) -> Result<String, DataLoadError> {
        match self.text(column)? {
            Some(s) if !s.trim().is_empty() => Ok(s.trim().to_string()),
            other => Err(invalid(self.row(), column, &other.unwrap_or_default())),
        }
    }
}

fn invalid(row: usize, column: &str, value: &str) -> DataLoadError {
    DataLoadError::InvalidValue {
        row,
        column: column.to_string(),
        value: value.to_string(),
    }
}

fn build_record(src: &impl RowSource) -> Result<SkillRecord, DataLoadError> {
    let skill_name = src
        .text(COL_SKILL_NAME)
        .ok()
        .flatten()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    let record = SkillRecord {
        skill_name,
        skill_category: src.required_text(COL_CATEGORY)?,
        industry: src.required_text(COL_INDUSTRY)?,
        ai_exposure_level: src.number(COL_EXPOSURE)?,
        automation_risk: src.number(COL_RISK)?,
        current_market_demand: src.number(COL_DEMAND)?,
        skill_half_life_years: src.number(COL_HALF_LIFE)?,
        reskilling_frequency_years: src.number(COL_RESKILLING)?,
        learning_mode: src.required_text(COL_LEARNING_MODE)?,
    };
    validate(&record, src.row())?;
    Ok(record)
}

/// Check the value-range invariants of one record.
fn validate(rec: &SkillRecord, row: usize) -> Result<(), DataLoadError> {
    let out_of_range = |column: &str, value: f64, expected: &'static str| DataLoadError::OutOfRange {
        row,
        column: column.to_string(),
        value,
        expected,
    };

    for (column, value) in [
        (COL_EXPOSURE, rec.ai_exposure_level),
        (COL_RISK, rec.automation_risk),
    ] {
        if !(0.0..=100.0).contains(&value) {
            return Err(out_of_range(column, value, "[0, 100]"));
        }
    }
    for (column, value) in [
        (COL_HALF_LIFE, rec.skill_half_life_years),
        (COL_RESKILLING, rec.reskilling_frequency_years),
    ] {
        if !(value.is_finite() && value > 0.0) {
            return Err(out_of_range(column, value, "(0, inf)"));
        }
    }
    if !rec.current_market_demand.is_finite() {
        return Err(out_of_range(COL_DEMAND, rec.current_market_demand, "finite numbers"));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// CSV loader
// ---------------------------------------------------------------------------

struct CsvRow<'a> {
    row: usize,
    headers: &'a [String],
    record: &'a csv::StringRecord,
}

impl RowSource for CsvRow<'_> {
    fn row(&self) -> usize {
        self.row + 1
    }

    fn text(&self, column: &str) -> Result<Option<String>, DataLoadError> {
        let idx = self
            .headers
            .iter()
            .position(|h| h == column)
            .ok_or_else(|| DataLoadError::MissingColumn(column.to_string()))?;
        Ok(self
            .record
            .get(idx)
            .filter(|s| !s.is_empty())
            .map(str::to_string))
    }
}

/// CSV layout: header row with column names, one skill per row.
fn load_csv(path: &Path) -> Result<Vec<SkillRecord>, DataLoadError> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(open(path)?);
    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    check_columns(headers.iter().map(String::as_str))?;

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result?;
        records.push(build_record(&CsvRow {
            row,
            headers: &headers,
            record: &record,
        })?);
    }
    Ok(records)
}

fn check_columns<'a>(present: impl Iterator<Item = &'a str> + Clone) -> Result<(), DataLoadError> {
    for required in REQUIRED_COLUMNS {
        if !present.clone().any(|c| c == required) {
            return Err(DataLoadError::MissingColumn(required.to_string()));
        }
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// JSON loader
// ---------------------------------------------------------------------------

struct JsonRow<'a> {
    row: usize,
    obj: &'a Map<String, JsonValue>,
}

impl RowSource for JsonRow<'_> {
    fn row(&self) -> usize {
        self.row + 1
    }

    fn text(&self, column: &str) -> Result<Option<String>, DataLoadError> {
        match self.obj.get(column) {
            None => Err(DataLoadError::MissingColumn(column.to_string())),
            Some(JsonValue::Null) => Ok(None),
            Some(JsonValue::String(s)) => Ok(Some(s.clone())),
            Some(other) => Ok(Some(other.to_string())),
        }
    }

    fn number(&self, column: &str) -> Result<f64, DataLoadError> {
        match self.obj.get(column) {
            None => Err(DataLoadError::MissingColumn(column.to_string())),
            Some(JsonValue::Number(n)) => n
                .as_f64()
                .ok_or_else(|| invalid(self.row(), column, &n.to_string())),
            Some(JsonValue::String(s)) => s
                .trim()
                .parse::<f64>()
                .map_err(|_| invalid(self.row(), column, s)),
            Some(other) => Err(invalid(self.row(), column, &other.to_string())),
        }
    }
}

/// Expected JSON schema (records-oriented, the default `df.to_json(orient='records')`):
///
/// ```json
/// [
///   {
///     "skill_category": "Data Science",
///     "industry": "Finance",
///     "ai_exposure_level": 72.5,
///     ...
///   },
///   ...
/// ]
/// ```
fn load_json(path: &Path) -> Result<Vec<SkillRecord>, DataLoadError> {
    let root: JsonValue = serde_json::from_reader(std::io::BufReader::new(open(path)?))?;
    let rows = root.as_array().ok_or(DataLoadError::NotARecordArray)?;

    rows.iter()
        .enumerate()
        .map(|(row, value)| {
            let obj = value.as_object().ok_or(DataLoadError::NotARecordArray)?;
            build_record(&JsonRow { row, obj })
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Parquet loader
// ---------------------------------------------------------------------------

/// One record batch with every required column cast to a uniform type
/// (`Float64` for numeric columns, `Utf8` for text).
struct ParquetBatch {
    columns: Vec<(&'static str, ArrayRef)>,
    skill_name: Option<ArrayRef>,
}

struct ParquetRow<'a> {
    row: usize,
    offset: usize,
    batch: &'a ParquetBatch,
}

impl ParquetBatch {
    fn from_record_batch(batch: &RecordBatch) -> Result<Self, DataLoadError> {
        let schema = batch.schema();
        check_columns(schema.fields().iter().map(|f| f.name().as_str()))?;

        let numeric = [COL_EXPOSURE, COL_RISK, COL_DEMAND, COL_HALF_LIFE, COL_RESKILLING];
        let mut columns = Vec::with_capacity(REQUIRED_COLUMNS.len());
        for column in REQUIRED_COLUMNS {
            let idx = schema
                .index_of(column)
                .map_err(|_| DataLoadError::MissingColumn(column.to_string()))?;
            let target = if numeric.contains(&column) {
                DataType::Float64
            } else {
                DataType::Utf8
            };
            columns.push((column, cast_column(column, batch.column(idx), &target)?));
        }

        let skill_name = match schema.index_of(COL_SKILL_NAME) {
            Ok(idx) => Some(cast_column(COL_SKILL_NAME, batch.column(idx), &DataType::Utf8)?),
            Err(_) => None,
        };

        Ok(ParquetBatch { columns, skill_name })
    }

    fn column(&self, name: &str) -> Result<&ArrayRef, DataLoadError> {
        self.columns
            .iter()
            .find(|(n, _)| *n == name)
            .map(|(_, a)| a)
            .ok_or_else(|| DataLoadError::MissingColumn(name.to_string()))
    }
}

fn cast_column(name: &str, array: &ArrayRef, target: &DataType) -> Result<ArrayRef, DataLoadError> {
    let supported = match target {
        DataType::Float64 => array.data_type().is_numeric(),
        _ => matches!(
            array.data_type(),
            DataType::Utf8 | DataType::LargeUtf8 | DataType::Utf8View | DataType::Dictionary(_, _)
        ),
    };
    if !supported {
        return Err(DataLoadError::UnexpectedType {
            column: name.to_string(),
            data_type: format!("{:?}", array.data_type()),
        });
    }
    Ok(cast(array, target)?)
}

impl RowSource for ParquetRow<'_> {
    fn row(&self) -> usize {
        self.offset + self.row + 1
    }

    fn text(&self, column: &str) -> Result<Option<String>, DataLoadError> {
        let array = if column == COL_SKILL_NAME {
            match &self.batch.skill_name {
                Some(a) => a,
                None => return Ok(None),
            }
        } else {
            self.batch.column(column)?
        };
        if array.is_null(self.row) {
            return Ok(None);
        }
        Ok(Some(array.as_string::<i32>().value(self.row).to_string()))
    }

    fn number(&self, column: &str) -> Result<f64, DataLoadError> {
        let array = self.batch.column(column)?;
        if array.is_null(self.row) {
            return Err(invalid(self.row(), column, "null"));
        }
        Ok(array.as_primitive::<Float64Type>().value(self.row))
    }
}

/// Load a flat Parquet table. Works with files written by Pandas
/// (`df.to_parquet()`), Polars and the bundled sample generator.
fn load_parquet(path: &Path) -> Result<Vec<SkillRecord>, DataLoadError> {
    let builder = ParquetRecordBatchReaderBuilder::try_new(open(path)?)?;
    let reader = builder.build()?;

    let mut records = Vec::new();
    for batch_result in reader {
        let batch = batch_result?;
        let typed = ParquetBatch::from_record_batch(&batch)?;
        let offset = records.len();
        for row in 0..batch.num_rows() {
            records.push(build_record(&ParquetRow {
                row,
                offset,
                batch: &typed,
            })?);
        }
    }
    Ok(records)
}

/// Shared by the sample generator so both outputs carry the same schema.
pub fn arrow_schema() -> Arc<arrow::datatypes::Schema> {
    use arrow::datatypes::{Field, Schema};

    Arc::new(Schema::new(vec![
        Field::new(COL_SKILL_NAME, DataType::Utf8, true),
        Field::new(COL_CATEGORY, DataType::Utf8, false),
        Field::new(COL_INDUSTRY, DataType::Utf8, false),
        Field::new(COL_EXPOSURE, DataType::Float64, false),
        Field::new(COL_RISK, DataType::Float64, false),
        Field::new(COL_DEMAND, DataType::Float64, false),
        Field::new(COL_HALF_LIFE, DataType::Float64, false),
        Field::new(COL_RESKILLING, DataType::Float64, false),
        Field::new(COL_LEARNING_MODE, DataType::Utf8, false),
    ]))
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use arrow::array::{Float64Array, Int64Array, StringArray};
    use arrow::datatypes::{Field, Schema};
    use parquet::arrow::ArrowWriter;

    use super::*;

    const HEADER: &str = "skill_name,skill_category,industry,ai_exposure_level,automation_risk,\
current_market_demand,skill_half_life_years,reskilling_frequency_years,learning_mode";

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &str) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    #[test]
    fn loads_csv_with_required_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "skills.csv",
            &format!(
                "{HEADER}\nPython,Data,Finance,80,75,60,2.5,1.5,Online\n\
                 ,Cloud,Retail,30,20,40,5,3,Bootcamp\n"
            ),
        );

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].skill_name.as_deref(), Some("Python"));
        assert_eq!(ds.records[1].skill_name, None);
        assert_eq!(ds.records[1].industry, "Retail");
        assert_eq!(ds.records[0].skill_half_life_years, 2.5);
        assert_eq!(ds.categories, vec!["Data", "Cloud"]);
    }

    #[test]
    fn header_only_csv_is_an_empty_dataset() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "empty.csv", &format!("{HEADER}\n"));
        let ds = load_file(&path).unwrap();
        assert!(ds.is_empty());
        assert_eq!(ds.exposure_range, None);
    }

    #[test]
    fn missing_column_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            "skill_category,industry,ai_exposure_level\nData,Finance,10\n",
        );
        match load_file(&path) {
            Err(DataLoadError::MissingColumn(col)) => assert_eq!(col, "automation_risk"),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn non_numeric_cell_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            &format!("{HEADER}\nPython,Data,Finance,high,75,60,2.5,1.5,Online\n"),
        );
        match load_file(&path) {
            Err(DataLoadError::InvalidValue { row, column, value }) => {
                assert_eq!(row, 1);
                assert_eq!(column, "ai_exposure_level");
                assert_eq!(value, "high");
            }
            other => panic!("expected InvalidValue, got {other:?}"),
        }
        let message = load_file(&path).unwrap_err().to_string();
        assert!(message.starts_with("data row 1, column 'ai_exposure_level'"));
    }

    #[test]
    fn out_of_range_values_are_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            &format!(
                "{HEADER}\nPython,Data,Finance,50,75,60,2.5,1.5,Online\n\
                 Rust,Data,Finance,50,101,60,2.5,1.5,Online\n"
            ),
        );
        match load_file(&path) {
            Err(DataLoadError::OutOfRange { row, column, .. }) => {
                assert_eq!(row, 2);
                assert_eq!(column, "automation_risk");
            }
            other => panic!("expected OutOfRange, got {other:?}"),
        }

        let path = write_file(
            &dir,
            "zero.csv",
            &format!("{HEADER}\nPython,Data,Finance,50,75,60,0,1.5,Online\n"),
        );
        assert!(matches!(
            load_file(&path),
            Err(DataLoadError::OutOfRange { .. })
        ));
    }

    #[test]
    fn empty_category_is_invalid() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "bad.csv",
            &format!("{HEADER}\nPython,,Finance,50,75,60,2,1.5,Online\n"),
        );
        assert!(matches!(
            load_file(&path),
            Err(DataLoadError::InvalidValue { .. })
        ));
    }

    #[test]
    fn missing_file_and_unknown_extension() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            load_file(&dir.path().join("nope.csv")),
            Err(DataLoadError::Io { .. })
        ));
        assert!(matches!(
            load_file(&dir.path().join("skills.xlsx")),
            Err(DataLoadError::UnsupportedExtension(ext)) if ext == "xlsx"
        ));
    }

    #[test]
    fn loads_json_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(
            &dir,
            "skills.json",
            r#"[
                {"skill_category": "Data", "industry": "Finance", "ai_exposure_level": 80,
                 "automation_risk": 75.5, "current_market_demand": 60,
                 "skill_half_life_years": 2.5, "reskilling_frequency_years": "1.5",
                 "learning_mode": "Online"}
            ]"#,
        );
        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 1);
        assert_eq!(ds.records[0].automation_risk, 75.5);
        assert_eq!(ds.records[0].reskilling_frequency_years, 1.5);
    }

    #[test]
    fn json_must_be_a_record_array() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "skills.json", r#"{"rows": []}"#);
        assert!(matches!(load_file(&path), Err(DataLoadError::NotARecordArray)));
    }

    #[test]
    fn loads_parquet_with_integer_columns() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("skills.parquet");

        let schema = Arc::new(Schema::new(vec![
            Field::new(COL_CATEGORY, DataType::Utf8, false),
            Field::new(COL_INDUSTRY, DataType::Utf8, false),
            Field::new(COL_EXPOSURE, DataType::Int64, false),
            Field::new(COL_RISK, DataType::Float64, false),
            Field::new(COL_DEMAND, DataType::Float64, false),
            Field::new(COL_HALF_LIFE, DataType::Float64, false),
            Field::new(COL_RESKILLING, DataType::Float64, false),
            Field::new(COL_LEARNING_MODE, DataType::Utf8, false),
        ]));
        let batch = RecordBatch::try_new(
            schema.clone(),
            vec![
                Arc::new(StringArray::from(vec!["Data", "Cloud"])),
                Arc::new(StringArray::from(vec!["Finance", "Retail"])),
                Arc::new(Int64Array::from(vec![80, 30])),
                Arc::new(Float64Array::from(vec![75.0, 20.0])),
                Arc::new(Float64Array::from(vec![60.0, 40.0])),
                Arc::new(Float64Array::from(vec![2.0, 5.0])),
                Arc::new(Float64Array::from(vec![1.0, 3.0])),
                Arc::new(StringArray::from(vec!["Online", "Mentoring"])),
            ],
        )
        .unwrap();
        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        let ds = load_file(&path).unwrap();
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.records[0].ai_exposure_level, 80.0);
        assert_eq!(ds.records[1].learning_mode, "Mentoring");
        assert_eq!(ds.records[0].skill_name, None);
    }
}
