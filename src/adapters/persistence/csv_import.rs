//! CSV dataset import. Reads an HR export with a header row into a `Table`,
//! inferring INTEGER, then REAL, then TEXT per column. Empty cells become NULL.

use crate::domain::{Column, DomainError, Table, Value};
use crate::ports::DataStorePort;
use std::io::Read;
use std::path::Path;
use tracing::info;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Inferred {
    Integer,
    Real,
    Text,
}

fn infer(cells: &[String]) -> Inferred {
    let mut kind = Inferred::Integer;
    for cell in cells.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
        if kind == Inferred::Integer && cell.parse::<i64>().is_err() {
            kind = Inferred::Real;
        }
        if kind == Inferred::Real && cell.parse::<f64>().is_err() {
            return Inferred::Text;
        }
    }
    kind
}

fn convert(cell: String, kind: Inferred) -> Value {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        return Value::Null;
    }
    match kind {
        Inferred::Integer => trimmed.parse().map(Value::Integer).unwrap_or(Value::Text(cell)),
        Inferred::Real => trimmed.parse().map(Value::Real).unwrap_or(Value::Text(cell)),
        Inferred::Text => Value::Text(cell),
    }
}

/// Parse CSV text (header row required) into a typed table.
pub fn read_table<R: Read>(reader: R) -> Result<Table, DomainError> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);
    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| DomainError::Import(format!("CSV header: {}", e)))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();
    if headers.is_empty() || headers.iter().all(String::is_empty) {
        return Err(DomainError::Import("CSV has no header row".to_string()));
    }

    let mut raw: Vec<Vec<String>> = vec![Vec::new(); headers.len()];
    for record in rdr.records() {
        let record = record.map_err(|e| DomainError::Import(format!("CSV record: {}", e)))?;
        for (i, col) in raw.iter_mut().enumerate() {
            col.push(record.get(i).unwrap_or_default().to_string());
        }
    }

    let columns = headers
        .into_iter()
        .zip(raw)
        .map(|(name, cells)| {
            let kind = infer(&cells);
            let values = cells.into_iter().map(|c| convert(c, kind)).collect();
            Column::new(name, values)
        })
        .collect();
    Ok(Table::new(columns))
}

/// Load `path` into `table_name`, replacing any existing table. Returns rows imported.
pub async fn import_csv(
    store: &dyn DataStorePort,
    path: &Path,
    table_name: &str,
) -> Result<usize, DomainError> {
    let bytes = tokio::fs::read(path)
        .await
        .map_err(|e| DomainError::Import(format!("read {}: {}", path.display(), e)))?;
    let table = read_table(bytes.as_slice())?;
    info!(
        path = %path.display(),
        rows = table.row_count(),
        columns = table.column_count(),
        "parsed CSV dataset"
    );
    store.import_table(table_name, &table).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::persistence::sqlite_store::SqliteStore;

    const SAMPLE: &str = "EMPLOYEE_NAME,SALARY,ABSENCES,DEPARTMENT,EMPLOYEE_EMAIL\n\
        Ann,62000,1.5,IT,ann@corp.com\n\
        Bob,,3,Production ,bob@corp.com\n";

    #[test]
    fn test_read_table_infers_types() {
        let t = read_table(SAMPLE.as_bytes()).unwrap();
        assert_eq!(t.row_count(), 2);
        let salary = t.column("SALARY").unwrap();
        assert_eq!(salary.values, vec![Value::Integer(62000), Value::Null]);
        let absences = t.column("ABSENCES").unwrap();
        assert_eq!(absences.values, vec![Value::Real(1.5), Value::Real(3.0)]);
        let dept = t.column("DEPARTMENT").unwrap();
        assert_eq!(dept.values[1], Value::Text("Production ".into()));
    }

    #[test]
    fn test_read_table_requires_header() {
        assert!(read_table("".as_bytes()).is_err());
    }

    #[tokio::test]
    async fn test_import_csv_into_store() {
        let dir = tempfile::tempdir().unwrap();
        let csv_path = dir.path().join("hr.csv");
        std::fs::write(&csv_path, SAMPLE).unwrap();
        let store = SqliteStore::connect(dir.path()).await.unwrap();

        let n = import_csv(&store, &csv_path, "HR_DATASET").await.unwrap();
        assert_eq!(n, 2);
        let t = store
            .run_query("SELECT SUM(SALARY) AS TOTAL FROM HR_DATASET")
            .await;
        assert_eq!(t.row(0), vec![&Value::Integer(62000)]);
    }
}
