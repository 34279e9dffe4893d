use rusqlite::Connection;

use super::pool::DbPool;
use crate::chart::raw::{RawRecord, RawValue};
use crate::error::HubError;

/// Source of raw price records, one collection per instrument.
pub trait RecordSource: Send + Sync {
    /// All records in `collection`, ordered ascending by the stored date field.
    fn fetch_sorted(&self, collection: &str) -> Result<Vec<RawRecord>, HubError>;
}

/// Quote a collection name as an SQLite identifier.
pub fn quote_ident(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

/// Fetch every `Date`/`Close` pair from a collection table.
pub fn fetch_records(conn: &Connection, collection: &str) -> Result<Vec<RawRecord>, HubError> {
    let sql = format!(
        r#"SELECT "Date", "Close" FROM {} ORDER BY "Date" ASC"#,
        quote_ident(collection)
    );
    let mut stmt = conn.prepare(&sql)?;

    let rows = stmt
        .query_map([], |row| {
            Ok(RawRecord {
                date: RawValue::from(row.get_ref(0)?),
                close: RawValue::from(row.get_ref(1)?),
            })
        })?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

/// Number of records in a collection.
pub fn count_records(conn: &Connection, collection: &str) -> Result<i64, HubError> {
    let sql = format!("SELECT COUNT(*) FROM {}", quote_ident(collection));
    Ok(conn.query_row(&sql, [], |row| row.get(0))?)
}

/// Number of collections (user tables) in the database.
pub fn count_collections(conn: &Connection) -> Result<i64, HubError> {
    Ok(conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name NOT LIKE 'sqlite_%'",
        [],
        |row| row.get(0),
    )?)
}

/// [`RecordSource`] backed by the shared SQLite pool.
pub struct SqliteSource {
    pool: DbPool,
}

impl SqliteSource {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

impl RecordSource for SqliteSource {
    fn fetch_sorted(&self, collection: &str) -> Result<Vec<RawRecord>, HubError> {
        let conn = self.pool.get()?;
        fetch_records(&conn, collection)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::pool::test_support::*;
    use rusqlite::types::Value;

    #[test]
    fn quote_ident_escapes_quotes_and_keeps_spaces() {
        assert_eq!(quote_ident("MSCI World"), "\"MSCI World\"");
        assert_eq!(quote_ident("a\"b"), "\"a\"\"b\"");
    }

    #[test]
    fn fetch_keeps_field_types_and_sorts_by_date() {
        let path = tmp_db_path("records");
        let conn = Connection::open(&path).unwrap();
        create_collection(&conn, "Procta & Gamble");
        insert_record(
            &conn,
            "Procta & Gamble",
            Value::Text("2020-05-15".into()),
            Value::Text("$140,10".into()),
        );
        insert_record(
            &conn,
            "Procta & Gamble",
            Value::Text("2020-05-14".into()),
            Value::Real(139.5),
        );
        insert_record(&conn, "Procta & Gamble", Value::Text("2020-05-16".into()), Value::Null);

        let rows = fetch_records(&conn, "Procta & Gamble").unwrap();
        assert_eq!(
            rows,
            vec![
                RawRecord::new(RawValue::text("2020-05-14"), RawValue::Numeric(139.5)),
                RawRecord::new(RawValue::text("2020-05-15"), RawValue::text("$140,10")),
                RawRecord::new(RawValue::text("2020-05-16"), RawValue::Missing),
            ]
        );
        assert_eq!(count_records(&conn, "Procta & Gamble").unwrap(), 3);
        assert_eq!(count_collections(&conn).unwrap(), 1);

        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn unknown_collection_is_a_db_error() {
        let path = tmp_db_path("nocoll");
        let conn = Connection::open(&path).unwrap();
        let err = fetch_records(&conn, "SAP").unwrap_err();
        assert!(matches!(err, HubError::Db(_)));

        let _ = std::fs::remove_file(&path);
    }
}
