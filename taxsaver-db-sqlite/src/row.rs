//! Helpers for reading typed values out of SQLite rows.
//!
//! Money columns are written as REAL (or INTEGER when whole) and read back
//! into `Decimal`; enum-coded columns are TEXT holding the model's short
//! codes. Both directions funnel through here so the repository never
//! hand-rolls conversions.

use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, TypeInfo, ValueRef};
use taxsaver_core::RepositoryError;

/// Read a plainly-typed column, mapping sqlx failures to [`RepositoryError`].
pub fn get_value<'r, T>(row: &'r SqliteRow, column: &str) -> Result<T, RepositoryError>
where
    T: sqlx::Decode<'r, sqlx::Sqlite> + sqlx::Type<sqlx::Sqlite>,
{
    row.try_get(column)
        .map_err(|e| RepositoryError::Database(format!("column '{}': {}", column, e)))
}

/// Read a money column, accepting INTEGER, REAL, or NULL (NULL reads as zero).
pub fn get_decimal(row: &SqliteRow, column: &str) -> Result<Decimal, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("column '{}' not found: {}", column, e)))?;

    let type_name = value_ref.type_info().name().to_string();
    match type_name.as_str() {
        "INTEGER" => {
            let value: i64 = get_value(row, column)?;
            Ok(Decimal::from(value))
        }
        "REAL" => {
            let value: f64 = get_value(row, column)?;
            Decimal::try_from(value).map_err(|e| {
                RepositoryError::Database(format!(
                    "column '{}': cannot represent {} as a decimal: {}",
                    column, value, e
                ))
            })
        }
        "NULL" => Ok(Decimal::ZERO),
        other => Err(RepositoryError::Database(format!(
            "column '{}' has unexpected type '{}'",
            column, other
        ))),
    }
}

/// Read an optional money column; NULL reads as `None`.
pub fn get_optional_decimal(
    row: &SqliteRow,
    column: &str,
) -> Result<Option<Decimal>, RepositoryError> {
    let value_ref = row
        .try_get_raw(column)
        .map_err(|e| RepositoryError::Database(format!("column '{}' not found: {}", column, e)))?;

    if value_ref.is_null() {
        return Ok(None);
    }
    get_decimal(row, column).map(Some)
}

/// Read an enum-coded TEXT column through the model's `parse` function.
pub fn get_code<T>(
    row: &SqliteRow,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<T, RepositoryError> {
    let code: String = get_value(row, column)?;
    parse(&code).ok_or_else(|| {
        RepositoryError::Database(format!("column '{}' holds unknown code '{}'", column, code))
    })
}

/// Read an optional enum-coded TEXT column; NULL reads as `None`.
pub fn get_optional_code<T>(
    row: &SqliteRow,
    column: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>, RepositoryError> {
    let code: Option<String> = get_value(row, column)?;
    match code {
        Some(code) => parse(&code)
            .map(Some)
            .ok_or_else(|| {
                RepositoryError::Database(format!(
                    "column '{}' holds unknown code '{}'",
                    column, code
                ))
            }),
        None => Ok(None),
    }
}

/// Convert a `Decimal` to the f64 SQLite stores for money columns.
pub fn decimal_to_f64(d: Decimal) -> f64 {
    d.to_f64().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;
    use sqlx::sqlite::SqlitePoolOptions;
    use taxsaver_core::models::{AgeBracket, DeductionCategory};

    use super::*;

    async fn setup_test_db() -> sqlx::sqlite::SqlitePool {
        let pool = SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        sqlx::query(
            "CREATE TABLE row_samples (
                id INTEGER PRIMARY KEY,
                int_value INTEGER,
                real_value REAL,
                null_value REAL,
                code_value TEXT,
                text_value TEXT
            )",
        )
        .execute(&pool)
        .await
        .expect("Failed to create test table");
        pool
    }

    async fn fetch_sample(pool: &sqlx::sqlite::SqlitePool, insert: &str) -> SqliteRow {
        sqlx::query(insert)
            .execute(pool)
            .await
            .expect("Failed to insert test data");
        sqlx::query("SELECT * FROM row_samples LIMIT 1")
            .fetch_one(pool)
            .await
            .expect("Failed to fetch row")
    }

    #[tokio::test]
    async fn get_decimal_reads_integer_column() {
        let pool = setup_test_db().await;
        let row = fetch_sample(&pool, "INSERT INTO row_samples (id, int_value) VALUES (1, 150000)")
            .await;

        assert_eq!(get_decimal(&row, "int_value"), Ok(dec!(150000)));
    }

    #[tokio::test]
    async fn get_decimal_reads_real_column() {
        let pool = setup_test_db().await;
        let row = fetch_sample(
            &pool,
            "INSERT INTO row_samples (id, real_value) VALUES (1, 28600.5)",
        )
        .await;

        assert_eq!(get_decimal(&row, "real_value"), Ok(dec!(28600.5)));
    }

    #[tokio::test]
    async fn get_decimal_reads_null_as_zero() {
        let pool = setup_test_db().await;
        let row = fetch_sample(&pool, "INSERT INTO row_samples (id) VALUES (1)").await;

        assert_eq!(get_decimal(&row, "null_value"), Ok(dec!(0)));
    }

    #[tokio::test]
    async fn get_decimal_rejects_text_column() {
        let pool = setup_test_db().await;
        let row = fetch_sample(
            &pool,
            "INSERT INTO row_samples (id, text_value) VALUES (1, 'oops')",
        )
        .await;

        assert!(matches!(
            get_decimal(&row, "text_value"),
            Err(RepositoryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn get_optional_decimal_reads_null_as_none() {
        let pool = setup_test_db().await;
        let row = fetch_sample(&pool, "INSERT INTO row_samples (id) VALUES (1)").await;

        assert_eq!(get_optional_decimal(&row, "null_value"), Ok(None));
    }

    #[tokio::test]
    async fn get_code_parses_known_codes() {
        let pool = setup_test_db().await;
        let row = fetch_sample(
            &pool,
            "INSERT INTO row_samples (id, code_value) VALUES (1, '60to80')",
        )
        .await;

        assert_eq!(
            get_code(&row, "code_value", AgeBracket::parse),
            Ok(AgeBracket::SixtyToEighty)
        );
    }

    #[tokio::test]
    async fn get_code_rejects_unknown_codes() {
        let pool = setup_test_db().await;
        let row = fetch_sample(
            &pool,
            "INSERT INTO row_samples (id, code_value) VALUES (1, 'centenarian')",
        )
        .await;

        assert!(matches!(
            get_code(&row, "code_value", AgeBracket::parse),
            Err(RepositoryError::Database(_))
        ));
    }

    #[tokio::test]
    async fn get_optional_code_reads_null_as_none() {
        let pool = setup_test_db().await;
        let row = fetch_sample(&pool, "INSERT INTO row_samples (id) VALUES (1)").await;

        assert_eq!(
            get_optional_code(&row, "code_value", DeductionCategory::parse),
            Ok(None)
        );
    }

    #[test]
    fn decimal_to_f64_preserves_two_decimal_money() {
        assert_eq!(decimal_to_f64(dec!(28600.04)), 28600.04);
    }
}
