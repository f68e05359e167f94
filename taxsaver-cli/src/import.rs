use std::io::Read;

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Deserialize;
use taxsaver_core::models::{DeductionCategory, NewExpense};
use taxsaver_core::{PlannerRepository, RepositoryError};
use thiserror::Error;

/// Errors that can occur when importing expense data.
#[derive(Debug, Error)]
pub enum ExpenseImportError {
    #[error("CSV parse error: {0}")]
    CsvParse(String),

    #[error("row {row}: unknown deduction section '{section}'")]
    UnknownSection { row: usize, section: String },

    #[error("row {row}: negative amount {amount}")]
    NegativeAmount { row: usize, amount: Decimal },

    #[error("repository error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<csv::Error> for ExpenseImportError {
    fn from(err: csv::Error) -> Self {
        ExpenseImportError::CsvParse(err.to_string())
    }
}

/// A single record from the expense CSV file.
///
/// Expected columns:
/// - `category`: free-form expense bucket (e.g. `Insurance`)
/// - `description`: free-form note
/// - `amount`: non-negative decimal amount
/// - `incurred_on`: ISO date, e.g. `2024-06-12`
/// - `tax_deductible`: `true` or `false`
/// - `section`: deduction code (`80C`, `80D`, `24B`, `80E`, `80CCD1B`,
///   `OTHER`) or empty when the expense maps to no deduction slot
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct ExpenseRecord {
    pub category: String,
    pub description: String,
    pub amount: Decimal,
    pub incurred_on: NaiveDate,
    pub tax_deductible: bool,
    #[serde(default, deserialize_with = "deserialize_optional_section")]
    pub section: Option<String>,
}

fn deserialize_optional_section<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    let s: Option<String> = Option::deserialize(deserializer)?;
    match s {
        Some(s) if s.trim().is_empty() => Ok(None),
        Some(s) => Ok(Some(s.trim().to_string())),
        None => Ok(None),
    }
}

/// Loader for expense data from CSV files.
///
/// Reads CSV rows, validates them against the planner's deduction codes, and
/// inserts them through the [`PlannerRepository`] trait so any backend works.
pub struct ExpenseCsvLoader;

impl ExpenseCsvLoader {
    /// Parse expense records from a CSV reader (file, string, anything
    /// implementing `Read`).
    pub fn parse<R: Read>(reader: R) -> Result<Vec<ExpenseRecord>, ExpenseImportError> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut records = Vec::new();

        for result in csv_reader.deserialize() {
            let record: ExpenseRecord = result?;
            records.push(record);
        }

        Ok(records)
    }

    /// Validate records and convert them into insertable rows.
    ///
    /// Row numbers in errors are 1-based data rows (the header is row zero).
    /// Nothing is coerced: a negative amount or an unknown section code fails
    /// the whole import so a partial file never lands silently.
    pub fn convert(records: &[ExpenseRecord]) -> Result<Vec<NewExpense>, ExpenseImportError> {
        records
            .iter()
            .enumerate()
            .map(|(i, record)| {
                let row = i + 1;
                if record.amount < Decimal::ZERO {
                    return Err(ExpenseImportError::NegativeAmount {
                        row,
                        amount: record.amount,
                    });
                }
                let section = match &record.section {
                    Some(code) => Some(DeductionCategory::parse(code).ok_or_else(|| {
                        ExpenseImportError::UnknownSection {
                            row,
                            section: code.clone(),
                        }
                    })?),
                    None => None,
                };
                Ok(NewExpense {
                    category: record.category.clone(),
                    description: record.description.clone(),
                    amount: record.amount,
                    incurred_on: record.incurred_on,
                    tax_deductible: record.tax_deductible,
                    section,
                })
            })
            .collect()
    }

    /// Load expense records into the planner store. Returns the number of
    /// rows inserted; validation runs up front so a bad row inserts nothing.
    pub async fn load(
        repo: &dyn PlannerRepository,
        records: &[ExpenseRecord],
    ) -> Result<usize, ExpenseImportError> {
        let expenses = Self::convert(records)?;
        let mut inserted = 0;
        for expense in expenses {
            repo.add_expense(expense).await?;
            inserted += 1;
        }
        Ok(inserted)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    use super::*;

    const VALID_CSV: &str = "\
category,description,amount,incurred_on,tax_deductible,section
Insurance,Family floater premium,18500,2024-06-12,true,80D
Investments,ELSS SIP,20000,2024-07-01,true,80C
Groceries,Monthly run,9400.50,2024-07-03,false,
";

    #[test]
    fn parse_reads_all_rows() {
        let records = ExpenseCsvLoader::parse(VALID_CSV.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(records[0].amount, dec!(18500));
        assert_eq!(records[0].section.as_deref(), Some("80D"));
        assert_eq!(records[2].amount, dec!(9400.50));
        assert_eq!(records[2].section, None);
    }

    #[test]
    fn convert_maps_section_codes() {
        let records = ExpenseCsvLoader::parse(VALID_CSV.as_bytes()).unwrap();

        let expenses = ExpenseCsvLoader::convert(&records).unwrap();

        assert_eq!(expenses[0].section, Some(DeductionCategory::Health80d));
        assert_eq!(expenses[1].section, Some(DeductionCategory::Investments80c));
        assert_eq!(expenses[2].section, None);
    }

    #[test]
    fn convert_rejects_unknown_section_with_row_number() {
        let csv = "\
category,description,amount,incurred_on,tax_deductible,section
Insurance,Premium,18500,2024-06-12,true,80D
Donations,Temple donation,5000,2024-06-20,true,80G
";
        let records = ExpenseCsvLoader::parse(csv.as_bytes()).unwrap();

        let result = ExpenseCsvLoader::convert(&records);

        match result {
            Err(ExpenseImportError::UnknownSection { row, section }) => {
                assert_eq!(row, 2);
                assert_eq!(section, "80G");
            }
            other => panic!("expected UnknownSection, got {:#?}", other),
        }
    }

    #[test]
    fn convert_rejects_negative_amount() {
        let csv = "\
category,description,amount,incurred_on,tax_deductible,section
Refund,Premium refund,-2000,2024-06-12,false,
";
        let records = ExpenseCsvLoader::parse(csv.as_bytes()).unwrap();

        let result = ExpenseCsvLoader::convert(&records);

        assert!(matches!(
            result,
            Err(ExpenseImportError::NegativeAmount { row: 1, .. })
        ));
    }

    #[test]
    fn parse_rejects_malformed_amount() {
        let csv = "\
category,description,amount,incurred_on,tax_deductible,section
Insurance,Premium,eighteen-thousand,2024-06-12,true,80D
";
        let result = ExpenseCsvLoader::parse(csv.as_bytes());

        assert!(matches!(result, Err(ExpenseImportError::CsvParse(_))));
    }

    #[tokio::test]
    async fn load_inserts_into_repository() {
        let pool = sqlx::sqlite::SqlitePoolOptions::new()
            .connect("sqlite::memory:")
            .await
            .expect("Failed to create in-memory database");
        let repo = taxsaver_db_sqlite::SqliteRepository::new_with_pool(pool);
        repo.run_migrations().await.expect("Failed to run migrations");

        let records = ExpenseCsvLoader::parse(VALID_CSV.as_bytes()).unwrap();
        let inserted = ExpenseCsvLoader::load(&repo, &records).await.unwrap();

        assert_eq!(inserted, 3);
        let stored = repo.list_expenses().await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(stored[0].section, Some(DeductionCategory::Health80d));
    }
}
