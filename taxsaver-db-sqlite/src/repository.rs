use chrono::{DateTime, NaiveDate, Utc};
use async_trait::async_trait;
use sqlx::sqlite::{SqlitePool, SqliteRow};
use tracing::info;

use taxsaver_core::models::{
    AgeBracket, DeductionCategory, Expense, FamilyMember, GoalPriority, NewExpense,
    NewFamilyMember, NewSavingsGoal, NewScenarioRecord, NewUserProfile, SavingsGoal,
    ScenarioRecord, UserProfile,
};
use taxsaver_core::{PlannerRepository, RepositoryError};

use crate::row::{
    decimal_to_f64, get_code, get_decimal, get_optional_code, get_optional_decimal, get_value,
};

/// [`PlannerRepository`] backed by a local SQLite file (or an in-memory
/// database for tests). Single-user, best-effort local state, the analog of
/// the original per-browser storage.
pub struct SqliteRepository {
    pool: SqlitePool,
}

impl SqliteRepository {
    pub async fn new(database_url: &str) -> Result<Self, RepositoryError> {
        let pool = SqlitePool::connect(database_url).await.map_err(|e| {
            RepositoryError::Connection(format!("failed to connect to '{}': {}", database_url, e))
        })?;
        Ok(Self { pool })
    }

    pub fn new_with_pool(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn run_migrations(&self) -> Result<(), RepositoryError> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .map_err(|e| RepositoryError::Database(format!("migration failed: {}", e)))?;
        info!("planner database migrations applied");
        Ok(())
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn database_error(e: sqlx::Error) -> RepositoryError {
    RepositoryError::Database(e.to_string())
}

fn row_to_profile(row: &SqliteRow) -> Result<UserProfile, RepositoryError> {
    Ok(UserProfile {
        id: get_value(row, "id")?,
        name: get_value(row, "name")?,
        email: get_value(row, "email")?,
        created_at: get_value::<DateTime<Utc>>(row, "created_at")?,
    })
}

fn row_to_family_member(row: &SqliteRow) -> Result<FamilyMember, RepositoryError> {
    Ok(FamilyMember {
        id: get_value(row, "id")?,
        name: get_value(row, "name")?,
        relation: get_value(row, "relation")?,
        age: get_value(row, "age")?,
        income: get_decimal(row, "income")?,
        has_health_insurance: get_value(row, "has_health_insurance")?,
        investments: get_decimal(row, "investments")?,
        created_at: get_value::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get_value::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_expense(row: &SqliteRow) -> Result<Expense, RepositoryError> {
    Ok(Expense {
        id: get_value(row, "id")?,
        category: get_value(row, "category")?,
        description: get_value(row, "description")?,
        amount: get_decimal(row, "amount")?,
        incurred_on: get_value::<NaiveDate>(row, "incurred_on")?,
        tax_deductible: get_value(row, "tax_deductible")?,
        section: get_optional_code(row, "section", DeductionCategory::parse)?,
        created_at: get_value::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get_value::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_goal(row: &SqliteRow) -> Result<SavingsGoal, RepositoryError> {
    Ok(SavingsGoal {
        id: get_value(row, "id")?,
        title: get_value(row, "title")?,
        target_amount: get_decimal(row, "target_amount")?,
        current_amount: get_decimal(row, "current_amount")?,
        category: get_value(row, "category")?,
        target_date: get_value::<NaiveDate>(row, "target_date")?,
        priority: get_code(row, "priority", GoalPriority::parse)?,
        description: get_value(row, "description")?,
        tax_benefit: get_value(row, "tax_benefit")?,
        created_at: get_value::<DateTime<Utc>>(row, "created_at")?,
        updated_at: get_value::<DateTime<Utc>>(row, "updated_at")?,
    })
}

fn row_to_scenario(row: &SqliteRow) -> Result<ScenarioRecord, RepositoryError> {
    Ok(ScenarioRecord {
        id: get_value(row, "id")?,
        gross_income: get_decimal(row, "gross_income")?,
        age_bracket: get_code(row, "age_bracket", AgeBracket::parse)?,
        claimed_80c: get_optional_decimal(row, "claimed_80c")?,
        claimed_80d: get_optional_decimal(row, "claimed_80d")?,
        claimed_home_loan_interest: get_optional_decimal(row, "claimed_home_loan_interest")?,
        claimed_education_loan_interest: get_optional_decimal(
            row,
            "claimed_education_loan_interest",
        )?,
        claimed_nps: get_optional_decimal(row, "claimed_nps")?,
        claimed_other: get_optional_decimal(row, "claimed_other")?,
        taxable_income: get_decimal(row, "taxable_income")?,
        baseline_tax: get_decimal(row, "baseline_tax")?,
        optimized_tax: get_decimal(row, "optimized_tax")?,
        total_savings: get_decimal(row, "total_savings")?,
        created_at: get_value::<DateTime<Utc>>(row, "created_at")?,
    })
}

#[async_trait]
impl PlannerRepository for SqliteRepository {
    async fn create_profile(
        &self,
        profile: NewUserProfile,
    ) -> Result<UserProfile, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO user_profiles (name, email, created_at) VALUES (?, ?, ?)",
        )
        .bind(&profile.name)
        .bind(&profile.email)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        let id = result.last_insert_rowid();
        let row = sqlx::query("SELECT * FROM user_profiles WHERE id = ?")
            .bind(id)
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)?;
        row_to_profile(&row)
    }

    async fn get_profile_by_email(&self, email: &str) -> Result<UserProfile, RepositoryError> {
        let row = sqlx::query("SELECT * FROM user_profiles WHERE email = ?")
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;
        row_to_profile(&row)
    }

    async fn add_family_member(
        &self,
        member: NewFamilyMember,
    ) -> Result<FamilyMember, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO family_members (
                name, relation, age, income, has_health_insurance, investments,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&member.name)
        .bind(&member.relation)
        .bind(member.age)
        .bind(decimal_to_f64(member.income))
        .bind(member.has_health_insurance)
        .bind(decimal_to_f64(member.investments))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        self.get_family_member(result.last_insert_rowid()).await
    }

    async fn get_family_member(&self, id: i64) -> Result<FamilyMember, RepositoryError> {
        let row = sqlx::query("SELECT * FROM family_members WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;
        row_to_family_member(&row)
    }

    async fn update_family_member(&self, member: &FamilyMember) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE family_members
             SET name = ?, relation = ?, age = ?, income = ?,
                 has_health_insurance = ?, investments = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&member.name)
        .bind(&member.relation)
        .bind(member.age)
        .bind(decimal_to_f64(member.income))
        .bind(member.has_health_insurance)
        .bind(decimal_to_f64(member.investments))
        .bind(Utc::now())
        .bind(member.id)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn remove_family_member(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM family_members WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_family_members(&self) -> Result<Vec<FamilyMember>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM family_members ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.iter().map(row_to_family_member).collect()
    }

    async fn add_expense(&self, expense: NewExpense) -> Result<Expense, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO expenses (
                category, description, amount, incurred_on, tax_deductible, section,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(decimal_to_f64(expense.amount))
        .bind(expense.incurred_on)
        .bind(expense.tax_deductible)
        .bind(expense.section.map(|section| section.as_str()))
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        self.get_expense(result.last_insert_rowid()).await
    }

    async fn get_expense(&self, id: i64) -> Result<Expense, RepositoryError> {
        let row = sqlx::query("SELECT * FROM expenses WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;
        row_to_expense(&row)
    }

    async fn update_expense(&self, expense: &Expense) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE expenses
             SET category = ?, description = ?, amount = ?, incurred_on = ?,
                 tax_deductible = ?, section = ?, updated_at = ?
             WHERE id = ?",
        )
        .bind(&expense.category)
        .bind(&expense.description)
        .bind(decimal_to_f64(expense.amount))
        .bind(expense.incurred_on)
        .bind(expense.tax_deductible)
        .bind(expense.section.map(|section| section.as_str()))
        .bind(Utc::now())
        .bind(expense.id)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn remove_expense(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM expenses WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_expenses(&self) -> Result<Vec<Expense>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM expenses ORDER BY incurred_on, id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.iter().map(row_to_expense).collect()
    }

    async fn add_goal(&self, goal: NewSavingsGoal) -> Result<SavingsGoal, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO savings_goals (
                title, target_amount, current_amount, category, target_date,
                priority, description, tax_benefit, created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(&goal.title)
        .bind(decimal_to_f64(goal.target_amount))
        .bind(decimal_to_f64(goal.current_amount))
        .bind(&goal.category)
        .bind(goal.target_date)
        .bind(goal.priority.as_str())
        .bind(&goal.description)
        .bind(&goal.tax_benefit)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        self.get_goal(result.last_insert_rowid()).await
    }

    async fn get_goal(&self, id: i64) -> Result<SavingsGoal, RepositoryError> {
        let row = sqlx::query("SELECT * FROM savings_goals WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;
        row_to_goal(&row)
    }

    async fn update_goal(&self, goal: &SavingsGoal) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE savings_goals
             SET title = ?, target_amount = ?, current_amount = ?, category = ?,
                 target_date = ?, priority = ?, description = ?, tax_benefit = ?,
                 updated_at = ?
             WHERE id = ?",
        )
        .bind(&goal.title)
        .bind(decimal_to_f64(goal.target_amount))
        .bind(decimal_to_f64(goal.current_amount))
        .bind(&goal.category)
        .bind(goal.target_date)
        .bind(goal.priority.as_str())
        .bind(&goal.description)
        .bind(&goal.tax_benefit)
        .bind(Utc::now())
        .bind(goal.id)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn remove_goal(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM savings_goals WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn list_goals(&self) -> Result<Vec<SavingsGoal>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM savings_goals ORDER BY target_date, id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.iter().map(row_to_goal).collect()
    }

    async fn save_scenario(
        &self,
        scenario: NewScenarioRecord,
    ) -> Result<ScenarioRecord, RepositoryError> {
        let now = Utc::now();

        let result = sqlx::query(
            "INSERT INTO scenarios (
                gross_income, age_bracket, claimed_80c, claimed_80d,
                claimed_home_loan_interest, claimed_education_loan_interest,
                claimed_nps, claimed_other, taxable_income, baseline_tax,
                optimized_tax, total_savings, created_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
        )
        .bind(decimal_to_f64(scenario.gross_income))
        .bind(scenario.age_bracket.as_str())
        .bind(scenario.claimed_80c.map(decimal_to_f64))
        .bind(scenario.claimed_80d.map(decimal_to_f64))
        .bind(scenario.claimed_home_loan_interest.map(decimal_to_f64))
        .bind(scenario.claimed_education_loan_interest.map(decimal_to_f64))
        .bind(scenario.claimed_nps.map(decimal_to_f64))
        .bind(scenario.claimed_other.map(decimal_to_f64))
        .bind(decimal_to_f64(scenario.taxable_income))
        .bind(decimal_to_f64(scenario.baseline_tax))
        .bind(decimal_to_f64(scenario.optimized_tax))
        .bind(decimal_to_f64(scenario.total_savings))
        .bind(now)
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        self.get_scenario(result.last_insert_rowid()).await
    }

    async fn get_scenario(&self, id: i64) -> Result<ScenarioRecord, RepositoryError> {
        let row = sqlx::query("SELECT * FROM scenarios WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(database_error)?
            .ok_or(RepositoryError::NotFound)?;
        row_to_scenario(&row)
    }

    async fn list_scenarios(&self) -> Result<Vec<ScenarioRecord>, RepositoryError> {
        let rows = sqlx::query("SELECT * FROM scenarios ORDER BY id")
            .fetch_all(&self.pool)
            .await
            .map_err(database_error)?;

        rows.iter().map(row_to_scenario).collect()
    }

    async fn delete_scenario(&self, id: i64) -> Result<(), RepositoryError> {
        let result = sqlx::query("DELETE FROM scenarios WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }
}
