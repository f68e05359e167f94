use std::fs::File;
use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use tracing_subscriber::EnvFilter;

use taxsaver_cli::import::ExpenseCsvLoader;
use taxsaver_cli::render;
use taxsaver_core::PlannerRepository;
use taxsaver_core::calculations::{ScenarioCalculator, TaxRegime, TaxScenarioInput};
use taxsaver_core::db::{DbConfig, RepositoryRegistry};
use taxsaver_core::models::{
    AgeBracket, DeductionCategory, DeductionClaims, GoalPriority, NewExpense, NewFamilyMember,
    NewSavingsGoal, NewScenarioRecord, NewUserProfile,
};
use taxsaver_db_sqlite::SqliteRepositoryFactory;

/// Personal tax planning and optimization toolkit.
///
/// Computes a baseline-versus-optimized income tax comparison and keeps
/// local planner records (family members, expenses, savings goals) in a
/// single-user SQLite file.
#[derive(Parser, Debug)]
#[command(name = "taxsaver")]
#[command(version, about, long_about = None)]
struct Cli {
    /// SQLite database URL holding planner records
    #[arg(
        long,
        global = true,
        default_value = "sqlite:taxsaver.db?mode=rwc"
    )]
    database: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Compute the baseline-versus-optimized tax comparison
    Calculate {
        /// Annual gross income
        #[arg(long)]
        gross_income: Decimal,

        /// Age group: below60, 60to80 or above80
        #[arg(long, value_parser = parse_age_bracket)]
        age: AgeBracket,

        /// Claimed deduction as CODE=AMOUNT (e.g. 80C=150000); repeatable
        #[arg(long = "deduction", value_parser = parse_claim)]
        deductions: Vec<(DeductionCategory, Decimal)>,

        /// Persist the inputs and results as a scenario record
        #[arg(long)]
        save: bool,
    },

    /// Manage the local profile
    Profile {
        #[command(subcommand)]
        action: ProfileAction,
    },

    /// Manage family members
    Family {
        #[command(subcommand)]
        action: FamilyAction,
    },

    /// Manage expenses
    Expense {
        #[command(subcommand)]
        action: ExpenseAction,
    },

    /// Manage savings goals
    Goal {
        #[command(subcommand)]
        action: GoalAction,
    },

    /// Summarize stored planner records
    Report,
}

#[derive(Subcommand, Debug)]
enum ProfileAction {
    /// Register the local profile
    Register {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
    },
    /// Show a registered profile
    Show {
        #[arg(long)]
        email: String,
    },
}

#[derive(Subcommand, Debug)]
enum FamilyAction {
    /// Add a family member
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        relation: String,
        #[arg(long)]
        age: i32,
        #[arg(long)]
        income: Decimal,
        #[arg(long)]
        has_health_insurance: bool,
        #[arg(long, default_value = "0")]
        investments: Decimal,
    },
    /// List family members
    List,
    /// Remove a family member by id
    Remove {
        #[arg(long)]
        id: i64,
    },
}

#[derive(Subcommand, Debug)]
enum ExpenseAction {
    /// Record an expense
    Add {
        #[arg(long)]
        category: String,
        #[arg(long)]
        description: String,
        #[arg(long)]
        amount: Decimal,
        /// Date the expense was incurred (e.g. 2024-06-12)
        #[arg(long)]
        date: NaiveDate,
        #[arg(long)]
        tax_deductible: bool,
        /// Deduction section code (80C, 80D, 24B, 80E, 80CCD1B, OTHER)
        #[arg(long, value_parser = parse_section)]
        section: Option<DeductionCategory>,
    },
    /// List expenses
    List,
    /// Remove an expense by id
    Remove {
        #[arg(long)]
        id: i64,
    },
    /// Import expenses from a CSV file
    Import {
        /// Path to the CSV file (category,description,amount,incurred_on,tax_deductible,section)
        #[arg(short, long)]
        file: PathBuf,
    },
}

#[derive(Subcommand, Debug)]
enum GoalAction {
    /// Add a savings goal
    Add {
        #[arg(long)]
        title: String,
        #[arg(long)]
        target_amount: Decimal,
        #[arg(long, default_value = "0")]
        current_amount: Decimal,
        #[arg(long)]
        category: String,
        /// Target date (e.g. 2025-03-31)
        #[arg(long)]
        target_date: NaiveDate,
        /// Priority: High, Medium or Low
        #[arg(long, default_value = "Medium", value_parser = parse_priority)]
        priority: GoalPriority,
        #[arg(long, default_value = "")]
        description: String,
        #[arg(long)]
        tax_benefit: Option<String>,
    },
    /// List savings goals
    List,
    /// Remove a savings goal by id
    Remove {
        #[arg(long)]
        id: i64,
    },
}

fn parse_age_bracket(s: &str) -> Result<AgeBracket, String> {
    AgeBracket::parse(s)
        .ok_or_else(|| format!("unknown age group '{}'; expected below60, 60to80 or above80", s))
}

fn parse_section(s: &str) -> Result<DeductionCategory, String> {
    DeductionCategory::parse(&s.trim().to_ascii_uppercase())
        .ok_or_else(|| format!("unknown deduction code '{}'", s))
}

fn parse_priority(s: &str) -> Result<GoalPriority, String> {
    GoalPriority::parse(s).ok_or_else(|| format!("unknown priority '{}'; expected High, Medium or Low", s))
}

fn parse_claim(s: &str) -> Result<(DeductionCategory, Decimal), String> {
    let (code, amount) = s
        .split_once('=')
        .ok_or_else(|| format!("expected CODE=AMOUNT, got '{}'", s))?;
    let category = parse_section(code)?;
    let amount = amount
        .trim()
        .parse::<Decimal>()
        .map_err(|e| format!("invalid amount '{}': {}", amount, e))?;
    Ok((category, amount))
}

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();
}

async fn open_repository(database: &str) -> Result<Box<dyn PlannerRepository>> {
    let mut registry = RepositoryRegistry::new();
    registry.register(Box::new(SqliteRepositoryFactory));

    let config = DbConfig {
        backend: "sqlite".to_string(),
        connection_string: database.to_string(),
    };
    registry
        .create(&config)
        .await
        .with_context(|| format!("failed to open planner database '{}'", database))
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Commands::Calculate {
            gross_income,
            age,
            deductions,
            save,
        } => run_calculate(&cli.database, gross_income, age, deductions, save).await,
        Commands::Profile { action } => run_profile(&cli.database, action).await,
        Commands::Family { action } => run_family(&cli.database, action).await,
        Commands::Expense { action } => run_expense(&cli.database, action).await,
        Commands::Goal { action } => run_goal(&cli.database, action).await,
        Commands::Report => run_report(&cli.database).await,
    }
}

async fn run_calculate(
    database: &str,
    gross_income: Decimal,
    age: AgeBracket,
    claim_args: Vec<(DeductionCategory, Decimal)>,
    save: bool,
) -> Result<()> {
    let mut deductions = DeductionClaims::new();
    for (category, amount) in claim_args {
        deductions
            .claim(category, amount)
            .with_context(|| format!("invalid claim for {}", category))?;
    }

    let regime = TaxRegime::fy_2023_24();
    let input = TaxScenarioInput {
        gross_income,
        age_bracket: age,
        deductions,
    };
    let result = ScenarioCalculator::new(&regime)
        .calculate(&input)
        .context("tax computation failed")?;

    print!("{}", render::scenario_summary(&input, &result));

    if save {
        let repo = open_repository(database).await?;
        let record = NewScenarioRecord {
            gross_income,
            age_bracket: age,
            claimed_80c: input.deductions.get(DeductionCategory::Investments80c),
            claimed_80d: input.deductions.get(DeductionCategory::Health80d),
            claimed_home_loan_interest: input.deductions.get(DeductionCategory::HomeLoanInterest),
            claimed_education_loan_interest: input
                .deductions
                .get(DeductionCategory::EducationLoanInterest),
            claimed_nps: input.deductions.get(DeductionCategory::Nps80ccd1b),
            claimed_other: input.deductions.get(DeductionCategory::Other),
            taxable_income: result.taxable_income,
            baseline_tax: result.baseline_tax,
            optimized_tax: result.optimized_tax,
            total_savings: result.total_savings,
        };
        let saved = repo
            .save_scenario(record)
            .await
            .context("failed to save the scenario")?;
        println!("Saved scenario #{}", saved.id);
    }

    Ok(())
}

async fn run_profile(database: &str, action: ProfileAction) -> Result<()> {
    let repo = open_repository(database).await?;
    match action {
        ProfileAction::Register { name, email } => {
            let profile = repo
                .create_profile(NewUserProfile { name, email })
                .await
                .context("failed to register the profile")?;
            println!("Registered profile #{} for {}", profile.id, profile.email);
        }
        ProfileAction::Show { email } => {
            let profile = repo
                .get_profile_by_email(&email)
                .await
                .with_context(|| format!("no profile registered for '{}'", email))?;
            println!(
                "#{} {} <{}> since {}",
                profile.id,
                profile.name,
                profile.email,
                profile.created_at.date_naive()
            );
        }
    }
    Ok(())
}

async fn run_family(database: &str, action: FamilyAction) -> Result<()> {
    let repo = open_repository(database).await?;
    match action {
        FamilyAction::Add {
            name,
            relation,
            age,
            income,
            has_health_insurance,
            investments,
        } => {
            let member = repo
                .add_family_member(NewFamilyMember {
                    name,
                    relation,
                    age,
                    income,
                    has_health_insurance,
                    investments,
                })
                .await
                .context("failed to add the family member")?;
            println!("Added family member #{} ({})", member.id, member.name);
        }
        FamilyAction::List => {
            let members = repo
                .list_family_members()
                .await
                .context("failed to list family members")?;
            if members.is_empty() {
                println!("No family members recorded.");
            }
            for member in members {
                println!(
                    "#{:<4} {:<20} {:<10} age {:<4} income {:<14} insured: {}",
                    member.id,
                    member.name,
                    member.relation,
                    member.age,
                    render::money(member.income),
                    if member.has_health_insurance { "yes" } else { "no" }
                );
            }
        }
        FamilyAction::Remove { id } => {
            repo.remove_family_member(id)
                .await
                .with_context(|| format!("failed to remove family member #{}", id))?;
            println!("Removed family member #{}", id);
        }
    }
    Ok(())
}

async fn run_expense(database: &str, action: ExpenseAction) -> Result<()> {
    let repo = open_repository(database).await?;
    match action {
        ExpenseAction::Add {
            category,
            description,
            amount,
            date,
            tax_deductible,
            section,
        } => {
            let expense = repo
                .add_expense(NewExpense {
                    category,
                    description,
                    amount,
                    incurred_on: date,
                    tax_deductible,
                    section,
                })
                .await
                .context("failed to record the expense")?;
            println!("Recorded expense #{} ({})", expense.id, expense.category);
        }
        ExpenseAction::List => {
            let expenses = repo.list_expenses().await.context("failed to list expenses")?;
            if expenses.is_empty() {
                println!("No expenses recorded.");
            }
            for expense in expenses {
                println!(
                    "#{:<4} {} {:<14} {:<16} {:<28} section: {}",
                    expense.id,
                    expense.incurred_on,
                    render::money(expense.amount),
                    expense.category,
                    expense.description,
                    expense
                        .section
                        .map(|s| s.as_str())
                        .unwrap_or(if expense.tax_deductible { "unassigned" } else { "-" })
                );
            }
        }
        ExpenseAction::Remove { id } => {
            repo.remove_expense(id)
                .await
                .with_context(|| format!("failed to remove expense #{}", id))?;
            println!("Removed expense #{}", id);
        }
        ExpenseAction::Import { file } => {
            let reader = File::open(&file)
                .with_context(|| format!("failed to open: {}", file.display()))?;
            let records = ExpenseCsvLoader::parse(reader)
                .with_context(|| format!("failed to parse CSV: {}", file.display()))?;
            println!("Parsed {} records from CSV", records.len());

            let inserted = ExpenseCsvLoader::load(repo.as_ref(), &records)
                .await
                .context("failed to load expenses into the planner database")?;
            println!("Imported {} expenses.", inserted);
        }
    }
    Ok(())
}

async fn run_goal(database: &str, action: GoalAction) -> Result<()> {
    let repo = open_repository(database).await?;
    match action {
        GoalAction::Add {
            title,
            target_amount,
            current_amount,
            category,
            target_date,
            priority,
            description,
            tax_benefit,
        } => {
            let goal = repo
                .add_goal(NewSavingsGoal {
                    title,
                    target_amount,
                    current_amount,
                    category,
                    target_date,
                    priority,
                    description,
                    tax_benefit,
                })
                .await
                .context("failed to add the savings goal")?;
            println!("Added savings goal #{} ({})", goal.id, goal.title);
        }
        GoalAction::List => {
            let goals = repo.list_goals().await.context("failed to list savings goals")?;
            if goals.is_empty() {
                println!("No savings goals recorded.");
            }
            for goal in goals {
                println!(
                    "#{:<4} [{:<6}] {:<24} {} of {} by {} ({})",
                    goal.id,
                    goal.priority.as_str(),
                    goal.title,
                    render::money(goal.current_amount),
                    render::money(goal.target_amount),
                    goal.target_date,
                    render::percent(goal.progress_percentage())
                );
            }
        }
        GoalAction::Remove { id } => {
            repo.remove_goal(id)
                .await
                .with_context(|| format!("failed to remove savings goal #{}", id))?;
            println!("Removed savings goal #{}", id);
        }
    }
    Ok(())
}

async fn run_report(database: &str) -> Result<()> {
    let repo = open_repository(database).await?;
    let members = repo
        .list_family_members()
        .await
        .context("failed to list family members")?;
    let expenses = repo.list_expenses().await.context("failed to list expenses")?;
    let goals = repo.list_goals().await.context("failed to list savings goals")?;

    print!("{}", render::planner_report(&members, &expenses, &goals));
    Ok(())
}
