use std::error::Error;
use std::path::Path;
use std::process::exit;

use clap::Parser;
use rusqlite::Connection;
use time::{Duration, OffsetDateTime};

use budgetflow::{
    Amount, CategoryName, PasswordHash, Transaction, TransactionType, ValidatedPassword,
    YearMonth, create_or_update_budget, create_transaction, create_user, initialize_db,
};

/// A utility for creating a test database for BudgetFlow.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,
}

/// Create and populate a database for manual testing.
fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        Some(extension) if !extension.is_empty() => {}
        _ => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
    }

    if output_path.is_file() {
        eprintln!("File already exists at {output_path:#?}!");
        exit(1);
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    println!("Creating demo user...");

    let password_hash = PasswordHash::new(
        ValidatedPassword::new("demo123")?,
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user(
        "demo",
        "demo@example.com",
        "Demo User",
        password_hash,
        &conn,
    )?;

    println!("Creating transactions...");

    let today = OffsetDateTime::now_utc().date();
    let transactions = [
        (TransactionType::Income, "Salary", 50_000_00, 20, "Monthly salary"),
        (TransactionType::Expense, "Bills", 3_200_00, 18, "Electricity"),
        (TransactionType::Expense, "Food", 1_250_50, 9, "Groceries"),
        (TransactionType::Expense, "Transport", 450_00, 6, ""),
        (TransactionType::Expense, "Food", 380_00, 2, "Lunch with the team"),
        (TransactionType::Expense, "Entertainment", 899_00, 1, "Movie night"),
    ];

    for (type_, category, cents, days_ago, note) in transactions {
        let builder = Transaction::build(
            type_,
            CategoryName::new(category)?,
            Amount::from_cents(cents),
            today - Duration::days(days_ago),
        )
        .note(note);

        create_transaction(user.id, builder, &conn)?;
    }

    println!("Creating budgets...");

    let month = YearMonth::from_date(today);
    for (category, cents) in [("Food", 8_000_00), ("Transport", 2_000_00), ("Bills", 5_000_00)] {
        create_or_update_budget(
            user.id,
            CategoryName::new(category)?,
            Amount::from_cents(cents),
            month,
            &conn,
        )?;
    }

    println!("Success! Log in with the username 'demo' and password 'demo123'.");

    Ok(())
}
