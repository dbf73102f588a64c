//! Creates a database with a verified user and some sample expenses for
//! trying out the API by hand.

use std::{error::Error, path::Path};

use clap::Parser;
use email_address::EmailAddress;
use rusqlite::Connection;

use expensave::{
    PasswordHash, Transaction, ValidatedPassword, create_transaction, create_user, initialize_db,
    set_user_verified,
};

/// Create a SQLite database for manually testing the expensave server.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Where to write the new database, e.g. "test.db".
    #[arg(long, short)]
    output_path: String,

    /// The email address of the test user.
    #[arg(long, default_value = "test@example.com")]
    email: String,
}

const TEST_PASSWORD: &str = "test";

/// Sample expenses as (amount, category, description, date).
const SAMPLE_TRANSACTIONS: [(f64, &str, &str, &str); 8] = [
    (42.50, "Food", "Weekly groceries", "2025-06-02"),
    (3.80, "Transport", "Bus fare", "2025-06-03"),
    (120.00, "Bills", "Electricity", "2025-06-05"),
    (15.99, "Entertainment", "Streaming subscription", "2025-06-07"),
    (38.20, "Food", "Weekly groceries", "2025-06-09"),
    (60.00, "Health", "Pharmacy", "2025-06-12"),
    (4.50, "Food", "Coffee", "2025-06-14"),
    (950.00, "Housing", "Rent", "2025-06-15"),
];

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let output_path = Path::new(&args.output_path);
    check_output_path(output_path)?;

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;
    initialize_db(&conn)?;

    let email: EmailAddress = args.email.parse()?;
    seed(&conn, &email)?;

    println!("Done! Log in as {email} with the password '{TEST_PASSWORD}'.");

    Ok(())
}

fn check_output_path(path: &Path) -> Result<(), String> {
    if path.extension().is_none_or(|extension| extension.is_empty()) {
        return Err("the output path needs a file extension, e.g. 'test.db'".to_owned());
    }

    if path.exists() {
        return Err(format!("{} already exists", path.display()));
    }

    Ok(())
}

/// Add a verified user with the sample transactions.
fn seed(conn: &Connection, email: &EmailAddress) -> Result<(), Box<dyn Error>> {
    // The test password is too weak to pass validation.
    let password_hash = PasswordHash::new(
        ValidatedPassword::new_unchecked(TEST_PASSWORD),
        PasswordHash::DEFAULT_COST,
    )?;
    let user = create_user("Test User", email, password_hash, conn)?;
    set_user_verified(user.id, conn)?;

    println!("Adding {} sample transactions", SAMPLE_TRANSACTIONS.len());
    for (amount, category, description, date) in SAMPLE_TRANSACTIONS {
        create_transaction(
            user.id,
            Transaction::build(amount, category, description, date),
            conn,
        )?;
    }

    Ok(())
}
