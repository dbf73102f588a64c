//! Sets a new password for a registered user from the command line, for when
//! the user cannot receive the reset code by email.

use std::{error::Error, io, path::Path};

use clap::Parser;
use rusqlite::Connection;

use expensave::{PasswordHash, User, ValidatedPassword, get_user_by_email, update_password};

/// Change the password of an expensave user.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to the application SQLite database.
    #[arg(long)]
    db_path: String,

    /// The email address of the user whose password should be changed.
    #[arg(long)]
    email: String,
}

fn main() -> Result<(), Box<dyn Error>> {
    let args = Args::parse();
    let db_path = Path::new(&args.db_path);
    if !db_path.is_file() {
        return Err(format!("no database found at {}", db_path.display()).into());
    }

    let conn = Connection::open(db_path)?;
    let user = get_user_by_email(&args.email, &conn)
        .map_err(|error| format!("could not load the user {}: {error}", args.email))?;
    println!("Resetting password for {}", user.email);

    let Some(password_hash) = prompt_new_password(&user)? else {
        println!("Cancelled, the password was not changed.");
        return Ok(());
    };
    update_password(user.id, &password_hash, &conn)?;

    println!("Password updated.");

    Ok(())
}

/// Ask for a new password until a strong one is entered twice.
///
/// Returns `None` if the input ends before then.
fn prompt_new_password(user: &User) -> Result<Option<PasswordHash>, Box<dyn Error>> {
    let user_inputs = [user.name.as_str(), user.email.as_str()];

    loop {
        let Some(password) = prompt("Enter a new password: ")? else {
            return Ok(None);
        };

        let validated_password = match ValidatedPassword::new(&password, &user_inputs) {
            Ok(password) => password,
            Err(error) => {
                print_error(error);
                continue;
            }
        };

        let Some(confirmation) = prompt("Enter the same password again: ")? else {
            return Ok(None);
        };

        if password != confirmation {
            print_error("the passwords do not match, try again");
            continue;
        }

        return Ok(Some(PasswordHash::new(
            validated_password,
            PasswordHash::DEFAULT_COST,
        )?));
    }
}

/// Read a password without echoing it. `None` means end of input.
fn prompt(message: &str) -> io::Result<Option<String>> {
    match rpassword::prompt_password(message) {
        Ok(password) => Ok(Some(password)),
        Err(error) if error.kind() == io::ErrorKind::UnexpectedEof => Ok(None),
        Err(error) => Err(error),
    }
}

fn print_error(error: impl ToString) {
    eprintln!("\x1b[31;1m{}\x1b[0m", error.to_string());
}
