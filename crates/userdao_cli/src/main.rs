//! Command-line front end for the user repository.
//!
//! # Responsibility
//! - Map subcommands one-to-one onto `UserRepository` operations.
//! - Print results as text lines or JSON; report failures with exit code 1.

use clap::{Args, Parser, Subcommand};
use log::error;
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;
use userdao_core::{
    init_logging, ProviderConfig, SqliteConnectionProvider, SqliteUserRepository, User,
    UserRepository,
};

#[derive(Debug, Parser)]
#[command(name = "userdao", version, about = "Manage user records in a SQLite store")]
struct Cli {
    /// SQLite database file.
    #[arg(long, env = "USERDAO_DB", default_value = "userdao.sqlite3")]
    db: PathBuf,

    /// Busy timeout in milliseconds for locked databases.
    #[arg(long, env = "USERDAO_BUSY_TIMEOUT_MS", default_value_t = 5000)]
    busy_timeout_ms: u64,

    /// Absolute directory for rolling log files; logging is off when unset.
    #[arg(long, env = "USERDAO_LOG_DIR")]
    log_dir: Option<String>,

    #[arg(long, env = "USERDAO_LOG_LEVEL", default_value_t = userdao_core::default_log_level().to_string())]
    log_level: String,

    /// Print users as JSON instead of text lines.
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// List all users ordered by id.
    List,
    /// Find a user by id.
    Find {
        #[arg(long)]
        id: i64,
    },
    /// Find a user by username.
    FindName { username: String },
    /// Find a user by username and password.
    Login { username: String, password: String },
    /// Create a new user.
    Create(UserFields),
    /// Overwrite an existing user.
    Update {
        #[arg(long)]
        id: i64,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Create or update depending on whether `--id` is given.
    Save {
        #[arg(long)]
        id: Option<i64>,
        #[command(flatten)]
        fields: UserFields,
    },
    /// Delete a user by id.
    Delete {
        #[arg(long)]
        id: i64,
    },
    /// Check whether a username or email is taken.
    Exists {
        #[arg(long, conflicts_with = "email", required_unless_present = "email")]
        username: Option<String>,
        #[arg(long)]
        email: Option<String>,
    },
}

#[derive(Debug, Args)]
struct UserFields {
    #[arg(long)]
    username: String,
    /// Plaintext, or an existing 32-char hex digest.
    #[arg(long)]
    password: String,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    age: Option<u16>,
}

impl UserFields {
    fn into_user(self, id: Option<i64>) -> User {
        User {
            id,
            username: self.username,
            password: self.password,
            email: self.email,
            age: self.age,
        }
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        if let Err(err) = init_logging(&cli.log_level, log_dir) {
            eprintln!("warning: logging disabled: {err}");
        }
    }

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            error!("event=cli_command module=cli status=error error={err}");
            eprintln!("error: {}", error_chain(err.as_ref()));
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    let config =
        ProviderConfig::file(&cli.db).with_busy_timeout(Duration::from_millis(cli.busy_timeout_ms));
    let repo = SqliteUserRepository::new(SqliteConnectionProvider::new(config)?);
    let json = cli.json;

    match cli.command {
        Command::List => print_users(&repo.list()?, json)?,
        Command::Find { id } => print_lookup(repo.find(id)?, json)?,
        Command::FindName { username } => print_lookup(repo.find_by_name(&username)?, json)?,
        Command::Login { username, password } => {
            print_lookup(repo.find_by_credentials(&username, &password)?, json)?
        }
        Command::Create(fields) => {
            let mut user = fields.into_user(None);
            repo.create(&mut user)?;
            print_stored(&repo, &user, json)?;
        }
        Command::Update { id, fields } => {
            let user = fields.into_user(Some(id));
            repo.update(&user)?;
            print_stored(&repo, &user, json)?;
        }
        Command::Save { id, fields } => {
            let mut user = fields.into_user(id);
            repo.save(&mut user)?;
            print_stored(&repo, &user, json)?;
        }
        Command::Delete { id } => {
            let mut user = User::new(String::new(), String::new());
            user.id = Some(id);
            repo.delete(&mut user)?;
            println!("deleted user {id}");
        }
        Command::Exists { username, email } => {
            let exists = match (username, email) {
                (Some(username), _) => repo.exist_username(&username)?,
                (None, Some(email)) => repo.exist_email(&email)?,
                (None, None) => false,
            };
            println!("{exists}");
        }
    }

    Ok(())
}

/// Prints the persisted row so the output shows the stored digest.
fn print_stored(
    repo: &impl UserRepository,
    user: &User,
    json: bool,
) -> Result<(), Box<dyn Error>> {
    match user.id {
        Some(id) => print_lookup(repo.find(id)?, json),
        None => print_users(std::slice::from_ref(user), json),
    }
}

fn print_lookup(user: Option<User>, json: bool) -> Result<(), Box<dyn Error>> {
    match user {
        Some(user) => print_users(&[user], json),
        None => {
            println!("not found");
            Ok(())
        }
    }
}

fn print_users(users: &[User], json: bool) -> Result<(), Box<dyn Error>> {
    if json {
        println!("{}", serde_json::to_string_pretty(users)?);
    } else {
        for user in users {
            println!("{user}");
        }
    }
    Ok(())
}

fn error_chain(err: &dyn Error) -> String {
    let mut message = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

#[cfg(test)]
mod tests {
    use super::{Cli, Command};
    use clap::Parser;

    #[test]
    fn parses_create_with_optional_fields() {
        let cli = Cli::try_parse_from([
            "userdao",
            "--db",
            "/tmp/users.db",
            "create",
            "--username",
            "alice",
            "--password",
            "secret",
            "--age",
            "30",
        ])
        .unwrap();
        match cli.command {
            Command::Create(fields) => {
                let user = fields.into_user(None);
                assert_eq!(user.username, "alice");
                assert_eq!(user.age, Some(30));
                assert_eq!(user.email, None);
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }

    #[test]
    fn exists_requires_username_or_email() {
        assert!(Cli::try_parse_from(["userdao", "exists"]).is_err());
        assert!(Cli::try_parse_from(["userdao", "exists", "--email", "a@x.com"]).is_ok());
    }
}
