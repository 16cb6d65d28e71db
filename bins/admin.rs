//! Operator tool for the admin credential store.
//!
//! ```bash
//! admin create -e admin@kondantheretreat.com --first-name Admin --last-name Kondan --phone "+91 8275063636"
//! admin deactivate -e admin@kondantheretreat.com
//! admin hash            # prints a bcrypt digest, no store access
//! admin migrate         # postgres backend only
//! ```
//!
//! Passwords are read from a hidden prompt. The `--password` flags exist for
//! scripted setups only; their values end up in shell history and process listings.

use std::process::ExitCode;

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use migration::MigratorTrait;
use service::auth::domain::{validate_password, AdminProfile, CreateAdminInput, LoginInput, ProfileInput};
use service::auth::repo;
use service::auth::repository::AdminRepository;
use service::{AdminError, AdminService, PasswordHasher};
use tracing::error;

#[derive(Parser)]
#[command(name = "admin")]
#[command(author, version, about = "Manage Kondan admin credentials")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create a new admin account
    Create {
        #[arg(short, long)]
        email: String,
        #[arg(long)]
        first_name: String,
        #[arg(long)]
        last_name: String,
        #[arg(long, default_value = "")]
        phone: String,
        #[arg(long)]
        address: Option<String>,
        /// Skip the hidden prompt (visible in shell history and `ps`; prefer the prompt)
        /// Skip the hidden prompt (visible in shell history and `ps`; prefer the prompt)
        #[arg(long)]
        password: Option<String>,
    },
    /// Replace an admin's password
    ResetPassword {
        #[arg(short, long)]
        email: String,
        /// Skip the hidden prompt (visible in shell history and `ps`; prefer the prompt)
        #[arg(long)]
        password: Option<String>,
    },
    /// Allow an admin to log in
    Activate {
        #[arg(short, long)]
        email: String,
    },
    /// Block an admin from logging in
    Deactivate {
        #[arg(short, long)]
        email: String,
    },
    /// Show the active flag and login eligibility of an admin
    Status {
        #[arg(short, long)]
        email: String,
    },
    /// List admins, newest first
    List,
    /// Print a bcrypt digest for a password
    Hash {
        /// Skip the hidden prompt (visible in shell history and `ps`; prefer the prompt)
        #[arg(long)]
        password: Option<String>,
    },
    /// Check that the configured store is reachable
    Check,
    /// Try a login against the store
    Verify {
        #[arg(short, long)]
        email: String,
        /// Skip the hidden prompt (visible in shell history and `ps`; prefer the prompt)
        #[arg(long)]
        password: Option<String>,
    },
    /// Create the admin table (postgres backend)
    Migrate,
}

#[tokio::main]
async fn main() -> ExitCode {
    common::env::load_dotenv();
    common::utils::logging::init_logging_cli();

    let cli = Cli::parse();
    match run(cli).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            match e.downcast_ref::<AdminError>() {
                Some(admin_err) => {
                    error!(code = admin_err.code(), "command failed");
                    eprintln!("error [{}]: {}", admin_err.code(), admin_err);
                }
                None => eprintln!("error: {e:#}"),
            }
            ExitCode::FAILURE
        }
    }
}

fn password_or_prompt(given: Option<String>, prompt: &str) -> Result<String> {
    match given {
        Some(p) => Ok(p),
        None => rpassword::prompt_password(prompt).context("cannot read password from terminal"),
    }
}

fn new_password(given: Option<String>) -> Result<String> {
    if given.is_some() {
        return password_or_prompt(given, "");
    }
    let first = password_or_prompt(None, "New password: ")?;
    let again = password_or_prompt(None, "Repeat password: ")?;
    if first != again {
        return Err(anyhow!("passwords do not match"));
    }
    Ok(first)
}

/// Digest for pasting into the table; held to the same policy as create and reset.
async fn hash_for_store(hasher: &PasswordHasher, plain: &str) -> Result<String> {
    validate_password(plain)?;
    Ok(hasher.hash(plain).await?)
}

/// Config for commands that only need the hashing settings.
fn hashing_config() -> Result<configs::AppConfig> {
    let mut cfg = configs::load_default()?;
    cfg.apply_env(common::env::var_non_empty)?;
    cfg.auth.validate()?;
    Ok(cfg)
}

fn print_profile(p: &AdminProfile) {
    println!("id:         {}", p.id);
    println!("email:      {}", p.email);
    println!("name:       {} {}", p.first_name, p.last_name);
    println!("phone:      {}", p.phone);
    println!("address:    {}", p.address.as_deref().unwrap_or("-"));
    println!("active:     {}", p.is_active);
    println!("updated_at: {}", p.updated_at.to_rfc3339());
}

async fn open_store() -> Result<(configs::AppConfig, AdminService<dyn AdminRepository>)> {
    let cfg = configs::AppConfig::load_and_validate()?;
    let hasher = PasswordHasher::new(cfg.auth.bcrypt_cost)?;
    let store = repo::connect(&cfg).await?;
    Ok((cfg, AdminService::new(store, hasher)))
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Hash { password } => {
            let cfg = hashing_config()?;
            let hasher = PasswordHasher::new(cfg.auth.bcrypt_cost)?;
            let plain = new_password(password)?;
            println!("{}", hash_for_store(&hasher, &plain).await?);
        }
        Command::Migrate => {
            let cfg = configs::AppConfig::load_and_validate()?;
            if cfg.store.backend != configs::StoreBackend::Postgres {
                return Err(anyhow!("migrate requires store.backend = \"postgres\""));
            }
            let db = models::db::connect_with_config(&cfg.database).await?;
            migration::Migrator::up(&db, None).await.context("migration failed")?;
            println!("admin table is up to date");
        }
        Command::Create { email, first_name, last_name, phone, address, password } => {
            let password = new_password(password)?;
            let (_, admin) = open_store().await?;
            let profile = ProfileInput { first_name, last_name, phone, address };
            let created = admin.create(CreateAdminInput { email, password, profile }).await?;
            println!("created admin");
            print_profile(&created);
        }
        Command::ResetPassword { email, password } => {
            let password = new_password(password)?;
            let (_, admin) = open_store().await?;
            let updated = admin.reset_password(&email, &password).await?;
            println!("password updated for {}", updated.email);
        }
        Command::Activate { email } => {
            let (_, admin) = open_store().await?;
            let p = admin.set_active(&email, true).await?;
            println!("{} is active", p.email);
        }
        Command::Deactivate { email } => {
            let (_, admin) = open_store().await?;
            let p = admin.set_active(&email, false).await?;
            println!("{} is inactive", p.email);
        }
        Command::Status { email } => {
            let (_, admin) = open_store().await?;
            let s = admin.status(&email).await?;
            let flag = match s.is_active {
                Some(v) => v.to_string(),
                None => "null".to_string(),
            };
            println!("email:         {}", s.email);
            println!("is_active:     {flag}");
            println!("password_hash: {}", if s.has_password_hash { "present" } else { "missing" });
            println!("can_login:     {}", s.login_eligible);
        }
        Command::List => {
            let (_, admin) = open_store().await?;
            let all = admin.list().await?;
            if all.is_empty() {
                println!("no admins");
            }
            for p in all {
                let state = if p.is_active { "active" } else { "inactive" };
                println!("{}\t{}\t{} {}\t{}", p.email, state, p.first_name, p.last_name, p.created_at.to_rfc3339());
            }
        }
        Command::Check => {
            let (cfg, admin) = open_store().await?;
            admin.check_store().await?;
            println!("store reachable ({:?})", cfg.store.backend);
        }
        Command::Verify { email, password } => {
            let password = password_or_prompt(password, "Password: ")?;
            let (_, admin) = open_store().await?;
            let p = admin.authenticate(LoginInput { email, password }).await?;
            println!("login ok for {}", p.email);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn password_flags_warn_about_exposure() {
        let cli = Cli::command();
        for name in ["create", "reset-password", "hash", "verify"] {
            let sub = cli.find_subcommand(name).expect("subcommand exists");
            let arg = sub.get_arguments().find(|a| a.get_id() == "password").expect("password flag");
            let help = arg.get_help().map(|h| h.to_string()).unwrap_or_default();
            assert!(help.contains("shell history"), "{name}: {help}");
        }
    }

    #[tokio::test]
    async fn hash_refuses_passwords_outside_policy() {
        let hasher = PasswordHasher::default();
        let short = hash_for_store(&hasher, "abc").await.unwrap_err();
        assert!(matches!(short.downcast_ref::<AdminError>(), Some(AdminError::Validation(_))));
        let long = hash_for_store(&hasher, &"x".repeat(73)).await.unwrap_err();
        assert!(matches!(long.downcast_ref::<AdminError>(), Some(AdminError::Validation(_))));

        let digest = hash_for_store(&hasher, "Secret1").await.unwrap();
        assert!(hasher.verify("Secret1", &digest).await.unwrap());
    }
}
