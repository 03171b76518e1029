//! Operator tooling: hash the admin password and purge appointments.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::env;
use std::io::{self, BufRead};

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, WrapErr, eyre};
use tokio::runtime::Builder;
use uuid::Uuid;
use zeroize::Zeroizing;

use clinic_backend::domain::ports::AppointmentRepository;
use clinic_backend::domain::{AppointmentId, sha256_hex};
use clinic_backend::outbound::persistence::{DbPool, DieselAppointmentRepository, PoolConfig};

const DATABASE_URL_ENV: &str = "CLINIC_DATABASE_URL";

/// `clinic-admin` command arguments.
#[derive(Debug, Parser)]
#[command(
    name = "clinic-admin",
    about = "Administrative tasks for the clinic backend",
    version
)]
struct CliArgs {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Read a password from stdin and print the digest for
    /// `CLINIC_ADMIN_PASSWORD_SHA256`.
    HashPassword,
    /// Permanently remove an appointment row.
    Purge {
        /// Appointment identifier.
        #[arg(long, value_name = "uuid")]
        id: Uuid,
        /// Database connection URL. Falls back to `CLINIC_DATABASE_URL`.
        #[arg(long = "database-url", value_name = "url")]
        database_url: Option<String>,
    },
}

fn main() -> Result<()> {
    color_eyre::install()?;
    let args = CliArgs::parse();
    match args.command {
        Command::HashPassword => {
            let digest = hash_password(io::stdin().lock())?;
            println!("{digest}");
            Ok(())
        }
        Command::Purge { id, database_url } => {
            let database_url = resolve_database_url(database_url, env::var(DATABASE_URL_ENV).ok())?;
            let runtime = Builder::new_current_thread()
                .enable_all()
                .build()
                .wrap_err("create Tokio runtime")?;
            runtime.block_on(purge(&database_url, AppointmentId::new(id)))
        }
    }
}

/// Digest the first line of `input`, without its line terminator.
fn hash_password(mut input: impl BufRead) -> Result<String> {
    let mut line = Zeroizing::new(String::new());
    input.read_line(&mut line).wrap_err("read password")?;
    let password = line.trim_end_matches(['\r', '\n']);
    if password.is_empty() {
        return Err(eyre!("password must not be empty"));
    }
    Ok(sha256_hex(password.as_bytes()))
}

fn resolve_database_url(explicit: Option<String>, from_env: Option<String>) -> Result<String> {
    explicit
        .or(from_env)
        .filter(|value| !value.trim().is_empty())
        .ok_or_else(|| eyre!("database URL missing: set --database-url or {DATABASE_URL_ENV}"))
}

async fn purge(database_url: &str, id: AppointmentId) -> Result<()> {
    let pool = DbPool::new(PoolConfig::new(database_url).with_min_idle(None))
        .await
        .wrap_err("create database pool")?;
    let repository = DieselAppointmentRepository::new(pool);
    let removed = repository
        .delete(&id)
        .await
        .wrap_err_with(|| format!("purge appointment {id}"))?;
    if !removed {
        return Err(eyre!("appointment {id} not found"));
    }
    println!("purged={id}");
    Ok(())
}
