use std::env;

use precinct_core::{AppError, UserId};
use tracing_subscriber::EnvFilter;

const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Command selected by the first CLI argument.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdminCommand {
    Migrate,
    Seed,
}

impl AdminCommand {
    pub fn parse(argument: Option<&str>) -> Result<Self, AppError> {
        match argument {
            Some("migrate") => Ok(Self::Migrate),
            Some("seed") => Ok(Self::Seed),
            Some(other) => Err(AppError::Validation(format!(
                "unknown command '{other}', expected 'migrate' or 'seed'"
            ))),
            None => Err(AppError::Validation(
                "a command is required: 'migrate' or 'seed'".to_owned(),
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct AdminConfig {
    pub command: AdminCommand,
    pub database_url: String,
    pub max_connections: u32,
    pub bootstrap_admin_user_id: Option<UserId>,
}

impl AdminConfig {
    pub fn load() -> Result<Self, AppError> {
        let command = AdminCommand::parse(env::args().nth(1).as_deref())?;
        let database_url = required_env("DATABASE_URL")?;

        let max_connections = env::var("DATABASE_MAX_CONNECTIONS")
            .ok()
            .map(|value| parse_max_connections(value.as_str()))
            .transpose()?
            .unwrap_or(DEFAULT_MAX_CONNECTIONS);

        let bootstrap_admin_user_id = env::var("BOOTSTRAP_ADMIN_USER_ID")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(|value| parse_user_id("BOOTSTRAP_ADMIN_USER_ID", value.as_str()))
            .transpose()?;

        Ok(Self {
            command,
            database_url,
            max_connections,
            bootstrap_admin_user_id,
        })
    }
}

pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .compact()
        .init();
}

fn required_env(name: &str) -> Result<String, AppError> {
    let value = env::var(name).map_err(|_| AppError::Validation(format!("{name} is required")))?;
    if value.trim().is_empty() {
        return Err(AppError::Validation(format!("{name} must not be empty")));
    }

    Ok(value)
}

fn parse_max_connections(value: &str) -> Result<u32, AppError> {
    match value.trim().parse::<u32>() {
        Ok(0) => Err(AppError::Validation(
            "DATABASE_MAX_CONNECTIONS must be greater than zero".to_owned(),
        )),
        Ok(parsed) => Ok(parsed),
        Err(error) => Err(AppError::Validation(format!(
            "invalid DATABASE_MAX_CONNECTIONS: {error}"
        ))),
    }
}

fn parse_user_id(name: &str, value: &str) -> Result<UserId, AppError> {
    uuid::Uuid::parse_str(value.trim())
        .map(UserId::from_uuid)
        .map_err(|error| AppError::Validation(format!("invalid {name}: {error}")))
}
