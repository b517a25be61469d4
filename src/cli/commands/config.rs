//! Config command - show or edit configuration

use crate::cli::args::{ConfigAction, ConfigArgs};
use crate::config::{Config, ConfigManager};
use crate::error::{CdnError, CdnResult};
use crate::ui::{self, UiContext};
use std::path::PathBuf;

/// Keys accepted by `config set`
const VALID_KEYS: [&str; 6] = [
    "general.log_format",
    "cdn.repos_dir",
    "cdn.default_source",
    "cdn.max_workers",
    "cdn.timeout_secs",
    "cdn.user_agent",
];

/// Execute the config command
pub async fn execute(args: ConfigArgs, manager: &ConfigManager, config: &Config) -> CdnResult<()> {
    match args.action {
        None | Some(ConfigAction::Show) => show_config(config)?,
        Some(ConfigAction::Path) => show_path(manager),
        Some(ConfigAction::Init { force }) => init_config(manager, force).await?,
        Some(ConfigAction::Set { key, value }) => set_value(manager, config, &key, &value).await?,
    }

    Ok(())
}

fn show_config(config: &Config) -> CdnResult<()> {
    println!("{}", toml::to_string_pretty(config)?);
    Ok(())
}

fn show_path(manager: &ConfigManager) {
    println!("{}", manager.path().display());
}

async fn init_config(manager: &ConfigManager, force: bool) -> CdnResult<()> {
    let ctx = UiContext::detect();
    let path = manager.path();

    if path.exists() && !force {
        ui::step_warn_hint(
            &ctx,
            &format!("Config already exists at {}", path.display()),
            "Use --force to overwrite",
        );
        return Ok(());
    }

    manager.save(&Config::default()).await?;

    ui::step_ok_detail(
        &ctx,
        "Configuration initialized",
        &path.display().to_string(),
    );

    Ok(())
}

async fn set_value(
    manager: &ConfigManager,
    config: &Config,
    key: &str,
    value: &str,
) -> CdnResult<()> {
    let ctx = UiContext::detect();
    let mut config = config.clone();

    if let Err(e) = apply(&mut config, key, value) {
        if matches!(e, CdnError::User(_)) {
            ui::step_error_detail(&ctx, "Unknown config key", key);
            ui::remark(&ctx, &format!("Valid keys: {}", VALID_KEYS.join(", ")));
        }
        return Err(e);
    }

    manager.save(&config).await?;
    ui::step_ok(&ctx, &format!("Set {} = {}", key, value));

    Ok(())
}

/// Apply a dot-separated key to a configuration
fn apply(config: &mut Config, key: &str, value: &str) -> CdnResult<()> {
    let parts: Vec<&str> = key.split('.').collect();

    match parts.as_slice() {
        ["general", "log_format"] => match value.to_lowercase().as_str() {
            "text" | "json" => config.general.log_format = value.to_lowercase(),
            _ => {
                return Err(CdnError::invalid_argument(format!(
                    "log_format must be \"text\" or \"json\", got {:?}",
                    value
                )))
            }
        },
        ["cdn", "repos_dir"] => config.cdn.repos_dir = PathBuf::from(value),
        ["cdn", "default_source"] => config.cdn.default_source = value.to_string(),
        ["cdn", "max_workers"] => config.cdn.max_workers = parse_number(value)?,
        ["cdn", "timeout_secs"] => config.cdn.timeout_secs = parse_number(value)?,
        ["cdn", "user_agent"] => config.cdn.user_agent = value.to_string(),
        _ => return Err(CdnError::User(format!("Unknown config key: {}", key))),
    }

    Ok(())
}

fn parse_number<T: std::str::FromStr>(value: &str) -> CdnResult<T> {
    value
        .parse()
        .map_err(|_| CdnError::invalid_argument(format!("Invalid number: {}", value)))
}
