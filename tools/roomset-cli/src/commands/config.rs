//! Configuration management commands.

use std::fs;

use anyhow::{bail, Result};

use super::{ConfigArgs, ConfigCommand};
use crate::config::generate_default_config;
use crate::context::{find_config_file, Context};

/// Run the config command.
pub async fn run(args: ConfigArgs, ctx: &Context) -> Result<()> {
    match args.command {
        ConfigCommand::Show => show_config(ctx),
        ConfigCommand::Init { force } => init_config(force, ctx),
        ConfigCommand::Validate => validate_config(ctx),
    }
}

fn show_config(ctx: &Context) -> Result<()> {
    if ctx.output.is_json() {
        ctx.output.json(&ctx.config);
        return Ok(());
    }

    ctx.output.header("Current Configuration");
    match find_config_file(&ctx.cwd) {
        Some(path) => ctx.output.kv("file", &path.display().to_string()),
        None => ctx.output.kv("file", "(defaults)"),
    }

    let engine = &ctx.config.engine;
    ctx.output.info("");
    ctx.output.info("[engine]");
    ctx.output.kv("currency", engine.currency.code());
    ctx.output.kv("material_selection", &format!("{:?}", engine.material_selection));
    ctx.output.kv("fallback_rate_percent", &engine.fallback_rate_percent.to_string());
    ctx.output.kv("fallback_floor", &engine.fallback_floor.to_string());
    let ratios: Vec<String> = engine.payment_ratios.iter().map(|r| format!("{}%", r)).collect();
    ctx.output.kv("payment_ratios", &ratios.join(", "));

    if !engine.keyword_premiums.is_empty() {
        ctx.output.info("");
        ctx.output.info("[[engine.keyword_premiums]]");
        for premium in &engine.keyword_premiums {
            ctx.output.list_item(&format!("{} = {}", premium.keyword, premium.amount));
        }
    }

    ctx.output.info("");
    ctx.output.info("[orders]");
    ctx.output.kv("dir", &ctx.orders_dir().display().to_string());
    ctx.output.kv("pretty", &ctx.config.orders.pretty.to_string());

    Ok(())
}

fn init_config(force: bool, ctx: &Context) -> Result<()> {
    let config_path = ctx.cwd.join("roomset.toml");

    if config_path.exists() && !force {
        bail!(
            "Config file already exists: {}. Use --force to overwrite.",
            config_path.display()
        );
    }

    fs::write(&config_path, generate_default_config())?;
    ctx.output.success(&format!("Created: {}", config_path.display()));

    Ok(())
}

fn validate_config(ctx: &Context) -> Result<()> {
    ctx.output.header("Validating configuration");

    let mut warnings: Vec<String> = Vec::new();
    let engine = &ctx.config.engine;

    if !engine.payment_ratios.contains(&100) {
        warnings.push("payment_ratios has no full-payment option (100)".to_string());
    }
    if engine.fallback_rate_percent == 0 && engine.fallback_floor == 0 {
        warnings.push("unlisted package upgrades will be free".to_string());
    }
    if ctx.config.orders.dir.trim().is_empty() {
        warnings.push("orders.dir is empty, orders go to the working directory".to_string());
    }

    if let Err(e) = engine.validate() {
        ctx.output.error(&format!("Error: {}", e));
        bail!("Configuration is invalid");
    }

    for warning in &warnings {
        ctx.output.warn(&format!("Warning: {}", warning));
    }

    if warnings.is_empty() {
        ctx.output.success("Configuration is valid");
    } else {
        ctx.output.success("Configuration is valid (with warnings)");
    }

    Ok(())
}
