//! CLI command implementations.

pub mod config;
pub mod product;
pub mod quote;
pub mod submit;

use std::path::Path;

use anyhow::{bail, Context as _, Result};
use clap::{Args, Subcommand, ValueEnum};
use roomset_commerce::prelude::*;
use serde::Serialize;

use crate::context::Context;
use crate::output::{progress_bar, source_badge, Output};
use crate::store::FileCatalog;

/// Arguments for the quote command.
#[derive(Args)]
pub struct QuoteArgs {
    /// Package plan JSON file.
    pub plan: String,

    /// JSON file with a list of intents to replay.
    #[arg(short, long)]
    pub intents: Option<String>,

    /// Deposit percentage to split the total at.
    #[arg(short, long)]
    pub ratio: Option<u32>,
}

/// Arguments for the product command.
#[derive(Args)]
pub struct ProductArgs {
    /// Product JSON file.
    pub product: String,

    /// SKU to choose, in order. Repeat for multi-spec and combo modes.
    #[arg(short, long)]
    pub sku: Vec<String>,

    /// Aggregation mode.
    #[arg(short, long, value_enum, default_value_t = ModeArg::Single)]
    pub mode: ModeArg,

    /// Material choice as SKU:TAG=OPTION.
    #[arg(long)]
    pub material: Vec<String>,
}

/// Product page aggregation mode.
#[derive(Clone, Copy, Debug, ValueEnum)]
pub enum ModeArg {
    Single,
    Multi,
    Combo,
}

impl From<ModeArg> for AggregationMode {
    fn from(mode: ModeArg) -> Self {
        match mode {
            ModeArg::Single => AggregationMode::SingleSku,
            ModeArg::Multi => AggregationMode::MultiSpec,
            ModeArg::Combo => AggregationMode::Combo,
        }
    }
}

/// Arguments for the submit command.
#[derive(Args)]
pub struct SubmitArgs {
    /// Package plan JSON file.
    pub plan: String,

    /// JSON file with a list of intents to replay.
    #[arg(short, long)]
    pub intents: String,

    /// Deposit percentage.
    #[arg(short, long)]
    pub ratio: Option<u32>,

    /// Write the order to this file instead of the orders directory.
    #[arg(short, long)]
    pub out: Option<String>,

    /// Skip confirmation prompt.
    #[arg(short, long)]
    pub yes: bool,
}

/// Arguments for the config command.
#[derive(Args)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommand,
}

/// Config subcommands.
#[derive(Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show,

    /// Initialize a roomset.toml
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },

    /// Validate configuration
    Validate,
}

/// An intent the configurator refused.
#[derive(Debug, Serialize)]
pub struct RejectedIntent {
    pub index: usize,
    pub intent: Intent,
    pub error: String,
}

/// Load a package plan file into a configurator.
pub async fn load_package(path: &str, ctx: &Context) -> Result<PackageConfigurator> {
    let (catalog, plan_id) = FileCatalog::for_file(&ctx.resolve_path(path));
    let spinner = ctx.output.spinner(&format!("Loading plan {}...", plan_id));
    let configurator =
        PackageConfigurator::load(&catalog, PlanId::new(plan_id), ctx.config.engine.clone()).await;
    spinner.finish_and_clear();

    if let Some(e) = configurator.last_error() {
        bail!("Failed to load plan {}: {}", path, e);
    }
    Ok(configurator)
}

/// Read a JSON list of intents.
pub fn read_intents(path: &Path) -> Result<Vec<Intent>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read intents: {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse intents: {}", path.display()))
}

/// Apply intents in order. Rejected intents are reported and skipped.
pub fn replay(
    configurator: &mut PackageConfigurator,
    intents: Vec<Intent>,
    output: &Output,
) -> Vec<RejectedIntent> {
    let mut rejected = Vec::new();
    for (index, intent) in intents.into_iter().enumerate() {
        match configurator.apply(&intent) {
            Ok(outcome) => output.debug(&format!("#{} {:?} -> {:?}", index, intent, outcome)),
            Err(e) => {
                output.warn(&format!("Intent #{} rejected: {}", index, e.user_message()));
                rejected.push(RejectedIntent {
                    index,
                    intent,
                    error: e.to_string(),
                });
            }
        }
    }
    rejected
}

/// Print category progress of a package.
pub fn print_progress(progress: &SelectionProgress, output: &Output) {
    output.kv("Progress", &progress_bar(progress.percent));
    for category in &progress.categories {
        let mark = if category.is_complete() { "✓" } else { " " };
        output.list_item(&format!(
            "{} {} {}/{}",
            mark, category.name, category.selected, category.required
        ));
    }
}

/// Print a price breakdown.
pub fn print_breakdown(breakdown: &PriceBreakdown, output: &Output) {
    output.header(&format!("Price ({})", breakdown.mode.as_str()));
    for line in &breakdown.lines {
        let name = match &line.sku_id {
            Some(sku) => format!("{} [{}]", line.name, sku),
            None => line.name.clone(),
        };
        let quantity = format!("x{}", line.quantity);
        let total = line.total.display();
        output.table_row(&[name.as_str(), quantity.as_str(), total.as_str()], &[32, 4, 12]);
        for material in &line.materials {
            let label = format!("  {}: {}", material.tag, material.option);
            let amount = material.surcharge.amount.display();
            let badge = source_badge(material.surcharge.source);
            output.table_row(
                &[label.as_str(), "", amount.as_str(), badge.as_str()],
                &[32, 4, 12, 10],
            );
        }
    }
    output.info("");
    output.kv("Base", &breakdown.base.display());
    if breakdown.has_surcharges() {
        output.kv("Surcharges", &breakdown.surcharge_subtotal.display());
    }
    output.kv("Total", &breakdown.total.display());
    if let Some(payment) = &breakdown.payment {
        output.kv(
            &format!("Deposit ({}%)", payment.ratio_percent),
            &payment.deposit.display(),
        );
        output.kv("Final payment", &payment.final_payment.display());
    }
}
