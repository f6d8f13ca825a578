//! Price a package after replaying shopper intents.

use anyhow::Result;
use roomset_commerce::prelude::*;
use serde::Serialize;

use super::{load_package, print_breakdown, print_progress, read_intents, replay, QuoteArgs, RejectedIntent};
use crate::context::Context;

#[derive(Serialize)]
struct QuoteReport {
    plan_id: PlanId,
    progress: SelectionProgress,
    breakdown: Option<PriceBreakdown>,
    /// Why no breakdown could be priced.
    #[serde(skip_serializing_if = "Option::is_none")]
    blocked: Option<String>,
    rejected: Vec<RejectedIntent>,
}

/// Run the quote command.
pub async fn run(args: QuoteArgs, ctx: &Context) -> Result<()> {
    let mut configurator = load_package(&args.plan, ctx).await?;

    let rejected = match &args.intents {
        Some(path) => {
            let intents = read_intents(&ctx.resolve_path(path))?;
            ctx.output.debug(&format!("Replaying {} intent(s)", intents.len()));
            replay(&mut configurator, intents, &ctx.output)
        }
        None => Vec::new(),
    };
    configurator.set_payment_ratio(args.ratio)?;

    let progress = configurator.progress();
    let (breakdown, blocked) = match configurator.breakdown() {
        Ok(breakdown) => (Some(breakdown), None),
        Err(e) => (None, Some(e.user_message())),
    };

    if ctx.output.is_json() {
        ctx.output.json(&QuoteReport {
            plan_id: configurator.plan_id().clone(),
            progress,
            breakdown,
            blocked,
            rejected,
        });
        return Ok(());
    }

    let plan = configurator.plan()?;
    ctx.output.header(&format!("{} ({})", plan.name, plan.id));
    print_progress(&progress, &ctx.output);

    match (breakdown, blocked) {
        (Some(breakdown), _) => print_breakdown(&breakdown, &ctx.output),
        (None, Some(reason)) => ctx.output.warn(&format!("Cannot price yet: {}", reason)),
        (None, None) => {}
    }

    if !rejected.is_empty() {
        ctx.output.warn(&format!("{} intent(s) rejected", rejected.len()));
    }
    if let Some(next) = progress.next_incomplete() {
        ctx.output.info(&format!("Next: choose {} more from {}", next.remaining(), next.name));
    }

    Ok(())
}
