//! Submit a completed package as an order.

use anyhow::{bail, Result};
use dialoguer::Confirm;
use roomset_commerce::prelude::*;

use super::{load_package, print_breakdown, read_intents, replay, SubmitArgs};
use crate::context::Context;
use crate::store::FileOrderGateway;

/// Run the submit command.
pub async fn run(args: SubmitArgs, ctx: &Context) -> Result<()> {
    let mut configurator = load_package(&args.plan, ctx).await?;

    let intents = read_intents(&ctx.resolve_path(&args.intents))?;
    let rejected = replay(&mut configurator, intents, &ctx.output);
    if !rejected.is_empty() {
        bail!("{} intent(s) rejected, nothing submitted", rejected.len());
    }
    configurator.set_payment_ratio(args.ratio)?;

    let summary = match configurator.summary() {
        Ok(summary) => summary,
        Err(e @ ConfiguratorError::SelectionIncomplete(_)) => {
            if let Some(next) = configurator.progress().next_incomplete() {
                ctx.output.info(&format!("Choose {} more from {}", next.remaining(), next.name));
            }
            bail!("{}", e.user_message());
        }
        Err(e) => bail!("{}", e.user_message()),
    };

    ctx.output.header(&format!("Submitting {}", summary.plan_name));
    ctx.output.kv("Items", &summary.item_count().to_string());
    print_breakdown(&summary.breakdown, &ctx.output);

    if !args.yes && !ctx.output.is_json() {
        ctx.output.info("");
        let confirmed = Confirm::new()
            .with_prompt("Place this order?")
            .default(true)
            .interact()?;

        if !confirmed {
            ctx.output.warn("Submission cancelled");
            return Ok(());
        }
    }

    let mut gateway = FileOrderGateway::new(ctx.orders_dir(), ctx.config.orders.pretty);
    if let Some(out) = &args.out {
        gateway = gateway.with_path(ctx.resolve_path(out));
    }

    let spinner = ctx.output.spinner("Submitting order...");
    let submitted = configurator.submit(&gateway).await;
    spinner.finish_and_clear();
    let order_id = submitted?;
    let path = gateway.path_for(&order_id);

    if ctx.output.is_json() {
        ctx.output.json(&serde_json::json!({
            "order_id": order_id,
            "path": path.display().to_string(),
            "total": summary.breakdown.total,
        }));
        return Ok(());
    }

    ctx.output.success(&format!("Order {} placed", order_id));
    ctx.output.kv("File", &path.display().to_string());

    Ok(())
}
