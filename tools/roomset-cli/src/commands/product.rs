//! Price SKUs of a product detail page.

use anyhow::{anyhow, bail, Result};
use roomset_commerce::prelude::*;

use super::{print_breakdown, ProductArgs};
use crate::context::Context;
use crate::store::FileCatalog;

/// A `SKU:TAG=OPTION` material argument.
#[derive(Debug, PartialEq)]
struct MaterialArg {
    sku: SkuId,
    tag: MaterialTag,
    option: String,
}

fn parse_material(arg: &str) -> Result<MaterialArg> {
    let (sku, rest) = arg
        .split_once(':')
        .ok_or_else(|| anyhow!("Expected SKU:TAG=OPTION, got '{}'", arg))?;
    let (tag, option) = rest
        .split_once('=')
        .ok_or_else(|| anyhow!("Expected SKU:TAG=OPTION, got '{}'", arg))?;
    if sku.trim().is_empty() || tag.trim().is_empty() || option.trim().is_empty() {
        bail!("Empty part in material '{}'", arg);
    }
    Ok(MaterialArg {
        sku: SkuId::new(sku.trim()),
        tag: MaterialTag::from_key(tag),
        option: option.trim().to_string(),
    })
}

/// Run the product command.
pub async fn run(args: ProductArgs, ctx: &Context) -> Result<()> {
    let materials = args
        .material
        .iter()
        .map(|m| parse_material(m))
        .collect::<Result<Vec<_>>>()?;

    let (catalog, product_id) = FileCatalog::for_file(&ctx.resolve_path(&args.product));
    let spinner = ctx.output.spinner(&format!("Loading product {}...", product_id));
    let loaded = ProductConfigurator::load(&catalog, &ProductId::new(product_id), &ctx.config.engine).await;
    spinner.finish_and_clear();
    let mut page = loaded?;

    page.set_mode(args.mode.into())?;
    for sku in &args.sku {
        page.choose_sku(&SkuId::new(sku.as_str()))?;
    }
    for material in materials {
        page.choose_material(&material.sku, material.tag, &material.option)?;
    }

    let breakdown = page.breakdown()?;
    if ctx.output.is_json() {
        ctx.output.json(&breakdown);
        return Ok(());
    }

    let product = page.product();
    ctx.output.header(&format!("{} ({})", product.name, product.id));
    for sku in &product.skus {
        let marker = if page.selection().is_chosen(&sku.id) { "*" } else { " " };
        let mut label = format!("{} {} {} {}", marker, sku.id, sku.name, sku.effective_price().display());
        if sku.is_pro {
            label.push_str(" PRO");
        }
        ctx.output.list_item(&label);
    }
    print_breakdown(&breakdown, &ctx.output);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_material() {
        let parsed = parse_material("seat:面料=Velvet Blue").unwrap();
        assert_eq!(
            parsed,
            MaterialArg {
                sku: SkuId::new("seat"),
                tag: MaterialTag::Fabric,
                option: "Velvet Blue".to_string(),
            }
        );
    }

    #[test]
    fn test_parse_material_rejects_malformed() {
        assert!(parse_material("seat=Velvet").is_err());
        assert!(parse_material("seat:fabric").is_err());
        assert!(parse_material(":fabric=Velvet").is_err());
    }
}
