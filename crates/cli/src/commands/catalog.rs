//! Catalog browsing commands.

use gearup_core::{CategoryId, ProductId, ProductRecord};
use gearup_storefront::catalog::{CATEGORIES, CatalogSource, find_category};
use gearup_storefront::error::{AppError, Result};
use gearup_storefront::format::{format_currency, title_case};
use gearup_storefront::state::AppState;

/// The requested category, or the configured default.
///
/// Only listed categories are accepted.
pub fn resolve_category(state: &AppState, requested: Option<&str>) -> Result<CategoryId> {
    let category = requested.map_or_else(
        || state.config().default_category.clone(),
        CategoryId::from,
    );
    if find_category(category.as_str()).is_none() {
        return Err(AppError::BadRequest(format!(
            "Unknown category '{category}'. Run `gearup categories` to list them."
        )));
    }
    Ok(category)
}

#[allow(clippy::print_stdout)]
pub fn categories() {
    for category in CATEGORIES {
        println!("{} {:<14} {}", category.icon, category.id, category.description);
    }
}

#[allow(clippy::print_stdout)]
pub async fn products(state: &AppState, category: Option<&str>) -> Result<()> {
    let category = resolve_category(state, category)?;
    let products = state.catalog().get_all(&category).await?;

    println!("{}", title_case(category.as_str()));
    if products.is_empty() {
        println!("  No products found.");
    }
    for product in &products {
        println!(
            "  {:<8} {:>8}  {}",
            product.id,
            format_currency(product.price.amount()),
            product.name
        );
    }
    Ok(())
}

pub async fn product(state: &AppState, id: &str, category: Option<&str>) -> Result<()> {
    let product = find_product(state, id, category).await?;
    print_product(&product);
    Ok(())
}

/// Look a product up in the requested (or default) category.
pub async fn find_product(
    state: &AppState,
    id: &str,
    category: Option<&str>,
) -> Result<ProductRecord> {
    let category = resolve_category(state, category)?;
    state
        .catalog()
        .get_by_id(&category, &ProductId::from(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id} in {category}")))
}

#[allow(clippy::print_stdout)]
fn print_product(product: &ProductRecord) {
    println!("{} ({})", product.name, product.id);
    println!("{}", format_currency(product.price.amount()));
    if let Some(tagline) = &product.tagline {
        println!("{tagline}");
    }
    if let Some(description) = &product.description {
        println!();
        println!("{description}");
    }
    if !product.features.is_empty() {
        println!();
        println!("Features:");
        for feature in &product.features {
            println!("  - {feature}");
        }
    }
    if !product.includes.is_empty() {
        println!();
        println!("Includes:");
        for item in &product.includes {
            println!("  - {item}");
        }
    }
}
