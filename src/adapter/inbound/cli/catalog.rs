//! Handlers for catalog browsing commands.

use serde_json::json;
use tabled::Tabled;
use tokio::sync::watch;

use crate::adapter::inbound::cli::output;
use crate::application::presentation::{DetailState, ListingState};
use crate::domain::{CategoryFilter, Product, ProductId};
use crate::error::{CatalogError, Result};
use crate::infrastructure::bootstrap::Storefront;

#[derive(Tabled)]
struct ProductRow {
    #[tabled(rename = "ID")]
    id: ProductId,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Category")]
    category: String,
    #[tabled(rename = "Price")]
    price: String,
    #[tabled(rename = "Rating")]
    rating: String,
}

impl From<&Product> for ProductRow {
    fn from(product: &Product) -> Self {
        Self {
            id: product.id,
            title: truncate(&product.title, 48),
            category: product.category.clone(),
            price: format!("${}", product.price),
            rating: format!("{:.1} ({})", product.rating.rate, product.rating.count),
        }
    }
}

fn truncate(text: &str, max: usize) -> String {
    if text.chars().count() <= max {
        return text.to_string();
    }
    let mut short: String = text.chars().take(max.saturating_sub(1)).collect();
    short.push('…');
    short
}

/// Wait until a screen adapter finishes loading and return its state.
async fn settled<T: Clone>(
    rx: &mut watch::Receiver<T>,
    is_loading: impl Fn(&T) -> bool,
) -> Result<T> {
    let state = rx
        .wait_for(|s| !is_loading(s))
        .await
        .map_err(|_| CatalogError::Unavailable("screen closed before loading finished".into()))?;
    Ok(state.clone())
}

/// Execute `products`.
pub async fn execute_products(app: &Storefront, category: Option<String>) -> Result<()> {
    let filter = category.map_or(CategoryFilter::All, CategoryFilter::from_label);
    let listing = app.listing();
    let mut rx = listing.subscribe();

    let pb = output::spinner("Loading products");
    listing.select_category(filter.clone());
    let state = settled(&mut rx, |s: &ListingState| s.is_loading).await?;
    if let Some(message) = state.error {
        output::spinner_fail(&pb, "Could not load products");
        return Err(CatalogError::Unavailable(message).into());
    }
    output::spinner_success(&pb, &format!("{} products", state.products.len()));

    if output::is_json() {
        output::json_output(json!({
            "command": "products",
            "category": filter.label(),
            "products": state.products,
        }));
        return Ok(());
    }

    output::section(&format!("Products in {}", output::highlight(filter.label())));
    output::table(
        state.products.iter().map(ProductRow::from).collect(),
        "(no products)",
    );
    Ok(())
}

/// Execute `categories`.
pub async fn execute_categories(app: &Storefront) -> Result<()> {
    let categories = app.catalog().list_categories().await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "categories",
            "categories": categories,
        }));
        return Ok(());
    }

    output::section("Categories");
    if categories.is_empty() {
        output::note("(none)");
    }
    for name in &categories {
        output::note(&format!("- {name}"));
    }
    Ok(())
}

/// Execute `product <ID>`.
pub async fn execute_product(app: &Storefront, id: ProductId) -> Result<()> {
    let detail = app.detail();
    let mut rx = detail.subscribe();

    detail.load(id);
    let state = settled(&mut rx, |s: &DetailState| s.is_loading).await?;
    let product = match (state.product, state.error) {
        (Some(product), _) => product,
        (None, Some(message)) => return Err(CatalogError::Unavailable(message).into()),
        (None, None) => return Err(CatalogError::NotFound(id).into()),
    };

    if output::is_json() {
        output::json_output(json!({
            "command": "product",
            "product": product,
        }));
        return Ok(());
    }

    output::section(&product.title);
    output::field("ID", product.id);
    output::field("Category", &product.category);
    output::field("Price", format!("${}", product.price));
    output::field(
        "Rating",
        format!("{:.1} from {} reviews", product.rating.rate, product.rating.count),
    );
    output::field("Image", &product.image);
    output::section("Description");
    output::note(&product.description);
    Ok(())
}
