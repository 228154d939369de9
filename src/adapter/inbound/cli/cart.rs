//! Handlers for the `cart` command group.

use serde_json::json;
use tabled::Tabled;

use crate::adapter::inbound::cli::output;
use crate::domain::{CartLine, CartSnapshot, ProductId};
use crate::error::Result;
use crate::infrastructure::bootstrap::Storefront;

#[derive(Tabled)]
struct LineRow {
    #[tabled(rename = "ID")]
    id: ProductId,
    #[tabled(rename = "Title")]
    title: String,
    #[tabled(rename = "Qty")]
    quantity: i32,
    #[tabled(rename = "Unit")]
    price: String,
    #[tabled(rename = "Subtotal")]
    subtotal: String,
}

impl From<&CartLine> for LineRow {
    fn from(line: &CartLine) -> Self {
        Self {
            id: line.product_id,
            title: line.title.clone(),
            quantity: line.quantity,
            price: format!("${}", line.price),
            subtotal: format!("${}", line.line_total()),
        }
    }
}

fn snapshot_json(command: &str, snapshot: &CartSnapshot) -> serde_json::Value {
    json!({
        "command": command,
        "lines": snapshot.lines(),
        "items": snapshot.item_count(),
        "total": snapshot.total(),
    })
}

/// Print a snapshot as a table with its total.
pub(crate) fn print_lines(snapshot: &CartSnapshot) {
    output::table(
        snapshot.lines().iter().map(LineRow::from).collect(),
        "(cart is empty)",
    );
    if !snapshot.is_empty() {
        output::field("Items", snapshot.item_count());
        output::field("Total", output::highlight(format!("${}", snapshot.total())));
    }
}

/// Execute `cart show`.
pub async fn execute_show(app: &Storefront) -> Result<()> {
    let snapshot = app.cart().snapshot().await?;

    if output::is_json() {
        output::json_output(snapshot_json("cart.show", &snapshot));
        return Ok(());
    }

    output::section("Cart");
    print_lines(&snapshot);
    Ok(())
}

/// Execute `cart add`.
pub async fn execute_add(app: &Storefront, id: ProductId, quantity: u32) -> Result<()> {
    let product = app.catalog().get_product(id).await?;
    let line = app.cart().add_to_cart(&product, quantity).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "cart.add",
            "line": line,
        }));
        return Ok(());
    }

    output::success(&format!(
        "Added {quantity} × {} (now {} in cart)",
        line.title, line.quantity
    ));
    Ok(())
}

/// Execute `cart set`.
pub async fn execute_set(app: &Storefront, id: ProductId, quantity: i64) -> Result<()> {
    let line = app.cart().update_quantity(id, quantity).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "cart.set",
            "product_id": id,
            "line": line,
        }));
        return Ok(());
    }

    match line {
        Some(line) => output::success(&format!("{} quantity set to {}", line.title, line.quantity)),
        None if quantity <= 0 => output::success(&format!("Product {id} removed from cart")),
        None => output::warning(&format!("Product {id} is not in the cart")),
    }
    Ok(())
}

/// Execute `cart remove`.
pub async fn execute_remove(app: &Storefront, id: ProductId) -> Result<()> {
    let removed = app.cart().remove_from_cart(id).await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "cart.remove",
            "product_id": id,
            "removed": removed,
        }));
        return Ok(());
    }

    if removed {
        output::success(&format!("Product {id} removed from cart"));
    } else {
        output::note(&format!("Product {id} was not in the cart"));
    }
    Ok(())
}

/// Execute `cart clear`.
pub async fn execute_clear(app: &Storefront) -> Result<()> {
    let removed = app.cart().clear_cart().await?;

    if output::is_json() {
        output::json_output(json!({
            "command": "cart.clear",
            "removed": removed,
        }));
        return Ok(());
    }

    output::success(&format!("Cart cleared ({removed} lines removed)"));
    Ok(())
}
