//! Handler for the `checkout` command.

use serde_json::json;

use crate::adapter::inbound::cli::command::CheckoutArgs;
use crate::adapter::inbound::cli::{cart, output};
use crate::domain::{CartSnapshot, CheckoutForm};
use crate::error::Result;
use crate::infrastructure::bootstrap::Storefront;

impl From<CheckoutArgs> for CheckoutForm {
    fn from(args: CheckoutArgs) -> Self {
        Self {
            name: args.name,
            address: args.address,
            city: args.city,
            zip_code: args.zip_code,
            card_number: args.card_number,
        }
    }
}

/// Execute `checkout`.
pub async fn execute(app: &Storefront, args: CheckoutArgs) -> Result<()> {
    let form = CheckoutForm::from(args);
    let checkout = app.checkout();

    let pb = output::spinner("Processing order");
    let receipt = match checkout.place_order(&form).await {
        Ok(receipt) => receipt,
        Err(e) => {
            output::spinner_fail(&pb, "Order not placed");
            return Err(e);
        }
    };
    output::spinner_success(&pb, "Order placed");

    if output::is_json() {
        output::json_output(json!({
            "command": "checkout",
            "receipt": receipt,
        }));
        return Ok(());
    }

    output::section("Receipt");
    output::field("Order", output::highlight(&receipt.order_id));
    output::field("Placed", receipt.placed_at.format("%Y-%m-%d %H:%M:%S UTC"));
    output::field("Ship to", format!("{}, {}", form.name, form.city));
    cart::print_lines(&CartSnapshot::new(receipt.lines));
    Ok(())
}
