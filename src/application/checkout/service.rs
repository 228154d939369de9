//! Checkout against the persisted cart.
//!
//! No payment provider is involved: after a fixed processing delay the order
//! is considered placed and the cart is emptied. Cart changes made while an
//! order is processing wait for it and land in the emptied cart.

use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::application::cart::CartService;
use crate::domain::{CheckoutForm, OrderReceipt};
use crate::error::{CheckoutError, Result};

pub struct CheckoutService {
    cart: CartService,
    processing_delay: Duration,
}

impl CheckoutService {
    pub fn new(cart: CartService, processing_delay: Duration) -> Self {
        Self {
            cart,
            processing_delay,
        }
    }

    /// Place an order for the current cart contents.
    ///
    /// The receipt lists the cart as it was when the order was accepted.
    ///
    /// # Errors
    /// `CheckoutError::MissingField` for a blank form field,
    /// `CheckoutError::EmptyCart` when there is nothing to order, or a store
    /// error.
    #[instrument(skip_all)]
    pub async fn place_order(&self, form: &CheckoutForm) -> Result<OrderReceipt> {
        if let Some(field) = form.missing_field() {
            return Err(CheckoutError::MissingField { field }.into());
        }

        let delay = self.processing_delay;
        let snapshot = self
            .cart
            .take_cart(async move { tokio::time::sleep(delay).await })
            .await?;
        if snapshot.is_empty() {
            return Err(CheckoutError::EmptyCart.into());
        }

        let receipt = OrderReceipt {
            order_id: Uuid::new_v4().to_string(),
            total: snapshot.total(),
            lines: snapshot.into_lines(),
            placed_at: Utc::now(),
        };
        info!(
            order_id = %receipt.order_id,
            total = %receipt.total,
            lines = receipt.lines.len(),
            "Order placed"
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::adapter::outbound::memory::MemoryCartStore;
    use crate::domain::ProductId;
    use crate::error::Error;
    use crate::testkit::domain::product;
    use rust_decimal_macros::dec;

    fn form() -> CheckoutForm {
        CheckoutForm {
            name: "Ada Lovelace".into(),
            address: "12 Analytical Row".into(),
            city: "London".into(),
            zip_code: "N1 9GU".into(),
            card_number: "4242424242424242".into(),
        }
    }

    fn setup(delay: Duration) -> (CheckoutService, CartService) {
        let cart = CartService::new(Arc::new(MemoryCartStore::new()));
        (CheckoutService::new(cart.clone(), delay), cart)
    }

    #[tokio::test]
    async fn order_captures_cart_and_clears_it() {
        let (checkout, cart) = setup(Duration::ZERO);
        cart.add_to_cart(&product(1, dec!(10.0)), 2).await.unwrap();
        cart.add_one(&product(2, dec!(5.5))).await.unwrap();

        let receipt = checkout.place_order(&form()).await.unwrap();

        assert_eq!(receipt.total, dec!(25.5));
        assert_eq!(receipt.lines.len(), 2);
        assert!(Uuid::parse_str(&receipt.order_id).is_ok());
        assert!(cart.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn blank_field_is_rejected_before_touching_cart() {
        let (checkout, cart) = setup(Duration::ZERO);
        cart.add_one(&product(1, dec!(1))).await.unwrap();
        let mut incomplete = form();
        incomplete.city = "   ".into();

        let result = checkout.place_order(&incomplete).await;

        assert!(matches!(
            result,
            Err(Error::Checkout(CheckoutError::MissingField { field: "city" }))
        ));
        assert_eq!(cart.snapshot().await.unwrap().line_count(), 1);
    }

    #[tokio::test]
    async fn empty_cart_is_rejected() {
        let (checkout, _) = setup(Duration::ZERO);

        let result = checkout.place_order(&form()).await;

        assert!(matches!(
            result,
            Err(Error::Checkout(CheckoutError::EmptyCart))
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn cart_is_kept_until_processing_completes() {
        let (checkout, cart) = setup(Duration::from_secs(2));
        cart.add_one(&product(1, dec!(3))).await.unwrap();

        let pending = tokio::spawn(async move { checkout.place_order(&form()).await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        assert_eq!(cart.snapshot().await.unwrap().line_count(), 1);

        let receipt = pending.await.unwrap().unwrap();
        assert_eq!(receipt.total, dec!(3));
        assert!(cart.snapshot().await.unwrap().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn product_added_while_processing_stays_in_cart() {
        let (checkout, cart) = setup(Duration::from_secs(2));
        cart.add_one(&product(1, dec!(3))).await.unwrap();

        let pending = tokio::spawn(async move { checkout.place_order(&form()).await });
        tokio::time::sleep(Duration::from_secs(1)).await;
        let late = {
            let cart = cart.clone();
            tokio::spawn(async move { cart.add_one(&product(2, dec!(7))).await })
        };

        let receipt = pending.await.unwrap().unwrap();
        late.await.unwrap().unwrap();

        let ordered: Vec<i64> = receipt.lines.iter().map(|l| l.product_id.get()).collect();
        assert_eq!(ordered, vec![1]);
        assert_eq!(receipt.total, dec!(3));

        let remaining = cart.snapshot().await.unwrap();
        assert_eq!(remaining.line_count(), 1);
        assert_eq!(remaining.quantity_of(ProductId::new(2)), 1);
    }
}
