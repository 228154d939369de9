//! Cart lines and the derived cart snapshot.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::id::ProductId;
use super::money::Price;
use super::product::Product;

/// One persisted cart row.
///
/// Caches the product's display fields at the time it was first added, so
/// later catalog changes do not alter what the cart shows or charges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub title: String,
    /// Unit price captured when the line was created.
    pub price: Price,
    pub image: String,
    /// Always at least one while the line exists.
    pub quantity: i32,
    /// When the product was first added; drives display order.
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// Project a catalog product into a new cart line.
    #[must_use]
    pub fn from_product(product: &Product, quantity: i32, added_at: DateTime<Utc>) -> Self {
        Self {
            product_id: product.id,
            title: product.title.clone(),
            price: product.price,
            image: product.image.clone(),
            quantity,
            added_at,
        }
    }

    /// Same line with a different quantity.
    #[must_use]
    pub fn with_quantity(self, quantity: i32) -> Self {
        Self { quantity, ..self }
    }

    /// Quantity times cached unit price, saturating at `Decimal::MAX`.
    #[must_use]
    pub fn line_total(&self) -> Price {
        self.price.saturating_mul(Decimal::from(self.quantity))
    }

    /// Quantity times cached unit price, or `None` if it does not fit a `Decimal`.
    #[must_use]
    pub fn checked_line_total(&self) -> Option<Price> {
        self.price.checked_mul(Decimal::from(self.quantity))
    }

    /// A line may only be stored while its quantity is positive.
    #[must_use]
    pub const fn is_persistable(&self) -> bool {
        self.quantity > 0
    }
}

/// Ordered view of every cart line at one instant.
///
/// Totals are always recomputed from the lines.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CartSnapshot {
    lines: Vec<CartLine>,
}

impl CartSnapshot {
    /// Build a snapshot, ordering lines by first-add time then product id.
    #[must_use]
    pub fn new(mut lines: Vec<CartLine>) -> Self {
        lines.sort_by(|a, b| {
            a.added_at
                .cmp(&b.added_at)
                .then_with(|| a.product_id.cmp(&b.product_id))
        });
        Self { lines }
    }

    /// Snapshot of an empty cart.
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn lines(&self) -> &[CartLine] {
        &self.lines
    }

    #[must_use]
    pub fn into_lines(self) -> Vec<CartLine> {
        self.lines
    }

    /// Look up the line for a product.
    #[must_use]
    pub fn line(&self, product_id: ProductId) -> Option<&CartLine> {
        self.lines.iter().find(|line| line.product_id == product_id)
    }

    /// Quantity held for a product, zero when absent.
    #[must_use]
    pub fn quantity_of(&self, product_id: ProductId) -> i32 {
        self.line(product_id).map_or(0, |line| line.quantity)
    }

    /// Sum of `quantity * price` over all lines.
    ///
    /// The cart service never stores a line that would overflow this, but
    /// rows written elsewhere might, so the sum saturates instead of panicking.
    #[must_use]
    pub fn total(&self) -> Price {
        self.lines
            .iter()
            .fold(Decimal::ZERO, |acc, line| acc.saturating_add(line.line_total()))
    }

    /// Total the cart would have with `line` stored in place of any line for
    /// the same product. `None` if that total does not fit a `Decimal`.
    #[must_use]
    pub fn checked_total_with(&self, line: &CartLine) -> Option<Price> {
        self.lines
            .iter()
            .filter(|other| other.product_id != line.product_id)
            .try_fold(line.checked_line_total()?, |acc, other| {
                acc.checked_add(other.checked_line_total()?)
            })
    }

    /// Number of distinct products (the cart badge number).
    #[must_use]
    pub fn line_count(&self) -> usize {
        self.lines.len()
    }

    /// Number of individual items across all lines.
    #[must_use]
    pub fn item_count(&self) -> i64 {
        self.lines.iter().map(|line| i64::from(line.quantity)).sum()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use rust_decimal_macros::dec;

    fn line(id: i64, price: Decimal, quantity: i32, added_at: DateTime<Utc>) -> CartLine {
        CartLine {
            product_id: ProductId::new(id),
            title: format!("product {id}"),
            price,
            image: String::new(),
            quantity,
            added_at,
        }
    }

    #[test]
    fn total_is_sum_of_line_totals() {
        let now = Utc::now();
        let snapshot = CartSnapshot::new(vec![
            line(1, dec!(10.00), 2, now),
            line(2, dec!(5.50), 3, now),
        ]);

        assert_eq!(snapshot.total(), dec!(36.50));
        assert_eq!(snapshot.line_count(), 2);
        assert_eq!(snapshot.item_count(), 5);
    }

    #[test]
    fn empty_snapshot_totals_zero() {
        let snapshot = CartSnapshot::empty();
        assert!(snapshot.is_empty());
        assert_eq!(snapshot.total(), Decimal::ZERO);
        assert_eq!(snapshot.quantity_of(ProductId::new(1)), 0);
    }

    #[test]
    fn lines_are_ordered_by_first_add_then_id() {
        let now = Utc::now();
        let snapshot = CartSnapshot::new(vec![
            line(3, dec!(1), 1, now + Duration::seconds(5)),
            line(2, dec!(1), 1, now),
            line(1, dec!(1), 1, now),
        ]);

        let ids: Vec<i64> = snapshot.lines().iter().map(|l| l.product_id.get()).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[test]
    fn decimal_prices_do_not_drift() {
        let now = Utc::now();
        let snapshot = CartSnapshot::new(vec![line(1, dec!(0.1), 3, now)]);
        assert_eq!(snapshot.total(), dec!(0.3));
    }

    #[test]
    fn checked_total_replaces_line_for_same_product() {
        let now = Utc::now();
        let snapshot = CartSnapshot::new(vec![
            line(1, dec!(10), 2, now),
            line(2, dec!(1), 1, now),
        ]);

        let replacement = line(1, dec!(10), 5, now);
        assert_eq!(snapshot.checked_total_with(&replacement), Some(dec!(51)));
    }

    #[test]
    fn checked_total_detects_overflow() {
        let now = Utc::now();
        let snapshot = CartSnapshot::new(vec![line(1, Decimal::MAX, 1, now)]);

        assert_eq!(snapshot.checked_total_with(&line(2, dec!(1), 1, now)), None);
        assert_eq!(line(3, Decimal::MAX, 2, now).checked_line_total(), None);
    }

    #[test]
    fn overflowing_rows_saturate_instead_of_panicking() {
        let now = Utc::now();
        let snapshot = CartSnapshot::new(vec![
            line(1, Decimal::MAX, 2, now),
            line(2, Decimal::MAX, 1, now),
        ]);

        assert_eq!(snapshot.total(), Decimal::MAX);
    }

    #[test]
    fn non_positive_quantity_is_not_persistable() {
        let now = Utc::now();
        assert!(line(1, dec!(1), 1, now).is_persistable());
        assert!(!line(1, dec!(1), 0, now).is_persistable());
        assert!(!line(1, dec!(1), -4, now).is_persistable());
    }
}
