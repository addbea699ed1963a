//! The serialized order handed to a submitter.

use serde::Serialize;

use crate::cart::Cart;
use crate::types::{ItemId, PhoneNumber, Price};

/// One line of a submitted order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// Catalog item identifier.
    pub id: ItemId,
    /// Display name.
    pub name: String,
    /// Units ordered.
    pub quantity: u32,
    /// Unit price.
    pub price: Price,
}

/// An immutable snapshot of a cart at the moment of confirmation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    lines: Vec<OrderLine>,
    phone: Option<PhoneNumber>,
    total_price: Price,
}

impl Order {
    /// Snapshot a cart into an order.
    ///
    /// Returns `None` for an empty cart.
    #[must_use]
    pub fn from_cart(cart: &Cart, phone: Option<PhoneNumber>) -> Option<Self> {
        if cart.is_empty() {
            return None;
        }
        let lines = cart
            .lines()
            .iter()
            .map(|line| OrderLine {
                id: line.item_id.clone(),
                name: line.name.clone(),
                quantity: line.quantity.get(),
                price: line.unit_price,
            })
            .collect();
        Some(Self {
            lines,
            phone,
            total_price: cart.total_price(),
        })
    }

    /// Ordered lines, in cart order.
    #[must_use]
    pub fn lines(&self) -> &[OrderLine] {
        &self.lines
    }

    /// Contact phone, when collected.
    #[must_use]
    pub const fn phone(&self) -> Option<&PhoneNumber> {
        self.phone.as_ref()
    }

    /// Order total.
    #[must_use]
    pub const fn total_price(&self) -> Price {
        self.total_price
    }

    /// Total number of units across all lines.
    #[must_use]
    pub fn total_item_count(&self) -> u64 {
        self.lines.iter().map(|line| u64::from(line.quantity)).sum()
    }

    /// The JSON body sent to an order endpoint.
    ///
    /// ```json
    /// { "phone": "+998901234567",
    ///   "items": [{ "id": "p1", "name": "Pizza Pepperoni", "quantity": 2, "price": 70000 }],
    ///   "totalPrice": 140000 }
    /// ```
    #[must_use]
    pub fn payload(&self) -> OrderPayload<'_> {
        OrderPayload {
            phone: self.phone.as_ref().map(PhoneNumber::international),
            items: &self.lines,
            total_price: self.total_price,
        }
    }
}

/// Wire form of an [`Order`].
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderPayload<'a> {
    /// Contact phone in international form.
    pub phone: Option<String>,
    /// Ordered lines.
    pub items: &'a [OrderLine],
    /// Order total.
    pub total_price: Price,
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::indexing_slicing)]
mod tests {
    use serde_json::json;

    use super::*;
    use crate::catalog::CatalogItem;
    use crate::types::PhoneRule;

    fn item(id: &str, name: &str, price: u64) -> CatalogItem {
        CatalogItem {
            id: ItemId::new(id),
            name: name.to_owned(),
            description: String::new(),
            price: Price::new(price),
            image_url: String::new(),
            category: "Menu".to_owned(),
        }
    }

    fn cart() -> Cart {
        let mut cart = Cart::new();
        let pepperoni = item("p1", "Pizza Pepperoni", 70_000);
        cart.add(&pepperoni);
        cart.add(&pepperoni);
        cart.add(&item("h1", "Hot-Dog Oddiy", 10_000));
        cart
    }

    #[test]
    fn test_from_empty_cart_is_none() {
        assert!(Order::from_cart(&Cart::new(), None).is_none());
    }

    #[test]
    fn test_snapshot_totals() {
        let order = Order::from_cart(&cart(), None).unwrap();
        assert_eq!(order.lines().len(), 2);
        assert_eq!(order.total_item_count(), 3);
        assert_eq!(order.total_price(), Price::new(150_000));
    }

    #[test]
    fn test_payload_json_shape() {
        let phone = PhoneNumber::parse("+998 90 123 45 67", &PhoneRule::default()).unwrap();
        let order = Order::from_cart(&cart(), Some(phone)).unwrap();
        let value = serde_json::to_value(order.payload()).unwrap();
        assert_eq!(
            value,
            json!({
                "phone": "+998901234567",
                "items": [
                    { "id": "p1", "name": "Pizza Pepperoni", "quantity": 2, "price": 70000 },
                    { "id": "h1", "name": "Hot-Dog Oddiy", "quantity": 1, "price": 10000 }
                ],
                "totalPrice": 150000
            })
        );
    }

    #[test]
    fn test_payload_without_phone_is_null() {
        let order = Order::from_cart(&cart(), None).unwrap();
        let value = serde_json::to_value(order.payload()).unwrap();
        assert!(value["phone"].is_null());
    }
}
