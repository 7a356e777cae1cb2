//! Customer details and the order message handed off at checkout.
//!
//! The message is plain text; encoding it into a chat deep-link is done by
//! the storefront's hand-off service.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::cart::Cart;

/// The customer fields collected at checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CustomerField {
    Name,
    Phone,
    Address,
}

impl fmt::Display for CustomerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Name => "name",
            Self::Phone => "phone",
            Self::Address => "address",
        })
    }
}

/// Errors that prevent an order message from being built.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum OrderError {
    /// Checkout was requested with nothing in the cart.
    #[error("your cart is empty")]
    EmptyCart,
    /// A required customer field was blank.
    #[error("{0} is required to complete the order")]
    MissingCustomerField(CustomerField),
}

/// Who is placing the order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDetails {
    pub name: String,
    pub phone: String,
    pub address: String,
}

impl CustomerDetails {
    /// Trim every field and check that none is blank.
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::MissingCustomerField`] for the first blank field,
    /// in the order name, phone, address.
    pub fn validated(self) -> Result<Self, OrderError> {
        let field = |value: String, which: CustomerField| {
            let trimmed = value.trim();
            if trimmed.is_empty() {
                Err(OrderError::MissingCustomerField(which))
            } else {
                Ok(trimmed.to_owned())
            }
        };

        Ok(Self {
            name: field(self.name, CustomerField::Name)?,
            phone: field(self.phone, CustomerField::Phone)?,
            address: field(self.address, CustomerField::Address)?,
        })
    }
}

/// The text summary of a cart sent to the store at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct OrderMessage(String);

impl OrderMessage {
    /// Build the message for `cart`, with prices prefixed by `currency`.
    ///
    /// ```
    /// use vitrine_core::{Cart, CustomerDetails, OrderMessage, Price, Product, ProductId};
    ///
    /// let mut cart = Cart::new();
    /// cart.add(&Product {
    ///     id: ProductId::new(1),
    ///     name: "Arte 1".into(),
    ///     price: Price::from_cents(1090),
    ///     image: "arte-1.jpg".into(),
    /// });
    /// let customer = CustomerDetails {
    ///     name: "Ana".into(),
    ///     phone: "83 99999-0000".into(),
    ///     address: "Rua A, 1".into(),
    /// };
    ///
    /// let message = OrderMessage::build(&cart, &customer, "R$").unwrap();
    /// assert!(message.as_str().contains("Arte 1 (x1) - R$ 10.90"));
    /// ```
    ///
    /// # Errors
    ///
    /// Returns [`OrderError::EmptyCart`] if the cart has no lines.
    pub fn build(
        cart: &Cart,
        customer: &CustomerDetails,
        currency: &str,
    ) -> Result<Self, OrderError> {
        if cart.is_empty() {
            return Err(OrderError::EmptyCart);
        }

        let mut lines = vec![
            "Hello, I would like to complete my order:".to_string(),
            String::new(),
            format!("*Name:* {}", customer.name),
            format!("*Phone:* {}", customer.phone),
            format!("*Address:* {}", customer.address),
            String::new(),
        ];

        lines.extend(cart.lines().iter().map(|line| {
            format!(
                "{} (x{}) - {}",
                line.name,
                line.quantity,
                line.subtotal().display_with(currency)
            )
        }));

        lines.push(String::new());
        lines.push(format!("Total: {}", cart.total().display_with(currency)));
        lines.push(String::new());
        lines.push("Looking forward to hearing from you. Thank you!".to_string());

        Ok(Self(lines.join("\n")))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OrderMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
