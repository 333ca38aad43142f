//! Checkout cart: the items a customer submits before a backend cart exists

#[derive(Clone, Debug, Default)]
pub struct CheckoutCart {
    items: Vec<CartLine>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: String,
    pub quantity: u32,
}

impl CheckoutCart {
    pub fn new() -> Self { Self::default() }

    /// Builds a cart from submitted `(product id, quantity)` pairs; a missing quantity counts as one.
    pub fn from_requested<I>(requested: I) -> Result<Self, CartError>
    where
        I: IntoIterator<Item = (String, Option<u32>)>,
    {
        let mut cart = Self::new();
        for (product_id, quantity) in requested {
            cart.add_item(product_id, quantity.unwrap_or(1))?;
        }
        Ok(cart)
    }

    pub fn items(&self) -> &[CartLine] { &self.items }
    pub fn item_count(&self) -> usize { self.items.len() }
    pub fn is_empty(&self) -> bool { self.items.is_empty() }
    pub fn total_quantity(&self) -> u32 { self.items.iter().map(|i| i.quantity).sum() }

    pub fn add_item(&mut self, product_id: impl Into<String>, quantity: u32) -> Result<(), CartError> {
        let product_id = product_id.into();
        if product_id.trim().is_empty() { return Err(CartError::MissingProduct); }
        if quantity == 0 { return Err(CartError::InvalidQuantity(product_id)); }
        if let Some(existing) = self.items.iter_mut().find(|i| i.product_id == product_id) {
            existing.quantity = existing.quantity.saturating_add(quantity);
        } else {
            self.items.push(CartLine { product_id, quantity });
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)] pub enum CartError { MissingProduct, InvalidQuantity(String) }
impl std::error::Error for CartError {}
impl std::fmt::Display for CartError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingProduct => write!(f, "Cart item without product id"),
            Self::InvalidQuantity(id) => write!(f, "Invalid quantity for {id}"),
        }
    }
}
