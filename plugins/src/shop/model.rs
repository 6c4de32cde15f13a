use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use pagestate_core::error::AppError;
use pagestate_core::state::{contains_ci, Entity};

pub type ProductId = u32;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub category: String,
    pub price_cents: u64,
    pub stock: u32,
    #[serde(default)]
    pub rating: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProductFilter {
    Search,
    Category,
    MaxPrice,
}

impl fmt::Display for ProductFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ProductFilter::Search => "search",
            ProductFilter::Category => "category",
            ProductFilter::MaxPrice => "max-price",
        })
    }
}

impl FromStr for ProductFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(ProductFilter::Search),
            "category" => Ok(ProductFilter::Category),
            "max-price" => Ok(ProductFilter::MaxPrice),
            other => Err(format!("unknown product filter: {other}")),
        }
    }
}

impl Entity for Product {
    type Id = ProductId;
    type FilterKey = ProductFilter;

    const SEARCH: ProductFilter = ProductFilter::Search;

    fn id(&self) -> &ProductId {
        &self.id
    }

    fn matches(&self, key: ProductFilter, value: &str) -> bool {
        match key {
            ProductFilter::Search => {
                contains_ci(&self.name, value) || contains_ci(&self.category, value)
            }
            ProductFilter::Category => self.category.eq_ignore_ascii_case(value.trim()),
            // An unparsable ceiling does not filter anything out.
            ProductFilter::MaxPrice => parse_price(value)
                .map(|max| self.price_cents <= max)
                .unwrap_or(true),
        }
    }
}

/// Parses a price in whole currency units ("25", "19.99") into cents.
pub fn parse_price(raw: &str) -> Option<u64> {
    let value: f64 = raw.trim().trim_start_matches('$').parse().ok()?;
    (value.is_finite() && value >= 0.0).then(|| (value * 100.0).round() as u64)
}

pub fn format_price(cents: u64) -> String {
    format!("${}.{:02}", cents / 100, cents % 100)
}

/// Product id to quantity. Lines with quantity zero are never stored.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopExtra {
    #[serde(default)]
    pub cart: BTreeMap<ProductId, u32>,
}

impl ShopExtra {
    pub fn quantity(&self, id: ProductId) -> u32 {
        self.cart.get(&id).copied().unwrap_or(0)
    }

    pub fn item_count(&self) -> u32 {
        self.cart.values().sum()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CartChange {
    pub quantity: u32,
    /// The requested quantity exceeded stock and was capped.
    pub clamped: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReceiptLine {
    pub id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub subtotal_cents: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Receipt {
    pub lines: Vec<ReceiptLine>,
    pub total_cents: u64,
}

/// Adds one unit, capped at the product's stock.
pub fn increase(
    products: &[Product],
    extra: &mut ShopExtra,
    id: ProductId,
) -> Result<CartChange, AppError> {
    let product = find(products, id)?;
    if product.stock == 0 {
        return Err(AppError::validation(format!("{} is out of stock", product.name)));
    }
    let current = extra.quantity(id);
    if current >= product.stock {
        // Stock may have dropped below an old cart line.
        extra.cart.insert(id, product.stock);
        return Ok(CartChange {
            quantity: product.stock,
            clamped: true,
        });
    }
    extra.cart.insert(id, current + 1);
    Ok(CartChange {
        quantity: current + 1,
        clamped: false,
    })
}

/// Removes one unit; the line disappears at zero.
pub fn decrease(extra: &mut ShopExtra, id: ProductId) -> Result<CartChange, AppError> {
    let current = extra.quantity(id);
    if current == 0 {
        return Err(AppError::not_found(format!("cart line for product {id}")));
    }
    if current == 1 {
        extra.cart.remove(&id);
    } else {
        extra.cart.insert(id, current - 1);
    }
    Ok(CartChange {
        quantity: current - 1,
        clamped: false,
    })
}

pub fn cart_total_cents(products: &[Product], extra: &ShopExtra) -> u64 {
    extra
        .cart
        .iter()
        .filter_map(|(id, qty)| {
            products
                .iter()
                .find(|p| p.id == *id)
                .map(|p| p.price_cents * u64::from(*qty))
        })
        .sum()
}

/// Simulated purchase: decrements stock and empties the cart.
pub fn checkout(products: &mut [Product], extra: &mut ShopExtra) -> Result<Receipt, AppError> {
    if extra.cart.is_empty() {
        return Err(AppError::validation("your cart is empty"));
    }
    let mut lines = Vec::with_capacity(extra.cart.len());
    for (&id, &quantity) in &extra.cart {
        let product = products
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| AppError::not_found(format!("product {id}")))?;
        if product.stock < quantity {
            return Err(AppError::validation(format!(
                "only {} of {} left",
                product.stock, product.name
            )));
        }
        product.stock -= quantity;
        lines.push(ReceiptLine {
            id,
            name: product.name.clone(),
            quantity,
            subtotal_cents: product.price_cents * u64::from(quantity),
        });
    }
    extra.cart.clear();
    let total_cents = lines.iter().map(|l| l.subtotal_cents).sum();
    Ok(Receipt { lines, total_cents })
}

fn find(products: &[Product], id: ProductId) -> Result<&Product, AppError> {
    products
        .iter()
        .find(|p| p.id == id)
        .ok_or_else(|| AppError::not_found(format!("product {id}")))
}
