use pagestate_core::render::{ItemView, Markup};
use pagestate_core::state::AppState;

use super::model::{cart_total_cents, format_price, Product, ShopExtra};

pub const LIST_ID: &str = "product-grid";
pub const CART_ID: &str = "cart";
pub const CART_COUNT_ID: &str = "cart-count";

#[derive(Debug, Clone, Default)]
pub struct ShopView;

impl ItemView<Product, ShopExtra> for ShopView {
    fn list_id(&self) -> &str {
        LIST_ID
    }

    fn render_item(&self, product: &Product, state: &AppState<Product, ShopExtra>) -> Markup {
        let id = product.id.to_string();
        let wish = if state.is_selected(&product.id) {
            "♥"
        } else {
            "♡"
        };
        let stock = match product.stock {
            0 => "Out of stock".to_string(),
            n if n <= 3 => format!("Only {n} left"),
            n => format!("{n} in stock"),
        };
        let m = Markup::new()
            .element("h3", &[("class", "product-name")], &product.name)
            .element("span", &[("class", "category")], &product.category)
            .element("p", &[("class", "price")], &format_price(product.price_cents))
            .element("p", &[("class", "rating")], &format!("{:.1} / 5", product.rating))
            .element("p", &[("class", "stock")], &stock)
            .element(
                "button",
                &[
                    ("class", "wishlist"),
                    ("data-action", "toggle-wishlist"),
                    ("data-id", id.as_str()),
                ],
                wish,
            );
        if product.stock == 0 {
            m.element("button", &[("disabled", "disabled")], "Sold out")
        } else {
            m.element(
                "button",
                &[("data-action", "add-to-cart"), ("data-id", id.as_str())],
                "Add to cart",
            )
        }
    }
}

pub fn render_cart(state: &AppState<Product, ShopExtra>) -> Markup {
    let cart = &state.extra.cart;
    if cart.is_empty() {
        return Markup::new().element("p", &[("class", "empty-state")], "Your cart is empty");
    }
    let mut m = Markup::new().open("ul", &[("class", "cart-lines")]);
    for (id, qty) in cart {
        let name = state
            .item(id)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| format!("Product {id}"));
        let subtotal = state
            .item(id)
            .map(|p| format_price(p.price_cents * u64::from(*qty)))
            .unwrap_or_default();
        let id = id.to_string();
        m = m
            .open("li", &[("data-id", id.as_str())])
            .element("span", &[("class", "line-name")], &name)
            .element(
                "button",
                &[("data-action", "decrease"), ("data-id", id.as_str())],
                "-",
            )
            .element("span", &[("class", "qty")], &qty.to_string())
            .element(
                "button",
                &[("data-action", "increase"), ("data-id", id.as_str())],
                "+",
            )
            .element("span", &[("class", "subtotal")], &subtotal)
            .element(
                "button",
                &[("data-action", "remove-from-cart"), ("data-id", id.as_str())],
                "Remove",
            )
            .close("li");
    }
    let total = cart_total_cents(&state.items, &state.extra);
    m.close("ul")
        .element(
            "p",
            &[("class", "cart-total")],
            &format!("Total: {}", format_price(total)),
        )
        .element("button", &[("data-action", "checkout")], "Checkout")
}
