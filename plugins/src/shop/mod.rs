//! Product catalogue with a cart, a wishlist and a simulated checkout.

pub mod fixtures;
pub mod model;
pub mod view;

pub use model::{CartChange, Product, ProductFilter, ProductId, Receipt, ShopExtra};
pub use view::ShopView;

use std::sync::Arc;

use pagestate_core::adapter::DataSource;
use pagestate_core::dispatch::{Dispatcher, NoticeLevel, Outcome, Payload};
use pagestate_core::error::AppError;
use pagestate_core::page::{App, AppDispatcher, AppOutcome};
use pagestate_core::render::{Frame, TextPatch};
use pagestate_core::state::{Mutation, Store};

use model::format_price;

pub const STORAGE_KEY: &str = "shop-cart";

pub struct Shop {
    store: Store<Product, ShopExtra>,
    source: Arc<dyn DataSource<Product>>,
    view: ShopView,
}

impl Shop {
    pub fn new(store: Store<Product, ShopExtra>, source: Arc<dyn DataSource<Product>>) -> Self {
        Self {
            store,
            source,
            view: ShopView,
        }
    }

    pub fn increase_quantity(&mut self, id: ProductId) -> Result<Mutation<CartChange>, AppError> {
        self.store
            .transact(|products, extra| model::increase(products, extra, id))
    }

    pub fn decrease_quantity(&mut self, id: ProductId) -> Result<Mutation<CartChange>, AppError> {
        self.store.transact(|_, extra| model::decrease(extra, id))
    }

    pub fn remove_from_cart(&mut self, id: ProductId) -> Result<Mutation<u32>, AppError> {
        self.store.transact(|_, extra| {
            extra
                .cart
                .remove(&id)
                .ok_or_else(|| AppError::not_found(format!("cart line for product {id}")))
        })
    }

    pub fn cart_total_cents(&self) -> u64 {
        let state = self.store.state();
        model::cart_total_cents(&state.items, &state.extra)
    }

    pub fn checkout(&mut self) -> Result<Mutation<Receipt>, AppError> {
        let receipt = self
            .store
            .transact(|products, extra| model::checkout(products, extra))?;
        tracing::info!(
            target: "pagestate.shop",
            lines = receipt.value.lines.len(),
            total_cents = receipt.value.total_cents,
            "checkout completed"
        );
        Ok(receipt)
    }
}

impl App for Shop {
    type Entity = Product;
    type Extra = ShopExtra;
    type View = ShopView;

    const REMOTE_QUERY: bool = false;

    fn store(&self) -> &Store<Product, ShopExtra> {
        &self.store
    }

    fn store_mut(&mut self) -> &mut Store<Product, ShopExtra> {
        &mut self.store
    }

    fn source(&self) -> Arc<dyn DataSource<Product>> {
        Arc::clone(&self.source)
    }

    fn view(&self) -> &ShopView {
        &self.view
    }

    fn actions() -> AppDispatcher<Self> {
        Dispatcher::new()
            .on("add-to-cart", on_increase)
            .on("increase", on_increase)
            .on("decrease", on_decrease)
            .on("remove-from-cart", on_remove)
            .on("toggle-wishlist", on_toggle_wishlist)
            .on("checkout", on_checkout)
    }

    fn render_panels(&self) -> Vec<Frame> {
        let state = self.store.state();
        vec![
            Frame::Replace {
                target: view::CART_ID.to_string(),
                markup: view::render_cart(state),
            },
            Frame::Patch(TextPatch::new(
                view::CART_COUNT_ID,
                state.extra.item_count().to_string(),
            )),
        ]
    }
}

fn on_increase(app: &mut Shop, p: &Payload) -> Result<AppOutcome<Shop>, AppError> {
    let id: ProductId = p.parse("id")?;
    let change = app.increase_quantity(id)?;
    let mut outcome = Outcome::render();
    if change.value.clamped {
        outcome = outcome.notify(
            NoticeLevel::Warning,
            format!("Only {} in stock (max stock reached)", change.value.quantity),
        );
    }
    Ok(outcome.saved(change.persisted))
}

fn on_decrease(app: &mut Shop, p: &Payload) -> Result<AppOutcome<Shop>, AppError> {
    let change = app.decrease_quantity(p.parse("id")?)?;
    Ok(Outcome::render().saved(change.persisted))
}

fn on_remove(app: &mut Shop, p: &Payload) -> Result<AppOutcome<Shop>, AppError> {
    let removed = app.remove_from_cart(p.parse("id")?)?;
    Ok(Outcome::render().saved(removed.persisted))
}

fn on_toggle_wishlist(app: &mut Shop, p: &Payload) -> Result<AppOutcome<Shop>, AppError> {
    let id: ProductId = p.parse("id")?;
    let member = app.store_mut().toggle_selection(id);
    let message = if member.value {
        "Added to wishlist"
    } else {
        "Removed from wishlist"
    };
    Ok(Outcome::render()
        .notify(NoticeLevel::Info, message)
        .saved(member.persisted))
}

fn on_checkout(app: &mut Shop, _: &Payload) -> Result<AppOutcome<Shop>, AppError> {
    let receipt = app.checkout()?;
    let units: u32 = receipt.value.lines.iter().map(|l| l.quantity).sum();
    Ok(Outcome::render()
        .notify(
            NoticeLevel::Success,
            format!(
                "Order placed: {units} item(s), {}",
                format_price(receipt.value.total_cents)
            ),
        )
        .saved(receipt.persisted))
}
