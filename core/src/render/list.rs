//! Projection of a store's state into list markup.

use super::markup::Markup;
use crate::state::{AppState, Entity};

/// Per-app presentation of one record.
pub trait ItemView<E: Entity, X>: Send + Sync {
    /// DOM id of the list region, replaced on full renders.
    fn list_id(&self) -> &str;

    /// DOM id of the `<ul>` inside the region that appended pages extend.
    fn items_id(&self) -> String {
        format!("{}-items", self.list_id())
    }

    /// Inner markup for one item; the renderer supplies the `<li>` wrapper.
    fn render_item(&self, item: &E, state: &AppState<E, X>) -> Markup;

    fn empty_message(&self, state: &AppState<E, X>) -> String {
        let query = state.query();
        if !query.is_empty() {
            format!("No results for \"{query}\"")
        } else if state.has_filters() {
            "No results match the current filters".to_string()
        } else {
            "Nothing here yet".to_string()
        }
    }
}

fn item_markup<E: Entity, X, V: ItemView<E, X> + ?Sized>(
    view: &V,
    item: &E,
    state: &AppState<E, X>,
) -> Markup {
    let id = item.id().to_string();
    let class = if state.is_selected(item.id()) {
        "item selected"
    } else {
        "item"
    };
    Markup::new()
        .open("li", &[("class", class), ("data-id", id.as_str())])
        .child(view.render_item(item, state))
        .close("li")
}

/// Renders the full list region. Exactly one branch is produced, checked in
/// this order: error, loading, empty, list.
pub fn render_list<E: Entity, X, V: ItemView<E, X> + ?Sized>(
    view: &V,
    state: &AppState<E, X>,
) -> Markup {
    if let Some(error) = &state.ui.error {
        let mut m = Markup::new()
            .open("div", &[("class", "error-state"), ("role", "alert")])
            .element("p", &[], &error.message);
        if error.retryable {
            m = m.element(
                "button",
                &[("type", "button"), ("data-action", "retry")],
                "Retry",
            );
        }
        return m.close("div");
    }

    if state.ui.is_loading {
        return Markup::new().element(
            "div",
            &[("class", "loading"), ("aria-busy", "true")],
            "Loading…",
        );
    }

    let items = state.page_items();
    if items.is_empty() {
        let mut m = Markup::new()
            .open("div", &[("class", "empty-state")])
            .element("p", &[], &view.empty_message(state));
        if state.has_filters() {
            m = m.element(
                "button",
                &[("type", "button"), ("data-action", "clear-filters")],
                "Clear filters",
            );
        }
        return m.close("div");
    }

    let class = format!("item-list view-{}", state.ui.view_mode.as_str());
    let items_id = view.items_id();
    let mut m = Markup::new().open("ul", &[("id", items_id.as_str()), ("class", class.as_str())]);
    for item in items {
        m = m.child(item_markup(view, item, state));
    }
    m = m.close("ul");
    if state.pagination.has_more {
        m = m.element(
            "button",
            &[
                ("type", "button"),
                ("class", "load-more"),
                ("data-action", "load-more"),
            ],
            "Load more",
        );
    }
    m
}

/// Renders only the items revealed since `previous_page`, to be appended to
/// the existing list.
pub fn render_append<E: Entity, X, V: ItemView<E, X> + ?Sized>(
    view: &V,
    state: &AppState<E, X>,
    previous_page: u32,
) -> Markup {
    state
        .revealed_since(previous_page)
        .into_iter()
        .fold(Markup::new(), |m, item| m.child(item_markup(view, item, state)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorInfo;
    use crate::state::types::test_fixtures::*;
    use pretty_assertions::assert_eq;

    struct FruitView;

    impl ItemView<Fruit, ()> for FruitView {
        fn list_id(&self) -> &str {
            "fruit-list"
        }

        fn render_item(&self, item: &Fruit, _: &AppState<Fruit>) -> Markup {
            Markup::new().element("span", &[], &item.name)
        }
    }

    fn state(n: u32, page_size: u32) -> AppState<Fruit> {
        let mut s = AppState::new(page_size);
        s.items = basket(n);
        s.refresh_pagination();
        s
    }

    #[test]
    fn render_is_idempotent() {
        let s = state(5, 2);
        assert_eq!(render_list(&FruitView, &s), render_list(&FruitView, &s));
    }

    #[test]
    fn renders_page_and_load_more() {
        let s = state(3, 2);
        assert_eq!(
            render_list(&FruitView, &s).as_str(),
            "<ul id=\"fruit-list-items\" class=\"item-list view-grid\">\
             <li class=\"item\" data-id=\"1\"><span>fruit-1</span></li>\
             <li class=\"item\" data-id=\"2\"><span>fruit-2</span></li>\
             </ul>\
             <button type=\"button\" class=\"load-more\" data-action=\"load-more\">Load more</button>"
        );
    }

    #[test]
    fn list_element_id_differs_from_region_id() {
        let html = render_list(&FruitView, &state(1, 2)).into_string();
        assert_eq!(FruitView.items_id(), "fruit-list-items");
        assert!(html.contains("id=\"fruit-list-items\""));
        assert!(!html.contains("id=\"fruit-list\""));
    }

    #[test]
    fn empty_search_renders_no_results_branch() {
        let mut s = state(3, 2);
        s.filters.insert(FruitFilter::Search, "kiwi".into());
        s.refresh_pagination();
        let html = render_list(&FruitView, &s).into_string();
        assert!(html.contains("empty-state"));
        assert!(html.contains("No results for &quot;kiwi&quot;"));
        assert!(html.contains("data-action=\"clear-filters\""));
        assert!(!html.contains("<ul"));
    }

    #[test]
    fn empty_collection_still_gives_feedback() {
        let s = state(0, 2);
        let html = render_list(&FruitView, &s).into_string();
        assert!(html.contains("Nothing here yet"));
    }

    #[test]
    fn error_branch_offers_retry() {
        let mut s = state(3, 2);
        s.ui.error = Some(ErrorInfo::retryable("offline"));
        let html = render_list(&FruitView, &s).into_string();
        assert!(html.contains("role=\"alert\""));
        assert!(html.contains("data-action=\"retry\""));
    }

    #[test]
    fn append_renders_only_new_items() {
        let mut s = state(5, 2);
        s.pagination.page = 2;
        s.refresh_pagination();
        let html = render_append(&FruitView, &s, 1).into_string();
        assert!(html.contains("data-id=\"3\""));
        assert!(html.contains("data-id=\"4\""));
        assert!(!html.contains("data-id=\"1\""));
        assert!(!html.contains("<ul"));
    }

    #[test]
    fn selected_items_are_marked() {
        let mut s = state(2, 5);
        s.selected.insert(2);
        let html = render_list(&FruitView, &s).into_string();
        assert!(html.contains("<li class=\"item selected\" data-id=\"2\">"));
    }
}
