use chrono::NaiveDate;

use pagestate_core::render::{ItemView, Markup};
use pagestate_core::state::AppState;

use super::model::{Book, LibraryExtra};

pub const LIST_ID: &str = "book-list";
pub const MEMBERS_ID: &str = "member-list";
pub const OVERDUE_ID: &str = "overdue-list";

#[derive(Debug, Clone, Default)]
pub struct LibraryView;

impl ItemView<Book, LibraryExtra> for LibraryView {
    fn list_id(&self) -> &str {
        LIST_ID
    }

    fn render_item(&self, book: &Book, state: &AppState<Book, LibraryExtra>) -> Markup {
        let byline = match book.year {
            Some(year) => format!("{} ({year})", book.author),
            None => book.author.clone(),
        };
        let star = if state.is_selected(&book.isbn) {
            "★"
        } else {
            "☆"
        };
        let mut m = Markup::new()
            .element("h3", &[("class", "book-title")], &book.title)
            .element("p", &[("class", "book-author")], &byline)
            .element(
                "span",
                &[("class", format!("badge badge-{}", book.kind.label()).as_str())],
                &book.kind.detail(),
            );
        m = match (&book.borrowed_by, book.due_date) {
            (Some(member_id), Some(due)) => {
                let who = state
                    .extra
                    .members
                    .get(member_id)
                    .map(|m| m.name.as_str())
                    .unwrap_or(member_id.as_str());
                m.element(
                    "p",
                    &[("class", "book-status borrowed")],
                    &format!("Borrowed by {who}, due {due}"),
                )
                .element(
                    "button",
                    &[("data-action", "return"), ("data-id", book.isbn.as_str())],
                    "Return",
                )
            }
            _ => m
                .element("p", &[("class", "book-status available")], "Available")
                .element(
                    "button",
                    &[("data-action", "borrow"), ("data-id", book.isbn.as_str())],
                    "Borrow",
                ),
        };
        m.element(
            "button",
            &[
                ("class", "favorite"),
                ("data-action", "toggle-favorite"),
                ("data-id", book.isbn.as_str()),
            ],
            star,
        )
        .element(
            "button",
            &[("data-action", "remove-book"), ("data-id", book.isbn.as_str())],
            "Remove",
        )
    }
}

pub fn render_members(extra: &LibraryExtra) -> Markup {
    if extra.members.is_empty() {
        return Markup::new().element("p", &[("class", "empty-state")], "No members yet");
    }
    let mut m = Markup::new().open("ul", &[("class", "members")]);
    for member in extra.members.values() {
        m = m
            .open("li", &[("data-id", member.id.as_str())])
            .element("strong", &[], &member.name)
            .text(" ")
            .element("span", &[("class", "email")], &member.email)
            .close("li");
    }
    m.close("ul")
}

pub fn render_overdue(overdue: &[&Book], today: NaiveDate) -> Markup {
    if overdue.is_empty() {
        return Markup::new().element("p", &[("class", "empty-state")], "Nothing overdue");
    }
    let mut m = Markup::new().open("ul", &[("class", "overdue")]);
    for book in overdue {
        let days = book
            .due_date
            .map(|due| (today - due).num_days())
            .unwrap_or_default();
        m = m
            .open("li", &[("data-id", book.isbn.as_str())])
            .text(&format!("{} ({days} days late)", book.title))
            .close("li");
    }
    m.close("ul")
}
