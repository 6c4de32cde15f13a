//! Library catalogue: books, members and the borrow/return lifecycle.

pub mod catalog;
pub mod fixtures;
pub mod model;
pub mod view;

pub use catalog::OpenLibrary;
pub use model::{Book, BookFilter, BookKind, LibraryExtra, Member, LOAN_DAYS};
pub use view::LibraryView;

use chrono::NaiveDate;
use std::sync::Arc;

use pagestate_core::adapter::DataSource;
use pagestate_core::clock::Clock;
use pagestate_core::dispatch::{Dispatcher, Effect, NoticeLevel, Outcome, Payload};
use pagestate_core::error::AppError;
use pagestate_core::page::{App, AppDispatcher, AppOutcome};
use pagestate_core::render::Frame;
use pagestate_core::state::{Mutation, Store};

use model::normalize_isbn;

pub const STORAGE_KEY: &str = "libraryData";

pub struct Library {
    store: Store<Book, LibraryExtra>,
    source: Arc<dyn DataSource<Book>>,
    clock: Arc<dyn Clock>,
    view: LibraryView,
}

impl Library {
    pub fn new(
        store: Store<Book, LibraryExtra>,
        source: Arc<dyn DataSource<Book>>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            source,
            clock,
            view: LibraryView,
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.now().date_naive()
    }

    pub fn add_book(&mut self, mut book: Book) -> Result<Mutation<()>, AppError> {
        book.isbn = normalize_isbn(&book.isbn)?;
        self.store.add_item(book)
    }

    pub fn remove_book(&mut self, isbn: &str) -> Result<Mutation<Book>, AppError> {
        let isbn = normalize_isbn(isbn)?;
        if let Some(book) = self.store.state().item(&isbn) {
            if !book.available {
                return Err(AppError::validation(format!(
                    "\"{}\" is on loan and cannot be removed",
                    book.title
                )));
            }
        }
        self.store.remove_item(&isbn)
    }

    pub fn add_member(&mut self, name: &str, email: &str) -> Result<Mutation<Member>, AppError> {
        self.store.transact(|_, extra| extra.enrol(name, email))
    }

    /// Lends a book for [`LOAN_DAYS`] days and returns the due date.
    pub fn borrow(
        &mut self,
        isbn: &str,
        member_id: &str,
        today: NaiveDate,
    ) -> Result<Mutation<NaiveDate>, AppError> {
        if !self.store.state().extra.members.contains_key(member_id) {
            return Err(AppError::not_found(format!("member {member_id}")));
        }
        let isbn = normalize_isbn(isbn)?;
        let due = self
            .store
            .update_item(&isbn, |book| book.lend(member_id, today))?;
        tracing::info!(target: "pagestate.library", %isbn, member = member_id, due = %due.value, "book borrowed");
        Ok(due)
    }

    pub fn return_book(&mut self, isbn: &str) -> Result<Mutation<()>, AppError> {
        let isbn = normalize_isbn(isbn)?;
        let m = self.store.update_item(&isbn, Book::take_back)?;
        tracing::info!(target: "pagestate.library", %isbn, "book returned");
        Ok(m)
    }

    pub fn overdue(&self, today: NaiveDate) -> Vec<&Book> {
        self.store
            .state()
            .items
            .iter()
            .filter(|b| b.is_overdue(today))
            .collect()
    }
}

impl App for Library {
    type Entity = Book;
    type Extra = LibraryExtra;
    type View = LibraryView;

    const REMOTE_QUERY: bool = false;

    fn store(&self) -> &Store<Book, LibraryExtra> {
        &self.store
    }

    fn store_mut(&mut self) -> &mut Store<Book, LibraryExtra> {
        &mut self.store
    }

    fn source(&self) -> Arc<dyn DataSource<Book>> {
        Arc::clone(&self.source)
    }

    fn view(&self) -> &LibraryView {
        &self.view
    }

    fn actions() -> AppDispatcher<Self> {
        Dispatcher::new()
            .on("borrow", on_borrow)
            .on("return", on_return)
            .on("remove-book", on_remove_book)
            .on("toggle-favorite", on_toggle_favorite)
            .on("add-book", on_add_book)
            .on("add-member", on_add_member)
            .on("import", on_import)
    }

    fn render_panels(&self) -> Vec<Frame> {
        let today = self.today();
        vec![
            Frame::Replace {
                target: view::MEMBERS_ID.to_string(),
                markup: view::render_members(&self.store.state().extra),
            },
            Frame::Replace {
                target: view::OVERDUE_ID.to_string(),
                markup: view::render_overdue(&self.overdue(today), today),
            },
        ]
    }
}

fn on_borrow(app: &mut Library, p: &Payload) -> Result<AppOutcome<Library>, AppError> {
    let isbn = p.require("id")?;
    let member = p
        .get("member")
        .filter(|m| !m.trim().is_empty())
        .ok_or_else(|| AppError::validation("choose a member to borrow this book"))?;
    let today = app.today();
    let due = app.borrow(isbn, member.trim(), today)?;
    Ok(Outcome::render()
        .notify(NoticeLevel::Success, format!("Due back on {}", due.value))
        .saved(due.persisted))
}

fn on_return(app: &mut Library, p: &Payload) -> Result<AppOutcome<Library>, AppError> {
    let m = app.return_book(p.require("id")?)?;
    Ok(Outcome::render()
        .notify(NoticeLevel::Success, "Book returned")
        .saved(m.persisted))
}

fn on_remove_book(app: &mut Library, p: &Payload) -> Result<AppOutcome<Library>, AppError> {
    let removed = app.remove_book(p.require("id")?)?;
    Ok(Outcome::render()
        .notify(NoticeLevel::Info, format!("Removed \"{}\"", removed.value.title))
        .saved(removed.persisted))
}

fn on_toggle_favorite(app: &mut Library, p: &Payload) -> Result<AppOutcome<Library>, AppError> {
    let isbn = normalize_isbn(p.require("id")?)?;
    let m = app.store_mut().toggle_selection(isbn);
    Ok(Outcome::render().saved(m.persisted))
}

fn parse_kind(p: &Payload) -> Result<BookKind, AppError> {
    match p.get("format").unwrap_or("print") {
        "print" => Ok(BookKind::Print {
            pages: p.get("pages").map(|_| p.parse("pages")).transpose()?.unwrap_or(0),
        }),
        "ebook" => Ok(BookKind::EBook {
            size_mb: p.get("size").map(|_| p.parse("size")).transpose()?.unwrap_or(0.0),
        }),
        "audiobook" => Ok(BookKind::AudioBook {
            minutes: p.parse("minutes")?,
            narrator: p.get("narrator").unwrap_or("Unknown").to_string(),
        }),
        other => Err(AppError::validation(format!("unknown format: {other}"))),
    }
}

fn on_add_book(app: &mut Library, p: &Payload) -> Result<AppOutcome<Library>, AppError> {
    let mut book = Book::new(
        p.require("isbn")?,
        p.require("title")?,
        p.get("author").unwrap_or_default(),
        parse_kind(p)?,
    )?;
    book.year = p.get("year").map(|_| p.parse("year")).transpose()?;
    let title = book.title.clone();
    let m = app.add_book(book)?;
    Ok(Outcome::render()
        .notify(NoticeLevel::Success, format!("Added \"{title}\""))
        .saved(m.persisted))
}

fn on_add_member(app: &mut Library, p: &Payload) -> Result<AppOutcome<Library>, AppError> {
    let member = app.add_member(p.require("name")?, p.require("email")?)?;
    Ok(Outcome::render()
        .notify(
            NoticeLevel::Success,
            format!("Welcome, {} ({})", member.value.name, member.value.id),
        )
        .saved(member.persisted))
}

/// Fetches one edition by ISBN from the data source and adds it.
fn on_import(app: &mut Library, p: &Payload) -> Result<AppOutcome<Library>, AppError> {
    let isbn = normalize_isbn(p.require("isbn")?)?;
    if app.store().state().item(&isbn).is_some() {
        return Err(AppError::validation(format!("{isbn} is already on the shelf")));
    }
    Ok(Outcome::none().with(Effect::Lookup { id: isbn }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestate_core::adapter::FixtureSource;
    use pagestate_core::clock::ManualClock;
    use pagestate_core::storage::MemoryKv;
    use pretty_assertions::assert_eq;

    fn day(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn library() -> Library {
        let kv = Arc::new(MemoryKv::new());
        let mut store = Store::new(kv, STORAGE_KEY, 12);
        let _ = store.set_items(fixtures::seed_books());
        let source = Arc::new(FixtureSource::new("shelf", fixtures::seed_books()));
        let clock = Arc::new(ManualClock::new(
            day("2024-03-01").and_hms_opt(9, 0, 0).unwrap().and_utc(),
        ));
        Library::new(store, source, clock)
    }

    #[test]
    fn borrow_and_return_lifecycle() {
        let mut lib = library();
        let ada = lib.add_member("Ada", "ada@example.org").unwrap().value;

        let due = lib
            .borrow("978-0-261-10357-3", &ada.id, day("2024-03-01"))
            .unwrap();
        assert_eq!(due.value, day("2024-03-15"));
        assert!(due.persisted);
        let hobbit = lib.store().state().item(&"9780261103573".to_string()).unwrap();
        assert!(!hobbit.available);
        assert_eq!(hobbit.borrowed_by.as_deref(), Some("M001"));

        assert!(lib.overdue(day("2024-03-15")).is_empty());
        assert_eq!(lib.overdue(day("2024-03-16")).len(), 1);

        lib.return_book("9780261103573").unwrap();
        let hobbit = lib.store().state().item(&"9780261103573".to_string()).unwrap();
        assert!(hobbit.available);
        assert_eq!(hobbit.borrowed_by, None);
        assert_eq!(hobbit.due_date, None);
    }

    #[test]
    fn borrow_requires_known_member_and_book() {
        let mut lib = library();
        let err = lib.borrow("9780261103573", "M404", day("2024-03-01")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        lib.add_member("Ada", "ada@example.org").unwrap();
        let err = lib.borrow("9780306406157", "M001", day("2024-03-01")).unwrap_err();
        assert!(matches!(err, AppError::NotFound(_)));

        lib.borrow("9780261103573", "M001", day("2024-03-01")).unwrap();
        let err = lib.borrow("9780261103573", "M001", day("2024-03-02")).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn borrowed_book_cannot_be_removed() {
        let mut lib = library();
        lib.add_member("Ada", "ada@example.org").unwrap();
        lib.borrow("0306406152", "M001", day("2024-03-01")).unwrap();
        assert!(lib.remove_book("0306406152").is_err());
        lib.return_book("0306406152").unwrap();
        assert_eq!(lib.remove_book("0306406152").unwrap().value.title, "Dune");
    }

    #[test]
    fn borrow_action_without_member_is_a_notification() {
        let mut lib = library();
        let dispatcher = Library::actions();
        let outcome = dispatcher
            .dispatch_action(&mut lib, "borrow", &Payload::new().with("id", "9780261103573"))
            .into_outcome();
        assert_eq!(outcome.notifications.len(), 1);
        assert_eq!(outcome.notifications[0].level, NoticeLevel::Warning);
        assert!(outcome.notifications[0].message.contains("choose a member"));
    }

    #[test]
    fn import_requests_lookup_for_new_isbn_only() {
        let mut lib = library();
        let dispatcher = Library::actions();
        let outcome = dispatcher
            .dispatch_action(&mut lib, "import", &Payload::new().with("isbn", "978-0-306-40615-7"))
            .into_outcome();
        assert_eq!(
            outcome.effects,
            vec![Effect::Lookup {
                id: "9780306406157".to_string()
            }]
        );

        let outcome = dispatcher
            .dispatch_action(&mut lib, "import", &Payload::new().with("isbn", "9780261103573"))
            .into_outcome();
        assert!(outcome.effects.iter().all(|e| *e == Effect::Render));
        assert!(outcome.notifications[0].message.contains("already on the shelf"));
    }

    #[test]
    fn add_book_action_parses_format() {
        let mut lib = library();
        let dispatcher = Library::actions();
        let payload = Payload::new()
            .with("isbn", "9780306406157")
            .with("title", "Information Theory")
            .with("format", "audiobook")
            .with("minutes", "95")
            .with("year", "2001");
        dispatcher.dispatch_action(&mut lib, "add-book", &payload);
        let book = lib.store().state().item(&"9780306406157".to_string()).unwrap();
        assert_eq!(book.author, "Unknown");
        assert_eq!(book.year, Some(2001));
        assert_eq!(
            book.kind,
            BookKind::AudioBook {
                minutes: 95,
                narrator: "Unknown".into()
            }
        );
    }
}
