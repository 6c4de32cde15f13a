//! Open Library as a remote catalog: `search.json` for queries and
//! `/isbn/{isbn}.json` for single editions.

use regex::Regex;
use serde_json::Value;
use std::sync::OnceLock;

use pagestate_core::adapter::{RemoteCatalog, RemoteRequest};
use pagestate_core::state::Filters;

use super::model::{normalize_isbn, Book, BookFilter, BookKind};

/// Used when neither a query nor an author narrows the search.
const BROWSE_QUERY: &str = "classics";
const SEARCH_LIMIT: &str = "50";
const SEARCH_FIELDS: &str = "title,author_name,first_publish_year,isbn,number_of_pages_median";

#[derive(Debug, Clone, Default)]
pub struct OpenLibrary;

impl RemoteCatalog for OpenLibrary {
    type Entity = Book;

    fn name(&self) -> &str {
        "open-library"
    }

    fn search_request(&self, query: &str, filters: &Filters<BookFilter>) -> RemoteRequest {
        let author = filters
            .get(&BookFilter::Author)
            .map(|a| a.trim())
            .filter(|a| !a.is_empty());
        let mut req = RemoteRequest::new("/search.json");
        if !query.trim().is_empty() {
            req = req.param("q", query.trim());
        } else if author.is_none() {
            req = req.param("q", BROWSE_QUERY);
        }
        if let Some(author) = author {
            req = req.param("author", author);
        }
        req.param("limit", SEARCH_LIMIT)
            .param("fields", SEARCH_FIELDS)
    }

    fn by_id_request(&self, isbn: &String) -> RemoteRequest {
        RemoteRequest::new(format!("/isbn/{isbn}.json"))
    }

    fn parse_search(&self, body: &Value) -> Result<Vec<Book>, String> {
        let docs = body
            .get("docs")
            .and_then(Value::as_array)
            .ok_or_else(|| "missing docs array".to_string())?;
        Ok(docs.iter().filter_map(book_from_doc).collect())
    }

    fn parse_one(&self, body: &Value) -> Result<Option<Book>, String> {
        if !body.is_object() {
            return Err("edition is not an object".to_string());
        }
        let Some(isbn) = ["isbn_13", "isbn_10"]
            .iter()
            .filter_map(|field| body.get(*field).and_then(Value::as_array))
            .flatten()
            .filter_map(Value::as_str)
            .find_map(|raw| normalize_isbn(raw).ok())
        else {
            return Ok(None);
        };
        let title = str_field(body, "title").ok_or_else(|| "edition has no title".to_string())?;
        let author = str_field(body, "by_statement").unwrap_or("Unknown");
        let pages = body
            .get("number_of_pages")
            .and_then(Value::as_u64)
            .unwrap_or(0) as u32;
        let mut book = Book::new(&isbn, title, author, BookKind::Print { pages })
            .map_err(|e| e.to_string())?;
        book.year = str_field(body, "publish_date").and_then(year_in);
        Ok(Some(book))
    }
}

fn str_field<'a>(v: &'a Value, key: &str) -> Option<&'a str> {
    v.get(key).and_then(Value::as_str)
}

/// Search docs without a valid ISBN are skipped.
fn book_from_doc(doc: &Value) -> Option<Book> {
    let isbn = doc
        .get("isbn")?
        .as_array()?
        .iter()
        .filter_map(Value::as_str)
        .find_map(|raw| normalize_isbn(raw).ok())?;
    let title = str_field(doc, "title")?;
    let author = doc
        .get("author_name")
        .and_then(Value::as_array)
        .and_then(|names| names.first())
        .and_then(Value::as_str)
        .unwrap_or("Unknown");
    let pages = doc
        .get("number_of_pages_median")
        .and_then(Value::as_u64)
        .unwrap_or(0) as u32;
    let mut book = Book::new(&isbn, title, author, BookKind::Print { pages }).ok()?;
    book.year = doc
        .get("first_publish_year")
        .and_then(Value::as_i64)
        .map(|y| y as i32);
    Some(book)
}

static YEAR_REGEX: OnceLock<Regex> = OnceLock::new();

fn year_in(date: &str) -> Option<i32> {
    let re = YEAR_REGEX.get_or_init(|| Regex::new(r"\b(\d{4})\b").unwrap());
    re.captures(date)?.get(1)?.as_str().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestate_core::adapter::{DataSource, HttpSource};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn blank_query_browses() {
        let req = OpenLibrary.search_request("  ", &Filters::new());
        assert_eq!(
            req.signature().as_str(),
            "/search.json?fields=title%2Cauthor_name%2Cfirst_publish_year%2Cisbn%2Cnumber_of_pages_median&limit=50&q=classics"
        );

        let mut filters = Filters::new();
        filters.insert(BookFilter::Author, "Le Guin".to_string());
        let req = OpenLibrary.search_request("", &filters);
        assert!(req.signature().as_str().contains("author=Le+Guin"));
        assert!(!req.signature().as_str().contains("q="));
    }

    #[test]
    fn parse_search_skips_docs_without_isbn() {
        let body = json!({"docs": [
            {"title": "The Hobbit", "author_name": ["J.R.R. Tolkien"], "first_publish_year": 1937,
             "isbn": ["bogus", "9780261103573"], "number_of_pages_median": 310},
            {"title": "No Isbn", "author_name": ["Anon"]},
        ]});
        let books = OpenLibrary.parse_search(&body).unwrap();
        assert_eq!(books.len(), 1);
        assert_eq!(books[0].isbn, "9780261103573");
        assert_eq!(books[0].year, Some(1937));
        assert_eq!(books[0].kind, BookKind::Print { pages: 310 });

        assert!(OpenLibrary.parse_search(&json!({"numFound": 0})).is_err());
    }

    #[test]
    fn parse_edition() {
        let body = json!({"title": "Dune", "isbn_10": ["0-306-40615-2"],
                          "publish_date": "August 1990", "number_of_pages": 604});
        let book = OpenLibrary.parse_one(&body).unwrap().unwrap();
        assert_eq!(book.isbn, "0306406152");
        assert_eq!(book.author, "Unknown");
        assert_eq!(book.year, Some(1990));
    }

    #[tokio::test]
    async fn lookup_by_isbn_hits_edition_endpoint() {
        let mut server = mockito::Server::new_async().await;
        let found = server
            .mock("GET", "/isbn/9780261103573.json")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"title":"The Hobbit","isbn_13":["9780261103573"],"by_statement":"J.R.R. Tolkien"}"#)
            .create_async()
            .await;
        let missing = server
            .mock("GET", "/isbn/9780141439518.json")
            .with_status(404)
            .create_async()
            .await;

        let source = HttpSource::new(OpenLibrary, &server.url(), 2_000).unwrap();
        let book = source
            .get_by_id(&"9780261103573".to_string())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(book.author, "J.R.R. Tolkien");
        assert!(source
            .get_by_id(&"9780141439518".to_string())
            .await
            .unwrap()
            .is_none());
        found.assert_async().await;
        missing.assert_async().await;
    }
}
