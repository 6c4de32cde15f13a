use super::model::{Book, BookKind};

fn book(isbn: &str, title: &str, author: &str, year: i32, kind: BookKind) -> Option<Book> {
    Book::new(isbn, title, author, kind)
        .ok()
        .map(|b| b.with_year(year))
}

/// Starter shelf used when no remote catalog is configured.
pub fn seed_books() -> Vec<Book> {
    [
        book("9780261103573", "The Hobbit", "J.R.R. Tolkien", 1937, BookKind::Print { pages: 310 }),
        book("9780141439518", "Pride and Prejudice", "Jane Austen", 1813, BookKind::EBook { size_mb: 1.2 }),
        book("9780553380163", "A Brief History of Time", "Stephen Hawking", 1988, BookKind::Print { pages: 212 }),
        book("9780061120084", "To Kill a Mockingbird", "Harper Lee", 1960, BookKind::Print { pages: 336 }),
        book(
            "9780743273565",
            "The Great Gatsby",
            "F. Scott Fitzgerald",
            1925,
            BookKind::AudioBook { minutes: 291, narrator: "Jake Gyllenhaal".into() },
        ),
        book("9780451524935", "Nineteen Eighty-Four", "George Orwell", 1949, BookKind::Print { pages: 328 }),
        book("9780345391803", "The Hitchhiker's Guide to the Galaxy", "Douglas Adams", 1979, BookKind::EBook { size_mb: 0.8 }),
        book("9780679729273", "The Remains of the Day", "Kazuo Ishiguro", 1989, BookKind::Print { pages: 245 }),
        book("0306406152", "Dune", "Frank Herbert", 1965, BookKind::AudioBook { minutes: 1261, narrator: "Scott Brick".into() }),
    ]
    .into_iter()
    .flatten()
    .collect()
}
