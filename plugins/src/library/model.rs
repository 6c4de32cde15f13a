use chrono::{Duration, NaiveDate};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

use pagestate_core::error::AppError;
use pagestate_core::state::{contains_ci, Entity};

pub const LOAN_DAYS: i64 = 14;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "format", rename_all = "lowercase")]
pub enum BookKind {
    Print { pages: u32 },
    EBook { size_mb: f32 },
    AudioBook { minutes: u32, narrator: String },
}

impl BookKind {
    pub fn label(&self) -> &'static str {
        match self {
            BookKind::Print { .. } => "print",
            BookKind::EBook { .. } => "ebook",
            BookKind::AudioBook { .. } => "audiobook",
        }
    }

    /// Short human description, e.g. "320 pages".
    pub fn detail(&self) -> String {
        match self {
            BookKind::Print { pages } => format!("{pages} pages"),
            BookKind::EBook { size_mb } => format!("{size_mb:.1} MB"),
            BookKind::AudioBook { minutes, narrator } => {
                format!("{}h {:02}m, read by {narrator}", minutes / 60, minutes % 60)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub isbn: String,
    pub title: String,
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
    pub kind: BookKind,
    pub available: bool,
    #[serde(default)]
    pub borrowed_by: Option<String>,
    #[serde(default)]
    pub due_date: Option<NaiveDate>,
}

impl Book {
    pub fn new(
        isbn: &str,
        title: impl Into<String>,
        author: impl Into<String>,
        kind: BookKind,
    ) -> Result<Self, AppError> {
        let title = title.into();
        if title.trim().is_empty() {
            return Err(AppError::validation("title is required"));
        }
        let author = author.into();
        Ok(Self {
            isbn: normalize_isbn(isbn)?,
            title: title.trim().to_string(),
            author: if author.trim().is_empty() {
                "Unknown".to_string()
            } else {
                author.trim().to_string()
            },
            year: None,
            kind,
            available: true,
            borrowed_by: None,
            due_date: None,
        })
    }

    pub fn with_year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn is_overdue(&self, today: NaiveDate) -> bool {
        !self.available && self.due_date.is_some_and(|due| due < today)
    }

    /// Marks the book as lent to `member_id` and returns the due date.
    pub fn lend(&mut self, member_id: &str, today: NaiveDate) -> Result<NaiveDate, AppError> {
        if !self.available {
            return Err(AppError::validation(format!(
                "\"{}\" is already borrowed",
                self.title
            )));
        }
        let due = today + Duration::days(LOAN_DAYS);
        self.available = false;
        self.borrowed_by = Some(member_id.to_string());
        self.due_date = Some(due);
        Ok(due)
    }

    pub fn take_back(&mut self) -> Result<(), AppError> {
        if self.available {
            return Err(AppError::validation(format!(
                "\"{}\" is not on loan",
                self.title
            )));
        }
        self.available = true;
        self.borrowed_by = None;
        self.due_date = None;
        Ok(())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BookFilter {
    Search,
    Author,
    Kind,
    Availability,
}

impl fmt::Display for BookFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BookFilter::Search => "search",
            BookFilter::Author => "author",
            BookFilter::Kind => "kind",
            BookFilter::Availability => "availability",
        };
        f.write_str(s)
    }
}

impl FromStr for BookFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "search" => Ok(BookFilter::Search),
            "author" => Ok(BookFilter::Author),
            "kind" => Ok(BookFilter::Kind),
            "availability" => Ok(BookFilter::Availability),
            other => Err(format!("unknown book filter: {other}")),
        }
    }
}

impl Entity for Book {
    type Id = String;
    type FilterKey = BookFilter;

    const SEARCH: BookFilter = BookFilter::Search;

    fn id(&self) -> &String {
        &self.isbn
    }

    fn matches(&self, key: BookFilter, value: &str) -> bool {
        match key {
            BookFilter::Search => {
                contains_ci(&self.title, value)
                    || contains_ci(&self.author, value)
                    || self.isbn.contains(&value.replace('-', ""))
            }
            BookFilter::Author => contains_ci(&self.author, value),
            BookFilter::Kind => self.kind.label().eq_ignore_ascii_case(value.trim()),
            BookFilter::Availability => match value.trim() {
                "available" => self.available,
                "borrowed" => !self.available,
                _ => true,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub id: String,
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LibraryExtra {
    #[serde(default)]
    pub members: BTreeMap<String, Member>,
}

impl LibraryExtra {
    /// Registers a member under the next free `M###` id.
    pub fn enrol(&mut self, name: &str, email: &str) -> Result<Member, AppError> {
        if name.trim().is_empty() {
            return Err(AppError::validation("member name is required"));
        }
        let email = validate_email(email)?;
        if self.members.values().any(|m| m.email == email) {
            return Err(AppError::validation(format!(
                "a member with email {email} already exists"
            )));
        }
        let id = (self.members.len() + 1..)
            .map(|n| format!("M{n:03}"))
            .find(|id| !self.members.contains_key(id))
            .unwrap_or_default();
        let member = Member {
            id: id.clone(),
            name: name.trim().to_string(),
            email,
        };
        self.members.insert(id, member.clone());
        Ok(member)
    }
}

/// Strips separators and checks the ISBN-10 or ISBN-13 check digit.
pub fn normalize_isbn(raw: &str) -> Result<String, AppError> {
    let isbn: String = raw
        .chars()
        .filter(|c| !matches!(c, '-' | ' '))
        .map(|c| c.to_ascii_uppercase())
        .collect();
    let valid = match isbn.len() {
        10 => isbn10_ok(&isbn),
        13 => isbn13_ok(&isbn),
        _ => false,
    };
    if valid {
        Ok(isbn)
    } else {
        Err(AppError::validation(format!("invalid ISBN: {}", raw.trim())))
    }
}

fn isbn10_ok(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let digit = match (c, i) {
            ('X', 9) => 10,
            (c, _) => match c.to_digit(10) {
                Some(d) => d,
                None => return false,
            },
        };
        sum += digit * (10 - i as u32);
    }
    sum % 11 == 0
}

fn isbn13_ok(isbn: &str) -> bool {
    let mut sum = 0u32;
    for (i, c) in isbn.chars().enumerate() {
        let Some(d) = c.to_digit(10) else {
            return false;
        };
        sum += if i % 2 == 0 { d } else { d * 3 };
    }
    sum % 10 == 0
}

static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();

pub fn validate_email(raw: &str) -> Result<String, AppError> {
    let re = EMAIL_REGEX.get_or_init(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]{2,}$").unwrap());
    let email = raw.trim().to_lowercase();
    if re.is_match(&email) {
        Ok(email)
    } else {
        Err(AppError::validation(format!("invalid email: {}", raw.trim())))
    }
}
