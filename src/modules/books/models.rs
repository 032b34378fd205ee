use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// ISBN-10 or ISBN-13: optional 978/979 prefix, nine digits, then a digit or `X`.
static ISBN_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(978|979)?[0-9]{9}([0-9]|X)$").expect("ISBN pattern compiles"));

/// A persisted (or about to be persisted) book record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// Assigned by the store; `None` until the book is first saved
    pub id: Option<i64>,
    pub title: String,
    pub author: String,
    /// Serialized as `YYYY-MM-DD`
    pub published_date: NaiveDate,
    pub isbn: String,
    pub price: f64,
}

/// Request body for create and update.
///
/// Every field is optional so that absent and blank values are reported as
/// violations rather than as deserialization failures.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BookPayload {
    /// Accepted for compatibility, never honoured
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    #[serde(default)]
    pub published_date: Option<NaiveDate>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub price: Option<f64>,
}

/// A single violated field constraint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Violation {
    pub field: &'static str,
    pub message: &'static str,
}

impl Violation {
    const fn new(field: &'static str, message: &'static str) -> Self {
        Self { field, message }
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Blank means nothing left after stripping ASCII control characters and spaces.
/// Other whitespace, such as U+00A0, counts as content.
fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim_matches(|c: char| c <= ' ').is_empty())
}

/// Whether `isbn` is a well-formed ISBN-10/13
pub fn is_valid_isbn(isbn: &str) -> bool {
    ISBN_PATTERN.is_match(isbn)
}

impl BookPayload {
    /// Check every field constraint, reporting violations in field order.
    pub fn validate(&self) -> Vec<Violation> {
        let mut violations = Vec::new();

        if is_blank(self.title.as_deref()) {
            violations.push(Violation::new("title", "Title cannot be empty"));
        }
        if is_blank(self.author.as_deref()) {
            violations.push(Violation::new("author", "Author cannot be empty"));
        }
        if self.published_date.is_none() {
            violations.push(Violation::new(
                "publishedDate",
                "Published Date cannot be null",
            ));
        }
        match self.isbn.as_deref() {
            isbn if is_blank(isbn) => {
                violations.push(Violation::new("isbn", "ISBN cannot be empty"));
            }
            Some(isbn) if !is_valid_isbn(isbn) => {
                violations.push(Violation::new("isbn", "Invalid ISBN format"));
            }
            _ => {}
        }
        match self.price {
            None => violations.push(Violation::new("price", "Price cannot be null")),
            // Written as a negation so NaN is rejected too.
            Some(price) if !(price > 0.0) => {
                violations.push(Violation::new("price", "Price must be positive"));
            }
            Some(_) => {}
        }

        violations
    }

    /// Build a new, unsaved [`Book`]. Any `id` in the payload is discarded.
    pub fn into_book(self) -> Result<Book, Vec<Violation>> {
        let violations = self.validate();

        match (
            violations.is_empty(),
            self.title,
            self.author,
            self.published_date,
            self.isbn,
            self.price,
        ) {
            (true, Some(title), Some(author), Some(published_date), Some(isbn), Some(price)) => {
                Ok(Book {
                    id: None,
                    title,
                    author,
                    published_date,
                    isbn,
                    price,
                })
            }
            _ => Err(violations),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_payload() -> BookPayload {
        BookPayload {
            id: None,
            title: Some("Test Book".to_string()),
            author: Some("Author".to_string()),
            published_date: NaiveDate::from_ymd_opt(2024, 1, 1),
            isbn: Some("9781234567890".to_string()),
            price: Some(19.99),
        }
    }

    fn fields(violations: &[Violation]) -> Vec<&'static str> {
        violations.iter().map(|v| v.field).collect()
    }

    #[test]
    fn isbn_pattern_accepts_ten_and_thirteen_digit_forms() {
        assert!(is_valid_isbn("9781234567890"));
        assert!(is_valid_isbn("9780987654321"));
        assert!(is_valid_isbn("123456789X"));
        assert!(is_valid_isbn("0987654321"));
    }

    #[test]
    fn isbn_pattern_rejects_malformed_values() {
        assert!(!is_valid_isbn("ABC1234567"));
        assert!(!is_valid_isbn("12345"));
        assert!(!is_valid_isbn("9771234567890"));
        assert!(!is_valid_isbn("123456789x"));
        // Non-ASCII digits are not digits here.
        assert!(!is_valid_isbn("١٢٣٤٥٦٧٨٩٠"));
    }

    #[test]
    fn valid_payload_builds_book_without_id() {
        let mut payload = valid_payload();
        payload.id = Some(42);

        let book = payload.into_book().unwrap();
        assert_eq!(book.id, None);
        assert_eq!(book.title, "Test Book");
        assert_eq!(book.price, 19.99);
    }

    #[test]
    fn blank_and_missing_fields_are_reported_in_order() {
        let payload = BookPayload {
            title: Some("   ".to_string()),
            ..BookPayload::default()
        };

        let violations = payload.validate();
        assert_eq!(
            fields(&violations),
            vec!["title", "author", "publishedDate", "isbn", "price"]
        );
        assert_eq!(violations[0].to_string(), "title: Title cannot be empty");
        assert_eq!(violations[4].message, "Price cannot be null");
    }

    #[test]
    fn only_control_and_space_characters_count_as_blank() {
        for title in ["", " \t\r\n", "\u{0}\u{1f}"] {
            let payload = BookPayload {
                title: Some(title.to_string()),
                ..valid_payload()
            };
            assert_eq!(fields(&payload.validate()), vec!["title"], "{title:?}");
        }

        let payload = BookPayload {
            title: Some("\u{00A0}".to_string()),
            author: Some("\u{2003}".to_string()),
            ..valid_payload()
        };
        assert!(payload.validate().is_empty());
    }

    #[test]
    fn malformed_isbn_is_rejected() {
        let payload = BookPayload {
            isbn: Some("12345".to_string()),
            ..valid_payload()
        };
        assert_eq!(
            payload.into_book().unwrap_err(),
            vec![Violation::new("isbn", "Invalid ISBN format")]
        );
    }

    #[test]
    fn non_positive_price_is_rejected() {
        for price in [0.0, -1.5, f64::NAN] {
            let payload = BookPayload {
                price: Some(price),
                ..valid_payload()
            };
            assert_eq!(
                payload.validate(),
                vec![Violation::new("price", "Price must be positive")],
                "price {price} should be rejected"
            );
        }
    }

    #[test]
    fn book_serializes_with_camel_case_date() {
        let book = valid_payload().into_book().unwrap();
        let json = serde_json::to_value(&book).unwrap();
        assert_eq!(json["publishedDate"], "2024-01-01");
        assert!(json["id"].is_null());
    }

    #[test]
    fn payload_deserializes_from_request_json() {
        let payload: BookPayload = serde_json::from_str(
            r#"{"id": 7, "title": "T", "author": "A", "publishedDate": "2024-01-01",
                "isbn": "9781234567890", "price": 19.99}"#,
        )
        .unwrap();
        assert!(payload.validate().is_empty());
        assert_eq!(payload.id, Some(7));
    }
}
