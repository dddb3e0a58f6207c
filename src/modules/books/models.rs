use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::{json, Value};
use shelf_http::AppError;
use uuid::Uuid;

pub const MOCK_ID: &str = "Mock Id";
pub const MOCK_TITLE: &str = "Mock Title";
pub const MOCK_AUTHOR: &str = "Mock Author";
pub const MOCK_SUMMARY: &str = "Mock Summary";
pub const MOCK_TOTAL_PAGES: i64 = 100;

const SUMMARY_MIN_CHARS: usize = 5;

/// Book as returned by the API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    /// UUID of the book
    pub id: String,
    pub title: String,
    pub author: String,
    /// Short description, at least five characters
    pub summary: String,
    /// Page count, at least one
    pub total_pages: i64,
}

impl Book {
    /// The fixed record every single-book endpoint answers with.
    ///
    /// Its id is not a UUID, so it does not pass [`Book::validate`].
    pub fn mock() -> Self {
        Self {
            id: MOCK_ID.to_string(),
            title: MOCK_TITLE.to_string(),
            author: MOCK_AUTHOR.to_string(),
            summary: MOCK_SUMMARY.to_string(),
            total_pages: MOCK_TOTAL_PAGES,
        }
    }

    pub fn validate(&self) -> Result<(), AppError> {
        let mut details = Vec::new();

        if Uuid::parse_str(&self.id).is_err() {
            details.push(json!({ "field": "id", "error": "must be a UUID" }));
        }
        if self.title.is_empty() {
            details.push(json!({ "field": "title", "error": "must not be empty" }));
        }
        if self.author.is_empty() {
            details.push(json!({ "field": "author", "error": "must not be empty" }));
        }
        if self.summary.chars().count() < SUMMARY_MIN_CHARS {
            details.push(json!({
                "field": "summary",
                "error": format!("must be at least {SUMMARY_MIN_CHARS} characters"),
            }));
        }
        if self.total_pages < 1 {
            details.push(json!({ "field": "totalPages", "error": "must be at least 1" }));
        }

        if details.is_empty() {
            Ok(())
        } else {
            Err(AppError::validation(details, "book failed schema validation"))
        }
    }
}

/// Request body for creating a book. Same shape as [`Book`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostBook {
    pub id: String,
    pub title: String,
    pub author: String,
    pub summary: String,
    /// Form bodies carry every field as text, so a numeric string is read too.
    #[serde(deserialize_with = "page_count")]
    pub total_pages: i64,
}

impl PostBook {
    /// Read a raw request body as a `PostBook`, if it has the right shape.
    pub fn from_value(value: &Value) -> Result<Self, AppError> {
        Self::deserialize(value).map_err(|err| {
            AppError::validation(
                vec![json!({ "field": "body", "error": err.to_string() })],
                "request body is not a book",
            )
        })
    }

    pub fn validate(&self) -> Result<(), AppError> {
        Book::from(self).validate()
    }
}

impl From<&PostBook> for Book {
    fn from(book: &PostBook) -> Self {
        Self {
            id: book.id.clone(),
            title: book.title.clone(),
            author: book.author.clone(),
            summary: book.summary.clone(),
            total_pages: book.total_pages,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PageCount {
    Number(i64),
    Text(String),
}

fn page_count<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    match PageCount::deserialize(deserializer)? {
        PageCount::Number(pages) => Ok(pages),
        PageCount::Text(text) => text.trim().parse().map_err(de::Error::custom),
    }
}
