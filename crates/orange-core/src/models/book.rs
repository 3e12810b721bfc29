use serde::{Deserialize, Serialize};

use crate::api::{FormBody, Resource};

use super::display_or_dash;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Book {
    pub id: i64,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub isbn: Option<String>,
    #[serde(default)]
    pub author: Option<String>,
    /// Id of the librarian who catalogued the book
    #[serde(default)]
    pub librarian: Option<i64>,
    #[serde(default)]
    pub publication_date: Option<String>,
}

impl Book {
    pub fn title_display(&self) -> String {
        display_or_dash(&self.title)
    }

    pub fn author_display(&self) -> String {
        display_or_dash(&self.author)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookForm {
    pub title: String,
    pub isbn: String,
    pub author: String,
    pub librarian: Option<i64>,
    pub publication_date: String,
}

impl From<&Book> for BookForm {
    fn from(book: &Book) -> Self {
        Self {
            title: book.title.clone().unwrap_or_default(),
            isbn: book.isbn.clone().unwrap_or_default(),
            author: book.author.clone().unwrap_or_default(),
            librarian: book.librarian,
            publication_date: book.publication_date.clone().unwrap_or_default(),
        }
    }
}

/// The `/book/` collection
pub struct Books;

impl Resource for Books {
    type Record = Book;
    type Form = BookForm;

    const LABEL: &'static str = "Book";
    const COLLECTION: &'static str = "/book/";

    fn record_id(record: &Book) -> i64 {
        record.id
    }

    fn encode(form: &BookForm) -> FormBody {
        FormBody::Json(serde_json::json!({
            "title": form.title,
            "isbn": form.isbn,
            "author": form.author,
            "librarian": form.librarian,
            "publication_date": form.publication_date,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_book_with_missing_fields() {
        let json = r#"{"id": 3, "title": "Dune", "isbn": "9780441013593"}"#;
        let book: Book = serde_json::from_str(json).expect("Failed to parse book JSON");
        assert_eq!(book.id, 3);
        assert_eq!(book.title_display(), "Dune");
        assert_eq!(book.author_display(), "-");
        assert_eq!(book.librarian, None);
    }

    #[test]
    fn test_book_form_encodes_as_json() {
        let form = BookForm {
            title: "Dune".to_string(),
            isbn: "9780441013593".to_string(),
            author: "Frank Herbert".to_string(),
            librarian: Some(2),
            publication_date: "1965-08-01".to_string(),
        };

        match Books::encode(&form) {
            FormBody::Json(value) => {
                assert_eq!(value["title"], "Dune");
                assert_eq!(value["librarian"], 2);
                assert_eq!(value["publication_date"], "1965-08-01");
            }
            other => panic!("expected JSON body, got {other:?}"),
        }
    }

    #[test]
    fn test_book_paths() {
        assert_eq!(Books::update_path(7), "/book/7/");
        assert_eq!(Books::delete_path(7), "/book/7/");
    }
}
