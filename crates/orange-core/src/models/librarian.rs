use serde::{Deserialize, Serialize};

use crate::api::{FormBody, Resource};

use super::{display_or_dash, join_name};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Librarian {
    pub id: i64,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub hire_date: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
}

impl Librarian {
    pub fn full_name(&self) -> String {
        join_name(&self.first_name, &self.last_name)
    }

    pub fn email_display(&self) -> String {
        display_or_dash(&self.email)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LibrarianForm {
    pub first_name: String,
    pub last_name: String,
    pub hire_date: String,
    pub email: String,
}

impl From<&Librarian> for LibrarianForm {
    fn from(librarian: &Librarian) -> Self {
        Self {
            first_name: librarian.first_name.clone().unwrap_or_default(),
            last_name: librarian.last_name.clone().unwrap_or_default(),
            hire_date: librarian.hire_date.clone().unwrap_or_default(),
            email: librarian.email.clone().unwrap_or_default(),
        }
    }
}

/// The `/librarian/` collection
pub struct Librarians;

impl Resource for Librarians {
    type Record = Librarian;
    type Form = LibrarianForm;

    const LABEL: &'static str = "Librarian";
    const COLLECTION: &'static str = "/librarian/";

    fn record_id(record: &Librarian) -> i64 {
        record.id
    }

    fn encode(form: &LibrarianForm) -> FormBody {
        FormBody::Json(serde_json::json!({
            "first_name": form.first_name,
            "last_name": form.last_name,
            "hire_date": form.hire_date,
            "email": form.email,
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_librarian_full_name() {
        let json = r#"{"id": 1, "first_name": "Ada", "last_name": "Lovelace", "hire_date": "2024-01-02", "email": null}"#;
        let librarian: Librarian = serde_json::from_str(json).expect("Failed to parse librarian JSON");
        assert_eq!(librarian.full_name(), "Ada Lovelace");
        assert_eq!(librarian.email_display(), "-");
    }

    #[test]
    fn test_librarian_form_from_record() {
        let librarian = Librarian {
            id: 4,
            first_name: Some("Ada".to_string()),
            last_name: None,
            hire_date: Some("2024-01-02".to_string()),
            email: Some("ada@example.org".to_string()),
        };
        let form = LibrarianForm::from(&librarian);
        assert_eq!(form.first_name, "Ada");
        assert_eq!(form.last_name, "");
        assert_eq!(form.email, "ada@example.org");
    }
}
