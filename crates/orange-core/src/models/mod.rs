//! Data models for the records service.
//!
//! Each module holds the record as returned by the server, the form used to
//! create or update it, and the `Resource` marker describing its endpoints:
//!
//! - `Book` / `Books`
//! - `Librarian` / `Librarians`
//! - `Member` / `Members` (multipart, optional image)
//! - `Student` / `Students` (multipart, optional image, sortable)

pub mod book;
pub mod librarian;
pub mod member;
pub mod student;

pub use book::{Book, BookForm, Books};
pub use librarian::{Librarian, LibrarianForm, Librarians};
pub use member::{Member, MemberForm, Members};
pub use student::{sort_students, Student, StudentForm, StudentSortColumn, Students};

/// Display a missing or empty field as "-"
pub(crate) fn display_or_dash(value: &Option<String>) -> String {
    match value.as_deref() {
        Some(v) if !v.is_empty() => v.to_string(),
        _ => "-".to_string(),
    }
}

/// Join first and last name, skipping missing parts
pub(crate) fn join_name(first: &Option<String>, last: &Option<String>) -> String {
    [first.as_deref(), last.as_deref()]
        .into_iter()
        .flatten()
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}
