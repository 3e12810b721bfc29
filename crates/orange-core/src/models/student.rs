use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::api::{FormBody, ImageUpload, Resource};

use super::join_name;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Student {
    pub id: i64,
    #[serde(default)]
    pub firstname: Option<String>,
    #[serde(default)]
    pub lastname: Option<String>,
    #[serde(default)]
    pub admissiondate: Option<String>,
    #[serde(default)]
    pub program: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
    /// Server-relative path of the student photo
    #[serde(default)]
    pub image: Option<String>,
}

impl Student {
    pub fn full_name(&self) -> String {
        join_name(&self.firstname, &self.lastname)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentForm {
    pub firstname: String,
    pub lastname: String,
    pub admissiondate: String,
    pub program: String,
    pub address: String,
    pub image: Option<ImageUpload>,
}

impl From<&Student> for StudentForm {
    fn from(student: &Student) -> Self {
        Self {
            firstname: student.firstname.clone().unwrap_or_default(),
            lastname: student.lastname.clone().unwrap_or_default(),
            admissiondate: student.admissiondate.clone().unwrap_or_default(),
            program: student.program.clone().unwrap_or_default(),
            address: student.address.clone().unwrap_or_default(),
            image: None,
        }
    }
}

/// The `/student/` collection. Updates and deletes use their own sub-paths.
pub struct Students;

impl Resource for Students {
    type Record = Student;
    type Form = StudentForm;

    const LABEL: &'static str = "Student";
    const COLLECTION: &'static str = "/student/";

    fn record_id(record: &Student) -> i64 {
        record.id
    }

    fn encode(form: &StudentForm) -> FormBody {
        FormBody::Multipart {
            fields: vec![
                ("firstname", form.firstname.clone()),
                ("lastname", form.lastname.clone()),
                ("admissiondate", form.admissiondate.clone()),
                ("program", form.program.clone()),
                ("address", form.address.clone()),
            ],
            image: form.image.clone(),
        }
    }

    fn update_path(id: i64) -> String {
        format!("/student/update/{}/", id)
    }

    fn delete_path(id: i64) -> String {
        format!("/student/delete/{}/", id)
    }

    fn created_message() -> String {
        "Student registered!".to_string()
    }

    fn updated_message() -> String {
        "Student updated!".to_string()
    }

    fn deleted_message() -> String {
        "Successfully Deleted".to_string()
    }
}

/// Columns the student record list can be sorted by
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StudentSortColumn {
    Id,
    Name,
    Program,
}

impl StudentSortColumn {
    pub fn title(&self) -> &'static str {
        match self {
            StudentSortColumn::Id => "ID",
            StudentSortColumn::Name => "Name",
            StudentSortColumn::Program => "Program",
        }
    }

    fn compare(&self, a: &Student, b: &Student) -> Ordering {
        match self {
            StudentSortColumn::Id => a.id.cmp(&b.id),
            StudentSortColumn::Name => cmp_lowercase(&a.firstname, &b.firstname)
                .then_with(|| cmp_lowercase(&a.lastname, &b.lastname)),
            StudentSortColumn::Program => cmp_lowercase(&a.program, &b.program),
        }
    }
}

fn cmp_lowercase(a: &Option<String>, b: &Option<String>) -> Ordering {
    let a = a.as_deref().map(str::to_lowercase);
    let b = b.as_deref().map(str::to_lowercase);
    a.cmp(&b)
}

/// Sort students in place. Ties keep their relative order.
pub fn sort_students(students: &mut [Student], column: StudentSortColumn, ascending: bool) {
    students.sort_by(|a, b| {
        let ord = column.compare(a, b);
        if ascending {
            ord
        } else {
            ord.reverse()
        }
    });
}
