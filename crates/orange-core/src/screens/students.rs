use crate::api::ApiClient;
use crate::models::{sort_students, Student, StudentForm, StudentSortColumn, Students};

use super::ResourceScreen;

/// Student record table: the student list plus its sort order.
pub struct StudentRecordScreen {
    screen: ResourceScreen<Students>,
    pub sort_column: StudentSortColumn,
    pub sort_ascending: bool,
}

impl StudentRecordScreen {
    pub fn mount(api: ApiClient) -> Self {
        Self {
            screen: ResourceScreen::mount(api),
            sort_column: StudentSortColumn::Id,
            sort_ascending: true,
        }
    }

    pub fn screen(&self) -> &ResourceScreen<Students> {
        &self.screen
    }

    pub fn screen_mut(&mut self) -> &mut ResourceScreen<Students> {
        &mut self.screen
    }

    /// Toggle sort column - if already sorting by this column, flip direction;
    /// otherwise switch to this column with ascending=true.
    pub fn toggle_sort(&mut self, column: StudentSortColumn) {
        if self.sort_column == column {
            self.sort_ascending = !self.sort_ascending;
        } else {
            self.sort_column = column;
            self.sort_ascending = true;
        }
    }

    /// Students in the current sort order
    pub fn sorted(&self) -> Vec<Student> {
        let mut students = self.screen.records().to_vec();
        sort_students(&mut students, self.sort_column, self.sort_ascending);
        students
    }

    /// Register a new student or update an existing one
    pub fn register(&mut self, id: Option<i64>, form: StudentForm) {
        self.screen.save(id, form);
    }

    pub fn delete(&mut self, id: i64) {
        self.screen.delete(id);
    }

    pub fn refresh(&mut self) {
        self.screen.refresh();
    }

    pub async fn settle(&mut self) {
        self.screen.settle().await;
    }

    pub fn unmount(&mut self) {
        self.screen.unmount();
    }
}
