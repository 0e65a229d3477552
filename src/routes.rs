pub mod add_student;
pub mod edit_student;
pub mod index;
pub mod search_student;
pub mod show_student;
pub mod submission;
