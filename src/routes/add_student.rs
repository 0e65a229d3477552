use crate::{
    data::student::{NewStudent, Student},
    error::RollcallResult,
    flash::FlashCategory,
    maud_conveniences::{file_form_element, form_submit_button, simple_form_element, title},
    routes::submission::{IMAGE_FIELD, StudentSubmission},
    state::RollcallState,
};
use axum::{extract::State, response::Redirect};
use maud::{Markup, html};
use tower_sessions::Session;

/// The inputs shared by the add and edit forms, prefilled from `student` when editing.
pub fn student_fields_form(student: Option<&Student>) -> Markup {
    let value = |get: fn(&Student) -> Option<&String>| student.and_then(get).map(String::as_str);

    html! {
        (simple_form_element("first_name", "First Name", false, None, value(|s| s.first_name.as_ref())))
        (simple_form_element("last_name", "Last Name", false, None, value(|s| s.last_name.as_ref())))
        (simple_form_element("email", "Email", false, Some("email"), value(|s| s.email.as_ref())))
        (simple_form_element("phone_number", "Phone Number", false, Some("tel"), value(|s| s.phone_number.as_ref())))
        (simple_form_element("address", "Address", false, None, value(|s| s.address.as_ref())))
        (file_form_element(IMAGE_FIELD, "Photo (optional)"))
    }
}

pub async fn get_add_student(
    State(state): State<RollcallState>,
    session: Session,
) -> RollcallResult<Markup> {
    state
        .render_page(
            &session,
            html! {
                div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-md" {
                    (title("Add Student"))

                    form method="post" action="/add_student" enctype="multipart/form-data" {
                        (simple_form_element("roll_number", "Roll Number (leave blank to auto-assign)", false, Some("number"), None))
                        (student_fields_form(None))
                        (form_submit_button(Some("Add Student")))
                    }
                }
            },
        )
        .await
}

pub async fn post_add_student(
    State(state): State<RollcallState>,
    session: Session,
    submission: StudentSubmission,
) -> RollcallResult<Redirect> {
    let new_student = NewStudent {
        roll_number: submission.roll_number()?,
        fields: submission.fields,
    };

    let roll_number =
        Student::create_with_photo(new_student, submission.photo, &state, state.uploads())
            .await?;

    state
        .flash(
            &session,
            FlashCategory::Success,
            format!("Successfully added student #{roll_number} to the database."),
        )
        .await?;

    Ok(Redirect::to("/add_student"))
}
