use crate::{
    data::student::Student,
    error::{MissingStudentSnafu, RollcallError, RollcallResult},
    flash::FlashCategory,
    maud_conveniences::{form_submit_button, student_photo, title},
    routes::{
        add_student::student_fields_form,
        submission::{StudentSubmission, parse_roll_number},
    },
    state::RollcallState,
};
use axum::{
    extract::{Path, State},
    response::Redirect,
};
use maud::{Markup, html};
use tower_sessions::Session;

pub async fn get_edit_student(
    State(state): State<RollcallState>,
    session: Session,
    Path(roll_number): Path<String>,
) -> RollcallResult<Markup> {
    let roll_number = parse_roll_number(&roll_number)?;

    let found =
        Student::get_by_roll_number(roll_number, &mut *state.get_connection().await?).await?;
    let Some(student) = found else {
        return Err(RollcallError::MissingStudent { roll_number });
    };

    state
        .render_page(
            &session,
            html! {
                div class="bg-gray-800 shadow-md rounded px-8 pt-6 pb-8 mb-4 w-full max-w-md" {
                    (title(html! { "Edit Student #" (student.roll_number) }))

                    div class="mb-4 flex flex-row items-center space-x-4" {
                        (student_photo(student.student_pic.as_deref()))
                        p class="text-sm text-gray-400" {"Choose a new photo below to replace this one."}
                    }

                    form method="post" action={"/update_student/" (student.roll_number)} enctype="multipart/form-data" {
                        (student_fields_form(Some(&student)))
                        (form_submit_button(Some("Update Student")))
                    }
                }
            },
        )
        .await
}

pub async fn post_update_student(
    State(state): State<RollcallState>,
    session: Session,
    Path(roll_number): Path<String>,
    submission: StudentSubmission,
) -> RollcallResult<Redirect> {
    let roll_number = parse_roll_number(&roll_number)?;

    let found = Student::update_with_photo(
        roll_number,
        submission.fields,
        submission.photo,
        &state,
        state.uploads(),
    )
    .await?;
    snafu::ensure!(found, MissingStudentSnafu { roll_number });

    state
        .flash(
            &session,
            FlashCategory::Success,
            format!("Updated student #{roll_number}."),
        )
        .await?;

    Ok(Redirect::to("/show_student"))
}
