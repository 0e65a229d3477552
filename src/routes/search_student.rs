use crate::{
    data::student::Student,
    error::{RejectedFormSnafu, RollcallResult},
    maud_conveniences::{optional_text, search_form, student_photo, title},
    routes::submission::parse_roll_number,
    state::RollcallState,
};
use axum::{
    Form,
    extract::{State, rejection::FormRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use maud::{Markup, html};
use serde::Deserialize;
use snafu::ResultExt;
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct SearchForm {
    roll_number: String,
}

fn detail(label: &'static str, value: Option<&str>) -> Markup {
    html! {
        p class="text-gray-200 font-semibold" {
            (label) ": "
            span class="font-medium" {(optional_text(value))}
        }
    }
}

pub async fn post_search_student(
    State(state): State<RollcallState>,
    session: Session,
    form: Result<Form<SearchForm>, FormRejection>,
) -> RollcallResult<Response> {
    let Form(SearchForm { roll_number }) = form.context(RejectedFormSnafu)?;
    let roll_number = parse_roll_number(&roll_number)?;

    let found =
        Student::search_by_roll_number(roll_number, &mut *state.get_connection().await?).await?;
    let Some(student) = found else {
        debug!(?roll_number, "Searched for missing student");
        let page = state
            .render_page(
                &session,
                html! {
                    div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full flex flex-col space-y-4" {
                        (title("Not Found"))
                        p class="text-gray-300" {"No student found with roll number " (roll_number) "."}
                        (search_form())
                    }
                },
            )
            .await?;
        return Ok((StatusCode::NOT_FOUND, page).into_response());
    };

    let page = state
        .render_page(
            &session,
            html! {
                div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full flex flex-col space-y-4" {
                    (title(html! { "Student #" (student.roll_number) }))
                    (student_photo(student.student_pic.as_deref()))
                    div class="py-4" {
                        (detail("First Name", student.first_name.as_deref()))
                        (detail("Last Name", student.last_name.as_deref()))
                        (detail("Email", student.email.as_deref()))
                        (detail("Phone Number", student.phone_number.as_deref()))
                        (detail("Address", student.address.as_deref()))
                    }
                    div class="flex flex-row space-x-2" {
                        a href={"/edit_student/" (student.roll_number)} class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {"Edit"}
                        a href={"/delete_student/" (student.roll_number)} class="bg-red-600 hover:bg-red-800 font-bold py-2 px-4 rounded" {"Delete"}
                    }
                    (search_form())
                }
            },
        )
        .await?;

    Ok(page.into_response())
}
