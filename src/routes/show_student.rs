use crate::{
    data::student::{PageRequest, Student, StudentPage},
    error::RollcallResult,
    flash::FlashCategory,
    maud_conveniences::{optional_text, render_table, search_form, student_photo, title},
    routes::submission::parse_roll_number,
    state::RollcallState,
};
use axum::{
    extract::{Path, Query, State},
    response::Redirect,
};
use maud::{Markup, html};
use serde::Deserialize;
use tower_sessions::Session;

#[derive(Deserialize)]
pub struct PageQuery {
    pub page: Option<String>,
}

impl PageQuery {
    ///anything unparsable is the first page
    pub fn page_number(&self) -> i64 {
        self.page
            .as_deref()
            .and_then(|page| page.trim().parse().ok())
            .unwrap_or(1)
    }
}

fn student_to_row(student: Student) -> [Markup; 7] {
    let full_name = match (&student.first_name, &student.last_name) {
        (None, None) => None,
        (first, last) => Some(
            [first.as_deref(), last.as_deref()]
                .into_iter()
                .flatten()
                .collect::<Vec<_>>()
                .join(" "),
        ),
    };

    [
        html! { (student.roll_number) },
        optional_text(full_name.as_deref()),
        optional_text(student.email.as_deref()),
        optional_text(student.phone_number.as_deref()),
        optional_text(student.address.as_deref()),
        student_photo(student.student_pic.as_deref()),
        html! {
            div class="flex flex-row space-x-2" {
                a href={"/edit_student/" (student.roll_number)} class="bg-blue-600 hover:bg-blue-800 font-bold py-1 px-3 rounded" {"Edit"}
                a href={"/delete_student/" (student.roll_number)} class="bg-red-600 hover:bg-red-800 font-bold py-1 px-3 rounded" {"Delete"}
            }
        },
    ]
}

fn pagination(page: &StudentPage) -> Markup {
    let current = page.current_page;

    html! {
        div class="flex flex-row items-center justify-between p-4" {
            @if current > 1 {
                a href={"/show_student?page=" (current - 1)} class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Previous"}
            } @else {
                span {}
            }
            p class="text-gray-300" {"Page " (current) " of " (page.total_pages.max(1)) " (" (page.total_students) " students)"}
            @if current < page.total_pages {
                a href={"/show_student?page=" (current + 1)} class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Next"}
            } @else {
                span {}
            }
        }
    }
}

pub async fn get_show_student(
    State(state): State<RollcallState>,
    session: Session,
    Query(query): Query<PageQuery>,
) -> RollcallResult<Markup> {
    let request = PageRequest::new(query.page_number(), state.config().server_config().page_size);
    let page = Student::list_page(request, &mut *state.get_connection().await?).await?;

    let pagination = pagination(&page);
    let rows: Vec<_> = page.students.into_iter().map(student_to_row).collect();
    let is_empty = rows.is_empty();

    state
        .render_page(
            &session,
            html! {
                div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-5xl w-full flex flex-col space-y-4" {
                    (search_form())
                    (render_table(
                        title("Students"),
                        ["Roll Number", "Name", "Email", "Phone", "Address", "Photo", ""],
                        rows,
                    ))
                    @if is_empty {
                        p class="italic text-gray-400 text-center" {"No students on this page."}
                    }
                    (pagination)
                }
            },
        )
        .await
}

pub async fn get_delete_student(
    State(state): State<RollcallState>,
    session: Session,
    Path(roll_number): Path<String>,
) -> RollcallResult<Redirect> {
    let roll_number = parse_roll_number(&roll_number)?;

    if Student::delete_with_photo(roll_number, &state, state.uploads()).await? {
        state
            .flash(
                &session,
                FlashCategory::Success,
                format!("Deleted student #{roll_number}."),
            )
            .await?;
    }

    Ok(Redirect::to("/show_student"))
}
