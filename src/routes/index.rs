use crate::{
    error::RollcallResult,
    maud_conveniences::{search_form, title},
    state::RollcallState,
};
use axum::extract::State;
use maud::{Markup, html};
use tower_sessions::Session;

pub async fn get_index_route(
    State(state): State<RollcallState>,
    session: Session,
) -> RollcallResult<Markup> {
    state
        .render_page(
            &session,
            html! {
                div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full" {
                    h1 class="text-2xl font-semibold mb-6 text-center" {
                        "Rollcall!"
                    }

                    div class="flex flex-row space-x-4 justify-center" {
                        a href="/home" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {
                            "Get Started"
                        }
                        a href="/show_student" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {
                            "View Students"
                        }
                    }
                }
            },
        )
        .await
}

pub async fn get_home(
    State(state): State<RollcallState>,
    session: Session,
) -> RollcallResult<Markup> {
    state
        .render_page(
            &session,
            html! {
                div class="bg-gray-800 p-8 rounded shadow-md max-w-md w-full flex flex-col space-y-6" {
                    (title("Student Records"))
                    p class="text-gray-300" {"Add new students, browse the list, or jump straight to a roll number."}

                    div class="flex flex-row space-x-4" {
                        a href="/add_student" class="bg-blue-600 hover:bg-blue-800 font-bold py-2 px-4 rounded" {
                            "Add Student"
                        }
                        a href="/show_student" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {
                            "Show Students"
                        }
                    }

                    (search_form())
                }
            },
        )
        .await
}
