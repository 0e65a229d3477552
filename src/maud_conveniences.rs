use crate::flash::{FlashCategory, FlashMessage};
use maud::{Markup, Render, html};

pub fn render_nav() -> Markup {
    html! {
        nav class="w-full bg-gray-800 shadow-md px-8 py-4 flex flex-row space-x-6" {
            a href="/" class="font-bold text-lg" {"Rollcall"}
            a href="/home" class="hover:text-blue-300" {"Home"}
            a href="/add_student" class="hover:text-blue-300" {"Add Student"}
            a href="/show_student" class="hover:text-blue-300" {"Show Students"}
        }
    }
}

pub fn render_flashes(flashes: &[FlashMessage]) -> Markup {
    html! {
        @for flash in flashes {
            @match flash.category {
                FlashCategory::Success => {
                    div class="bg-green-100 border border-green-400 text-green-700 px-4 py-3 rounded relative max-w-md w-full" role="status" {
                        span {(flash.message)}
                    }
                },
            }
        }
    }
}

pub fn render_table<const N: usize>(
    overall_title: impl Render,
    titles: [&'static str; N],
    items: Vec<[Markup; N]>,
) -> Markup {
    html! {
        div class="container mx-auto" {
            (overall_title)
            div class="overflow-x-auto" {
                table class="min-w-full bg-gray-800 rounded shadow-md" {
                    thead class="bg-gray-700" {
                        tr {
                            @for title in titles {
                                th class="py-2 px-4 text-left font-semibold text-gray-300" {(title)}
                            }
                        }
                    }
                    tbody {
                        @for row in items {
                            tr {
                                @for col in row {
                                    td class="py-2 px-4 border-b border-gray-600 text-gray-200" {(col)}
                                }
                            }
                        }
                    }
                }
            }
        }
    }
}

pub fn title(s: impl Render) -> Markup {
    html! {
        h1 class="text-2xl font-semibold mb-4" {(s)}
    }
}

pub fn form_element(id: &'static str, label: &'static str, element: Markup) -> Markup {
    html! {
        div class="mb-4" {
            label for=(id) class="block text-sm font-bold mb-2 text-gray-300" {(label)}
            (element)
        }
    }
}

pub fn simple_form_element(
    id: &'static str,
    label: &'static str,
    required: bool,
    input_type: Option<&'static str>,
    value: Option<&str>,
) -> Markup {
    form_element(
        id,
        label,
        html! {
            input required[required] type=(input_type.unwrap_or("text")) id=(id) name=(id) value=[value] class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
        },
    )
}

pub fn file_form_element(id: &'static str, label: &'static str) -> Markup {
    form_element(
        id,
        label,
        html! {
            input type="file" accept="image/*" id=(id) name=(id) class="block w-full text-sm text-gray-300 file:mr-4 file:py-2 file:px-4 file:rounded file:border-0 file:text-sm file:font-semibold file:bg-violet-50 file:text-violet-700 hover:file:bg-violet-100" {}
        },
    )
}

pub fn form_submit_button(text: Option<&'static str>) -> Markup {
    html! {
        div class="flex items-center justify-between" {
            button type="submit" class="bg-blue-500 hover:bg-blue-700 font-bold py-2 px-4 rounded focus:outline-none focus:shadow-outline" {
                (text.unwrap_or("Submit"))
            }
        }
    }
}

/// Either the value or a greyed-out dash.
pub fn optional_text(value: Option<&str>) -> Markup {
    html! {
        @if let Some(value) = value {
            (value)
        } @else {
            span class="italic text-gray-500" {"-"}
        }
    }
}

pub fn student_photo(student_pic: Option<&str>) -> Markup {
    html! {
        @if let Some(student_pic) = student_pic {
            img src={"/uploads/" (student_pic)} alt="Student photo" class="h-16 w-16 object-cover rounded" {}
        } @else {
            span class="italic text-gray-500" {"No photo"}
        }
    }
}

pub fn search_form() -> Markup {
    html! {
        form method="post" action="/search_student" class="flex flex-row space-x-2" {
            input type="number" name="roll_number" required placeholder="Search by roll number..." class="shadow appearance-none border rounded w-full py-2 px-3 leading-tight focus:outline-none focus:shadow-outline bg-gray-700 border-gray-600" {}
            button type="submit" class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Search"}
        }
    }
}
