use crate::{
    data::{DataType, student::Student},
    error::{RosterResult, StoreAction},
    maud_conveniences::render_table,
    state::RosterState,
};
use axum::extract::State;
use maud::{Markup, html};

pub async fn get_index_route(State(state): State<RosterState>) -> RosterResult<Markup> {
    let students = Student::get_all(&mut *state.get_connection(StoreAction::List).await?).await?;
    let rows: Vec<_> = students
        .into_iter()
        .map(|student| {
            [
                html! { (student.id_no) },
                html! { (student.last_name) },
                html! { (student.first_name) },
                html! { (student.course) },
                html! { "Year " (student.level) },
            ]
        })
        .collect();

    Ok(state.render(html! {
        div class="bg-gray-800 p-8 rounded shadow-md max-w-4xl w-full" {
            (render_table(
                "Student List",
                ["ID No.", "Last Name", "First Name", "Course", "Year Level"],
                rows,
                "No students registered yet.",
            ))
        }
    }))
}
