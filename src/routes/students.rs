use crate::{
    data::{
        DataType,
        student::{NewStudent, Student, StudentDetails},
    },
    error::{
        MalformedBodySnafu, MethodNotAllowedSnafu, MissingFieldsSnafu, RosterError, RosterResult,
        StoreAction, UnknownRouteSnafu,
    },
    state::RosterState,
};
use axum::{
    Json,
    extract::{Path, State, rejection::JsonRejection},
    http::{Method, StatusCode, Uri},
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use snafu::{ResultExt, ensure};

/// Body of a registration request. Every field is optional here so that absence can be
/// reported as a validation failure rather than a deserialisation one.
#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct RegisterStudentBody {
    student_id: Option<Value>,
    first_name: Option<Value>,
    last_name: Option<Value>,
    course: Option<Value>,
    year_level: Option<Value>,
}

#[derive(Deserialize, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStudentBody {
    first_name: Option<Value>,
    last_name: Option<Value>,
    course: Option<Value>,
    year_level: Option<Value>,
}

/// Collects required fields, remembering which ones were absent or empty.
struct RequiredFields {
    action: StoreAction,
    missing: Vec<&'static str>,
}

impl RequiredFields {
    const fn new(action: StoreAction) -> Self {
        Self {
            action,
            missing: Vec::new(),
        }
    }

    fn take(&mut self, name: &'static str, value: Option<Value>) -> String {
        match value.and_then(field_text) {
            Some(text) => text,
            None => {
                self.missing.push(name);
                String::new()
            }
        }
    }

    fn finish(self) -> RosterResult<()> {
        ensure!(
            self.missing.is_empty(),
            MissingFieldsSnafu {
                action: self.action,
                missing: self.missing,
            }
        );
        Ok(())
    }
}

//numbers come through from the year level select, so they're as good as strings, but a zero
//counts as unset the same way an empty string does
fn field_text(value: Value) -> Option<String> {
    match value {
        Value::String(text) if !text.is_empty() => Some(text),
        Value::Number(number) if number.as_f64() != Some(0.0) => Some(number.to_string()),
        _ => None,
    }
}

impl TryFrom<RegisterStudentBody> for NewStudent {
    type Error = RosterError;

    fn try_from(body: RegisterStudentBody) -> Result<Self, Self::Error> {
        let mut fields = RequiredFields::new(StoreAction::Register);
        let id_no = fields.take("studentId", body.student_id);
        let first_name = fields.take("firstName", body.first_name);
        let last_name = fields.take("lastName", body.last_name);
        let course = fields.take("course", body.course);
        let level = fields.take("yearLevel", body.year_level);
        fields.finish()?;

        Ok(Self {
            id_no,
            details: StudentDetails {
                first_name,
                last_name,
                course,
                level,
            },
        })
    }
}

impl TryFrom<UpdateStudentBody> for StudentDetails {
    type Error = RosterError;

    fn try_from(body: UpdateStudentBody) -> Result<Self, Self::Error> {
        let mut fields = RequiredFields::new(StoreAction::Update);
        let first_name = fields.take("firstName", body.first_name);
        let last_name = fields.take("lastName", body.last_name);
        let course = fields.take("course", body.course);
        let level = fields.take("yearLevel", body.year_level);
        fields.finish()?;

        Ok(Self {
            first_name,
            last_name,
            course,
            level,
        })
    }
}

#[derive(Serialize)]
pub struct StudentList {
    success: bool,
    students: Vec<Student>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisteredSummary {
    id: i64,
    student_id: String,
    last_name: String,
}

#[derive(Serialize)]
pub struct Registered {
    success: bool,
    message: &'static str,
    data: RegisteredSummary,
}

#[derive(Serialize)]
pub struct Confirmation {
    success: bool,
    message: &'static str,
}

impl Confirmation {
    const fn new(message: &'static str) -> Self {
        Self {
            success: true,
            message,
        }
    }
}

pub async fn get_students(State(state): State<RosterState>) -> RosterResult<Json<StudentList>> {
    let students = Student::get_all(&mut *state.get_connection(StoreAction::List).await?).await?;

    Ok(Json(StudentList {
        success: true,
        students,
    }))
}

pub async fn post_student(
    State(state): State<RosterState>,
    body: Result<Json<RegisterStudentBody>, JsonRejection>,
) -> RosterResult<(StatusCode, Json<Registered>)> {
    let Json(body) = body.context(MalformedBodySnafu)?;
    let new_student = NewStudent::try_from(body)?;

    let stored = Student::insert_into_database(
        new_student,
        &mut *state.get_connection(StoreAction::Register).await?,
    )
    .await?;
    info!(id_no = %stored.id_no, id = stored.id, "Registered student");

    Ok((
        StatusCode::CREATED,
        Json(Registered {
            success: true,
            message: "Student registered successfully!",
            data: RegisteredSummary {
                id: stored.id,
                student_id: stored.id_no,
                last_name: stored.last_name,
            },
        }),
    ))
}

pub async fn put_student(
    State(state): State<RosterState>,
    Path(id_no): Path<String>,
    body: Result<Json<UpdateStudentBody>, JsonRejection>,
) -> RosterResult<Json<Confirmation>> {
    let Json(body) = body.context(MalformedBodySnafu)?;
    let replacement = StudentDetails::try_from(body)?;

    Student::update_in_database(
        id_no.clone(),
        replacement,
        &mut *state.get_connection(StoreAction::Update).await?,
    )
    .await?;
    info!(%id_no, "Updated student");

    Ok(Json(Confirmation::new("Student updated successfully!")))
}

pub async fn delete_student(
    State(state): State<RosterState>,
    Path(id_no): Path<String>,
) -> RosterResult<Json<Confirmation>> {
    Student::remove_from_database(
        id_no.clone(),
        &mut *state.get_connection(StoreAction::Delete).await?,
    )
    .await?;
    info!(%id_no, "Deleted student");

    Ok(Json(Confirmation::new("Student deleted successfully!")))
}

pub async fn api_fallback(uri: Uri) -> RosterError {
    UnknownRouteSnafu {
        path: uri.path().to_string(),
    }
    .build()
}

pub async fn api_method_not_allowed(method: Method, uri: Uri) -> RosterError {
    MethodNotAllowedSnafu {
        method,
        path: uri.path().to_string(),
    }
    .build()
}
