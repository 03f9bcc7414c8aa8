use crate::{
    data::DataType,
    error::{
        DuplicateIdNoSnafu, MakeQuerySnafu, RosterError, RosterResult, StoreAction,
        StudentNotFoundSnafu,
    },
};
use serde::Serialize;
use snafu::{ResultExt, ensure};
use sqlx::{FromRow, SqliteConnection};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Student {
    #[serde(skip)]
    pub id: i64,
    pub id_no: String,
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub level: String,
}

#[derive(Debug, Clone)]
pub struct NewStudent {
    pub id_no: String,
    pub details: StudentDetails,
}

/// Everything about a student that an update may replace.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentDetails {
    pub first_name: String,
    pub last_name: String,
    pub course: String,
    pub level: String,
}

impl DataType for Student {
    type Id = String;
    type FormForAdding = NewStudent;
    type FormForUpdating = StudentDetails;

    async fn get_all(conn: &mut SqliteConnection) -> RosterResult<Vec<Self>> {
        sqlx::query_as::<_, Self>(
            "SELECT id, id_no, first_name, last_name, course, level FROM students ORDER BY last_name, first_name, id",
        )
        .fetch_all(conn)
        .await
        .context(MakeQuerySnafu {
            action: StoreAction::List,
        })
    }

    async fn insert_into_database(
        to_be_added: Self::FormForAdding,
        conn: &mut SqliteConnection,
    ) -> RosterResult<Self> {
        let NewStudent {
            id_no,
            details:
                StudentDetails {
                    first_name,
                    last_name,
                    course,
                    level,
                },
        } = to_be_added;

        //the UNIQUE constraint is the duplicate check, so it can't race a concurrent insert
        let result = sqlx::query(
            "INSERT INTO students (id_no, first_name, last_name, course, level) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(id_no.as_str())
        .bind(first_name.as_str())
        .bind(last_name.as_str())
        .bind(course.as_str())
        .bind(level.as_str())
        .execute(conn)
        .await;

        match result {
            Ok(done) => Ok(Self {
                id: done.last_insert_rowid(),
                id_no,
                first_name,
                last_name,
                course,
                level,
            }),
            Err(sqlx::Error::Database(e)) if e.is_unique_violation() => {
                DuplicateIdNoSnafu { id_no }.fail()
            }
            Err(source) => Err(RosterError::MakeQuery {
                source,
                action: StoreAction::Register,
            }),
        }
    }

    async fn update_in_database(
        id: Self::Id,
        replacement: Self::FormForUpdating,
        conn: &mut SqliteConnection,
    ) -> RosterResult<()> {
        let StudentDetails {
            first_name,
            last_name,
            course,
            level,
        } = replacement;

        let done = sqlx::query(
            "UPDATE students SET first_name = ?, last_name = ?, course = ?, level = ? WHERE id_no = ?",
        )
        .bind(first_name)
        .bind(last_name)
        .bind(course)
        .bind(level)
        .bind(id.as_str())
        .execute(conn)
        .await
        .context(MakeQuerySnafu {
            action: StoreAction::Update,
        })?;

        //sqlite counts matched rows, so rewriting identical values still reports 1
        ensure!(done.rows_affected() > 0, StudentNotFoundSnafu { id_no: id });
        Ok(())
    }

    async fn remove_from_database(id: Self::Id, conn: &mut SqliteConnection) -> RosterResult<()> {
        let done = sqlx::query("DELETE FROM students WHERE id_no = ?")
            .bind(id.as_str())
            .execute(conn)
            .await
            .context(MakeQuerySnafu {
                action: StoreAction::Delete,
            })?;

        ensure!(done.rows_affected() > 0, StudentNotFoundSnafu { id_no: id });
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::test_support::temp_state;

    fn details(first_name: &str, last_name: &str, course: &str, level: &str) -> StudentDetails {
        StudentDetails {
            first_name: first_name.into(),
            last_name: last_name.into(),
            course: course.into(),
            level: level.into(),
        }
    }

    fn new_student(id_no: &str, first_name: &str, last_name: &str) -> NewStudent {
        NewStudent {
            id_no: id_no.into(),
            details: details(first_name, last_name, "BSCS", "1"),
        }
    }

    #[tokio::test]
    async fn inserted_student_is_listed() {
        let (_dir, state) = temp_state().await;
        let mut conn = state.get_connection(StoreAction::List).await.unwrap();

        let stored = Student::insert_into_database(new_student("S1", "Ann", "Lee"), &mut conn)
            .await
            .unwrap();
        assert!(stored.id > 0);

        let all = Student::get_all(&mut conn).await.unwrap();
        assert_eq!(all, vec![stored]);
        assert_eq!(all[0].course, "BSCS");
        assert_eq!(all[0].level, "1");
    }

    #[tokio::test]
    async fn duplicate_id_no_leaves_existing_row_alone() {
        let (_dir, state) = temp_state().await;
        let mut conn = state.get_connection(StoreAction::List).await.unwrap();

        Student::insert_into_database(new_student("S1", "Ann", "Lee"), &mut conn)
            .await
            .unwrap();
        let err = Student::insert_into_database(new_student("S1", "Bob", "Kim"), &mut conn)
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::DuplicateIdNo { ref id_no } if id_no == "S1"));

        let all = Student::get_all(&mut conn).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].first_name, "Ann");
    }

    #[tokio::test]
    async fn concurrent_duplicate_inserts_have_one_winner() {
        let (_dir, state) = temp_state().await;

        let attempt = |first_name: &'static str| {
            let state = state.clone();
            async move {
                let mut conn = state.get_connection(StoreAction::Register).await.unwrap();
                Student::insert_into_database(new_student("S9", first_name, "Race"), &mut conn)
                    .await
            }
        };

        let (a, b) = tokio::join!(tokio::spawn(attempt("Ann")), tokio::spawn(attempt("Bob")));
        let results = [a.unwrap(), b.unwrap()];

        assert_eq!(results.iter().filter(|r| r.is_ok()).count(), 1);
        assert_eq!(
            results
                .iter()
                .filter(|r| matches!(r, Err(RosterError::DuplicateIdNo { .. })))
                .count(),
            1
        );

        let mut conn = state.get_connection(StoreAction::List).await.unwrap();
        assert_eq!(Student::get_all(&mut conn).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn listing_is_ordered_by_last_then_first_name() {
        let (_dir, state) = temp_state().await;
        let mut conn = state.get_connection(StoreAction::List).await.unwrap();

        for (id_no, first_name, last_name) in [
            ("S1", "Zed", "Lee"),
            ("S2", "Amy", "Park"),
            ("S3", "Ann", "Lee"),
            ("S4", "Bo", "Cruz"),
        ] {
            Student::insert_into_database(new_student(id_no, first_name, last_name), &mut conn)
                .await
                .unwrap();
        }

        let order: Vec<_> = Student::get_all(&mut conn)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.id_no)
            .collect();
        assert_eq!(order, ["S4", "S3", "S1", "S2"]);
    }

    #[tokio::test]
    async fn update_replaces_everything_but_the_id_no() {
        let (_dir, state) = temp_state().await;
        let mut conn = state.get_connection(StoreAction::List).await.unwrap();

        Student::insert_into_database(new_student("S1", "Ann", "Lee"), &mut conn)
            .await
            .unwrap();
        let replacement = details("Anne", "Leigh", "BSIT", "2");
        Student::update_in_database("S1".into(), replacement.clone(), &mut conn)
            .await
            .unwrap();
        //same values again must still succeed
        Student::update_in_database("S1".into(), replacement, &mut conn)
            .await
            .unwrap();

        let all = Student::get_all(&mut conn).await.unwrap();
        assert_eq!(all.len(), 1);
        assert_eq!(all[0].id_no, "S1");
        assert_eq!(all[0].first_name, "Anne");
        assert_eq!(all[0].last_name, "Leigh");
        assert_eq!(all[0].course, "BSIT");
        assert_eq!(all[0].level, "2");
    }

    #[tokio::test]
    async fn update_of_missing_student_is_not_found() {
        let (_dir, state) = temp_state().await;
        let mut conn = state.get_connection(StoreAction::List).await.unwrap();

        Student::insert_into_database(new_student("S1", "Ann", "Lee"), &mut conn)
            .await
            .unwrap();
        let err = Student::update_in_database("S2".into(), details("X", "Y", "BSIT", "3"), &mut conn)
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::StudentNotFound { .. }));

        let all = Student::get_all(&mut conn).await.unwrap();
        assert_eq!(all[0].first_name, "Ann");
        assert_eq!(all[0].course, "BSCS");
    }

    #[tokio::test]
    async fn delete_twice_is_not_found_the_second_time() {
        let (_dir, state) = temp_state().await;
        let mut conn = state.get_connection(StoreAction::List).await.unwrap();

        Student::insert_into_database(new_student("S1", "Ann", "Lee"), &mut conn)
            .await
            .unwrap();
        Student::remove_from_database("S1".into(), &mut conn)
            .await
            .unwrap();
        assert!(Student::get_all(&mut conn).await.unwrap().is_empty());

        let err = Student::remove_from_database("S1".into(), &mut conn)
            .await
            .unwrap_err();
        assert!(matches!(err, RosterError::StudentNotFound { ref id_no } if id_no == "S1"));
    }
}
