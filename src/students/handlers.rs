use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    routing::get,
    Form, Router,
};
use serde::Deserialize;
use tracing::{error, info, instrument, warn};

use crate::state::AppState;
use crate::students::forms::{
    self, DeleteForm, ProfileForm, RegisterForm, UpdateForm,
};
use crate::students::repo::{NewStudent, StoreError, Student, StudentChanges};
use crate::students::views;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/", get(index))
        .route("/student/", get(profile_form).post(profile_submit))
        .route("/student/add", get(register_form).post(register_submit))
        .route("/update/:id", get(update_form).post(update_submit))
        .route("/delete/:id", get(delete_form).post(delete_submit))
        .route("/student/list", get(list_students))
}

const GENERIC_FAILURE: &str = "Error: something went wrong and the change was not saved.";

/// Carries the failure signal across the redirect issued after an
/// unhandled store error; there is no session layer to flash through.
#[derive(Debug, Default, Deserialize)]
struct FlashQuery {
    #[serde(default)]
    error: Option<String>,
}

fn flash_messages(query: &FlashQuery) -> Vec<String> {
    if query.error.is_some() {
        vec![GENERIC_FAILURE.to_string()]
    } else {
        Vec::new()
    }
}

fn not_found() -> Response {
    (StatusCode::NOT_FOUND, Html(views::not_found_page())).into_response()
}

fn store_failure(context: &'static str, err: StoreError) -> Response {
    error!(error = %err, context, "store operation failed");
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Html(views::server_error_page()),
    )
        .into_response()
}

fn form_from(student: &Student) -> UpdateForm {
    UpdateForm {
        name: student.name.clone(),
        email: student.email.clone(),
        address: student.address.clone(),
        course: student.course.clone(),
    }
}

async fn index() -> Html<String> {
    Html(views::index_page())
}

async fn profile_form() -> Html<String> {
    Html(views::profile_page(&ProfileForm::default(), None, &[]))
}

/// Acknowledges the submitted name without querying the store. The
/// original behaves this way on purpose, so the echo is preserved.
#[instrument(skip(form))]
async fn profile_submit(Form(form): Form<ProfileForm>) -> Html<String> {
    match forms::validate_profile_lookup(&form) {
        Ok(name) => Html(views::profile_page(&form, Some(&name), &[])),
        Err(errors) => Html(views::profile_page(&form, None, &errors)),
    }
}

#[instrument(skip(state))]
async fn register_form(State(state): State<AppState>, Query(query): Query<FlashQuery>) -> Response {
    match Student::list_all(&state.db).await {
        Ok(students) => Html(views::register_page(
            &RegisterForm::default(),
            &[],
            &flash_messages(&query),
            &students,
        ))
        .into_response(),
        Err(e) => store_failure("register_form list", e),
    }
}

#[instrument(skip(state, form))]
async fn register_submit(
    State(state): State<AppState>,
    Form(form): Form<RegisterForm>,
) -> Response {
    let registration = match forms::validate_register(&form) {
        Ok(r) => r,
        Err(errors) => {
            warn!(error_count = errors.len(), "register form invalid");
            return match Student::list_all(&state.db).await {
                Ok(students) => {
                    Html(views::register_page(&form, &errors, &[], &students)).into_response()
                }
                Err(e) => store_failure("register_submit list", e),
            };
        }
    };

    match Student::create(
        &state.db,
        NewStudent {
            name: &registration.name,
            email: &registration.email,
            address: &registration.address,
            course: registration.course,
            password: &registration.password,
        },
    )
    .await
    {
        Ok(student) => {
            info!(student_id = student.id, name = %student.name, "student registered");
            let message = format!("Student named {} added to the table.", student.name);
            match Student::list_all(&state.db).await {
                Ok(students) => Html(views::register_page(
                    &RegisterForm::default(),
                    &[],
                    &[message],
                    &students,
                ))
                .into_response(),
                Err(e) => store_failure("register_submit list", e),
            }
        }
        Err(StoreError::Conflict) => {
            warn!(email = %registration.email, "email already registered");
            let message = "Error: A student with that email address already exists.".to_string();
            match Student::list_all(&state.db).await {
                Ok(students) => {
                    Html(views::register_page(&form, &[], &[message], &students)).into_response()
                }
                Err(e) => store_failure("register_submit list", e),
            }
        }
        Err(e) => {
            error!(error = %e, "create student failed");
            Redirect::to("/student/add?error=1").into_response()
        }
    }
}

#[instrument(skip(state))]
async fn update_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FlashQuery>,
) -> Response {
    match Student::get_by_id(&state.db, id).await {
        Ok(student) => Html(views::update_page(
            id,
            &form_from(&student),
            &[],
            &flash_messages(&query),
        ))
        .into_response(),
        Err(StoreError::NotFound) => not_found(),
        Err(e) => store_failure("update_form get", e),
    }
}

#[instrument(skip(state, form))]
async fn update_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<UpdateForm>,
) -> Response {
    // The record must exist before any validation feedback is shown.
    match Student::get_by_id(&state.db, id).await {
        Ok(_) => {}
        Err(StoreError::NotFound) => return not_found(),
        Err(e) => return store_failure("update_submit get", e),
    }

    let changes = match forms::validate_update(&form) {
        Ok(c) => c,
        Err(errors) => {
            warn!(student_id = id, error_count = errors.len(), "update form invalid");
            return Html(views::update_page(id, &form, &errors, &[])).into_response();
        }
    };

    match Student::update(
        &state.db,
        id,
        StudentChanges {
            name: &changes.name,
            email: &changes.email,
            address: &changes.address,
            course: changes.course,
        },
    )
    .await
    {
        Ok(student) => {
            info!(student_id = student.id, "student updated");
            Redirect::to("/student/list").into_response()
        }
        Err(StoreError::Conflict) => {
            warn!(student_id = id, email = %changes.email, "update email conflict");
            let message = "Error: A student with that email address already exists.".to_string();
            Html(views::update_page(id, &form, &[], &[message])).into_response()
        }
        Err(StoreError::NotFound) => not_found(),
        Err(e) => {
            error!(error = %e, student_id = id, "update student failed");
            Redirect::to(&format!("/update/{id}?error=1")).into_response()
        }
    }
}

#[instrument(skip(state))]
async fn delete_form(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<FlashQuery>,
) -> Response {
    match Student::get_by_id(&state.db, id).await {
        Ok(student) => {
            Html(views::delete_page(&student, &flash_messages(&query))).into_response()
        }
        Err(StoreError::NotFound) => not_found(),
        Err(e) => store_failure("delete_form get", e),
    }
}

#[instrument(skip(state, form))]
async fn delete_submit(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Form(form): Form<DeleteForm>,
) -> Response {
    let student = match Student::get_by_id(&state.db, id).await {
        Ok(s) => s,
        Err(StoreError::NotFound) => return not_found(),
        Err(e) => return store_failure("delete_submit get", e),
    };

    if !forms::is_delete_confirmed(&form) {
        warn!(student_id = id, "delete submitted without confirmation");
        let message = "Confirm the deletion to remove this student.".to_string();
        return Html(views::delete_page(&student, &[message])).into_response();
    }

    match Student::delete(&state.db, id).await {
        Ok(()) => {
            info!(student_id = id, name = %student.name, "student removed");
            Redirect::to("/student/list").into_response()
        }
        Err(StoreError::NotFound) => not_found(),
        Err(e) => {
            // Single attempt per request; send the user back to the
            // confirmation view rather than retrying.
            error!(error = %e, student_id = id, "delete student failed");
            Redirect::to(&format!("/delete/{id}?error=1")).into_response()
        }
    }
}

#[instrument(skip(state))]
async fn list_students(State(state): State<AppState>) -> Response {
    match Student::list_all(&state.db).await {
        Ok(students) => Html(views::list_page(&students)).into_response(),
        Err(e) => store_failure("list_students", e),
    }
}

pub async fn fallback() -> Response {
    not_found()
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::OffsetDateTime;

    #[test]
    fn update_form_prefills_from_the_stored_record() {
        let student = Student {
            id: 4,
            name: "Ada Lovelace".into(),
            email: "Ada@x.com".into(),
            address: "10 Street".into(),
            course: "Python".into(),
            password_hash: "$argon2id$fake".into(),
            created_at: OffsetDateTime::UNIX_EPOCH,
        };
        let form = form_from(&student);
        assert_eq!(form.name, "Ada Lovelace");
        assert_eq!(form.email, "Ada@x.com");
        assert_eq!(form.address, "10 Street");
        assert_eq!(form.course, "Python");
    }

    #[test]
    fn error_flag_maps_to_the_generic_failure_message() {
        let flagged = FlashQuery {
            error: Some("1".into()),
        };
        assert_eq!(flash_messages(&flagged), vec![GENERIC_FAILURE.to_string()]);
        assert!(flash_messages(&FlashQuery::default()).is_empty());
    }
}
