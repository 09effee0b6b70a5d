use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use storage::{
    Database,
    dto::roster::{ClassDetail, CreateClassRequest, CreateGradeRequest, CreateStudentRequest, RosterFilter},
    models::{Class, Grade, Student},
    services::roster,
};
use uuid::Uuid;
use validator::Validate;

use crate::error::WebError;

#[utoipa::path(
    get,
    path = "/api/grades",
    responses(
        (status = 200, description = "All grades", body = Vec<Grade>)
    ),
    tag = "roster"
)]
pub async fn list_grades(State(db): State<Database>) -> Result<Response, WebError> {
    let grades = roster::list_grades(db.pool()).await?;

    Ok(Json(grades).into_response())
}

#[utoipa::path(
    post,
    path = "/api/grades",
    request_body = CreateGradeRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Grade created", body = Grade),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 409, description = "Grade name already exists")
    ),
    tag = "roster"
)]
pub async fn create_grade(
    State(db): State<Database>,
    Json(req): Json<CreateGradeRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let grade = roster::create_grade(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(grade)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/grades/{id}",
    params(
        ("id" = Uuid, Path, description = "Grade id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Grade deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Grade not found"),
        (status = 409, description = "Classes still belong to this grade")
    ),
    tag = "roster"
)]
pub async fn delete_grade(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    roster::delete_grade(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/classes",
    params(RosterFilter),
    responses(
        (status = 200, description = "Classes, optionally for one grade", body = Vec<ClassDetail>)
    ),
    tag = "roster"
)]
pub async fn list_classes(
    State(db): State<Database>,
    Query(filter): Query<RosterFilter>,
) -> Result<Response, WebError> {
    let classes = roster::list_classes(db.pool(), filter.grade_id).await?;

    Ok(Json(classes).into_response())
}

#[utoipa::path(
    post,
    path = "/api/classes",
    request_body = CreateClassRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Class created", body = Class),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Grade not found"),
        (status = 409, description = "Class name already exists in this grade")
    ),
    tag = "roster"
)]
pub async fn create_class(
    State(db): State<Database>,
    Json(req): Json<CreateClassRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let class = roster::create_class(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(class)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/classes/{id}",
    params(
        ("id" = Uuid, Path, description = "Class id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Class deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Students still belong to this class")
    ),
    tag = "roster"
)]
pub async fn delete_class(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    roster::delete_class(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}

#[utoipa::path(
    get,
    path = "/api/students",
    params(RosterFilter),
    responses(
        (status = 200, description = "Students by student number", body = Vec<Student>)
    ),
    tag = "roster"
)]
pub async fn list_students(
    State(db): State<Database>,
    Query(filter): Query<RosterFilter>,
) -> Result<Response, WebError> {
    let students = roster::list_students(db.pool(), &filter).await?;

    Ok(Json(students).into_response())
}

#[utoipa::path(
    get,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student id")
    ),
    responses(
        (status = 200, description = "Student found", body = Student),
        (status = 404, description = "Student not found")
    ),
    tag = "roster"
)]
pub async fn get_student(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    let student = roster::get_student(db.pool(), id).await?;

    Ok(Json(student).into_response())
}

#[utoipa::path(
    post,
    path = "/api/students",
    request_body = CreateStudentRequest,
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 201, description = "Student created", body = Student),
        (status = 400, description = "Validation error"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Class not found"),
        (status = 409, description = "Student number already exists")
    ),
    tag = "roster"
)]
pub async fn create_student(
    State(db): State<Database>,
    Json(req): Json<CreateStudentRequest>,
) -> Result<Response, WebError> {
    req.validate()?;

    let student = roster::create_student(db.pool(), &req).await?;

    Ok((StatusCode::CREATED, Json(student)).into_response())
}

#[utoipa::path(
    delete,
    path = "/api/students/{id}",
    params(
        ("id" = Uuid, Path, description = "Student id")
    ),
    security(
        ("bearer_auth" = [])
    ),
    responses(
        (status = 204, description = "Student deleted"),
        (status = 401, description = "Unauthorized"),
        (status = 404, description = "Student not found"),
        (status = 409, description = "Student still has registrations")
    ),
    tag = "roster"
)]
pub async fn delete_student(
    State(db): State<Database>,
    Path(id): Path<Uuid>,
) -> Result<Response, WebError> {
    roster::delete_student(db.pool(), id).await?;

    Ok(StatusCode::NO_CONTENT.into_response())
}
