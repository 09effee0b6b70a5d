use sqlx::PgPool;
use uuid::Uuid;

use crate::dto::roster::{ClassDetail, CreateClassRequest, CreateGradeRequest, CreateStudentRequest, RosterFilter};
use crate::error::{Rejection, Resource, Result};
use crate::models::{Class, Grade, Student};
use crate::repository::roster::RosterRepository;

/// Deletes never cascade: a parent with `count` dependents stays put.
pub fn ensure_unreferenced(resource: Resource, count: i64) -> Result<()> {
    if count > 0 {
        return Err(Rejection::ReferenceExists { resource, count }.into());
    }
    Ok(())
}

pub async fn create_grade(pool: &PgPool, req: &CreateGradeRequest) -> Result<Grade> {
    let mut conn = pool.acquire().await?;
    let grade = RosterRepository::new(&mut *conn).create_grade(req).await?;

    tracing::info!(grade_id = %grade.grade_id, name = %grade.name, "Grade created");

    Ok(grade)
}

pub async fn list_grades(pool: &PgPool) -> Result<Vec<Grade>> {
    let mut conn = pool.acquire().await?;
    RosterRepository::new(&mut *conn).list_grades().await
}

pub async fn delete_grade(pool: &PgPool, grade_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut roster = RosterRepository::new(&mut *tx);

    roster.find_grade(grade_id).await?;
    ensure_unreferenced(Resource::Class, roster.count_classes_in_grade(grade_id).await?)?;
    roster.delete_grade(grade_id).await?;

    tx.commit().await?;

    tracing::info!(%grade_id, "Grade deleted");

    Ok(())
}

pub async fn create_class(pool: &PgPool, req: &CreateClassRequest) -> Result<Class> {
    let mut tx = pool.begin().await?;
    let mut roster = RosterRepository::new(&mut *tx);

    roster.find_grade(req.grade_id).await?;
    let class = roster.create_class(req).await?;

    tx.commit().await?;

    tracing::info!(class_id = %class.class_id, name = %class.name, "Class created");

    Ok(class)
}

pub async fn list_classes(pool: &PgPool, grade_id: Option<Uuid>) -> Result<Vec<ClassDetail>> {
    let mut conn = pool.acquire().await?;
    RosterRepository::new(&mut *conn).list_classes(grade_id).await
}

pub async fn delete_class(pool: &PgPool, class_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut roster = RosterRepository::new(&mut *tx);

    roster.find_class(class_id).await?;
    ensure_unreferenced(Resource::Student, roster.count_students_in_class(class_id).await?)?;
    roster.delete_class(class_id).await?;

    tx.commit().await?;

    tracing::info!(%class_id, "Class deleted");

    Ok(())
}

pub async fn create_student(pool: &PgPool, req: &CreateStudentRequest) -> Result<Student> {
    let mut tx = pool.begin().await?;
    let mut roster = RosterRepository::new(&mut *tx);

    roster.find_class(req.class_id).await?;
    let student = roster.create_student(req).await?;

    tx.commit().await?;

    tracing::info!(
        student_id = %student.student_id,
        student_no = %student.student_no,
        "Student created"
    );

    Ok(student)
}

pub async fn list_students(pool: &PgPool, filter: &RosterFilter) -> Result<Vec<Student>> {
    let mut conn = pool.acquire().await?;
    RosterRepository::new(&mut *conn).list_students(filter).await
}

pub async fn get_student(pool: &PgPool, student_id: Uuid) -> Result<Student> {
    let mut conn = pool.acquire().await?;
    RosterRepository::new(&mut *conn).find_student(student_id).await
}

pub async fn delete_student(pool: &PgPool, student_id: Uuid) -> Result<()> {
    let mut tx = pool.begin().await?;
    let mut roster = RosterRepository::new(&mut *tx);

    roster.find_student(student_id).await?;
    ensure_unreferenced(
        Resource::Registration,
        roster.count_registrations_for_student(student_id).await?,
    )?;
    roster.delete_student(student_id).await?;

    tx.commit().await?;

    tracing::info!(%student_id, "Student deleted");

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unreferenced_parent_may_be_deleted() {
        assert!(ensure_unreferenced(Resource::Class, 0).is_ok());
    }

    #[test]
    fn test_referenced_parent_reports_dependents() {
        let error = ensure_unreferenced(Resource::Registration, 2).unwrap_err();

        match error.rejection() {
            Some(Rejection::ReferenceExists { resource, count }) => {
                assert_eq!(*resource, Resource::Registration);
                assert_eq!(*count, 2);
            }
            other => panic!("unexpected rejection: {other:?}"),
        }
    }
}
