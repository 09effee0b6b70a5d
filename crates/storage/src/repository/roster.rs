use sqlx::{FromRow, PgConnection, QueryBuilder};
use uuid::Uuid;

use crate::dto::roster::{
    ClassDetail, CreateClassRequest, CreateGradeRequest, CreateStudentRequest, RosterFilter,
};
use crate::error::{Resource, Result, StorageError};
use crate::models::{Class, Gender, Grade, Student};

/// Student together with the class and grade the entry rules look at.
#[derive(Debug, Clone, FromRow)]
pub struct EnrolledStudent {
    pub student_id: Uuid,
    pub student_no: String,
    pub gender: Gender,
    pub class_id: Uuid,
    pub grade_id: Uuid,
}

const STUDENT_COLUMNS: &str = "student_id, class_id, student_no, name, gender, created_at";

pub struct RosterRepository<'a> {
    conn: &'a mut PgConnection,
}

impl<'a> RosterRepository<'a> {
    pub fn new(conn: &'a mut PgConnection) -> Self {
        Self { conn }
    }

    pub async fn create_grade(&mut self, req: &CreateGradeRequest) -> Result<Grade> {
        sqlx::query_as::<_, Grade>(
            r#"
            INSERT INTO grades (name, sort_order)
            VALUES ($1, $2)
            RETURNING grade_id, name, sort_order, created_at
            "#,
        )
        .bind(&req.name)
        .bind(req.sort_order)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| unique_to_conflict(e, "Grade name already exists"))
    }

    pub async fn list_grades(&mut self) -> Result<Vec<Grade>> {
        let grades = sqlx::query_as::<_, Grade>(
            r#"
            SELECT grade_id, name, sort_order, created_at
            FROM grades
            ORDER BY sort_order, name
            "#,
        )
        .fetch_all(&mut *self.conn)
        .await?;

        Ok(grades)
    }

    pub async fn find_grade(&mut self, grade_id: Uuid) -> Result<Grade> {
        sqlx::query_as::<_, Grade>(
            "SELECT grade_id, name, sort_order, created_at FROM grades WHERE grade_id = $1",
        )
        .bind(grade_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| StorageError::not_found(Resource::Grade, grade_id))
    }

    pub async fn count_classes_in_grade(&mut self, grade_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM classes WHERE grade_id = $1")
            .bind(grade_id)
            .fetch_one(&mut *self.conn)
            .await?;

        Ok(count)
    }

    pub async fn delete_grade(&mut self, grade_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM grades WHERE grade_id = $1")
            .bind(grade_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(Resource::Grade, grade_id));
        }

        Ok(())
    }

    pub async fn create_class(&mut self, req: &CreateClassRequest) -> Result<Class> {
        sqlx::query_as::<_, Class>(
            r#"
            INSERT INTO classes (grade_id, name)
            VALUES ($1, $2)
            RETURNING class_id, grade_id, name, created_at
            "#,
        )
        .bind(req.grade_id)
        .bind(&req.name)
        .fetch_one(&mut *self.conn)
        .await
        .map_err(|e| unique_to_conflict(e, "Class name already exists in this grade"))
    }

    pub async fn list_classes(&mut self, grade_id: Option<Uuid>) -> Result<Vec<ClassDetail>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT c.class_id, c.name, g.grade_id, g.name AS grade_name
            FROM classes c
            INNER JOIN grades g ON g.grade_id = c.grade_id
            WHERE 1=1
            "#,
        );

        if let Some(grade_id) = grade_id {
            query.push(" AND c.grade_id = ");
            query.push_bind(grade_id);
        }

        query.push(" ORDER BY g.sort_order, g.name, c.name");

        let classes = query
            .build_query_as::<ClassDetail>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(classes)
    }

    pub async fn find_class(&mut self, class_id: Uuid) -> Result<Class> {
        sqlx::query_as::<_, Class>(
            "SELECT class_id, grade_id, name, created_at FROM classes WHERE class_id = $1",
        )
        .bind(class_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| StorageError::not_found(Resource::Class, class_id))
    }

    pub async fn count_students_in_class(&mut self, class_id: Uuid) -> Result<i64> {
        let count =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM students WHERE class_id = $1")
                .bind(class_id)
                .fetch_one(&mut *self.conn)
                .await?;

        Ok(count)
    }

    pub async fn delete_class(&mut self, class_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM classes WHERE class_id = $1")
            .bind(class_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(Resource::Class, class_id));
        }

        Ok(())
    }

    pub async fn create_student(&mut self, req: &CreateStudentRequest) -> Result<Student> {
        let sql = format!(
            "INSERT INTO students (class_id, student_no, name, gender) \
             VALUES ($1, $2, $3, $4) RETURNING {STUDENT_COLUMNS}"
        );

        sqlx::query_as::<_, Student>(&sql)
            .bind(req.class_id)
            .bind(req.student_no.trim())
            .bind(&req.name)
            .bind(req.gender)
            .fetch_one(&mut *self.conn)
            .await
            .map_err(|e| unique_to_conflict(e, "Student number already exists"))
    }

    pub async fn list_students(&mut self, filter: &RosterFilter) -> Result<Vec<Student>> {
        let mut query = QueryBuilder::new(
            r#"
            SELECT s.student_id, s.class_id, s.student_no, s.name, s.gender, s.created_at
            FROM students s
            INNER JOIN classes c ON c.class_id = s.class_id
            WHERE 1=1
            "#,
        );

        if let Some(class_id) = filter.class_id {
            query.push(" AND s.class_id = ");
            query.push_bind(class_id);
        }

        if let Some(grade_id) = filter.grade_id {
            query.push(" AND c.grade_id = ");
            query.push_bind(grade_id);
        }

        query.push(" ORDER BY s.student_no");

        let students = query
            .build_query_as::<Student>()
            .fetch_all(&mut *self.conn)
            .await?;

        Ok(students)
    }

    pub async fn find_student(&mut self, student_id: Uuid) -> Result<Student> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_id = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(student_id)
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Student, student_id))
    }

    pub async fn find_student_by_no(&mut self, student_no: &str) -> Result<Student> {
        let sql = format!("SELECT {STUDENT_COLUMNS} FROM students WHERE student_no = $1");

        sqlx::query_as::<_, Student>(&sql)
            .bind(student_no.trim())
            .fetch_optional(&mut *self.conn)
            .await?
            .ok_or_else(|| StorageError::not_found(Resource::Student, student_no.trim()))
    }

    /// Loads a student with class and grade, locking the student row for the
    /// rest of the transaction.
    pub async fn lock_enrolled_student(&mut self, student_id: Uuid) -> Result<EnrolledStudent> {
        sqlx::query_as::<_, EnrolledStudent>(
            r#"
            SELECT s.student_id, s.student_no, s.gender, s.class_id, c.grade_id
            FROM students s
            INNER JOIN classes c ON c.class_id = s.class_id
            WHERE s.student_id = $1
            FOR UPDATE OF s
            "#,
        )
        .bind(student_id)
        .fetch_optional(&mut *self.conn)
        .await?
        .ok_or_else(|| StorageError::not_found(Resource::Student, student_id))
    }

    pub async fn count_registrations_for_student(&mut self, student_id: Uuid) -> Result<i64> {
        let count = sqlx::query_scalar::<_, i64>(
            "SELECT COUNT(*) FROM registrations WHERE student_id = $1",
        )
        .bind(student_id)
        .fetch_one(&mut *self.conn)
        .await?;

        Ok(count)
    }

    pub async fn delete_student(&mut self, student_id: Uuid) -> Result<()> {
        let result = sqlx::query("DELETE FROM students WHERE student_id = $1")
            .bind(student_id)
            .execute(&mut *self.conn)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StorageError::not_found(Resource::Student, student_id));
        }

        Ok(())
    }
}

/// Maps a unique-constraint failure onto a readable conflict.
pub(crate) fn unique_to_conflict(error: sqlx::Error, message: &str) -> StorageError {
    let error = StorageError::from(error);
    if error.is_unique_violation() {
        return StorageError::ConstraintViolation(message.to_string());
    }
    if error.is_foreign_key_violation() {
        return StorageError::ConstraintViolation("Referenced record does not exist".to_string());
    }
    error
}
