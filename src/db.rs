use anyhow::Context;
use sqlx::{PgPool, Postgres, Row, Transaction};
use tracing::{debug, info};

use crate::models::{CourseResult, GradeRow, ScoreSet};
use crate::policy::WeightPolicy;

/// Which enrollments to pull for a report.
#[derive(Debug, Clone, Copy)]
pub enum RowScope<'a> {
    Course(&'a str),
    Student(i32),
}

pub async fn init_db(pool: &PgPool) -> anyhow::Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

async fn upsert_course(
    tx: &mut Transaction<'_, Postgres>,
    name: &str,
    credit_hours: u32,
    policy: &WeightPolicy,
) -> anyhow::Result<i32> {
    let credit_hours = i32::try_from(credit_hours).context("credit hours out of range")?;
    let course_id: i32 = sqlx::query(
        r#"
        INSERT INTO gradebook.courses
        (name, credit_hours, assignment_weight, quiz_weight, exam_weight)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (name) DO UPDATE
        SET credit_hours = EXCLUDED.credit_hours,
            assignment_weight = EXCLUDED.assignment_weight,
            quiz_weight = EXCLUDED.quiz_weight,
            exam_weight = EXCLUDED.exam_weight
        RETURNING course_id
        "#,
    )
    .bind(name)
    .bind(credit_hours)
    .bind(policy.assignment())
    .bind(policy.quiz())
    .bind(policy.exam())
    .fetch_one(&mut **tx)
    .await?
    .get("course_id");

    Ok(course_id)
}

async fn assign_teacher(
    tx: &mut Transaction<'_, Postgres>,
    course_id: i32,
    teacher_name: &str,
) -> anyhow::Result<()> {
    let teacher_id: i32 = sqlx::query(
        r#"
        INSERT INTO gradebook.teachers (full_name)
        VALUES ($1)
        ON CONFLICT (full_name) DO UPDATE SET full_name = EXCLUDED.full_name
        RETURNING teacher_id
        "#,
    )
    .bind(teacher_name)
    .fetch_one(&mut **tx)
    .await?
    .get("teacher_id");

    sqlx::query(
        r#"
        INSERT INTO gradebook.assignments (course_id, teacher_id)
        VALUES ($1, $2)
        ON CONFLICT (course_id, teacher_id) DO NOTHING
        "#,
    )
    .bind(course_id)
    .bind(teacher_id)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn record_result(
    tx: &mut Transaction<'_, Postgres>,
    course_id: i32,
    result: &CourseResult,
) -> anyhow::Result<bool> {
    sqlx::query(
        r#"
        INSERT INTO gradebook.students (student_id, full_name)
        VALUES ($1, $2)
        ON CONFLICT (student_id) DO UPDATE SET full_name = EXCLUDED.full_name
        "#,
    )
    .bind(result.student_id)
    .bind(&result.student_name)
    .execute(&mut **tx)
    .await?;

    sqlx::query(
        r#"
        INSERT INTO gradebook.enrollments (student_id, course_id)
        VALUES ($1, $2)
        ON CONFLICT (student_id, course_id) DO NOTHING
        "#,
    )
    .bind(result.student_id)
    .bind(course_id)
    .execute(&mut **tx)
    .await?;

    let written = sqlx::query(
        r#"
        INSERT INTO gradebook.grades
        (student_id, course_id, assignment_score, quiz_score, exam_score)
        VALUES ($1, $2, $3, $4, $5)
        ON CONFLICT (student_id, course_id) DO UPDATE
        SET assignment_score = EXCLUDED.assignment_score,
            quiz_score = EXCLUDED.quiz_score,
            exam_score = EXCLUDED.exam_score
        "#,
    )
    .bind(result.student_id)
    .bind(course_id)
    .bind(result.scores().assignment)
    .bind(result.scores().quiz)
    .bind(result.scores().exam)
    .execute(&mut **tx)
    .await?;

    Ok(written.rows_affected() > 0)
}

async fn store_results(pool: &PgPool, results: &[CourseResult]) -> anyhow::Result<usize> {
    let mut tx = pool.begin().await?;
    let mut written = 0usize;

    for result in results {
        let course_id =
            upsert_course(&mut tx, &result.course_name, result.credit_hours, result.policy()).await?;
        if let Some(instructor) = result.instructor_name.as_deref() {
            assign_teacher(&mut tx, course_id, instructor).await?;
        }
        if record_result(&mut tx, course_id, result).await? {
            written += 1;
        }
    }

    tx.commit().await?;
    Ok(written)
}

pub async fn seed(pool: &PgPool) -> anyhow::Result<()> {
    let courses = [
        ("Physics", 3, WeightPolicy::new(30, 20, 50)?, "Dr. Okafor"),
        ("History", 4, WeightPolicy::new(40, 20, 40)?, "Dr. Hale"),
        ("Calculus", 4, WeightPolicy::new(20, 30, 50)?, "Dr. Nakamura"),
    ];
    let students = [
        (1001, "Avery Lee", [(92, 88, 95), (78, 81, 70), (65, 49, 72)]),
        (1002, "Jules Moreno", [(55, 62, 58), (90, 94, 97), (81, 77, 84)]),
        (1003, "Kiara Patel", [(99, 96, 98), (47, 70, 66), (88, 92, 90)]),
    ];

    let mut results = Vec::new();
    for (student_id, name, scores) in students {
        for ((course, credit_hours, policy, instructor), (a, q, e)) in courses.iter().zip(scores) {
            results.push(CourseResult::new(
                student_id,
                name,
                *course,
                Some(instructor.to_string()),
                *credit_hours,
                *policy,
                ScoreSet::new(Some(a), Some(q), Some(e))?,
            ));
        }
    }

    let written = store_results(pool, &results).await?;
    info!(written, "seeded grade records");
    Ok(())
}

/// Loads CSV rows into the database. Every row passes the same weight and score
/// validation as report input before anything is written.
pub async fn import_rows(pool: &PgPool, rows: Vec<GradeRow>) -> anyhow::Result<usize> {
    let results = crate::input::into_results(rows)?;
    store_results(pool, &results).await
}

pub async fn set_course_weights(
    pool: &PgPool,
    course_name: &str,
    policy: &WeightPolicy,
) -> anyhow::Result<bool> {
    let result = sqlx::query(
        r#"
        UPDATE gradebook.courses
        SET assignment_weight = $1, quiz_weight = $2, exam_weight = $3
        WHERE name = $4
        "#,
    )
    .bind(policy.assignment())
    .bind(policy.quiz())
    .bind(policy.exam())
    .bind(course_name)
    .execute(pool)
    .await?;

    Ok(result.rows_affected() > 0)
}

pub async fn count_sections(pool: &PgPool, course_name: &str) -> anyhow::Result<usize> {
    let sections: i64 = sqlx::query(
        r#"
        SELECT COUNT(DISTINCT a.assignment_id) AS sections
        FROM gradebook.courses c
        LEFT JOIN gradebook.assignments a ON a.course_id = c.course_id
        WHERE c.name = $1
        "#,
    )
    .bind(course_name)
    .fetch_one(pool)
    .await?
    .get("sections");

    Ok(usize::try_from(sections).unwrap_or(0))
}

pub async fn fetch_rows(pool: &PgPool, scope: RowScope<'_>) -> anyhow::Result<Vec<GradeRow>> {
    let mut query = String::from(
        "SELECT s.student_id, s.full_name AS student_name, c.name AS course_name, \
         c.credit_hours, \
         (SELECT t.full_name FROM gradebook.assignments a \
          JOIN gradebook.teachers t ON t.teacher_id = a.teacher_id \
          WHERE a.course_id = c.course_id ORDER BY a.assignment_id LIMIT 1) AS instructor_name, \
         c.assignment_weight, c.quiz_weight, c.exam_weight, \
         g.assignment_score, g.quiz_score, g.exam_score \
         FROM gradebook.enrollments e \
         JOIN gradebook.students s ON s.student_id = e.student_id \
         JOIN gradebook.courses c ON c.course_id = e.course_id \
         LEFT JOIN gradebook.grades g \
         ON g.student_id = e.student_id AND g.course_id = e.course_id",
    );

    let rows = match scope {
        RowScope::Course(name) => {
            query.push_str(" WHERE c.name = $1 ORDER BY s.student_id");
            sqlx::query(&query).bind(name).fetch_all(pool).await?
        }
        RowScope::Student(id) => {
            query.push_str(" WHERE s.student_id = $1 ORDER BY e.enrolled_at, c.name");
            sqlx::query(&query).bind(id).fetch_all(pool).await?
        }
    };

    let mut records = Vec::with_capacity(rows.len());
    for row in rows {
        let credit_hours: i32 = row.get("credit_hours");
        records.push(GradeRow {
            student_id: row.get("student_id"),
            student_name: row.get("student_name"),
            course_name: row.get("course_name"),
            credit_hours: u32::try_from(credit_hours).context("negative credit hours in database")?,
            instructor_name: row.get("instructor_name"),
            assignment_weight: row.get("assignment_weight"),
            quiz_weight: row.get("quiz_weight"),
            exam_weight: row.get("exam_weight"),
            assignment_score: row.get("assignment_score"),
            quiz_score: row.get("quiz_score"),
            exam_score: row.get("exam_score"),
        });
    }

    debug!(?scope, rows = records.len(), "fetched grade rows");
    Ok(records)
}
