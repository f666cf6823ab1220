//! Catalog seeding command.
//!
//! Inserts a small set of subjects, tutors, and products so a fresh
//! development database has something to render. Idempotent: seeding is
//! skipped when the products table already has rows.

use rust_decimal::Decimal;
use serde_json::json;

use super::{CommandError, connect};

/// Seed the catalog tables with sample data.
///
/// # Errors
///
/// Returns an error if the database is unreachable or an insert fails.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let (existing,): (i64,) = sqlx::query_as("SELECT count(*) FROM products")
        .fetch_one(&pool)
        .await?;
    if existing > 0 {
        tracing::info!("Catalog already seeded ({existing} products), skipping");
        return Ok(());
    }

    tracing::info!("Seeding subjects...");
    let subjects: &[(&str, &str, &str, &str)] = &[
        (
            "Mathematics",
            "Primary to A-level",
            "Number sense through calculus, taught in groups of six.",
            "icon-maths",
        ),
        (
            "English",
            "Primary to A-level",
            "Reading, writing, and exam technique for every stage.",
            "icon-english",
        ),
        (
            "Physics",
            "Secondary to A-level",
            "Practical-first physics in our refurbished lab.",
            "icon-physics",
        ),
        (
            "Chemistry",
            "Secondary to A-level",
            "From atomic structure to organic synthesis.",
            "icon-chemistry",
        ),
    ];
    for (i, (name, level, description, icon)) in subjects.iter().enumerate() {
        sqlx::query(
            "INSERT INTO subjects (name, level, description, icon, sort_order)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(name)
        .bind(level)
        .bind(description)
        .bind(icon)
        .bind(i32::try_from(i).unwrap_or(0))
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding tutors...");
    let tutors = [
        (
            "Karma Wangmo",
            "Mathematics, Physics",
            json!(["MSc Applied Mathematics", "PGCE"]),
        ),
        (
            "Daniel Osei",
            "English",
            json!(["MA English Literature", "TEFL"]),
        ),
        (
            "Sonam Choden",
            "Chemistry",
            json!(["BSc Chemistry", "PGDE Science Education"]),
        ),
    ];
    for (i, (name, subjects, qualifications)) in tutors.iter().enumerate() {
        sqlx::query(
            "INSERT INTO tutors (name, subjects, qualifications, sort_order)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(name)
        .bind(subjects)
        .bind(qualifications)
        .bind(i32::try_from(i).unwrap_or(0))
        .execute(&pool)
        .await?;
    }

    tracing::info!("Seeding products...");
    let products: &[(&str, &str, Decimal, &str)] = &[
        (
            "Algebra Workbook",
            "The workbook our maths groups use, with full worked answers.",
            Decimal::new(1550, 2),
            "books",
        ),
        (
            "Essay Writing Guide",
            "Planning, drafting, and editing, from first line to final mark.",
            Decimal::new(1200, 2),
            "books",
        ),
        (
            "Revision Cards: Physics",
            "Every A-level formula and definition on one ring.",
            Decimal::new(850, 2),
            "revision",
        ),
        (
            "College Pencil Case Kit",
            "Everything a session needs, in college colors.",
            Decimal::new(600, 2),
            "supplies",
        ),
    ];
    for (name, description, price, category) in products {
        sqlx::query(
            "INSERT INTO products (name, description, price, category)
             VALUES ($1, $2, $3, $4)",
        )
        .bind(name)
        .bind(description)
        .bind(price)
        .bind(category)
        .execute(&pool)
        .await?;
    }

    tracing::info!("Catalog seeded");
    Ok(())
}
