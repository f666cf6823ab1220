//! Catalog repository: products, subjects, and tutors.
//!
//! Read-mostly content tables behind a [`CatalogService`] that caches full
//! listings with `moka` (5-minute TTL). Category filtering happens in memory
//! over the cached listing, so filter clicks never hit the database.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use rust_decimal::Decimal;
use sqlx::PgPool;
use tracing::instrument;

use kingsway_core::{ProductId, SubjectId, TutorId};

use super::RepositoryError;

/// A shop product.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub image: Option<String>,
    pub category: String,
    pub active: bool,
}

/// A tutored subject.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct Subject {
    pub id: SubjectId,
    pub name: String,
    pub level: String,
    pub description: String,
    pub icon: Option<String>,
}

/// A tutor profile.
#[derive(Debug, Clone)]
pub struct Tutor {
    pub id: TutorId,
    pub name: String,
    pub photo: Option<String>,
    pub subjects: String,
    pub qualifications: Vec<String>,
}

/// Raw tutor row; `qualifications` is normalized before leaving this module.
#[derive(Debug, sqlx::FromRow)]
struct TutorRow {
    id: TutorId,
    name: String,
    photo: Option<String>,
    subjects: String,
    qualifications: Option<serde_json::Value>,
}

/// Normalize the stored qualifications value into a list of strings.
///
/// Historical records stored either a genuine JSON array or a serialized
/// JSON string holding one. Both shapes are accepted here, at the data
/// access edge, so rendering code only ever sees `Vec<String>`.
fn normalize_qualifications(value: Option<&serde_json::Value>) -> Vec<String> {
    fn from_array(values: &[serde_json::Value]) -> Vec<String> {
        values
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::to_owned)
            .filter(|s| !s.is_empty())
            .collect()
    }

    match value {
        Some(serde_json::Value::Array(values)) => from_array(values),
        Some(serde_json::Value::String(raw)) => {
            match serde_json::from_str::<serde_json::Value>(raw) {
                Ok(serde_json::Value::Array(values)) => from_array(&values),
                // A bare string that isn't JSON is treated as a single entry
                _ if !raw.trim().is_empty() => vec![raw.trim().to_owned()],
                _ => Vec::new(),
            }
        }
        _ => Vec::new(),
    }
}

impl From<TutorRow> for Tutor {
    fn from(row: TutorRow) -> Self {
        Self {
            id: row.id,
            name: row.name,
            photo: row.photo,
            subjects: row.subjects,
            qualifications: normalize_qualifications(row.qualifications.as_ref()),
        }
    }
}

// =============================================================================
// CatalogService
// =============================================================================

/// Cached value types.
#[derive(Debug, Clone)]
enum CacheValue {
    Products(Arc<Vec<Product>>),
    Subjects(Arc<Vec<Subject>>),
    Tutors(Arc<Vec<Tutor>>),
}

const PRODUCTS_KEY: &str = "products";
const SUBJECTS_KEY: &str = "subjects";
const TUTORS_KEY: &str = "tutors";

/// Read access to the catalog tables with a short-lived listing cache.
///
/// Cheaply cloneable via `Arc`.
#[derive(Clone)]
pub struct CatalogService {
    inner: Arc<CatalogServiceInner>,
}

struct CatalogServiceInner {
    pool: PgPool,
    cache: Cache<String, CacheValue>,
}

impl CatalogService {
    /// Create a new catalog service over a connection pool.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        let cache = Cache::builder()
            .max_capacity(16)
            .time_to_live(Duration::from_secs(300)) // 5 minutes
            .build();

        Self {
            inner: Arc::new(CatalogServiceInner { pool, cache }),
        }
    }

    /// All active products, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn products(&self) -> Result<Arc<Vec<Product>>, RepositoryError> {
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(PRODUCTS_KEY).await
        {
            return Ok(products);
        }

        let products: Vec<Product> = sqlx::query_as(
            r"
            SELECT id, name, description, price, image, category, active
            FROM products
            WHERE active
            ORDER BY created_at DESC, id DESC
            ",
        )
        .fetch_all(&self.inner.pool)
        .await?;

        let products = Arc::new(products);
        self.inner
            .cache
            .insert(
                PRODUCTS_KEY.to_string(),
                CacheValue::Products(Arc::clone(&products)),
            )
            .await;

        Ok(products)
    }

    /// Active products filtered by category (in memory, over the cached list).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the listing query fails.
    pub async fn products_in_category(
        &self,
        category: Option<&str>,
    ) -> Result<Vec<Product>, RepositoryError> {
        let products = self.products().await?;
        Ok(products
            .iter()
            .filter(|p| category.is_none_or(|c| p.category.eq_ignore_ascii_case(c)))
            .cloned()
            .collect())
    }

    /// Distinct product categories, sorted.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the listing query fails.
    pub async fn categories(&self) -> Result<Vec<String>, RepositoryError> {
        let products = self.products().await?;
        let mut categories: Vec<String> =
            products.iter().map(|p| p.category.clone()).collect();
        categories.sort();
        categories.dedup();
        Ok(categories)
    }

    /// Look up one active product by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    #[instrument(skip(self))]
    pub async fn product(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        // Served from the cached listing when warm
        if let Some(CacheValue::Products(products)) =
            self.inner.cache.get(PRODUCTS_KEY).await
        {
            return Ok(products.iter().find(|p| p.id == id).cloned());
        }

        let product: Option<Product> = sqlx::query_as(
            r"
            SELECT id, name, description, price, image, category, active
            FROM products
            WHERE id = $1 AND active
            ",
        )
        .bind(id)
        .fetch_optional(&self.inner.pool)
        .await?;

        Ok(product)
    }

    /// All subjects in display order.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn subjects(&self) -> Result<Arc<Vec<Subject>>, RepositoryError> {
        if let Some(CacheValue::Subjects(subjects)) =
            self.inner.cache.get(SUBJECTS_KEY).await
        {
            return Ok(subjects);
        }

        let subjects: Vec<Subject> = sqlx::query_as(
            r"
            SELECT id, name, level, description, icon
            FROM subjects
            ORDER BY sort_order, name
            ",
        )
        .fetch_all(&self.inner.pool)
        .await?;

        let subjects = Arc::new(subjects);
        self.inner
            .cache
            .insert(
                SUBJECTS_KEY.to_string(),
                CacheValue::Subjects(Arc::clone(&subjects)),
            )
            .await;

        Ok(subjects)
    }

    /// All tutors in display order, qualifications normalized.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails on a cache miss.
    #[instrument(skip(self))]
    pub async fn tutors(&self) -> Result<Arc<Vec<Tutor>>, RepositoryError> {
        if let Some(CacheValue::Tutors(tutors)) = self.inner.cache.get(TUTORS_KEY).await {
            return Ok(tutors);
        }

        let rows: Vec<TutorRow> = sqlx::query_as(
            r"
            SELECT id, name, photo, subjects, qualifications
            FROM tutors
            ORDER BY sort_order, name
            ",
        )
        .fetch_all(&self.inner.pool)
        .await?;

        let tutors = Arc::new(rows.into_iter().map(Tutor::from).collect::<Vec<_>>());
        self.inner
            .cache
            .insert(
                TUTORS_KEY.to_string(),
                CacheValue::Tutors(Arc::clone(&tutors)),
            )
            .await;

        Ok(tutors)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_qualifications_genuine_array() {
        let value = json!(["BSc Mathematics", "PGCE"]);
        assert_eq!(
            normalize_qualifications(Some(&value)),
            vec!["BSc Mathematics".to_string(), "PGCE".to_string()]
        );
    }

    #[test]
    fn test_normalize_qualifications_serialized_string_fallback() {
        // Legacy records stored the array serialized inside a JSON string
        let value = json!("[\"MA English\", \"TEFL\"]");
        assert_eq!(
            normalize_qualifications(Some(&value)),
            vec!["MA English".to_string(), "TEFL".to_string()]
        );
    }

    #[test]
    fn test_normalize_qualifications_bare_string() {
        let value = json!("BEd Primary Education");
        assert_eq!(
            normalize_qualifications(Some(&value)),
            vec!["BEd Primary Education".to_string()]
        );
    }

    #[test]
    fn test_normalize_qualifications_malformed() {
        assert!(normalize_qualifications(None).is_empty());
        assert!(normalize_qualifications(Some(&json!(null))).is_empty());
        assert!(normalize_qualifications(Some(&json!(42))).is_empty());
        assert!(normalize_qualifications(Some(&json!(""))).is_empty());
        assert!(normalize_qualifications(Some(&json!({"a": 1}))).is_empty());
    }

    #[test]
    fn test_normalize_qualifications_skips_non_string_entries() {
        let value = json!(["BSc Physics", 3, null, ""]);
        assert_eq!(
            normalize_qualifications(Some(&value)),
            vec!["BSc Physics".to_string()]
        );
    }
}
