//! Store catalog route handlers.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;

use kingsway_core::{CurrencyCode, Price, ProductId};

use crate::db::catalog::Product;
use crate::error::{AppError, Result};
use crate::state::AppState;

/// Product display data for templates.
#[derive(Clone)]
pub struct ProductView {
    pub id: i32,
    pub name: String,
    pub description: String,
    pub price: String,
    pub image: Option<String>,
    pub category: String,
}

impl ProductView {
    /// Build the display product from the catalog row.
    #[must_use]
    pub fn from_product(product: &Product, currency: CurrencyCode) -> Self {
        Self {
            id: product.id.as_i32(),
            name: product.name.clone(),
            description: product.description.clone(),
            price: Price::new(product.price, currency).display(),
            image: product.image.clone(),
            category: product.category.clone(),
        }
    }
}

/// Category filter chip display data.
#[derive(Clone)]
pub struct CategoryView {
    pub name: String,
    pub selected: bool,
}

/// Store listing query parameters.
#[derive(Debug, Deserialize)]
pub struct StoreQuery {
    pub category: Option<String>,
    /// Set when arriving from a completed checkout; shows the success toast.
    pub success: Option<String>,
}

/// Store catalog page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/index.html")]
pub struct StoreIndexTemplate {
    pub products: Vec<ProductView>,
    pub categories: Vec<CategoryView>,
    pub show_success: bool,
}

/// Product detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "store/show.html")]
pub struct ProductShowTemplate {
    pub product: ProductView,
}

/// Display the store catalog, optionally filtered to one category.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<StoreQuery>,
) -> Result<impl IntoResponse> {
    let currency = state.config().gateway.currency;
    let category_filter = query
        .category
        .as_deref()
        .map(str::trim)
        .filter(|c| !c.is_empty());

    let products = state
        .catalog()
        .products_in_category(category_filter)
        .await?
        .iter()
        .map(|p| ProductView::from_product(p, currency))
        .collect();

    let categories = state
        .catalog()
        .categories()
        .await?
        .into_iter()
        .map(|name| CategoryView {
            selected: category_filter.is_some_and(|c| c.eq_ignore_ascii_case(&name)),
            name,
        })
        .collect();

    Ok(StoreIndexTemplate {
        products,
        categories,
        show_success: query.success.as_deref() == Some("1"),
    })
}

/// Display a product detail page.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<i32>,
) -> Result<impl IntoResponse> {
    let product = state
        .catalog()
        .product(ProductId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound(format!("product {id}")))?;

    Ok(ProductShowTemplate {
        product: ProductView::from_product(&product, state.config().gateway.currency),
    })
}
