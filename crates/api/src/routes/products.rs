//! Product catalog handlers.

use axum::extract::State;
use serde::Deserialize;
use tamarind_core::{Price, ProductId};
use url::Url;

use crate::db::products::ProductRepository;
use crate::error::{ApiError, Result};
use crate::extract::{AppJson, AppPath};
use crate::middleware::RequireManager;
use crate::models::{NewProduct, Product};
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::validate::Validator;

/// Product creation request body. `price` arrives as a decimal string,
/// the same rendering the API uses on the way out.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductBody {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub price: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub image: String,
}

impl CreateProductBody {
    /// Validate every field, aggregating failures into one response.
    fn validate(&self) -> Result<(Price, Url)> {
        let mut v = Validator::new();
        v.require("name", &self.name);
        v.require("category", &self.category);
        v.require("description", &self.description);

        let price = Price::parse(&self.price);
        v.check(
            "price",
            price.is_ok(),
            "price must be a positive decimal number",
        );

        let image = Url::parse(self.image.trim());
        v.check("image", image.is_ok(), "image must be an absolute URL");

        v.finish()?;

        // Both parses succeeded or finish() would have failed above.
        match (price, image) {
            (Ok(price), Ok(image)) => Ok((price, image)),
            _ => Err(ApiError::Internal("validation desync".to_string())),
        }
    }
}

/// `POST /product/add` - create a catalog entry (manager only).
pub async fn create(
    State(state): State<AppState>,
    RequireManager(manager): RequireManager,
    AppJson(body): AppJson<CreateProductBody>,
) -> Result<ApiResponse<Product>> {
    let (price, image) = body.validate()?;

    let product = ProductRepository::new(state.pool())
        .create(&NewProduct {
            name: body.name.trim().to_string(),
            price,
            category: body.category.trim().to_string(),
            description: body.description.trim().to_string(),
            image: image.to_string(),
            created_by: manager.id,
        })
        .await?;

    tracing::info!(product_id = %product.id, manager_id = %manager.id, "product created");
    Ok(ApiResponse::created(product, "Product created successfully"))
}

/// `GET /product` - the whole catalog, newest first. Public.
pub async fn list(State(state): State<AppState>) -> Result<ApiResponse<Vec<Product>>> {
    let products = ProductRepository::new(state.pool()).list().await?;
    Ok(ApiResponse::ok(products, "Products fetched successfully"))
}

/// `GET /product/{id}` - one product. Public.
pub async fn show(
    State(state): State<AppState>,
    AppPath(id): AppPath<i32>,
) -> Result<ApiResponse<Product>> {
    let product = ProductRepository::new(state.pool())
        .get_by_id(ProductId::new(id))
        .await?
        .ok_or_else(|| ApiError::NotFound("Product not found".to_string()))?;

    Ok(ApiResponse::ok(product, "Product fetched successfully"))
}
