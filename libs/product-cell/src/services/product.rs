use chrono::Utc;
use reqwest::Method;
use serde_json::{json, Map, Value};
use tracing::{debug, info};
use uuid::Uuid;

use family_cell::ScopeService;
use shared_config::AppConfig;
use shared_database::SupabaseClient;
use shared_models::auth::User;
use shared_models::error::AppError;
use shared_models::product::Product;

use crate::models::{
    CreateProductRequest, ProductView, UpdateProductRequest, DEFAULT_CATEGORY, DEFAULT_UNIT,
};

pub struct ProductService {
    supabase: SupabaseClient,
    config: AppConfig,
}

impl ProductService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: SupabaseClient::new(config),
            config: config.clone(),
        }
    }

    /// Household products, soonest expiry first.
    pub async fn list_products(
        &self,
        user: &User,
        auth_token: &str,
    ) -> Result<Vec<ProductView>, AppError> {
        let Some(scope) = ScopeService::new(&self.config).resolve(user, auth_token).await? else {
            return Ok(Vec::new());
        };

        let path = format!(
            "/rest/v1/products?family_id={}&order=expiry_date.asc.nullslast",
            scope.family_filter()
        );
        let products: Vec<Product> = self
            .supabase
            .request(Method::GET, &path, Some(auth_token), None)
            .await?;

        let now = Utc::now();
        Ok(products
            .into_iter()
            .map(|product| ProductView::at(product, now))
            .collect())
    }

    pub async fn create_product(
        &self,
        user: &User,
        request: CreateProductRequest,
        auth_token: &str,
    ) -> Result<ProductView, AppError> {
        let (expiry_date, purchase_date) = request.validate()?;
        debug!("Adding product '{}' for user {}", request.name.trim(), user.id);

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.ensure(user, auth_token).await?;
        let (member_id, family_id) = match request.member_id {
            Some(member_id) => {
                let (member_id, family_id) = scopes
                    .target_member(&scope, Some(member_id), auth_token)
                    .await?;
                (Some(member_id), family_id)
            }
            None => (None, scope.family_id),
        };

        let product_data = json!({
            "family_id": family_id,
            "member_id": member_id,
            "name": request.name.trim(),
            "category": request.category.as_deref().map(str::trim).unwrap_or(DEFAULT_CATEGORY),
            "stock_quantity": request.stock_quantity.unwrap_or(0),
            "unit": request.unit.as_deref().map(str::trim).unwrap_or(DEFAULT_UNIT),
            "expiry_date": expiry_date,
            "purchase_date": purchase_date,
            "notes": request.notes,
        });

        let created: Vec<Product> = self
            .supabase
            .write_returning(Method::POST, "/rest/v1/products", auth_token, Some(product_data))
            .await?;

        let product = created
            .into_iter()
            .next()
            .ok_or_else(|| AppError::Internal("Product insert returned no row".to_string()))?;

        info!("Product {} added to family {}", product.id, family_id);
        Ok(ProductView::at(product, Utc::now()))
    }

    pub async fn update_product(
        &self,
        user: &User,
        product_id: Uuid,
        request: UpdateProductRequest,
        auth_token: &str,
    ) -> Result<ProductView, AppError> {
        let (expiry_date, purchase_date) = request.validate()?;

        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let existing: Product = scopes
            .fetch_in_scope("products", product_id, &scope, auth_token, "Product")
            .await?;

        let mut update_data = Map::new();
        if let Some(name) = request.name {
            update_data.insert("name".to_string(), json!(name.trim()));
        }
        if let Some(category) = request.category {
            update_data.insert("category".to_string(), json!(category.trim()));
        }
        if let Some(stock) = request.stock_quantity {
            update_data.insert("stock_quantity".to_string(), json!(stock));
        }
        if let Some(unit) = request.unit {
            update_data.insert("unit".to_string(), json!(unit.trim()));
        }
        if let Some(expiry_date) = expiry_date {
            update_data.insert("expiry_date".to_string(), json!(expiry_date));
        }
        if let Some(purchase_date) = purchase_date {
            update_data.insert("purchase_date".to_string(), json!(purchase_date));
        }
        if let Some(notes) = request.notes {
            update_data.insert("notes".to_string(), json!(notes));
        }

        if update_data.is_empty() {
            return Ok(ProductView::at(existing, Utc::now()));
        }
        update_data.insert("updated_at".to_string(), json!(Utc::now().to_rfc3339()));

        let path = format!(
            "/rest/v1/products?id=eq.{}&family_id={}",
            product_id,
            scope.family_filter()
        );
        let updated: Vec<Product> = self
            .supabase
            .write_returning(Method::PATCH, &path, auth_token, Some(Value::Object(update_data)))
            .await?;

        updated
            .into_iter()
            .next()
            .map(|product| ProductView::at(product, Utc::now()))
            .ok_or_else(|| AppError::NotFound("Product not found".to_string()))
    }

    pub async fn delete_product(
        &self,
        user: &User,
        product_id: Uuid,
        auth_token: &str,
    ) -> Result<(), AppError> {
        let scopes = ScopeService::new(&self.config);
        let scope = scopes.require(user, auth_token).await?;
        let _: Product = scopes
            .fetch_in_scope("products", product_id, &scope, auth_token, "Product")
            .await?;

        let path = format!(
            "/rest/v1/products?id=eq.{}&family_id={}",
            product_id,
            scope.family_filter()
        );
        let removed: Vec<Value> = self
            .supabase
            .write_returning(Method::DELETE, &path, auth_token, None)
            .await?;

        if removed.is_empty() {
            return Err(AppError::NotFound("Product not found".to_string()));
        }
        info!("Product {} deleted by user {}", product_id, user.id);
        Ok(())
    }
}
