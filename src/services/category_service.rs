use chrono::Utc;
use sea_orm::{
    ColumnTrait, EntityTrait, JoinType, LoaderTrait, QueryFilter, QueryOrder, QuerySelect,
    RelationTrait,
};
use uuid::Uuid;

use crate::{
    dto::categories::{CategoryDetail, CategoryList, ProductListing},
    entity::{
        Categories, ProductFlavors, Products, categories, product_flavors, products,
        subcategories,
    },
    error::{AppError, AppResult},
    models::{Category, Product, ProductFlavor},
    response::{ApiResponse, Meta},
    state::AppState,
};

/// Active categories, ordered for display.
pub async fn list_categories(state: &AppState) -> AppResult<ApiResponse<CategoryList>> {
    let items: Vec<Category> = Categories::find()
        .filter(categories::Column::IsActive.eq(true))
        .order_by_asc(categories::Column::DisplayOrder)
        .order_by_asc(categories::Column::Name)
        .all(&state.orm)
        .await?
        .into_iter()
        .map(category_from_entity)
        .collect();

    let meta = Meta::total(items.len());
    Ok(ApiResponse::success(
        "Categories",
        CategoryList::new(items),
        Some(meta),
    ))
}

/// One category and the active products filed under any of its subcategories.
pub async fn get_category(state: &AppState, id: Uuid) -> AppResult<ApiResponse<CategoryDetail>> {
    let category = Categories::find_by_id(id)
        .one(&state.orm)
        .await?
        .map(category_from_entity)
        .ok_or(AppError::NotFound)?;

    let product_models = Products::find()
        .join(JoinType::InnerJoin, products::Relation::Subcategories.def())
        .filter(subcategories::Column::CategoryId.eq(id))
        .filter(products::Column::IsActive.eq(true))
        .order_by_asc(products::Column::Name)
        .all(&state.orm)
        .await?;

    let flavors = product_models
        .load_many(ProductFlavors, &state.orm)
        .await?;

    let items: Vec<Product> = product_models
        .into_iter()
        .zip(flavors)
        .map(|(product, flavors)| product_from_entity(product, flavors))
        .collect();

    tracing::debug!(category_id = %id, products = items.len(), "category products loaded");

    let products = ProductListing::from_products(items);
    let meta = Meta::total(products.len());
    Ok(ApiResponse::success(
        "Category",
        CategoryDetail { category, products },
        Some(meta),
    ))
}

fn category_from_entity(model: categories::Model) -> Category {
    Category {
        id: model.id,
        name: model.name,
        description: model.description,
        image_url: model.image_url,
        display_order: model.display_order,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
    }
}

fn product_from_entity(model: products::Model, flavors: Vec<product_flavors::Model>) -> Product {
    let mut flavors: Vec<ProductFlavor> = flavors
        .into_iter()
        .map(|flavor| ProductFlavor {
            id: flavor.id,
            product_id: flavor.product_id,
            name: flavor.name,
            price_delta: flavor.price_delta,
            is_available: flavor.is_available,
        })
        .collect();
    flavors.sort_by(|a, b| a.name.cmp(&b.name));

    Product {
        id: model.id,
        subcategory_id: model.subcategory_id,
        name: model.name,
        description: model.description,
        price: model.price,
        image_url: model.image_url,
        is_active: model.is_active,
        created_at: model.created_at.with_timezone(&Utc),
        flavors,
    }
}
