use serde::Serialize;
use utoipa::ToSchema;

use crate::models::{Category, Product};

pub const NO_CATEGORIES_MESSAGE: &str = "No categories available at the moment.";
pub const NO_PRODUCTS_MESSAGE: &str = "No products found in this category.";

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryList {
    pub items: Vec<Category>,
    /// Set only when `items` is empty.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub empty_message: Option<String>,
}

impl CategoryList {
    pub fn new(items: Vec<Category>) -> Self {
        let empty_message = items.is_empty().then(|| NO_CATEGORIES_MESSAGE.to_string());
        Self {
            items,
            empty_message,
        }
    }
}

/// Products of one category: a non-empty grid or the empty-state text.
#[derive(Debug, Serialize, ToSchema)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductListing {
    Grid { items: Vec<Product> },
    Empty { message: String },
}

impl ProductListing {
    pub fn from_products(items: Vec<Product>) -> Self {
        if items.is_empty() {
            ProductListing::Empty {
                message: NO_PRODUCTS_MESSAGE.to_string(),
            }
        } else {
            ProductListing::Grid { items }
        }
    }

    pub fn len(&self) -> usize {
        match self {
            ProductListing::Grid { items } => items.len(),
            ProductListing::Empty { .. } => 0,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct CategoryDetail {
    pub category: Category,
    pub products: ProductListing,
}
