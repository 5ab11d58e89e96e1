pub mod categories;
pub mod product_flavors;
pub mod products;
pub mod subcategories;

pub use categories::Entity as Categories;
pub use product_flavors::Entity as ProductFlavors;
pub use products::Entity as Products;
pub use subcategories::Entity as Subcategories;
