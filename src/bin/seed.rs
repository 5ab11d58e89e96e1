use bakery_storefront_api::{
    account::password::hash_password,
    config::AppConfig,
    db::create_pool,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use uuid::Uuid;

struct SeedProduct {
    subcategory: &'static str,
    name: &'static str,
    description: &'static str,
    price: i64,
    flavors: &'static [(&'static str, i64)],
}

struct SeedCategory {
    name: &'static str,
    description: &'static str,
    display_order: i32,
    products: &'static [SeedProduct],
}

const CATALOG: &[SeedCategory] = &[
    SeedCategory {
        name: "Cakes",
        description: "Celebration and everyday cakes baked to order",
        display_order: 1,
        products: &[
            SeedProduct {
                subcategory: "Celebration Cakes",
                name: "Black Forest Cake",
                description: "Chocolate sponge, cherries and whipped cream",
                price: 65000,
                flavors: &[("Classic", 0), ("Eggless", 5000)],
            },
            SeedProduct {
                subcategory: "Celebration Cakes",
                name: "Red Velvet Cake",
                description: "Cream cheese frosting on a cocoa sponge",
                price: 75000,
                flavors: &[("Classic", 0), ("Eggless", 5000)],
            },
            SeedProduct {
                subcategory: "Tea Cakes",
                name: "Banana Walnut Loaf",
                description: "Moist loaf with toasted walnuts",
                price: 32000,
                flavors: &[],
            },
        ],
    },
    SeedCategory {
        name: "Breads",
        description: "Fresh loaves from the morning bake",
        display_order: 2,
        products: &[
            SeedProduct {
                subcategory: "Sourdough",
                name: "Country Sourdough",
                description: "Long-fermented white sourdough",
                price: 18000,
                flavors: &[("Plain", 0), ("Olive", 3000), ("Multigrain", 2500)],
            },
            SeedProduct {
                subcategory: "Everyday",
                name: "Milk Bread",
                description: "Soft pull-apart sandwich loaf",
                price: 9000,
                flavors: &[],
            },
        ],
    },
    SeedCategory {
        name: "Cookies",
        description: "Crisp, chewy and everything in between",
        display_order: 3,
        products: &[SeedProduct {
            subcategory: "Classics",
            name: "Choco Chip Cookies",
            description: "Box of six, brown butter dough",
            price: 24000,
            flavors: &[("Dark Chocolate", 0), ("Milk Chocolate", 0)],
        }],
    },
    SeedCategory {
        name: "Seasonal Specials",
        description: "Limited runs, currently empty",
        display_order: 4,
        products: &[],
    },
];

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new("info"))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = AppConfig::from_env()?;
    let pool = create_pool(&config.database_url).await?;
    // Ensure migrations are applied.
    sqlx::migrate!("./migrations").run(&pool).await?;

    let user_id = ensure_customer(&pool, "customer@example.com", "customer123").await?;
    seed_catalog(&pool).await?;

    tracing::info!(%user_id, "seed completed");
    Ok(())
}

async fn ensure_customer(pool: &sqlx::PgPool, email: &str, password: &str) -> anyhow::Result<Uuid> {
    let password_hash = hash_password(password)?;

    let (user_id,): (Uuid,) = sqlx::query_as(
        r#"
        INSERT INTO users (id, email, password_hash)
        VALUES ($1, $2, $3)
        ON CONFLICT (email) DO UPDATE SET email = EXCLUDED.email
        RETURNING id
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(email)
    .bind(password_hash)
    .fetch_one(pool)
    .await?;

    tracing::info!(email, "ensured customer");
    Ok(user_id)
}

async fn seed_catalog(pool: &sqlx::PgPool) -> anyhow::Result<()> {
    for category in CATALOG {
        let (category_id,): (Uuid,) = sqlx::query_as(
            r#"
            INSERT INTO categories (id, name, description, display_order)
            VALUES ($1, $2, $3, $4)
            ON CONFLICT (name) DO UPDATE SET display_order = EXCLUDED.display_order
            RETURNING id
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(category.name)
        .bind(category.description)
        .bind(category.display_order)
        .fetch_one(pool)
        .await?;

        for (position, product) in category.products.iter().enumerate() {
            let (subcategory_id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO subcategories (id, category_id, name, display_order)
                VALUES ($1, $2, $3, $4)
                ON CONFLICT (category_id, name) DO UPDATE SET name = EXCLUDED.name
                RETURNING id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(category_id)
            .bind(product.subcategory)
            .bind(position as i32)
            .fetch_one(pool)
            .await?;

            let (product_id,): (Uuid,) = sqlx::query_as(
                r#"
                INSERT INTO products (id, subcategory_id, name, description, price)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (name) DO UPDATE SET price = EXCLUDED.price
                RETURNING id
                "#,
            )
            .bind(Uuid::new_v4())
            .bind(subcategory_id)
            .bind(product.name)
            .bind(product.description)
            .bind(product.price)
            .fetch_one(pool)
            .await?;

            for (flavor, price_delta) in product.flavors {
                sqlx::query(
                    r#"
                    INSERT INTO product_flavors (id, product_id, name, price_delta)
                    VALUES ($1, $2, $3, $4)
                    ON CONFLICT (product_id, name) DO NOTHING
                    "#,
                )
                .bind(Uuid::new_v4())
                .bind(product_id)
                .bind(*flavor)
                .bind(*price_delta)
                .execute(pool)
                .await?;
            }
        }

        tracing::info!(category = category.name, products = category.products.len(), "seeded category");
    }

    Ok(())
}
