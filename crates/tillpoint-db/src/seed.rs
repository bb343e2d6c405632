use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::DbError;

struct DemoProduct {
    name: &'static str,
    price: Decimal,
    stock_quantity: i32,
    category: &'static str,
    rating: f32,
}

fn demo_products() -> Vec<DemoProduct> {
    vec![
        DemoProduct {
            name: "Cold Brew Coffee",
            price: Decimal::new(450, 2),
            stock_quantity: 40,
            category: "Beverages",
            rating: 4.5,
        },
        DemoProduct {
            name: "Sourdough Loaf",
            price: Decimal::new(625, 2),
            stock_quantity: 12,
            category: "Bakery",
            rating: 4.8,
        },
        DemoProduct {
            name: "Whole Milk",
            price: Decimal::new(310, 2),
            stock_quantity: 24,
            category: "Dairy",
            rating: 4.2,
        },
        DemoProduct {
            name: "Gala Apples",
            price: Decimal::new(199, 2),
            stock_quantity: 80,
            category: "Produce",
            rating: 4.0,
        },
        DemoProduct {
            name: "Trail Mix",
            price: Decimal::new(549, 2),
            stock_quantity: 30,
            category: "Snacks",
            rating: 3.9,
        },
        DemoProduct {
            name: "USB-C Cable",
            price: Decimal::new(1299, 2),
            stock_quantity: 15,
            category: "Electronics",
            rating: 4.4,
        },
    ]
}

/// Insert the demo catalog and a couple of walk-in customers.
///
/// Products are matched by name so re-running the seed is a no-op for rows
/// that already exist. Returns the number of rows inserted. All inserts run
/// inside a single transaction; if any operation fails the entire batch is
/// rolled back.
///
/// # Errors
///
/// Returns [`DbError::Sqlx`] if any database operation fails.
pub async fn seed_demo_catalog(pool: &PgPool) -> Result<usize, DbError> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;

    for product in demo_products() {
        let inserted = sqlx::query(
            "INSERT INTO products (name, price, stock_quantity, category, rating, stock_unit) \
             SELECT $1, $2, $3, $4, $5, $6 \
             WHERE NOT EXISTS (SELECT 1 FROM products WHERE name = $1)",
        )
        .bind(product.name)
        .bind(product.price)
        .bind(product.stock_quantity)
        .bind(product.category)
        .bind(product.rating)
        .bind(tillpoint_core::units::default_stock_unit(product.category))
        .execute(&mut *tx)
        .await?
        .rows_affected();
        count += usize::try_from(inserted).unwrap_or(0);
    }

    for (name, phone) in [("Walk-in", None), ("Dana Reyes", Some("555-0117"))] {
        let inserted = sqlx::query(
            "INSERT INTO customers (name, phone) \
             SELECT $1, $2::TEXT \
             WHERE NOT EXISTS (SELECT 1 FROM customers WHERE name = $1)",
        )
        .bind(name)
        .bind(phone)
        .execute(&mut *tx)
        .await?
        .rows_affected();
        count += usize::try_from(inserted).unwrap_or(0);
    }

    tx.commit().await?;
    Ok(count)
}
