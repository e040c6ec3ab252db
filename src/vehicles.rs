use log::error;
use rust_decimal::{Decimal, prelude::ToPrimitive};
use sqlx::FromRow;

use crate::{db::Database, error::AppError};

const LIST_VEHICLES: &str = "
    SELECT id, brand, model, year, price, availability
    FROM vehicles
    ORDER BY brand, model
";

#[derive(Debug, FromRow)]
struct VehicleRow {
    id: i32,
    brand: String,
    model: String,
    year: i32,
    price: Option<Decimal>,
    availability: Option<bool>,
}

/// A catalog entry ready for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Vehicle {
    pub id: i32,
    pub brand: String,
    pub model: String,
    pub year: i32,
    pub price: f64,
    pub price_formatted: String,
    pub available: bool,
}

impl From<VehicleRow> for Vehicle {
    fn from(row: VehicleRow) -> Self {
        let price = row.price.unwrap_or_default();
        Vehicle {
            id: row.id,
            brand: row.brand,
            model: row.model,
            year: row.year,
            price: price.to_f64().unwrap_or(0.0),
            price_formatted: format_price(price),
            available: row.availability.unwrap_or(false),
        }
    }
}

/// Whole catalog, ordered by brand then model.
pub async fn list_vehicles(db: &Database) -> Result<Vec<Vehicle>, AppError> {
    let mut conn = db.acquire("list vehicles").await?;

    let rows: Vec<VehicleRow> = sqlx::query_as(LIST_VEHICLES)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("Database error listing vehicles: {}", e);
            AppError::from(e)
        })?;

    Ok(rows.into_iter().map(Vehicle::from).collect())
}

/// `27650` -> `27,650.00`
pub fn format_price(price: Decimal) -> String {
    let rounded = price.round_dp(2);
    let text = format!("{:.2}", rounded.abs());
    let (whole, fraction) = text.split_once('.').unwrap_or((text.as_str(), "00"));

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, ch) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    let sign = if rounded.is_sign_negative() && !rounded.is_zero() {
        "-"
    } else {
        ""
    };
    format!("{sign}{grouped}.{fraction}")
}
