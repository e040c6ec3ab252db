use chrono::{DateTime, Utc};
use log::{error, warn};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::{currency::Currency, db::Database, error::AppError};

pub const DEFAULT_HISTORY_LIMIT: i64 = 50;
pub const MAX_HISTORY_LIMIT: i64 = 100;

const INSERT_CONVERSION: &str = "
    INSERT INTO conversions (amount, from_currency, to_currency, converted_amount, base_currency)
    VALUES ($1, $2, $3, $4, $5)
    RETURNING id, created_at
";

const RECENT_CONVERSIONS: &str = "
    SELECT id, amount, from_currency, to_currency, converted_amount, base_currency, created_at
    FROM conversions
    ORDER BY created_at DESC
    LIMIT $1
";

/// Body of `POST /api/conversions`, as sent by the browser.
#[derive(Debug, Deserialize)]
pub struct NewConversion {
    #[serde(default)]
    pub amount: Decimal,
    #[serde(default)]
    pub from_currency: String,
    #[serde(default)]
    pub to_currency: String,
    #[serde(default)]
    pub converted_amount: Decimal,
    #[serde(default)]
    pub base_currency: Option<String>,
}

/// A conversion whose currencies are known to be in the supported set.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidConversion {
    pub amount: Decimal,
    pub from: Currency,
    pub to: Currency,
    pub converted_amount: Decimal,
    pub base: Currency,
}

impl NewConversion {
    pub fn validate(self) -> Result<ValidConversion, AppError> {
        let (Ok(from), Ok(to)) = (
            self.from_currency.parse::<Currency>(),
            self.to_currency.parse::<Currency>(),
        ) else {
            warn!(
                "Rejected conversion {} -> {}: invalid currency",
                self.from_currency, self.to_currency
            );
            return Err(AppError::Validation("Invalid currency".to_string()));
        };

        Ok(ValidConversion {
            amount: self.amount,
            from,
            to,
            converted_amount: self.converted_amount,
            base: Currency::parse_or_default(self.base_currency.as_deref().unwrap_or("USD")),
        })
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SavedConversion {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
pub struct ConversionRecord {
    pub id: Uuid,
    pub amount: Decimal,
    pub from_currency: String,
    pub to_currency: String,
    pub converted_amount: Decimal,
    pub base_currency: String,
    pub created_at: DateTime<Utc>,
}

/// Reads `?limit=` leniently: absent or non-numeric means the default,
/// anything above the cap is capped.
pub fn history_limit(raw: Option<&str>) -> i64 {
    raw.and_then(|s| s.trim().parse::<i64>().ok())
        .unwrap_or(DEFAULT_HISTORY_LIMIT)
        .clamp(0, MAX_HISTORY_LIMIT)
}

pub async fn save_conversion(
    db: &Database,
    conversion: &ValidConversion,
) -> Result<SavedConversion, AppError> {
    let mut conn = db.acquire("save conversion").await?;

    let saved = async {
        let mut tx = sqlx::Connection::begin(&mut *conn).await?;
        let (id, created_at): (Uuid, DateTime<Utc>) = sqlx::query_as(INSERT_CONVERSION)
            .bind(conversion.amount)
            .bind(conversion.from.code())
            .bind(conversion.to.code())
            .bind(conversion.converted_amount)
            .bind(conversion.base.code())
            .fetch_one(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok::<_, sqlx::Error>(SavedConversion { id, created_at })
    }
    .await;

    saved.map_err(|e| {
        error!("Database error saving conversion: {}", e);
        AppError::from(e)
    })
}

/// Most recent conversions first.
pub async fn recent_conversions(
    db: &Database,
    limit: i64,
) -> Result<Vec<ConversionRecord>, AppError> {
    let mut conn = db.acquire("list conversions").await?;

    sqlx::query_as(RECENT_CONVERSIONS)
        .bind(limit)
        .fetch_all(&mut *conn)
        .await
        .map_err(|e| {
            error!("Database error getting conversions: {}", e);
            AppError::from(e)
        })
}
