//! Bootcamps within a distance of a point
//!
//! Great-circle distance by the haversine formula on a sphere of
//! [`EARTH_RADIUS_MILES`].

use serde::Deserialize;
use serde_json::Value;
use sqlx::{PgPool, Postgres, QueryBuilder};

use crate::error::{AppError, AppResult};
use crate::features::bootcamps::BOOTCAMPS;
use crate::features::shared::projection::{Projection, SortKey};

/// Mean Earth radius used for radius searches
pub const EARTH_RADIUS_MILES: f64 = 3_963.0;

/// Centre point in the request body
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct Coordinates {
    pub lat: Option<f64>,
    pub lng: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BootcampsWithinRadiusQuery {
    pub lat: f64,
    pub lng: f64,
    /// Radius in miles
    pub distance: f64,
}

impl BootcampsWithinRadiusQuery {
    /// Build from the raw `:distance` segment and the body coordinates
    pub fn parse(distance: &str, coordinates: Coordinates) -> Result<Self, AppError> {
        let distance = distance
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d >= 0.0)
            .ok_or_else(|| AppError::validation("Please provide a valid distance in miles"))?;

        let (Some(lat), Some(lng)) = (coordinates.lat, coordinates.lng) else {
            return Err(AppError::validation("Please provide lat and lng"));
        };

        if !(-90.0..=90.0).contains(&lat) || !(-180.0..=180.0).contains(&lng) {
            return Err(AppError::validation("Please provide valid coordinates"));
        }

        Ok(Self { lat, lng, distance })
    }
}

fn build_query(query: &BootcampsWithinRadiusQuery) -> QueryBuilder<'static, Postgres> {
    let mut qb = QueryBuilder::new("");
    BOOTCAMPS.push_select(&mut qb, &Projection::All);

    qb.push(" WHERE 2 * asin(sqrt(LEAST(1, power(sin(radians(t.location_lat - ");
    qb.push_bind(query.lat);
    qb.push(") / 2), 2) + cos(radians(");
    qb.push_bind(query.lat);
    qb.push(")) * cos(radians(t.location_lat)) * power(sin(radians(t.location_lng - ");
    qb.push_bind(query.lng);
    qb.push(") / 2), 2)))) * ");
    qb.push_bind(EARTH_RADIUS_MILES);
    qb.push(" <= ");
    qb.push_bind(query.distance);

    SortKey::push_order_by(&mut qb, &SortKey::defaults(&BOOTCAMPS));
    qb
}

/// Every bootcamp whose location lies within `distance` miles
#[tracing::instrument(skip(pool))]
pub async fn handle(pool: PgPool, query: BootcampsWithinRadiusQuery) -> AppResult<Vec<Value>> {
    let bootcamps: Vec<Value> = build_query(&query)
        .build_query_scalar()
        .fetch_all(&pool)
        .await?;

    tracing::debug!(found = bootcamps.len(), "Radius search finished");

    Ok(bootcamps)
}
