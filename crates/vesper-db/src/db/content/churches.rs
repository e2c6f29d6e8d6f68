use sqlx::{PgPool, Postgres};
use vesper_core::models::ChurchWithDistance;
use vesper_core::AppError;

const EARTH_RADIUS_KM: f64 = 6371.0;
const KM_PER_DEGREE_LAT: f64 = 111.32;

/// Latitude/longitude box that contains every point within `radius_km` of the centre.
/// Used as an index-friendly prefilter before the exact great-circle distance.
pub fn bounding_box(lat: f64, lng: f64, radius_km: f64) -> (f64, f64, f64, f64) {
    let lat_delta = radius_km / KM_PER_DEGREE_LAT;
    let min_lat = (lat - lat_delta).max(-90.0);
    let max_lat = (lat + lat_delta).min(90.0);

    let cos_lat = lat.to_radians().cos();
    if cos_lat.abs() < 1e-6 || max_lat >= 90.0 || min_lat <= -90.0 {
        return (min_lat, max_lat, -180.0, 180.0);
    }
    let lng_delta = radius_km / (KM_PER_DEGREE_LAT * cos_lat);
    // Boxes crossing the antimeridian would need two ranges; search every longitude instead.
    if lng - lng_delta < -180.0 || lng + lng_delta > 180.0 {
        return (min_lat, max_lat, -180.0, 180.0);
    }
    (min_lat, max_lat, lng - lng_delta, lng + lng_delta)
}

/// Repository for church/place lookups
#[derive(Clone)]
pub struct ChurchRepository {
    pool: PgPool,
}

impl ChurchRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Churches within `radius_km` of the point, nearest first.
    #[tracing::instrument(skip(self), fields(db.table = "churches", db.operation = "select"))]
    pub async fn nearby(
        &self,
        lat: f64,
        lng: f64,
        radius_km: f64,
        limit: i64,
    ) -> Result<Vec<ChurchWithDistance>, AppError> {
        let (min_lat, max_lat, min_lng, max_lng) = bounding_box(lat, lng, radius_km);
        let churches = sqlx::query_as::<Postgres, ChurchWithDistance>(
            r#"
            SELECT * FROM (
                SELECT id, name, denomination, address, city, country, latitude, longitude,
                       phone, website, service_times, created_at,
                       $5 * 2 * ASIN(SQRT(
                           POWER(SIN(RADIANS(latitude - $1) / 2), 2)
                           + COS(RADIANS($1)) * COS(RADIANS(latitude))
                             * POWER(SIN(RADIANS(longitude - $2) / 2), 2)
                       )) AS distance_km
                FROM churches
                WHERE latitude BETWEEN $6 AND $7 AND longitude BETWEEN $8 AND $9
            ) c
            WHERE distance_km <= $3
            ORDER BY distance_km
            LIMIT $4
            "#,
        )
        .bind(lat)
        .bind(lng)
        .bind(radius_km)
        .bind(limit)
        .bind(EARTH_RADIUS_KM)
        .bind(min_lat)
        .bind(max_lat)
        .bind(min_lng)
        .bind(max_lng)
        .fetch_all(&self.pool)
        .await?;
        Ok(churches)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bounding_box_is_symmetric_around_centre() {
        let (min_lat, max_lat, min_lng, max_lng) = bounding_box(6.5, 3.4, 25.0);
        assert!((max_lat - 6.5 - (6.5 - min_lat)).abs() < 1e-9);
        assert!((max_lng - 3.4 - (3.4 - min_lng)).abs() < 1e-9);
        assert!(max_lat - min_lat > 0.44 && max_lat - min_lat < 0.46);
    }

    #[test]
    fn bounding_box_across_antimeridian_spans_all_longitudes() {
        let (_, _, min_lng, max_lng) = bounding_box(-17.7, 179.9, 25.0);
        assert_eq!((min_lng, max_lng), (-180.0, 180.0));
        assert!((min_lng..=max_lng).contains(&-179.9));

        let (_, _, min_lng, max_lng) = bounding_box(-17.7, -179.95, 25.0);
        assert_eq!((min_lng, max_lng), (-180.0, 180.0));
    }

    #[test]
    fn bounding_box_near_pole_spans_all_longitudes() {
        let (_, max_lat, min_lng, max_lng) = bounding_box(89.9, 10.0, 50.0);
        assert_eq!(max_lat, 90.0);
        assert_eq!((min_lng, max_lng), (-180.0, 180.0));
    }
}
