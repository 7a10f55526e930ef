//! Conversions from catalog field shapes into the values stored on a movie.

use base64::{Engine, engine::general_purpose::STANDARD};
use jiff::civil::Date;
use sea_orm::{ColumnTrait, ConnectionTrait, EntityTrait, QueryFilter};

use crate::{
    entities::language,
    error::{AppError, AppResult},
    models::Rating,
};

/// Leading digit of the minute count, then its last two digits as the fraction:
/// 125 becomes 1.25, 95 becomes 9.95 and 8 becomes 8.08.
///
/// This is a digit transform, not a minutes to hours conversion.
pub fn runtime_hours(minutes: u32) -> f64 {
    let mut leading = minutes;
    while leading >= 10 {
        leading /= 10;
    }
    let fraction = minutes % 100;
    f64::from(leading * 100 + fraction) / 100.0
}

pub fn poster_url(cdn_base: &str, poster_path: &str) -> String {
    format!("{}/t/p/w500{}", cdn_base.trim_end_matches('/'), poster_path)
}

pub fn encode_poster(bytes: &[u8]) -> String {
    STANDARD.encode(bytes)
}

/// Catalog release dates are `YYYY-MM-DD`; unreleased titles send an empty string.
pub fn release_date(raw: Option<&str>) -> AppResult<Option<Date>> {
    let Some(raw) = raw.map(str::trim).filter(|s| !s.is_empty()) else {
        return Ok(None);
    };
    raw.parse().map(Some).map_err(|e: jiff::Error| AppError::MalformedResponse {
        from: "release_date".to_string(),
        reason: format!("{raw:?}: {e}"),
    })
}

/// Maps a 0..=10 vote average onto the five-step rating scale.
pub fn rating(vote_average: f64, vote_count: u32) -> Rating {
    if vote_count == 0 || vote_average <= 0.0 {
        return Rating::NoRating;
    }
    let step = (vote_average / 2.0).ceil().clamp(1.0, 5.0) as i32;
    Rating::from_code(step).unwrap_or_default()
}

/// Exact ISO code lookup. Unknown or missing codes leave the movie without a language.
pub async fn language_id<C: ConnectionTrait>(
    db: &C,
    iso_code: Option<&str>,
) -> AppResult<Option<i32>> {
    let Some(code) = iso_code.filter(|c| !c.is_empty()) else {
        return Ok(None);
    };
    let found = language::Entity::find()
        .filter(language::Column::IsoCode.eq(code))
        .one(db)
        .await?;
    Ok(found.map(|l| l.id))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runtime_keeps_first_digit_and_last_two() {
        assert_eq!(runtime_hours(125), 1.25);
        assert_eq!(runtime_hours(95), 9.95);
        assert_eq!(runtime_hours(8), 8.08);
        assert_eq!(runtime_hours(139), 1.39);
        assert_eq!(runtime_hours(0), 0.0);
    }

    #[test]
    fn runtime_ignores_middle_digits() {
        assert_eq!(runtime_hours(1005), 1.05);
    }

    #[test]
    fn poster_url_joins_cdn_and_path() {
        assert_eq!(
            poster_url("https://image.tmdb.org/", "/abc.jpg"),
            "https://image.tmdb.org/t/p/w500/abc.jpg"
        );
    }

    #[test]
    fn poster_is_base64() {
        assert_eq!(encode_poster(b"\x89PNG"), "iVBORw==");
    }

    #[test]
    fn release_date_handles_blank_values() {
        assert_eq!(release_date(None).unwrap(), None);
        assert_eq!(release_date(Some("")).unwrap(), None);
        assert_eq!(
            release_date(Some("1999-10-15")).unwrap(),
            Some(jiff::civil::date(1999, 10, 15))
        );
        assert!(release_date(Some("October 1999")).is_err());
    }

    #[test]
    fn rating_buckets() {
        assert_eq!(rating(8.4, 27000), Rating::Excellent);
        assert_eq!(rating(6.1, 10), Rating::VeryGood);
        assert_eq!(rating(0.5, 3), Rating::VeryLow);
        assert_eq!(rating(7.0, 0), Rating::NoRating);
    }

    #[tokio::test]
    async fn language_lookup_is_exact() {
        let db = crate::db::memory().await;

        assert!(language_id(&db, Some("en")).await.unwrap().is_some());
        assert_eq!(language_id(&db, Some("EN")).await.unwrap(), None);
        assert_eq!(language_id(&db, Some("xx")).await.unwrap(), None);
        assert_eq!(language_id(&db, None).await.unwrap(), None);
    }
}
