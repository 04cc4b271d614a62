//! Feed endpoint.

use crate::error::Result;
use crate::services::feed::{FeedService, DEFAULT_LIMIT};
use actix_web::{web, HttpRequest, HttpResponse};
use serde::Deserialize;

/// Pagination query. Parsed permissively: values are accepted as raw
/// strings and anything that is not a non-negative integer falls back to
/// the default instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct FeedQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

impl FeedQuery {
    pub fn offset(&self) -> usize {
        parse_or(self.offset.as_deref(), 0)
    }

    pub fn limit(&self) -> usize {
        parse_or(self.limit.as_deref(), DEFAULT_LIMIT)
    }
}

fn parse_or(value: Option<&str>, default: usize) -> usize {
    value
        .and_then(|v| v.trim().parse::<usize>().ok())
        .unwrap_or(default)
}

/// GET /api/v1/feed
///
/// Personalized when an `X-User-Id` header identifies the viewer,
/// reverse-chronological otherwise.
pub async fn get_feed(
    req: HttpRequest,
    feed: web::Data<FeedService>,
    query: web::Query<FeedQuery>,
) -> Result<HttpResponse> {
    let viewer = super::requester(&req);
    let page = feed.get_feed(viewer, query.offset(), query.limit()).await?;
    Ok(HttpResponse::Ok().json(page))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(offset: Option<&str>, limit: Option<&str>) -> FeedQuery {
        FeedQuery {
            offset: offset.map(|s| s.to_string()),
            limit: limit.map(|s| s.to_string()),
        }
    }

    #[test]
    fn missing_params_use_defaults() {
        let q = query(None, None);
        assert_eq!(q.offset(), 0);
        assert_eq!(q.limit(), DEFAULT_LIMIT);
    }

    #[test]
    fn numeric_params_parse() {
        let q = query(Some("20"), Some("10"));
        assert_eq!(q.offset(), 20);
        assert_eq!(q.limit(), 10);
    }

    #[test]
    fn garbage_params_fall_back_to_defaults() {
        let q = query(Some("abc"), Some("-5"));
        assert_eq!(q.offset(), 0);
        assert_eq!(q.limit(), DEFAULT_LIMIT);
    }
}
