//! Paginated JSON projections of the stats cache.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};

use super::server::SharedState;
use crate::cache::{Client, MinedWork, Payment, Quota};

/// Query parameters required by every paginated endpoint. Axum rejects
/// missing or non-integer values with a 400 before the handler runs.
#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct PaginationParams {
    page_number: u64,
    page_size: u64,
}

impl PaginationParams {
    /// Both parameters are 1-based; zero in either position is a client
    /// error.
    fn validate(self) -> Result<Self, StatusCode> {
        if self.page_number == 0 || self.page_size == 0 {
            return Err(StatusCode::BAD_REQUEST);
        }
        Ok(self)
    }
}

/// One page of data plus the total element count, so clients can lay out
/// page controls without a second request.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct PaginationPayload<T> {
    data: Vec<T>,
    count: usize,
}

/// Slice one page out of a snapshot. `count` is always the total length of
/// the snapshot; a page past the end yields empty data.
fn paginate<T>(items: Vec<T>, params: PaginationParams) -> PaginationPayload<T> {
    let count = items.len();
    let first = (params.page_number - 1).saturating_mul(params.page_size);
    let last = first.saturating_add(params.page_size).min(count as u64);
    let first = first.min(last);

    let data = items
        .into_iter()
        .skip(first as usize)
        .take((last - first) as usize)
        .collect();

    PaginationPayload { data, count }
}

/// Handler for "GET /blocks": blocks mined by the pool.
pub(crate) async fn blocks(
    State(state): State<SharedState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginationPayload<MinedWork>>, StatusCode> {
    let params = params.validate()?;
    Ok(Json(paginate(state.cache.mined_work(), params)))
}

/// Handler for "GET /rewardquotas": pending reward payment quotas.
pub(crate) async fn reward_quotas(
    State(state): State<SharedState>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginationPayload<Quota>>, StatusCode> {
    let params = params.validate()?;
    Ok(Json(paginate(state.cache.reward_quotas(), params)))
}

/// Handler for "GET /account/{account_id}/blocks": blocks mined by one
/// account. The account filter applies before counting, so `count` is the
/// account's total rather than the pool's.
pub(crate) async fn blocks_by_account(
    State(state): State<SharedState>,
    Path(account_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginationPayload<MinedWork>>, StatusCode> {
    let params = params.validate()?;

    let work: Vec<MinedWork> = state
        .cache
        .mined_work()
        .into_iter()
        .filter(|w| w.account_id == account_id)
        .collect();

    Ok(Json(paginate(work, params)))
}

/// Handler for "GET /account/{account_id}/clients": connected mining
/// clients belonging to the account.
pub(crate) async fn clients_by_account(
    State(state): State<SharedState>,
    Path(account_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginationPayload<Client>>, StatusCode> {
    let params = params.validate()?;

    let clients = state
        .cache
        .clients()
        .remove(&account_id)
        .unwrap_or_default();

    Ok(Json(paginate(clients, params)))
}

/// Handler for "GET /account/{account_id}/payments/pending": unpaid
/// payments due to the account.
pub(crate) async fn pending_payments_by_account(
    State(state): State<SharedState>,
    Path(account_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginationPayload<Payment>>, StatusCode> {
    let params = params.validate()?;

    let payments = state
        .cache
        .pending_payments()
        .remove(&account_id)
        .unwrap_or_default();

    Ok(Json(paginate(payments, params)))
}

/// Handler for "GET /account/{account_id}/payments/archived": payments made
/// to the account.
pub(crate) async fn archived_payments_by_account(
    State(state): State<SharedState>,
    Path(account_id): Path<String>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<PaginationPayload<Payment>>, StatusCode> {
    let params = params.validate()?;

    let payments = state
        .cache
        .archived_payments()
        .remove(&account_id)
        .unwrap_or_default();

    Ok(Json(paginate(payments, params)))
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Arc;

    use axum::body::{to_bytes, Body};
    use axum::http::{header, Request, StatusCode};
    use axum::Router;
    use serde_json::Value;
    use tower::ServiceExt;

    use super::super::server::build_router;
    use super::*;
    use crate::cache::PoolCache;

    fn params(page_number: u64, page_size: u64) -> PaginationParams {
        PaginationParams {
            page_number,
            page_size,
        }
    }

    #[test]
    fn test_paginate_middle_page() {
        let page = paginate((0..7).collect(), params(2, 3));
        assert_eq!(page.data, vec![3, 4, 5]);
        assert_eq!(page.count, 7);
    }

    #[test]
    fn test_paginate_short_last_page() {
        let page = paginate((0..7).collect(), params(3, 3));
        assert_eq!(page.data, vec![6]);
        assert_eq!(page.count, 7);
    }

    #[test]
    fn test_paginate_past_the_end() {
        let page = paginate((0..7).collect::<Vec<_>>(), params(4, 3));
        assert!(page.data.is_empty());
        assert_eq!(page.count, 7);
    }

    #[test]
    fn test_paginate_empty_snapshot() {
        let page = paginate(Vec::<u32>::new(), params(1, 10));
        assert!(page.data.is_empty());
        assert_eq!(page.count, 0);
    }

    #[test]
    fn test_paginate_bounds_property() {
        for count in 0..10usize {
            for page_number in 1..5u64 {
                for page_size in 1..5u64 {
                    let page = paginate((0..count).collect(), params(page_number, page_size));

                    let first = (page_number - 1) * page_size;
                    let want = (count as u64).saturating_sub(first).min(page_size) as usize;
                    assert_eq!(page.data.len(), want, "count={count} page={page_number} size={page_size}");
                    assert_eq!(page.count, count);
                }
            }
        }
    }

    fn mined(height: u32, account_id: &str) -> MinedWork {
        MinedWork {
            block_height: height,
            block_url: format!("https://example.org/block/{height}"),
            mined_by: "worker1".to_string(),
            miner: "antminer-dr3".to_string(),
            account_id: account_id.to_string(),
            confirmed: height % 2 == 0,
        }
    }

    fn seeded_router() -> Router {
        let cache = PoolCache::default();

        cache.set_mined_work(vec![
            mined(100, "acct-a"),
            mined(101, "acct-b"),
            mined(102, "acct-a"),
            mined(103, "acct-a"),
            mined(104, "acct-b"),
            mined(105, "acct-a"),
            mined(106, "acct-a"),
        ]);

        cache.set_reward_quotas(vec![
            Quota {
                account_id: "acct-a".to_string(),
                percent: 62.5,
            },
            Quota {
                account_id: "acct-b".to_string(),
                percent: 37.5,
            },
        ]);

        cache.set_clients(HashMap::from([(
            "acct-a".to_string(),
            vec![Client {
                miner: "whatsminer-d1".to_string(),
                ip: "192.0.2.7".to_string(),
                hash_rate: "44 TH/s".to_string(),
            }],
        )]));

        cache.set_pending_payments(HashMap::from([(
            "acct-a".to_string(),
            vec![
                Payment {
                    work_height: 100,
                    amount: 5_000_000,
                    paid_on_height: 0,
                },
                Payment {
                    work_height: 102,
                    amount: 3_000_000,
                    paid_on_height: 0,
                },
            ],
        )]));

        cache.set_archived_payments(HashMap::from([(
            "acct-b".to_string(),
            vec![Payment {
                work_height: 90,
                amount: 7_000_000,
                paid_on_height: 95,
            }],
        )]));

        build_router(Arc::new(cache))
    }

    async fn get(router: Router, uri: &str) -> (StatusCode, Value) {
        let response = router
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        if status == StatusCode::OK {
            assert_eq!(
                response.headers()[header::CONTENT_TYPE],
                "application/json"
            );
        }

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap_or(Value::Null)
        };

        (status, body)
    }

    #[tokio::test]
    async fn test_blocks_endpoint() {
        let router = seeded_router();
        let (status, body) = get(router, "/blocks?pageNumber=3&pageSize=3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 7);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0]["blockheight"], 106);
    }

    #[tokio::test]
    async fn test_blocks_page_past_the_end() {
        let router = seeded_router();
        let (status, body) = get(router, "/blocks?pageNumber=9&pageSize=5").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 7);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_blocks_rejects_bad_params() {
        for uri in [
            "/blocks",
            "/blocks?pageNumber=1",
            "/blocks?pageSize=5",
            "/blocks?pageNumber=one&pageSize=5",
            "/blocks?pageNumber=1.5&pageSize=5",
            "/blocks?pageNumber=0&pageSize=5",
            "/blocks?pageNumber=1&pageSize=0",
            "/blocks?pageNumber=-1&pageSize=5",
        ] {
            let (status, _) = get(seeded_router(), uri).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "uri: {uri}");
        }
    }

    #[tokio::test]
    async fn test_reward_quotas_endpoint() {
        let router = seeded_router();
        let (status, body) = get(router, "/rewardquotas?pageNumber=1&pageSize=10").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["accountid"], "acct-a");
        assert_eq!(body["data"][0]["percent"], 62.5);
    }

    #[tokio::test]
    async fn test_account_blocks_filter_before_count() {
        let router = seeded_router();
        let (status, body) = get(
            router,
            "/account/acct-a/blocks?pageNumber=1&pageSize=3",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        // Five of the seven blocks belong to acct-a; count reflects the
        // filtered total, not the pool-wide one.
        assert_eq!(body["count"], 5);
        let data = body["data"].as_array().unwrap();
        assert_eq!(data.len(), 3);
        assert_eq!(data[0]["blockheight"], 100);
        assert_eq!(data[2]["blockheight"], 103);
    }

    #[tokio::test]
    async fn test_account_clients_endpoint() {
        let router = seeded_router();
        let (status, body) = get(
            router.clone(),
            "/account/acct-a/clients?pageNumber=1&pageSize=10",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["hashrate"], "44 TH/s");

        // Unknown accounts paginate an empty collection.
        let (status, body) = get(
            router,
            "/account/nobody/clients?pageNumber=1&pageSize=10",
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert!(body["data"].as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_account_payment_endpoints() {
        let router = seeded_router();
        let (status, body) = get(
            router.clone(),
            "/account/acct-a/payments/pending?pageNumber=2&pageSize=1",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 2);
        assert_eq!(body["data"][0]["workheight"], 102);
        assert_eq!(body["data"][0]["paidonheight"], 0);

        let (status, body) = get(
            router,
            "/account/acct-b/payments/archived?pageNumber=1&pageSize=10",
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["data"][0]["paidonheight"], 95);
    }
}
