use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use serde_json::json;
use tokio::{net::TcpListener, sync::Mutex};

use super::*;
use crate::query_state::QueryState;
use shared::domain::FilterField;

#[derive(Clone, Default)]
struct CapturedQueries {
    params: Arc<Mutex<Vec<HashMap<String, String>>>>,
}

async fn handle_bills(
    State(state): State<CapturedQueries>,
    Query(params): Query<HashMap<String, String>>,
) -> Json<serde_json::Value> {
    state.params.lock().await.push(params);
    Json(json!({
        "bills": [{
            "bill_id": "PRC_A1",
            "bill_no": "2200001",
            "title": "국가재정법 일부개정법률안",
            "proposal_date": "2025-02-03",
            "proposer_kind": "의원",
            "proposer_name": "홍길동",
            "proc_stage_cd": "소관위심사",
            "pass_gubn": "계류의안",
            "proc_date": null,
            "general_result": null,
            "link_url": null,
            "vote_count": 0,
            "vote_for": 0,
            "vote_against": 0,
            "vote_abstain": 0,
            "vote_absent": 0,
            "member_count": 0
        }],
        "pagination": {"page": 1, "per_page": 20, "total": 1, "pages": 1}
    }))
}

async fn spawn_server(app: Router) -> String {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    format!("http://{addr}")
}

#[tokio::test]
async fn fetch_bills_sends_state_as_query_parameters() {
    let captured = CapturedQueries::default();
    let app = Router::new()
        .route("/api/bills", get(handle_bills))
        .with_state(captured.clone());
    let api = HttpBillApi::new(spawn_server(app).await);

    let mut state = QueryState::default();
    state.set_filter(FilterField::Month, "2025-02");
    state.set_filter(FilterField::Search, "재정");
    let page = api.fetch_bills(&state.to_query()).await.expect("fetch");

    assert_eq!(page.bills.len(), 1);
    assert_eq!(page.pagination.pages, 1);
    assert_eq!(page.bills[0].bill_id.as_str(), "PRC_A1");

    let params = captured.params.lock().await;
    let sent = &params[0];
    assert_eq!(sent.get("page").map(String::as_str), Some("1"));
    assert_eq!(sent.get("per_page").map(String::as_str), Some("20"));
    assert_eq!(sent.get("sort_by").map(String::as_str), Some("proposal_date"));
    assert_eq!(sent.get("order").map(String::as_str), Some("desc"));
    assert_eq!(sent.get("month").map(String::as_str), Some("2025-02"));
    assert_eq!(sent.get("search").map(String::as_str), Some("재정"));
    assert!(!sent.contains_key("pass_gubn"));
    assert!(!sent.contains_key("proc_stage"));
}

#[tokio::test]
async fn error_envelopes_map_to_api_errors_regardless_of_status() {
    let app = Router::new()
        .route(
            "/api/bills",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "db unavailable"})),
                )
            }),
        )
        .route(
            "/api/stats",
            get(|| async { Json(json!({"error": "stats query failed"})) }),
        );
    let api = HttpBillApi::new(spawn_server(app).await);

    let err = api
        .fetch_bills(&QueryState::default().to_query())
        .await
        .expect_err("must fail");
    assert!(matches!(err, QueryError::Api(ref msg) if msg == "db unavailable"));

    let err = api.fetch_stats().await.expect_err("must fail");
    assert!(matches!(err, QueryError::Api(ref msg) if msg == "stats query failed"));
}

#[tokio::test]
async fn fetch_bill_detail_parses_party_and_member_breakdowns() {
    async fn handle_detail(Path(bill_id): Path<String>) -> Json<serde_json::Value> {
        Json(json!({
            "bill_id": bill_id,
            "bill_no": "2200042",
            "title": "감사원법 일부개정법률안",
            "proposal_date": "2025-01-20",
            "proposer_kind": "의원",
            "proposer_name": "김철수",
            "proc_stage_cd": "본회의의결",
            "pass_gubn": "처리의안",
            "proc_date": "2025-03-02",
            "general_result": "원안가결",
            "link_url": "https://likms.assembly.go.kr/bill/42",
            "created_at": "2025-03-02T18:00:00",
            "updated_at": null,
            "vote_count": 3,
            "vote_for": 2,
            "vote_against": 1,
            "vote_abstain": 0,
            "vote_absent": 0,
            "member_count": 3,
            "party_votes": [
                {"party_name": "더불어민주당", "total": 2, "vote_for": 2,
                 "vote_against": 0, "vote_abstain": 0, "vote_absent": 0},
                {"party_name": "국민의힘", "total": 1, "vote_for": 0,
                 "vote_against": 1, "vote_abstain": 0, "vote_absent": 0}
            ],
            "member_votes_by_result": {
                "찬성": [
                    {"member_name": "김철수", "party_name": "더불어민주당",
                     "district_name": "서울 종로구", "vote_result": "찬성",
                     "member_id": "M001", "photo_url": null},
                    {"member_name": "이영희", "party_name": "더불어민주당",
                     "district_name": null, "vote_result": "찬성",
                     "member_id": null, "photo_url": null}
                ],
                "반대": [
                    {"member_name": "박민수", "party_name": "국민의힘",
                     "district_name": "부산 해운대구", "vote_result": "반대",
                     "member_id": "M017", "photo_url": null}
                ],
                "기권": [],
                "불참": []
            }
        }))
    }

    let app = Router::new().route("/api/bills/:bill_id", get(handle_detail));
    let api = HttpBillApi::new(spawn_server(app).await);

    let detail = api
        .fetch_bill(&BillId::new("PRC_B7"))
        .await
        .expect("detail");
    assert_eq!(detail.bill_id.as_str(), "PRC_B7");
    assert!(detail.tally.has_votes());
    assert_eq!(detail.party_votes.len(), 2);
    assert_eq!(detail.member_votes_by_result.favor.len(), 2);
    assert_eq!(detail.member_votes_by_result.against.len(), 1);
    assert!(detail.member_votes_by_result.absent.is_empty());
}

#[tokio::test]
async fn option_feeds_parse_label_count_pairs() {
    let app = Router::new()
        .route(
            "/api/months",
            get(|| async {
                Json(json!({"months": [
                    {"month": "2025-03", "month_label": "2025년 03월", "bill_count": 210},
                    {"month": "2025-02", "month_label": "2025년 02월", "bill_count": 180}
                ]}))
            }),
        )
        .route(
            "/api/pass_gubn_options",
            get(|| async {
                Json(json!({"options": [
                    {"pass_gubn": "계류의안", "bill_count": 900},
                    {"pass_gubn": "처리의안", "bill_count": 400}
                ]}))
            }),
        )
        .route(
            "/api/proc_stage_options",
            get(|| async {
                Json(json!({"options": [
                    {"proc_stage_cd": "체계자구심사", "bill_count": 40},
                    {"proc_stage_cd": "접수", "bill_count": 300}
                ]}))
            }),
        );
    let api = HttpBillApi::new(spawn_server(app).await);

    let months = api.months().await.expect("months");
    assert_eq!(months[0].month, "2025-03");
    assert_eq!(months[0].bill_count, 210);

    let pass = api.pass_gubn_options().await.expect("pass_gubn");
    assert_eq!(pass[0].pass_gubn, "계류의안");

    let stages = api.proc_stage_options().await.expect("proc_stage");
    assert_eq!(stages.len(), 2);
}

#[tokio::test]
async fn bootstrap_tolerates_individual_feed_failures() {
    let app = Router::new()
        .route(
            "/api/stats",
            get(|| async {
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({"error": "stats query failed"})),
                )
            }),
        )
        .route(
            "/api/months",
            get(|| async {
                Json(json!({"months": [
                    {"month": "2025-01", "month_label": "2025년 01월", "bill_count": 50}
                ]}))
            }),
        )
        .route(
            "/api/pass_gubn_options",
            get(|| async { Json(json!({"options": []})) }),
        )
        .route(
            "/api/proc_stage_options",
            get(|| async {
                Json(json!({"options": [
                    {"proc_stage_cd": "미분류", "bill_count": 3},
                    {"proc_stage_cd": "접수", "bill_count": 11}
                ]}))
            }),
        );
    let api = HttpBillApi::new(spawn_server(app).await);

    let bootstrap = load_bootstrap(&api, &api).await;
    assert!(bootstrap.stats.is_none());
    assert_eq!(bootstrap.months.len(), 1);
    assert!(bootstrap.pass_gubn_options.is_empty());
    // Promoted stages are reordered ahead of the long tail.
    assert_eq!(bootstrap.proc_stage_options[0].proc_stage_cd, "접수");
    assert_eq!(bootstrap.proc_stage_options[1].proc_stage_cd, "미분류");
}
