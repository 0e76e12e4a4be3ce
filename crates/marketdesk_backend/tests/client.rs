use axum::extract::Path;
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use marketdesk_backend::BackendClient;
use marketdesk_backend::chartdata::ChartData;
use marketdesk_backend::levels::{Levels, LevelsParams};
use marketdesk_backend::snapshots::Snapshots;
use marketdesk_shared_models::{LevelName, fields};
use serde_json::{Value, json};
use tokio::test;

async fn levels(Path(file): Path<String>) -> Result<Json<Value>, StatusCode> {
    match file.as_str() {
        "levels_NIFTY_50.json" => Ok(Json(json!({
            "symbol": "NIFTY 50",
            "PDH": 24950.0, "PDL": 24700.0,
            "CWH": 25010.5, "CWL": 24650.0,
            "PWH": null, "PWL": 24500.0,
            "PMH": 25200.0, "PML": 24100.0
        }))),
        _ => Err(StatusCode::NOT_FOUND),
    }
}

async fn spawn_backend() -> String {
    let app = Router::new()
        .route(
            "/api/snapshots",
            get(|| async {
                Json(json!({
                    "NIFTY": [
                        "| 14-08-2025 09:20 | NIFTY     | EXP:2025-08-14 | LTP:24800.1 | ATM: 24800 |",
                        "| 14-08-2025 09:21 | NIFTY     | EXP:2025-08-14 | LTP:24812.4 | ATM: 24800 |"
                    ],
                    "SENSEX": []
                }))
            }),
        )
        .route(
            "/api/chartdata",
            get(|| async {
                Json(json!({
                    "NIFTY": [
                        {"time": "09:20", "ltp": 100.0, "ltp_ma": 0.0, "net_oi_change": -1500.0},
                        {"time": "09:25", "ltp": 110.0, "ltp_ma": 104.0, "net_oi_change": 800.0}
                    ]
                }))
            }),
        )
        .route("/api/levels/:file", get(levels));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{addr}")
}

#[test]
pub async fn fetch_snapshots() {
    let client = BackendClient::new(&spawn_backend().await).unwrap();

    let response = client
        .call0::<Snapshots>()
        .await
        .expect("Failed to fetch snapshots");

    assert_eq!(response["NIFTY"].len(), 2);
    assert!(response["NIFTY"][1].contains("LTP:24812.4"));
    assert!(response["SENSEX"].is_empty());
}

#[test]
pub async fn fetch_chartdata() {
    let client = BackendClient::new(&spawn_backend().await).unwrap();

    let response = client
        .call0::<ChartData>()
        .await
        .expect("Failed to fetch chart data");

    let nifty = &response["NIFTY"];
    assert_eq!(nifty.len(), 2);
    assert_eq!(nifty[0].time(), Some("09:20"));
    assert_eq!(nifty[0].field(fields::NET_OI_CHANGE), Some(-1500.0));
    assert_eq!(nifty[1].field(fields::LTP_MA), Some(104.0));
}

#[test]
pub async fn fetch_levels() {
    let client = BackendClient::new(&spawn_backend().await).unwrap();

    let levels = client
        .call::<Levels>(&LevelsParams::builder().file_key("NIFTY_50").build())
        .await
        .expect("Failed to fetch levels");

    assert_eq!(levels.get(LevelName::PriorDayHigh), Some(24950.0));
    assert_eq!(levels.get(LevelName::PriorWeekHigh), None);
}

#[test]
pub async fn missing_levels_file_is_an_error() {
    let client = BackendClient::new(&spawn_backend().await).unwrap();

    let err = client
        .call::<Levels>(&LevelsParams::builder().file_key("UNKNOWN").build())
        .await
        .expect_err("404 should surface as an error");

    assert_eq!(err.status(), Some(reqwest::StatusCode::NOT_FOUND));
}
