use crate::helpers::{
    mock_with_snapshot, spawn_mock_app, MockClimateAccess, LATEST_DATE, MOST_ACTIVE, WINDOW_START,
};
use axum::http::StatusCode;
use climate_api::{ActiveStationPolicy, DateBounds, Error, ErrorBody, TemperatureSummary};
use serde_json::from_slice;
use time::macros::date;

#[tokio::test]
async fn startup_policy_resolves_station_once() {
    // mock_with_snapshot allows exactly one most_active_station call
    let mut climate_db = mock_with_snapshot();
    climate_db
        .expect_temperature_observations()
        .withf(|station, window| {
            station == MOST_ACTIVE && window.start == WINDOW_START && window.end == LATEST_DATE
        })
        .times(2)
        .returning(|_, _| Ok(vec![77.0, 80.0]));

    let test_app = spawn_mock_app(climate_db, ActiveStationPolicy::Startup).await;

    for _ in 0..2 {
        let (status, body) = test_app.get("/api/v1.0/tobs").await;
        assert_eq!(status, StatusCode::OK);
        let tobs: Vec<f64> = from_slice(&body).unwrap();
        assert_eq!(tobs, vec![77.0, 80.0]);
    }
}

#[tokio::test]
async fn per_request_policy_resolves_station_on_every_call() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_latest_date()
        .times(1)
        .returning(|| Ok(Some(LATEST_DATE)));
    // Once for the snapshot, then once per request
    climate_db
        .expect_most_active_station()
        .times(3)
        .returning(|| Ok(Some(String::from("USC00513117"))));
    climate_db
        .expect_temperature_observations()
        .withf(|station, _| station == "USC00513117")
        .times(2)
        .returning(|_, _| Ok(vec![71.0]));

    let test_app = spawn_mock_app(climate_db, ActiveStationPolicy::PerRequest).await;

    for _ in 0..2 {
        let (status, body) = test_app.get("/api/v1.0/tobs").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_ref(), b"[71.0]");
    }
}

#[tokio::test]
async fn per_request_policy_reports_emptied_dataset() {
    let mut climate_db = MockClimateAccess::new();
    climate_db
        .expect_latest_date()
        .returning(|| Ok(Some(LATEST_DATE)));
    let mut calls = 0;
    climate_db.expect_most_active_station().returning(move || {
        calls += 1;
        if calls == 1 {
            Ok(Some(MOST_ACTIVE.to_string()))
        } else {
            Ok(None)
        }
    });
    climate_db.expect_temperature_observations().never();

    let test_app = spawn_mock_app(climate_db, ActiveStationPolicy::PerRequest).await;

    let (status, body) = test_app.get("/api/v1.0/tobs").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = from_slice(&body).unwrap();
    assert_eq!(body.error, "Dataset has no measurements");
}

#[tokio::test]
async fn precipitation_queries_the_snapshot_window() {
    let mut climate_db = mock_with_snapshot();
    climate_db
        .expect_precipitation()
        .withf(|window| window.start == date!(2016 - 08 - 23) && window.end == LATEST_DATE)
        .times(1)
        .returning(|_| Ok(vec![]));

    let test_app = spawn_mock_app(climate_db, ActiveStationPolicy::Startup).await;

    let (status, body) = test_app.get("/api/v1.0/precipitation").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"[]");
}

#[tokio::test]
async fn range_routes_pass_parsed_bounds() {
    let mut climate_db = mock_with_snapshot();
    climate_db
        .expect_temperature_summary()
        .withf(|bounds| {
            *bounds
                == DateBounds {
                    start: date!(2010 - 01 - 01),
                    end: None,
                }
        })
        .times(1)
        .returning(|_| {
            Ok(TemperatureSummary::rounded(
                Some(53.0),
                Some(73.097_953),
                Some(87.0),
            ))
        });
    climate_db
        .expect_temperature_summary()
        .withf(|bounds| {
            *bounds
                == DateBounds {
                    start: date!(2010 - 01 - 01),
                    end: Some(date!(2017 - 08 - 23)),
                }
        })
        .times(1)
        .returning(|_| {
            Ok(TemperatureSummary::rounded(
                Some(53.0),
                Some(73.097_953),
                Some(87.0),
            ))
        });

    let test_app = spawn_mock_app(climate_db, ActiveStationPolicy::Startup).await;

    let (status, body) = test_app.get("/api/v1.0/2010-01-01").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"[53.0,73.1,87.0]");

    let (status, body) = test_app.get("/api/v1.0/2010-01-01/2017-08-23").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_ref(), b"[53.0,73.1,87.0]");
}

#[tokio::test]
async fn invalid_dates_never_reach_the_store() {
    let mut climate_db = mock_with_snapshot();
    climate_db.expect_temperature_summary().never();

    let test_app = spawn_mock_app(climate_db, ActiveStationPolicy::Startup).await;

    for uri in [
        "/api/v1.0/2010-13-40",
        "/api/v1.0/2017-08-23/2017-13-01",
        "/api/v1.0/not-a-date/2017-08-23",
    ] {
        let (status, _) = test_app.get(uri).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
    }
}

#[tokio::test]
async fn store_failures_become_internal_errors() {
    let mut climate_db = mock_with_snapshot();
    climate_db
        .expect_stations()
        .times(1)
        .returning(|| Err(Error::MissingTable(String::from("station"))));

    let test_app = spawn_mock_app(climate_db, ActiveStationPolicy::Startup).await;

    let (status, body) = test_app.get("/api/v1.0/stations").await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: ErrorBody = from_slice(&body).unwrap();
    assert_eq!(body.error, "Dataset is missing table: station");
}

#[tokio::test]
async fn empty_dataset_fails_snapshot() {
    let mut climate_db = MockClimateAccess::new();
    climate_db.expect_latest_date().returning(|| Ok(None));
    climate_db.expect_most_active_station().never();

    let result =
        climate_api::AppState::new(std::sync::Arc::new(climate_db), ActiveStationPolicy::Startup)
            .await;
    assert!(matches!(result, Err(Error::EmptyDataset)));
}
