use std::{num::NonZeroUsize, sync::Arc, time::Duration};

use axum::{extract::Path, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use client_core::{
    CountrySource, DetailController, DetailViewState, ListConfig, ListController, ListViewState,
    RestCountriesSource,
};
use serde_json::{json, Value};
use tokio::{net::TcpListener, sync::watch, time};

fn countries() -> Vec<Value> {
    [
        ("CHL", "Chile"),
        ("TCD", "Chad"),
        ("CHN", "China"),
        ("CUB", "Cuba"),
        ("CAN", "Canada"),
    ]
    .into_iter()
    .map(|(code, name)| {
        json!({
            "cca3": code,
            "name": { "common": name, "official": format!("Republic of {name}") },
            "flags": { "png": format!("https://flags.test/{code}.png") },
            "capital": [format!("{name} City")],
            "population": 1000,
        })
    })
    .collect()
}

async fn spawn_server() -> anyhow::Result<String> {
    std::env::set_var("NO_PROXY", "127.0.0.1,localhost");
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    let app = Router::new()
        .route("/all", get(|| async { Json(Value::Array(countries())) }))
        .route(
            "/name/:query",
            get(|Path(query): Path<String>| async move {
                let needle = query.to_lowercase();
                let found: Vec<Value> = countries()
                    .into_iter()
                    .filter(|c| {
                        c["name"]["common"]
                            .as_str()
                            .is_some_and(|name| name.to_lowercase().contains(&needle))
                    })
                    .collect();
                if found.is_empty() {
                    (StatusCode::NOT_FOUND, Json(json!({ "status": 404 }))).into_response()
                } else {
                    Json(Value::Array(found)).into_response()
                }
            }),
        )
        .route(
            "/alpha/:code",
            get(|Path(code): Path<String>| async move {
                match countries().into_iter().find(|c| c["cca3"] == code.as_str()) {
                    Some(country) => Json(country).into_response(),
                    None => (StatusCode::NOT_FOUND, Json(json!({ "status": 404 }))).into_response(),
                }
            }),
        );
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok(format!("http://{addr}/"))
}

async fn wait_for<T: Clone>(rx: &mut watch::Receiver<T>, done: impl FnMut(&T) -> bool) -> T {
    time::timeout(Duration::from_secs(5), rx.wait_for(done))
        .await
        .expect("state settled in time")
        .expect("controller alive")
        .clone()
}

fn names(state: &ListViewState) -> Vec<String> {
    match state {
        ListViewState::Success { page, .. } => {
            page.iter().map(|country| country.common_name.clone()).collect()
        }
        other => panic!("expected a listing, got {other:?}"),
    }
}

#[tokio::test]
async fn browse_search_page_and_open_detail() {
    let base_url = spawn_server().await.expect("spawn server");
    let source: Arc<dyn CountrySource> = Arc::new(
        RestCountriesSource::new(&base_url, Duration::from_secs(5)).expect("source"),
    );
    let list = ListController::new(
        Arc::clone(&source),
        ListConfig {
            page_size: NonZeroUsize::new(2).expect("non-zero"),
            debounce: Duration::from_millis(20),
        },
    );
    let mut states = list.subscribe();

    let first = wait_for(&mut states, |s| matches!(s, ListViewState::Success { .. })).await;
    assert_eq!(names(&first), vec!["Canada", "Chad"]);
    if let ListViewState::Success { page, .. } = &first {
        assert_eq!(page[0].capital, "Canada City");
        assert_eq!(page[0].population, 1000);
    }
    assert!(matches!(
        first,
        ListViewState::Success { current_page: 1, total_pages: 3, total_countries: 5, .. }
    ));

    assert!(list.go_to_page(3));
    assert_eq!(names(&list.state()), vec!["Cuba"]);
    assert!(!list.next_page());

    list.on_query_change("ch");
    let searched = wait_for(&mut states, |s| {
        matches!(s, ListViewState::Success { total_countries: 3, .. })
    })
    .await;
    assert_eq!(names(&searched), vec!["Chad", "Chile"]);
    assert!(!list.is_searching());

    list.on_query_change("atlantis");
    let empty = wait_for(&mut states, |s| {
        matches!(s, ListViewState::Success { total_countries: 0, .. })
    })
    .await;
    assert!(matches!(
        empty,
        ListViewState::Success { current_page: 1, total_pages: 1, .. }
    ));

    list.clear_query();
    wait_for(&mut states, |s| {
        matches!(s, ListViewState::Success { total_countries: 5, .. })
    })
    .await;
    assert_eq!(list.query(), "");

    let detail = DetailController::new(Arc::clone(&source), Some("CHL".to_string()));
    let mut detail_states = detail.subscribe();
    let shown = wait_for(&mut detail_states, |s| !matches!(s, DetailViewState::Loading)).await;
    match shown {
        DetailViewState::Success { country } => {
            assert_eq!(country.common_name, "Chile");
            assert_eq!(country.capital, "Chile City");
            assert_eq!(country.flag_url, "https://flags.test/CHL.png");
            assert_eq!(country.region, "N/A");
        }
        other => panic!("expected detail, got {other:?}"),
    }
}

#[tokio::test]
async fn unknown_code_and_dead_service_surface_user_messages() {
    let base_url = spawn_server().await.expect("spawn server");
    let source: Arc<dyn CountrySource> = Arc::new(
        RestCountriesSource::new(&base_url, Duration::from_secs(5)).expect("source"),
    );
    let detail = DetailController::new(Arc::clone(&source), Some("XYZ".to_string()));
    let mut detail_states = detail.subscribe();
    let shown = wait_for(&mut detail_states, |s| !matches!(s, DetailViewState::Loading)).await;
    assert_eq!(
        shown,
        DetailViewState::Error {
            message: "The requested country could not be found.".to_string()
        }
    );

    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let dead_url = format!("http://{}/", listener.local_addr().expect("addr"));
    drop(listener);
    let dead: Arc<dyn CountrySource> = Arc::new(
        RestCountriesSource::new(&dead_url, Duration::from_secs(5)).expect("source"),
    );
    let list = ListController::new(dead, ListConfig::default());
    let mut states = list.subscribe();
    let failed = wait_for(&mut states, |s| matches!(s, ListViewState::Error { .. })).await;
    assert_eq!(
        failed,
        ListViewState::Error {
            message: "Connection error. Check your internet connection.".to_string()
        }
    );
}
