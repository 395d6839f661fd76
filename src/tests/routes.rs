#[cfg(test)]
mod tests {
    use axum::Router;
    use http::StatusCode;
    use httpmock::Method::{GET, POST};
    use httpmock::MockServer;
    use serde_json::{json, Value};

    use crate::config::settings::CorsConfig;
    use crate::server::server::router;
    use crate::tests::common::{build_reqwest_client, spawn_axum, spotify_tracks_body, test_settings, test_state, TMDB_API_KEY};

    const TOKEN_PATH: &str = "/api/token";

    /// Router wired to stub upstreams; upstreams unused by a test can point anywhere.
    async fn app(tmdb: &MockServer, auth: &MockServer, api: &MockServer) -> Router {
        let state = test_state(tmdb.url("/3"), auth.url(TOKEN_PATH), api.url("/v1")).await;
        router(state, &test_settings())
    }

    #[tokio::test]
    async fn health_reports_up() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/health", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body["status"], "UP");

        handle.abort();
    }

    #[tokio::test]
    async fn popular_movies_passes_results_through() {
        let tmdb = MockServer::start_async().await;
        let tmdb_mock = tmdb
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/3/movie/popular")
                    .query_param("api_key", TMDB_API_KEY)
                    .query_param("language", "en-US")
                    .query_param("page", "1");
                then.status(200).json_body(json!({
                    "page": 1,
                    "results": [{"id": 550, "title": "Fight Club"}, {"id": 13, "title": "Forrest Gump"}],
                    "total_pages": 500
                }));
            })
            .await;
        let (handle, addr) = spawn_axum(app(&tmdb, &tmdb, &tmdb).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/movies/popular", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!([{"id": 550, "title": "Fight Club"}, {"id": 13, "title": "Forrest Gump"}]));
        assert_eq!(tmdb_mock.calls_async().await, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn popular_movies_forwards_page_and_rejects_out_of_range() {
        let tmdb = MockServer::start_async().await;
        let page_two = tmdb
            .mock_async(|when, then| {
                when.method(GET).path("/3/movie/popular").query_param("page", "2");
                then.status(200).json_body(json!({"page": 2}));
            })
            .await;
        let (handle, addr) = spawn_axum(app(&tmdb, &tmdb, &tmdb).await).await;
        let client = build_reqwest_client();

        let response = client
            .get(format!("http://{}/movies/popular?page=2", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        // no results field upstream
        assert_eq!(response.json::<Value>().await.unwrap(), json!([]));
        assert_eq!(page_two.calls_async().await, 1);

        let response = client
            .get(format!("http://{}/movies/popular?page=0", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        handle.abort();
    }

    #[tokio::test]
    async fn popular_movies_upstream_failure_is_bad_gateway() {
        let tmdb = MockServer::start_async().await;
        tmdb.mock_async(|when, then| {
            when.method(GET).path("/3/movie/popular");
            then.status(401).json_body(json!({"status_message": "Invalid API key"}));
        })
        .await;
        let (handle, addr) = spawn_axum(app(&tmdb, &tmdb, &tmdb).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/movies/popular", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("tmdb"));

        handle.abort();
    }

    #[tokio::test]
    async fn music_recommend_applies_defaults() {
        let auth = MockServer::start_async().await;
        let api = MockServer::start_async().await;
        auth.mock_async(|when, then| {
            when.method(POST).path(TOKEN_PATH);
            then.status(200).json_body(json!({"access_token": "abc123", "expires_in": 3600}));
        })
        .await;
        let api_mock = api
            .mock_async(|when, then| {
                when.method(GET)
                    .path("/v1/recommendations")
                    .query_param("seed_genres", "pop")
                    .query_param("target_valence", "0.9");
                then.status(200).json_body(spotify_tracks_body());
            })
            .await;
        let (handle, addr) = spawn_axum(app(&auth, &auth, &api).await).await;

        let response = build_reqwest_client()
            .post(format!("http://{}/music/recommend", addr))
            .json(&json!({}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        assert_eq!(body[1]["title"], "Levitating");
        assert_eq!(body[1]["artist"], "Dua Lipa");
        assert_eq!(body[1]["spotifyUrl"], "https://open.spotify.com/track/463CkQjx2Zk1yXoBuierM9");
        assert_eq!(body[1]["appleMusicUrl"], "https://music.apple.com/in/search?term=Levitating+Dua+Lipa");
        assert_eq!(body[1]["amazonMusicUrl"], "https://music.amazon.in/search/Levitating+Dua+Lipa");
        assert_eq!(api_mock.calls_async().await, 1);

        handle.abort();
    }

    #[tokio::test]
    async fn music_recommend_credential_failure_is_service_unavailable() {
        let auth = MockServer::start_async().await;
        let api = MockServer::start_async().await;
        auth.mock_async(|when, then| {
            when.method(POST).path(TOKEN_PATH);
            then.status(400).json_body(json!({"error": "invalid_client"}));
        })
        .await;
        let (handle, addr) = spawn_axum(app(&auth, &auth, &api).await).await;
        let client = build_reqwest_client();

        let response = client
            .post(format!("http://{}/music/recommend", addr))
            .json(&json!({"mood": "Sad", "genre": "Jazz"}))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("invalid_client"));

        // the server keeps serving other routes
        let response = client.get(format!("http://{}/food/recommend", addr)).send().await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        handle.abort();
    }

    #[tokio::test]
    async fn food_recommend_lists_all_items() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/food/recommend", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let body: Value = response.json().await.unwrap();
        let names: Vec<&str> = body
            .as_array()
            .unwrap()
            .iter()
            .map(|item| item["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Pizza", "Burger", "Pasta"]);
        assert_eq!(body[2]["category"], "Italian");

        handle.abort();
    }

    #[tokio::test]
    async fn food_compare_returns_prices_case_insensitively() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/food/compare/bUrGeR", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"swiggy": 120, "zomato": 100, "ubereats": 130}));

        handle.abort();
    }

    #[tokio::test]
    async fn food_compare_unknown_item_is_404() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/food/compare/sushi", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        let body: Value = response.json().await.unwrap();
        assert_eq!(body, json!({"error": "Food item not found"}));

        handle.abort();
    }

    #[tokio::test]
    async fn cors_allows_any_origin_by_default() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/food/recommend", addr))
            .header("origin", "http://localhost:3000")
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "*"
        );

        handle.abort();
    }

    #[tokio::test]
    async fn cors_with_origin_list_ignores_foreign_origins() {
        let upstream = MockServer::start_async().await;
        let state = test_state(upstream.url("/3"), upstream.url(TOKEN_PATH), upstream.url("/v1")).await;
        let mut settings = test_settings();
        settings.cors = CorsConfig {
            allowed_origins: vec!["http://a.example".to_owned()],
        };
        let (handle, addr) = spawn_axum(router(state, &settings)).await;
        let client = build_reqwest_client();

        let response = client
            .get(format!("http://{}/food/recommend", addr))
            .header("origin", "http://a.example")
            .send()
            .await
            .unwrap();
        assert_eq!(
            response.headers().get("access-control-allow-origin").unwrap(),
            "http://a.example"
        );

        let response = client
            .get(format!("http://{}/food/recommend", addr))
            .header("origin", "http://b.example")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().get("access-control-allow-origin").is_none());

        handle.abort();
    }

    #[tokio::test]
    async fn malformed_music_request_is_json_error() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;
        let client = build_reqwest_client();

        // no body, no content type
        let response = client
            .post(format!("http://{}/music/recommend", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNSUPPORTED_MEDIA_TYPE);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("application/json"));

        let response = client
            .post(format!("http://{}/music/recommend", addr))
            .header("content-type", "application/json")
            .body("{\"mood\": ")
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].is_string());

        handle.abort();
    }

    #[tokio::test]
    async fn non_numeric_page_is_json_error() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/movies/popular?page=abc", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(response.headers().get("content-type").unwrap(), "application/json");
        let body: Value = response.json().await.unwrap();
        assert!(body["error"].as_str().unwrap().contains("page"));

        handle.abort();
    }

    #[tokio::test]
    async fn metrics_route_exposes_registry() {
        let upstream = MockServer::start_async().await;
        let (handle, addr) = spawn_axum(app(&upstream, &upstream, &upstream).await).await;

        let response = build_reqwest_client()
            .get(format!("http://{}/metrics", addr))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let text = response.text().await.unwrap();
        assert!(text.contains("vibes_credential_cache_hits_total"));

        handle.abort();
    }
}
