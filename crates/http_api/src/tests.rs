use axum::body::Body;
use axum::http::{Request, StatusCode};
use tower::util::ServiceExt;

use app_api::AppContext;
use gather_app::{AppPaths, AppState, ensure_app_data_dir};

use crate::HttpState;

#[tokio::test]
async fn health_answers_without_auth() {
    let temp_dir = tempfile::tempdir().expect("tempdir");
    let paths = AppPaths::new(temp_dir.path().to_path_buf());
    ensure_app_data_dir(&paths).expect("ensure app data dir");
    let app_state = AppState::new(paths.db_path);
    app_state.setup_db().expect("setup db");

    let context = AppContext {
        app_state,
        app_data_dir: paths.app_data_dir,
    };
    let state = HttpState::new(context, "testtoken".to_string());
    let app = crate::router(state);

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/health")
                .body(Body::empty())
                .expect("request"),
        )
        .await
        .expect("response");

    assert_eq!(response.status(), StatusCode::OK);
}
