use axum::{
    Router,
    body::Body,
    http::{Request, StatusCode, header},
    response::Response,
};
use bookstore::api;
use bookstore::auth;
use bookstore::config::Config;
use bookstore::db;
use bookstore::infrastructure::AppState;
use bookstore::models::user;
use sea_orm::{ActiveModelTrait, DatabaseConnection, EntityTrait, PaginatorTrait, Set};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db, Config::for_tests())
}

async fn create_user(db: &DatabaseConnection, email: &str, password: &str) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    user::ActiveModel {
        username: Set(email.to_string()),
        email: Set(email.to_string()),
        first_name: Set("Reader".to_string()),
        password_hash: Set(auth::hash_password(password).unwrap()),
        is_staff: Set(false),
        is_superuser: Set(false),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

async fn send(app: Router, req: Request<Body>) -> Response {
    app.oneshot(req).await.unwrap()
}

fn form_request(uri: &str, form: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap()
}

fn get_request(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut req = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        req = req.header(header::COOKIE, cookie);
    }
    req.body(Body::empty()).unwrap()
}

/// `session=<token>` from the response, if it set one.
fn session_cookie(res: &Response) -> Option<String> {
    res.headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with("session="))
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

async fn json_body(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_login_sets_session() {
    let state = setup_test_state().await;
    create_user(state.db(), "reader@example.com", "s3cret").await;
    let app = api::api_router(state);

    let res = send(
        app.clone(),
        form_request("/login/", "email=reader%40example.com&password=s3cret"),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/mis-libros/");
    let cookie = session_cookie(&res).expect("login should start a session");

    let res = send(app, get_request("/cuenta/", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["user"]["email"], "reader@example.com");
}

#[tokio::test]
async fn test_login_failure_is_indistinct() {
    let state = setup_test_state().await;
    create_user(state.db(), "reader@example.com", "s3cret").await;
    let app = api::api_router(state);

    for form in [
        "email=reader%40example.com&password=wrong",
        "email=nobody%40example.com&password=s3cret",
    ] {
        let res = send(app.clone(), form_request("/login/", form)).await;
        assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
        assert!(session_cookie(&res).is_none());
        let body = json_body(res).await;
        assert_eq!(body["template"], "login.html");
        assert_eq!(body["messages"][0]["text"], "Incorrect email or password.");
        assert!(body["context"]["form"].get("password").is_none());
    }
}

#[tokio::test]
async fn test_register_creates_account_and_signs_in() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let app = api::api_router(state);

    let res = send(
        app.clone(),
        form_request(
            "/registro/",
            "full_name=Ana+Reader&email=ana%40example.com&password=pw&confirm_password=pw",
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/");
    let cookie = session_cookie(&res).unwrap();

    let saved = user::Entity::find().one(&db).await.unwrap().unwrap();
    assert_eq!(saved.username, "ana@example.com");
    assert_eq!(saved.first_name, "Ana Reader");
    assert!(!saved.is_superuser);
    assert!(auth::verify_password("pw", &saved.password_hash).unwrap());

    // Signed-in users are sent away from the sign-up page
    let res = send(app, get_request("/registro/", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/mis-libros/");
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    create_user(&db, "taken@example.com", "pw").await;
    let app = api::api_router(state);

    let res = send(
        app.clone(),
        form_request(
            "/registro/",
            "full_name=X&email=taken%40example.com&password=pw&confirm_password=pw",
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await;
    assert_eq!(
        body["context"]["errors"]["email"][0],
        "This email address is already registered."
    );

    let res = send(
        app,
        form_request(
            "/registro/",
            "full_name=X&email=not-an-email&password=pw&confirm_password=other",
        ),
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await;
    assert!(body["context"]["errors"].get("email").is_some());
    assert!(body["context"]["errors"].get("confirm_password").is_some());

    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 1);
}

#[tokio::test]
async fn test_logout_clears_session() {
    let state = setup_test_state().await;
    let user_id = create_user(state.db(), "reader@example.com", "pw").await;
    let app = api::api_router(state);

    let token = auth::create_jwt(user_id, "test-secret", 1).unwrap();
    let res = send(
        app,
        get_request("/logout/", Some(&format!("session={}", token))),
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(res.headers()[header::LOCATION], "/");
    let cleared = session_cookie(&res).expect("logout should expire the cookie");
    assert_eq!(cleared, "session=");
}

#[tokio::test]
async fn test_bad_tokens_are_anonymous() {
    let state = setup_test_state().await;
    let user_id = create_user(state.db(), "reader@example.com", "pw").await;
    let app = api::api_router(state);

    let forged = auth::create_jwt(user_id, "another-secret", 1).unwrap();
    let expired = auth::create_jwt(user_id, "test-secret", -2).unwrap();

    for token in [forged, expired, "garbage".to_string()] {
        let res = send(
            app.clone(),
            get_request("/cuenta/", Some(&format!("session={}", token))),
        )
        .await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER);
        assert_eq!(res.headers()[header::LOCATION], "/login/");
    }
}

#[tokio::test]
async fn test_bearer_token_is_accepted() {
    let state = setup_test_state().await;
    let user_id = create_user(state.db(), "reader@example.com", "pw").await;
    let app = api::api_router(state);

    let token = auth::create_jwt(user_id, "test-secret", 1).unwrap();
    let req = Request::builder()
        .uri("/cuenta/")
        .header(header::AUTHORIZATION, format!("Bearer {}", token))
        .body(Body::empty())
        .unwrap();
    let res = send(app, req).await;
    assert_eq!(res.status(), StatusCode::OK);
}

#[tokio::test]
async fn test_deleted_user_session_is_anonymous() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let user_id = create_user(&db, "reader@example.com", "pw").await;
    let cookie = format!(
        "session={}",
        auth::create_jwt(user_id, "test-secret", 1).unwrap()
    );
    user::Entity::delete_by_id(user_id).exec(&db).await.unwrap();
    let app = api::api_router(state);

    let res = send(app, get_request("/", Some(&cookie))).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["user"], Value::Null);
}
