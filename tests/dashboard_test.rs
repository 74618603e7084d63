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
use bookstore::domain::Money;
use bookstore::infrastructure::AppState;
use bookstore::models::book::{BookFormat, BookInput, PublicationState};
use bookstore::models::genre::GenreInput;
use bookstore::models::{book, genre, library_entry, order, user};
use bookstore::services::purchase;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    Set,
};
use serde_json::Value;
use tower::util::ServiceExt; // for `oneshot`

async fn setup_test_state() -> AppState {
    let db = db::init_db("sqlite::memory:")
        .await
        .expect("Failed to init DB");
    AppState::new(db, Config::for_tests())
}

async fn create_user(db: &DatabaseConnection, email: &str, superuser: bool) -> i32 {
    let now = chrono::Utc::now().to_rfc3339();
    user::ActiveModel {
        username: Set(email.to_string()),
        email: Set(email.to_string()),
        first_name: Set("Test".to_string()),
        password_hash: Set("hash".to_string()),
        is_staff: Set(superuser),
        is_superuser: Set(superuser),
        created_at: Set(now.clone()),
        updated_at: Set(now),
        ..Default::default()
    }
    .insert(db)
    .await
    .unwrap()
    .id
}

async fn create_book(state: &AppState, title: &str, cents: i64) -> i32 {
    state
        .book_repo
        .create(BookInput {
            title: title.to_string(),
            description: String::new(),
            price: Money::from_cents(cents),
            cover_url: None,
            publication_state: PublicationState::Available,
            format: BookFormat::Ebook,
            release_date: None,
            duration_minutes: None,
            genre_ids: vec![],
            author_ids: vec![],
        })
        .await
        .unwrap()
        .id
}

fn session_cookie(user_id: i32) -> String {
    format!(
        "session={}",
        auth::create_jwt(user_id, "test-secret", 1).unwrap()
    )
}

async fn get(app: Router, uri: &str, cookie: &str) -> Response {
    let req = Request::builder()
        .uri(uri)
        .header(header::COOKIE, cookie)
        .body(Body::empty())
        .unwrap();
    app.oneshot(req).await.unwrap()
}

async fn post_form(app: Router, uri: &str, cookie: &str, form: &str) -> Response {
    let req = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::COOKIE, cookie)
        .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
        .body(Body::from(form.to_string()))
        .unwrap();
    app.oneshot(req).await.unwrap()
}

fn location(res: &Response) -> &str {
    res.headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
}

async fn json_body(res: Response) -> Value {
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_dashboard_is_for_superusers_only() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let reader = create_user(&db, "reader@example.com", false).await;
    let app = api::api_router(state);

    for uri in [
        "/dashboard/pedidos/",
        "/dashboard/libros/",
        "/dashboard/generos/agregar/",
        "/dashboard/usuarios/",
    ] {
        let res = get(app.clone(), uri, &session_cookie(reader)).await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&res), "/", "{}", uri);

        let res = get(app.clone(), uri, "").await;
        assert_eq!(res.status(), StatusCode::SEE_OTHER, "{}", uri);
        assert_eq!(location(&res), "/login/", "{}", uri);
    }

    // Writes are refused too
    let res = post_form(
        app,
        "/dashboard/generos/agregar/",
        &session_cookie(reader),
        "name=Horror&description=",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(genre::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_book_list_search() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    create_book(&state, "Dune", 999).await;
    create_book(&state, "Catch 22", 1200).await;
    let app = api::api_router(state);

    let res = get(app.clone(), "/dashboard/libros/?q=9.99", &session_cookie(admin)).await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["template"], "dashboard/ver_libros.html");
    assert_eq!(body["context"]["search_query"], "9.99");
    assert_eq!(body["context"]["books"].as_array().unwrap().len(), 1);
    assert_eq!(body["context"]["books"][0]["title"], "Dune");

    let body = json_body(get(app.clone(), "/dashboard/libros/?q=22", &session_cookie(admin)).await).await;
    assert!(body["context"]["books"].as_array().unwrap().is_empty());

    let body = json_body(get(app, "/dashboard/libros/", &session_cookie(admin)).await).await;
    assert_eq!(body["context"]["books"].as_array().unwrap().len(), 2);
    assert_eq!(body["context"]["search_query"], Value::Null);
}

#[tokio::test]
async fn test_add_book_with_genres() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    let sf = state
        .genre_repo
        .create(GenreInput {
            name: "Science Fiction".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let classics = state
        .genre_repo
        .create(GenreInput {
            name: "Classics".to_string(),
            description: String::new(),
        })
        .await
        .unwrap();
    let app = api::api_router(state.clone());
    let cookie = session_cookie(admin);

    let form = format!(
        "title=Dune&description=Sand&price=9.99&publication_state=available&format=ebook\
         &release_date=1965-08-01&duration_minutes=&cover_url=&genres={}&genres={}",
        sf.id, classics.id
    );
    let res = post_form(app, "/dashboard/libros/agregar/", &cookie, &form).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard/libros/");

    let saved = book::Entity::find()
        .filter(book::Column::Title.eq("Dune"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(saved.price_cents, 999);

    let dto = state.book_repo.find_by_id(saved.id).await.unwrap().unwrap();
    let names: Vec<&str> = dto.genres.iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, vec!["Classics", "Science Fiction"]);
}

#[tokio::test]
async fn test_invalid_book_form_is_redisplayed() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    let app = api::api_router(state);

    let res = post_form(
        app,
        "/dashboard/libros/agregar/",
        &session_cookie(admin),
        "title=&price=9.999&publication_state=gone&format=ebook&genres=42",
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await;
    assert_eq!(body["template"], "dashboard/form_generico.html");
    assert_eq!(body["context"]["page_title"], "Add New Book");
    let errors = &body["context"]["errors"];
    assert!(errors.get("title").is_some());
    assert!(errors.get("price").is_some());
    assert!(errors.get("publication_state").is_some());
    assert!(errors.get("genres").is_some());
    assert!(errors.get("format").is_none());
    assert_eq!(
        body["messages"][0]["text"],
        "There was an error. Please review the form."
    );
    assert_eq!(book::Entity::find().count(&db).await.unwrap(), 0);
}

#[tokio::test]
async fn test_genre_crud() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    let cookie = session_cookie(admin);
    let app = api::api_router(state);

    let res = post_form(
        app.clone(),
        "/dashboard/generos/agregar/",
        &cookie,
        "name=Horror&description=Scary",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let saved = genre::Entity::find().one(&db).await.unwrap().unwrap();

    let res = post_form(
        app.clone(),
        &format!("/dashboard/generos/editar/{}/", saved.id),
        &cookie,
        "name=Terror&description=Scarier",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let updated = genre::Entity::find_by_id(saved.id).one(&db).await.unwrap().unwrap();
    assert_eq!(updated.name, "Terror");

    let res = get(
        app.clone(),
        &format!("/dashboard/generos/borrar/{}/", saved.id),
        &cookie,
    )
    .await;
    assert_eq!(res.status(), StatusCode::OK);
    let body = json_body(res).await;
    assert_eq!(body["template"], "dashboard/borrar_generico.html");
    assert_eq!(body["context"]["cancel_url"], "/dashboard/generos/");

    let res = post_form(
        app.clone(),
        &format!("/dashboard/generos/borrar/{}/", saved.id),
        &cookie,
        "",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard/generos/");
    assert_eq!(genre::Entity::find().count(&db).await.unwrap(), 0);

    let res = get(app, "/dashboard/generos/editar/9999/", &cookie).await;
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_superuser_cannot_be_deleted() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    let other_admin = create_user(&db, "root@example.com", true).await;
    let cookie = session_cookie(admin);
    let app = api::api_router(state);

    let uri = format!("/dashboard/usuarios/borrar/{}/", other_admin);
    let res = get(app.clone(), &uri, &cookie).await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard/usuarios/");

    let res = post_form(app, &uri, &cookie, "").await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard/usuarios/");
    assert!(
        user::Entity::find_by_id(other_admin)
            .one(&db)
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn test_deleting_user_removes_library_and_orders() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    let reader = create_user(&db, "reader@example.com", false).await;
    let book_id = create_book(&state, "Dune", 999).await;
    purchase(&db, reader, book_id).await.unwrap();
    let app = api::api_router(state);

    let res = post_form(
        app,
        &format!("/dashboard/usuarios/borrar/{}/", reader),
        &session_cookie(admin),
        "",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&res), "/dashboard/usuarios/");

    assert!(user::Entity::find_by_id(reader).one(&db).await.unwrap().is_none());
    assert_eq!(library_entry::Entity::find().count(&db).await.unwrap(), 0);
    assert_eq!(order::Entity::find().count(&db).await.unwrap(), 0);
    assert!(book::Entity::find_by_id(book_id).one(&db).await.unwrap().is_some());
}

#[tokio::test]
async fn test_admin_creates_user_with_unique_email() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    let cookie = session_cookie(admin);
    let app = api::api_router(state);

    let res = post_form(
        app.clone(),
        "/dashboard/usuarios/agregar/",
        &cookie,
        "first_name=Ana&email=ana%40example.com&password=secret&is_staff=on",
    )
    .await;
    assert_eq!(res.status(), StatusCode::SEE_OTHER);
    let ana = user::Entity::find()
        .filter(user::Column::Email.eq("ana@example.com"))
        .one(&db)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(ana.username, "ana@example.com");
    assert!(ana.is_staff);
    assert!(!ana.is_superuser);
    assert_ne!(ana.password_hash, "secret");

    let res = post_form(
        app,
        "/dashboard/usuarios/agregar/",
        &cookie,
        "first_name=Ana&email=ANA%40example.com&password=other",
    )
    .await;
    assert_eq!(res.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_body(res).await;
    assert_eq!(
        body["context"]["errors"]["email"][0],
        "This email address is already registered."
    );
    assert_eq!(user::Entity::find().count(&db).await.unwrap(), 2);
}

#[tokio::test]
async fn test_order_list_shows_customer() {
    let state = setup_test_state().await;
    let db = state.db().clone();
    let admin = create_user(&db, "admin@example.com", true).await;
    let reader = create_user(&db, "reader@example.com", false).await;
    let book_id = create_book(&state, "Dune", 999).await;
    purchase(&db, reader, book_id).await.unwrap();
    let app = api::api_router(state);

    let body = json_body(get(app, "/dashboard/pedidos/?q=reader", &session_cookie(admin)).await).await;
    assert_eq!(body["template"], "dashboard/ver_pedidos.html");
    let orders = body["context"]["orders"].as_array().unwrap();
    assert_eq!(orders.len(), 1);
    assert_eq!(orders[0]["user_email"], "reader@example.com");
    assert_eq!(orders[0]["total_paid"], "9.99");
    assert_eq!(orders[0]["payment_state"], "completed");
}
