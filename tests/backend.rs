//! End-to-end tests against an in-process backend.

use std::sync::{Arc, Mutex};

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::{json, Value};
use tokio::net::TcpListener;

use mottooth_lib::{
    client::ApiError,
    commands::{self, Format},
    config::AppConfig,
    dashboard,
    error::{Alert, AppError, ErrorCategory},
    i18n::Locale,
    models::{LocationForm, LocationPayload, RegisterForm},
    session::SessionError,
    storage::{TOKEN_KEY, USERNAME_KEY, USER_ID_KEY},
    AppState,
};

const TOKEN: &str = "tok-1";

#[derive(Clone, Default)]
struct Backend {
    /// `Authorization` header of every request, in arrival order
    auth_headers: Arc<Mutex<Vec<Option<String>>>>,
    created_locations: Arc<Mutex<Vec<Value>>>,
    deleted_locations: Arc<Mutex<Vec<i64>>>,
}

impl Backend {
    fn record(&self, headers: &HeaderMap) -> bool {
        let auth = headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let ok = auth.as_deref() == Some(format!("Bearer {}", TOKEN).as_str());
        self.auth_headers.lock().unwrap().push(auth);
        ok
    }

    fn last_auth(&self) -> Option<String> {
        self.auth_headers.lock().unwrap().last().cloned().flatten()
    }
}

fn unauthorized() -> Response {
    (StatusCode::UNAUTHORIZED, Json(json!({ "message": "token expired" }))).into_response()
}

async fn login(Json(body): Json<Value>) -> Response {
    if body["username"] == "ana" && body["password"] == "secret" {
        Json(json!({ "token": TOKEN, "idFuncionario": 3, "nome": "Ana Souza", "cargo": "Operadora" }))
            .into_response()
    } else {
        unauthorized()
    }
}

async fn me(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    Json(json!({ "idFuncionario": 3, "nome": "Ana Souza", "email": "ana@mottu.com" })).into_response()
}

async fn motos(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    Json(json!({
        "content": [
            { "id": 10, "placa": "ABC1D23", "clienteId": 1, "modeloMotoId": 2, "modeloNome": "Pop 110i", "fabricante": "Honda" },
            { "id": 11, "placa": "XYZ9A87", "clienteId": 1, "modeloMotoId": 3 }
        ],
        "totalElements": 2
    }))
    .into_response()
}

async fn moto(State(backend): State<Backend>, headers: HeaderMap, Path(id): Path<i64>) -> Response {
    if !backend.record(&headers) {
        return unauthorized();
    }
    if id != 10 {
        return (StatusCode::NOT_FOUND, Json(json!({ "message": "Moto não encontrada" }))).into_response();
    }
    Json(json!({ "id": 10, "placa": "ABC1D23", "clienteId": 1, "modeloMotoId": 2 })).into_response()
}

async fn beacons(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(&headers);
    Json(json!([
        { "id": 1, "uuid": "B-10", "bateria": 80.0, "motoId": 10 },
        { "id": 2, "uuid": "B-99", "bateria": 15 }
    ]))
    .into_response()
}

async fn locations(State(backend): State<Backend>, headers: HeaderMap) -> Response {
    backend.record(&headers);
    Json(json!([
        { "id": 1, "posicaoX": 1.0, "posicaoY": 2.0, "dataHora": "2024-05-01T10:00:00", "motoId": 10, "patioId": 1, "nomePatio": "Norte" },
        { "id": 2, "posicaoX": 3.0, "posicaoY": 4.0, "dataHora": "2024-05-01T09:00:00", "motoId": 10, "patioId": 2, "nomePatio": "Sul" },
        { "id": 3, "posicaoX": 5.0, "posicaoY": 6.0, "dataHora": "2024-05-02T08:00:00", "motoId": 11, "patioId": 2, "nomePatio": "Sul" }
    ]))
    .into_response()
}

async fn create_location(State(backend): State<Backend>, Json(body): Json<Value>) -> StatusCode {
    backend.created_locations.lock().unwrap().push(body);
    StatusCode::CREATED
}

async fn location(Path(id): Path<i64>) -> Response {
    if id != 1 {
        return StatusCode::NOT_FOUND.into_response();
    }
    Json(json!({ "id": 1, "posicaoX": 1.0, "posicaoY": 2.0, "motoId": 10, "patioId": 1, "nomePatio": "Norte" }))
        .into_response()
}

async fn update_location(Path(id): Path<i64>, Json(body): Json<Value>) -> Json<Value> {
    let mut updated = body;
    updated["id"] = json!(id);
    updated["dataHora"] = json!("2024-05-03T12:00:00");
    Json(updated)
}

async fn delete_location(State(backend): State<Backend>, Path(id): Path<i64>) -> StatusCode {
    backend.deleted_locations.lock().unwrap().push(id);
    StatusCode::NO_CONTENT
}

async fn register(Json(body): Json<Value>) -> Response {
    if body["email"] == "taken@mottu.com" {
        return (StatusCode::BAD_REQUEST, Json(json!({ "error": "duplicate key" }))).into_response();
    }
    StatusCode::CREATED.into_response()
}

async fn spawn(router: Router) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

async fn start() -> (Backend, String) {
    let backend = Backend::default();
    let router = Router::new()
        .route("/api/auth/login", post(login))
        .route("/api/auth/me", get(me))
        .route("/api/motos", get(motos))
        .route("/api/motos/:id", get(moto))
        .route("/api/beacons", get(beacons))
        .route("/api/localizacoes", get(locations).post(create_location))
        .route(
            "/api/localizacoes/:id",
            get(location).put(update_location).delete(delete_location),
        )
        .route("/api/usuarios", post(register))
        .with_state(backend.clone());
    let url = spawn(router).await;
    (backend, url)
}

fn app(url: &str, dir: &tempfile::TempDir) -> AppState {
    let config = AppConfig {
        api_base_url: url.to_string(),
        data_dir: dir.path().to_path_buf(),
        ..AppConfig::default()
    };
    AppState::init(config, Some("pt-BR")).unwrap()
}

#[tokio::test]
async fn login_persists_token_and_authorizes_later_requests() {
    let (backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = app(&url, &dir);

    let out = commands::login(&mut state, " ana ", "secret").await.unwrap();
    assert_eq!(out, "Bem-vindo! Ana Souza");
    assert_eq!(state.storage.get_item(TOKEN_KEY).unwrap().as_deref(), Some(TOKEN));
    assert_eq!(state.storage.get_item(USER_ID_KEY).unwrap().as_deref(), Some("3"));
    assert_eq!(state.storage.get_item(USERNAME_KEY).unwrap().as_deref(), Some("ana"));

    let motos = state.api.motos().list().await.unwrap();
    assert_eq!(motos.len(), 2);
    assert_eq!(backend.last_auth().as_deref(), Some("Bearer tok-1"));
}

#[tokio::test]
async fn wrong_password_is_invalid_credentials() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = app(&url, &dir);

    let err = commands::login(&mut state, "ana", "nope").await.unwrap_err();
    assert!(matches!(err, AppError::Session(SessionError::InvalidCredentials)));
    assert_eq!(Alert::for_error(&err, Locale::PtBr).message, "Credenciais inválidas.");
    assert_eq!(state.storage.get_item(TOKEN_KEY).unwrap(), None);
}

#[tokio::test]
async fn unauthorized_response_clears_stored_credentials() {
    let (backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);
    state.storage.set_item(TOKEN_KEY, "stale").unwrap();
    state.storage.set_item(USER_ID_KEY, "3").unwrap();
    state.storage.set_item(USERNAME_KEY, "ana").unwrap();

    let err = state.api.motos().list().await.unwrap_err();
    assert_eq!(err.status(), Some(401));
    assert_eq!(state.storage.get_item(TOKEN_KEY).unwrap(), None);
    assert_eq!(state.storage.get_item(USER_ID_KEY).unwrap(), None);
    assert_eq!(state.storage.get_item(USERNAME_KEY).unwrap().as_deref(), Some("ana"));
    assert!(!state.session.is_authenticated());

    let _ = state.api.motos().list().await;
    assert_eq!(backend.last_auth(), None);
}

#[tokio::test]
async fn restore_refreshes_profile_from_backend() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = app(&url, &dir);
    state.storage.set_item(TOKEN_KEY, TOKEN).unwrap();

    let out = commands::whoami(&mut state, Format::Text).await.unwrap();
    assert_eq!(out, "Ana Souza <ana@mottu.com> #3");
}

#[tokio::test]
async fn restore_without_token_reports_no_session() {
    let (backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = app(&url, &dir);

    let out = commands::whoami(&mut state, Format::Text).await.unwrap();
    assert_eq!(out, "Nenhuma sessão ativa.");
    assert!(backend.auth_headers.lock().unwrap().is_empty());
}

#[tokio::test]
async fn restore_keeps_stored_profile_when_backend_is_down() {
    let router = Router::new().route(
        "/api/auth/me",
        get(|| async { StatusCode::SERVICE_UNAVAILABLE }),
    );
    let url = spawn(router).await;
    let dir = tempfile::tempdir().unwrap();
    let mut state = app(&url, &dir);
    state.storage.set_item(TOKEN_KEY, TOKEN).unwrap();
    state.storage.set_item(USER_ID_KEY, "3").unwrap();
    state.storage.set_item(USERNAME_KEY, "ana").unwrap();

    let user = state.session.restore().await.unwrap().cloned().unwrap();
    assert_eq!(user.id_funcionario, Some(3));
    assert_eq!(user.username.as_deref(), Some("ana"));
    assert!(state.session.is_authenticated());
}

#[tokio::test]
async fn server_errors_surface_as_generic_alert() {
    let router = Router::new().route(
        "/api/beacons",
        get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "java.lang.NullPointerException") }),
    );
    let url = spawn(router).await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);

    let err = state.api.beacons().list().await.unwrap_err();
    assert!(matches!(err, ApiError::Http { status: 500, .. }));
    assert_eq!(err.backend_message(), Some("java.lang.NullPointerException"));

    let err = AppError::from(err);
    assert!(err.category().is_transient());
    assert_eq!(
        Alert::for_error(&err, Locale::PtBr).message,
        "Servidor indisponível. Tente novamente."
    );
}

#[tokio::test]
async fn not_found_alert_shows_backend_message() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);
    state.storage.set_item(TOKEN_KEY, TOKEN).unwrap();

    let err = commands::motos_get(&state, 404, Format::Text).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::NotFound);
    assert_eq!(
        Alert::for_error(&err, Locale::PtBr),
        Alert::new("Não encontrado", "Moto não encontrada")
    );
}

#[tokio::test]
async fn connection_refused_is_a_network_error() {
    let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);

    let err = AppError::from(state.api.locations().list().await.unwrap_err());
    assert_eq!(err.category(), ErrorCategory::Network);
}

#[tokio::test]
async fn home_uses_newest_location_and_map_uses_last_listed() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);
    state.storage.set_item(TOKEN_KEY, TOKEN).unwrap();

    let home = dashboard::load_home(&state.api, Locale::PtBr).await.unwrap();
    let zones: Vec<_> = home
        .zones
        .iter()
        .map(|z| (z.id, z.label.as_str(), z.motos, z.beacons))
        .collect();
    assert_eq!(zones, vec![(1, "Norte", 1, 1), (2, "Sul", 1, 0)]);
    assert_eq!((home.totals.motos, home.totals.beacons), (2, 1));
    assert_eq!(home.recent_motos[0].id, 11);
    assert_eq!(home.recent_beacons[0].uuid, "B-99");

    let map = dashboard::load_map(&state.api, Locale::PtBr).await.unwrap();
    let zones: Vec<_> = map.zones.iter().map(|z| (z.id, z.motos, z.beacons)).collect();
    assert_eq!(zones, vec![(2, 2, 1)]);
}

#[tokio::test]
async fn home_fails_as_a_whole_when_one_request_fails() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);

    // No token: /api/motos answers 401 while the other lists succeed
    let err = dashboard::load_home(&state.api, Locale::PtBr).await.unwrap_err();
    assert_eq!(err.status(), Some(401));
}

#[tokio::test]
async fn fleet_listing_joins_beacons_and_filters() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);
    state.storage.set_item(TOKEN_KEY, TOKEN).unwrap();

    let out = commands::motos_list(&state, Some("honda"), Format::Text).await.unwrap();
    assert_eq!(out, "#10 ABC1D23 • Honda Pop 110i • beacon B-10");
}

#[tokio::test]
async fn location_for_moto_without_beacon_is_rejected_before_posting() {
    let (backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);

    let form = LocationForm {
        posicao_x: "1,5".into(),
        posicao_y: "2".into(),
        moto_id: "11".into(),
        patio_id: 2,
    };
    let err = commands::locations_create(&state, &form).await.unwrap_err();
    assert_eq!(err.category(), ErrorCategory::Validation);
    assert_eq!(
        Alert::for_error(&err, Locale::PtBr).message,
        "Esta moto não possui beacon vinculado."
    );
    assert!(backend.created_locations.lock().unwrap().is_empty());
}

#[tokio::test]
async fn location_is_posted_and_zone_refreshed() {
    let (backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);

    let form = LocationForm {
        posicao_x: "1,5".into(),
        posicao_y: "-2".into(),
        moto_id: "10".into(),
        patio_id: 2,
    };
    let out = commands::locations_create(&state, &form).await.unwrap();
    assert_eq!(out, "Sucesso: Localização criada.\nSul — 2 motos • 1 beacons");

    let created = backend.created_locations.lock().unwrap();
    assert_eq!(
        created.as_slice(),
        &[json!({ "posicaoX": 1.5, "posicaoY": -2.0, "motoId": 10, "patioId": 2 })]
    );
}

#[tokio::test]
async fn duplicate_email_registration_reports_email_in_use() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);

    let mut form = RegisterForm {
        full_name: "Ana Souza".into(),
        email: "ana@mottu.com".into(),
        username: "ana".into(),
        password: "secret1".into(),
        confirm: "secret1".into(),
    };
    assert_eq!(
        commands::register(&state, &form).await.unwrap(),
        "Cadastro realizado! Faça login para continuar."
    );

    form.email = "taken@mottu.com".into();
    let err = commands::register(&state, &form).await.unwrap_err();
    assert_eq!(
        Alert::for_error(&err, Locale::PtBr).message,
        "Já existe um usuário com este e-mail."
    );
}

#[tokio::test]
async fn single_location_can_be_read_updated_and_deleted() {
    let (backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);
    let api = state.api.locations();

    let found = api.get(1).await.unwrap();
    assert_eq!((found.moto_id, found.patio_id), (10, 1));
    assert_eq!(found.nome_patio.as_deref(), Some("Norte"));

    let err = api.get(2).await.unwrap_err();
    assert_eq!(err.status(), Some(404));

    let payload = LocationPayload {
        posicao_x: 7.5,
        posicao_y: 8.0,
        moto_id: 10,
        patio_id: 2,
    };
    let updated = api.update(1, &payload).await.unwrap();
    assert_eq!(updated.id, 1);
    assert_eq!(updated.patio_id, 2);
    assert_eq!(updated.posicao_x, 7.5);
    assert!(updated.observed_at().is_some());

    api.delete(1).await.unwrap();
    assert_eq!(*backend.deleted_locations.lock().unwrap(), vec![1]);
}

#[tokio::test]
async fn fractional_battery_levels_do_not_break_the_dashboard() {
    let (_backend, url) = start().await;
    let dir = tempfile::tempdir().unwrap();
    let state = app(&url, &dir);

    let beacons = state.api.beacons().list().await.unwrap();
    assert_eq!(beacons[0].bateria, Some(80));

    let map = dashboard::load_map(&state.api, Locale::PtBr).await.unwrap();
    assert_eq!(map.totals.beacons, 1);
}
