//! End-to-end tests driving the router over an in-memory store.

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use nutriplan::{
    app::build_app,
    auth::JwtVerifier,
    catalog::FOOD_COLLECTION,
    state::AppState,
    store::Fields,
};

fn fields(value: Value) -> Fields {
    value.as_object().expect("object").clone()
}

struct TestApp {
    router: Router,
    state: AppState,
    verifier: JwtVerifier,
}

impl TestApp {
    fn new() -> Self {
        let state = AppState::fake();
        let verifier = JwtVerifier::from_config(&state.config.jwt);
        let router = build_app(state.clone());
        Self {
            router,
            state,
            verifier,
        }
    }

    async fn seed(&self, path: &str, id: &str, doc: Value) {
        self.state
            .store
            .set(path, id, fields(doc))
            .await
            .expect("seed doc");
    }

    async fn seed_chicken(&self) {
        self.seed(
            FOOD_COLLECTION,
            "pollo",
            json!({
                "nombre": "Pechuga de pollo",
                "categoria": "Carnes",
                "cantidad_base": 100,
                "proteinas": 31.0,
                "carbohidratos": 0,
                "grasas": 3.6
            }),
        )
        .await;
    }

    fn token(&self, uid: &str) -> String {
        self.verifier.sign(uid, None).expect("sign token")
    }

    async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(json) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(json.to_string()))
                .expect("request"),
            None => builder.body(Body::empty()).expect("request"),
        };

        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("response");
        let status = response.status();
        let bytes = response.into_body().collect().await.expect("body").to_bytes();
        let value = serde_json::from_slice(&bytes).unwrap_or(Value::String(
            String::from_utf8_lossy(&bytes).into_owned(),
        ));
        (status, value)
    }
}

fn chicken_plan_body(paciente_id: &str) -> Value {
    json!({
        "pacienteId": paciente_id,
        "nombre": "Plan corte",
        "tipo": "Recomposición",
        "objetivo": "Bajar grasa",
        "comidas": [
            {
                "nombre": "Comida",
                "alimentos": [{"refAlimento": "pollo", "cantidad": "200g"}]
            }
        ]
    })
}

#[tokio::test]
async fn health_is_public() {
    let app = TestApp::new();
    let (status, _) = app.request(Method::GET, "/api/health", None, None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn protected_routes_require_a_token() {
    let app = TestApp::new();
    let (status, _) = app.request(Method::GET, "/api/alimentos", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .request(Method::GET, "/api/planes/asignados", Some("garbage"), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn catalog_listing_returns_normalized_profiles() {
    let app = TestApp::new();
    app.seed_chicken().await;
    // A legacy record with singular field names and no base quantity.
    app.seed(
        FOOD_COLLECTION,
        "arroz",
        json!({"nombre": "Arroz", "proteina": 7.5, "carbohidrato": 77}),
    )
    .await;

    let token = app.token("nutri-1");
    let (status, body) = app
        .request(Method::GET, "/api/alimentos", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let list = body.as_array().expect("array");
    assert_eq!(list.len(), 2);
    let arroz = list.iter().find(|f| f["id"] == "arroz").expect("arroz");
    assert_eq!(arroz["proteinas"], json!(7.5));
    assert_eq!(arroz["cantidad_base"], json!(100.0));
}

#[tokio::test]
async fn create_and_read_plan_with_computed_totals() {
    let app = TestApp::new();
    app.seed_chicken().await;

    let nutri = app.token("nutri-1");
    let (status, created) = app
        .request(
            Method::POST,
            "/api/planes",
            Some(&nutri),
            Some(chicken_plan_body("paciente-1")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "create failed: {created}");
    assert!(created["id"].as_str().is_some());

    let patient = app.token("paciente-1");
    let (status, plans) = app
        .request(Method::GET, "/api/planes/asignados", Some(&patient), None)
        .await;
    assert_eq!(status, StatusCode::OK);

    let plans = plans.as_array().expect("array");
    assert_eq!(plans.len(), 1);
    let version = &plans[0]["versiones"]["recomposicion"];

    // 200g of chicken: 62g protein, 7.2g fat -> 62*4 + 7.2*9 = 312.8 kcal.
    let totals = &version["totales_diarios"];
    assert!((totals["proteinas"].as_f64().unwrap() - 62.0).abs() < 1e-9);
    assert!((totals["grasas"].as_f64().unwrap() - 7.2).abs() < 1e-9);
    assert!((totals["kcal"].as_f64().unwrap() - 312.8).abs() < 1e-9);
    assert_eq!(version["calorias"], totals["kcal"]);

    let item = &version["comidas"][0]["alimentos"][0];
    assert_eq!(item["nombre"], "Pechuga de pollo");
    assert_eq!(item["encontrado"], json!(true));

    assert!(plans[0]["fecha_asignacion"].as_i64().is_some());
}

#[tokio::test]
async fn plan_without_valid_foods_is_rejected() {
    let app = TestApp::new();
    // Catalog is empty: every reference fails to resolve.

    let token = app.token("nutri-1");
    let (status, body) = app
        .request(
            Method::POST,
            "/api/planes",
            Some(&token),
            Some(chicken_plan_body("paciente-1")),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.as_str().unwrap_or_default().contains("alimento"));

    // Nothing was persisted for the patient.
    let patient = app.token("paciente-1");
    let (_, plans) = app
        .request(Method::GET, "/api/planes/asignados", Some(&patient), None)
        .await;
    assert_eq!(plans.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn partially_invalid_plan_is_created_with_flagged_items() {
    let app = TestApp::new();
    app.seed_chicken().await;

    let body = json!({
        "pacienteId": "paciente-1",
        "nombre": "Plan mixto",
        "tipo": "Volumen",
        "comidas": [
            {
                "nombre": "Comida",
                "alimentos": [
                    {"refAlimento": "fantasma", "cantidad": "100g"},
                    {"refAlimento": "pollo", "cantidad": "100g"}
                ]
            }
        ]
    });
    let token = app.token("nutri-1");
    let (status, _) = app
        .request(Method::POST, "/api/planes", Some(&token), Some(body))
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let patient = app.token("paciente-1");
    let (_, plans) = app
        .request(Method::GET, "/api/planes/asignados", Some(&patient), None)
        .await;
    let items = plans[0]["versiones"]["volumen"]["comidas"][0]["alimentos"]
        .as_array()
        .expect("items")
        .clone();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["encontrado"], json!(false));
    assert_eq!(items[0]["nombre"], "No encontrado");
    assert_eq!(items[1]["encontrado"], json!(true));

    // Only the resolved item contributes to the totals.
    let totals = &plans[0]["versiones"]["volumen"]["totales_diarios"];
    assert!((totals["proteinas"].as_f64().unwrap() - 31.0).abs() < 1e-9);
}

#[tokio::test]
async fn nutritionist_deletes_a_patients_plan() {
    let app = TestApp::new();
    app.seed_chicken().await;

    let nutri = app.token("nutri-1");
    let (status, _) = app
        .request(
            Method::POST,
            "/api/planes",
            Some(&nutri),
            Some(chicken_plan_body("paciente-1")),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let patient = app.token("paciente-1");
    let (_, plans) = app
        .request(Method::GET, "/api/planes/asignados", Some(&patient), None)
        .await;
    let plan_id = plans[0]["id"].as_str().expect("plan id").to_string();

    let (status, _) = app
        .request(
            Method::DELETE,
            &format!("/api/planes/{plan_id}?pacienteId=paciente-1"),
            Some(&nutri),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (_, plans) = app
        .request(Method::GET, "/api/planes/asignados", Some(&patient), None)
        .await;
    assert_eq!(plans.as_array().map(Vec::len), Some(0));
}

#[tokio::test]
async fn global_plan_view_tags_owning_patients() {
    let app = TestApp::new();
    app.seed_chicken().await;

    let nutri = app.token("nutri-1");
    for paciente in ["paciente-1", "paciente-2"] {
        let (status, _) = app
            .request(
                Method::POST,
                "/api/planes",
                Some(&nutri),
                Some(chicken_plan_body(paciente)),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
    }

    let (status, body) = app
        .request(
            Method::GET,
            "/api/nutricionista/todos-los-planes",
            Some(&nutri),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let mut owners: Vec<String> = body
        .as_array()
        .expect("array")
        .iter()
        .map(|p| p["pacienteId"].as_str().unwrap().to_string())
        .collect();
    owners.sort();
    assert_eq!(owners, vec!["paciente-1", "paciente-2"]);
}

#[tokio::test]
async fn profile_roundtrip_with_default_creation() {
    let app = TestApp::new();
    let token = app
        .verifier
        .sign("paciente-9", Some("leo@test.dev"))
        .unwrap();

    let (status, profile) = app
        .request(Method::GET, "/api/perfil", Some(&token), None)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(profile["nombre"], "leo");
    assert!(profile["creadoEn"].as_i64().is_some());

    let (status, updated) = app
        .request(
            Method::PUT,
            "/api/perfil",
            Some(&token),
            Some(json!({"perfil_nutricional": {"peso": 81.5}})),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["perfil_nutricional"]["peso"], json!(81.5));
}
