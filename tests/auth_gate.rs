//! HTTP-level tests for the authentication gate and the authorization entry
//! point: anonymous pass-through on public routes, uniform 401 bodies with
//! the bearer challenge on everything else.

use actix_web::http::header;
use actix_web::{test, web, App, HttpResponse};

use jobfind_auth::auth::{
    encode_access_token, AccessClaims, AuthContext, SigningKeys, TokenUser,
};
use jobfind_auth::error::{AppError, ErrorBody};
use jobfind_auth::middleware::JwtAuthentication;

fn test_keys() -> SigningKeys {
    SigningKeys::from_base64_secret("dGVzdC1zZWNyZXQta2V5LWF0LWxlYXN0LTMyLWNoYXJhY3RlcnMtbG9uZw==")
        .expect("Failed to build test keys")
}

fn test_user() -> TokenUser {
    TokenUser {
        id: 1,
        email: "admin@x.com".to_string(),
        name: "Admin".to_string(),
    }
}

async fn public_route() -> HttpResponse {
    HttpResponse::Ok().finish()
}

async fn protected_route(context: AuthContext) -> Result<HttpResponse, AppError> {
    let codes: Vec<&str> = context.authorities().iter().map(|a| a.as_str()).collect();
    Ok(HttpResponse::Ok().json(codes))
}

macro_rules! test_app {
    ($keys:expr) => {
        test::init_service(
            App::new()
                .wrap(JwtAuthentication::new($keys))
                .route("/public", web::get().to(public_route))
                .route("/protected", web::get().to(protected_route)),
        )
        .await
    };
}

#[tokio::test]
async fn anonymous_request_reaches_public_route() {
    let app = test_app!(test_keys());

    let req = test::TestRequest::get().uri("/public").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 200);
}

#[tokio::test]
async fn anonymous_request_to_protected_route_is_401() {
    let app = test_app!(test_keys());

    let req = test::TestRequest::get().uri("/protected").to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 401);
    assert_eq!(
        res.headers().get(header::WWW_AUTHENTICATE).unwrap(),
        "Bearer"
    );

    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.status_code, 401);
    assert_eq!(body.error, "Missing authentication token");
}

#[tokio::test]
async fn garbage_bearer_token_is_401_malformed() {
    let app = test_app!(test_keys());

    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, "Bearer not.a.token"))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 401);
    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.error, "Malformed token");
}

#[tokio::test]
async fn expired_access_token_is_401_with_the_expiry_instant() {
    let keys = test_keys();
    let mut claims = AccessClaims::new(test_user(), vec![], 900);
    claims.exp = chrono::Utc::now().timestamp() - 30;
    let token = encode_access_token(&claims, &keys).unwrap();

    let app = test_app!(keys);
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 401);
    let body: ErrorBody = test::read_body_json(res).await;
    assert!(
        body.error.starts_with("Jwt expired at "),
        "got: {}",
        body.error
    );
}

#[tokio::test]
async fn tampered_token_is_401_bad_signature() {
    let keys = test_keys();
    let claims = AccessClaims::new(test_user(), vec![], 900);
    let token = encode_access_token(&claims, &keys).unwrap();

    let mut parts: Vec<String> = token.split('.').map(str::to_string).collect();
    let first = parts[2].remove(0);
    parts[2].insert(0, if first == 'A' { 'B' } else { 'A' });
    let tampered = parts.join(".");

    let app = test_app!(keys);
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", tampered)))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 401);
    let body: ErrorBody = test::read_body_json(res).await;
    assert_eq!(body.error, "Invalid token signature");
}

#[tokio::test]
async fn valid_token_attaches_authorities_to_the_request() {
    let keys = test_keys();
    let claims = AccessClaims::new(
        test_user(),
        vec!["ROLE_USER_CREATE".to_string(), "ROLE_USER_UPDATE".to_string()],
        900,
    );
    let token = encode_access_token(&claims, &keys).unwrap();

    let app = test_app!(keys);
    let req = test::TestRequest::get()
        .uri("/protected")
        .insert_header((header::AUTHORIZATION, format!("Bearer {}", token)))
        .to_request();
    let res = test::call_service(&app, req).await;

    assert_eq!(res.status(), 200);
    let codes: Vec<String> = test::read_body_json(res).await;
    assert_eq!(codes, vec!["ROLE_USER_CREATE", "ROLE_USER_UPDATE"]);
}
