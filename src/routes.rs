use crate::{
    api::{attendance, employee, export, job},
    auth::handlers,
    config::Config,
    error::AppError,
};
use actix_cors::Cors;
use actix_governor::{
    Governor, GovernorConfigBuilder, PeerIpKeyExtractor, governor::middleware::NoOpMiddleware,
};
use actix_web::{HttpResponse, web};
use std::sync::Arc;

pub async fn index() -> HttpResponse {
    HttpResponse::Ok().json(crate::models::MessageResponse::new(
        "Benvenuto nel sistema di gestione presenze!",
    ))
}

// Per-route limiter
fn build_limiter(requests_per_min: u32) -> Governor<PeerIpKeyExtractor, NoOpMiddleware> {
    let requests_per_min = requests_per_min.max(1);
    let per_ms = (60_000 / requests_per_min as u64).max(1);

    let cfg = GovernorConfigBuilder::default()
        .per_millisecond(per_ms)
        .burst_size(requests_per_min)
        .key_extractor(PeerIpKeyExtractor)
        .finish()
        // only None for a zero period or burst, both clamped above
        .unwrap_or_default();
    Governor::new(&cfg)
}

/// Cross-origin policy for the browser front-end, which is opened from another origin.
pub fn cors(config: &Config) -> Cors {
    let cors = Cors::default()
        .allow_any_method()
        .allow_any_header()
        .max_age(3600);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        return cors.allow_any_origin();
    }

    // Matched byte for byte so that `null` (pages opened from disk) can be listed too.
    let origins = config.cors_origins.clone();
    cors.allowed_origin_fn(move |origin, _req| {
        origins.iter().any(|allowed| allowed.as_bytes() == origin.as_bytes())
    })
}

pub fn configure(cfg: &mut web::ServiceConfig, config: Config) {
    let login_limiter = Arc::new(build_limiter(config.rate_login_per_min));

    // Extractor failures answer with the same `{"detail"}` shape as handler errors.
    cfg.app_data(
        web::JsonConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::QueryConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    )
    .app_data(
        web::PathConfig::default()
            .error_handler(|err, _req| AppError::validation(err.to_string()).into()),
    );

    cfg.service(web::resource("/").route(web::get().to(index)))
        .service(
            web::resource("/login")
                .wrap(login_limiter)
                .route(web::post().to(handlers::login)),
        )
        .service(
            web::scope("/timbrature")
                // /timbrature
                .service(
                    web::resource("")
                        .route(web::post().to(attendance::create_attendance))
                        .route(web::get().to(attendance::list_attendance)),
                )
                // /timbrature/{id}
                .service(
                    web::resource("/{id}").route(web::delete().to(attendance::delete_attendance)),
                ),
        )
        .service(
            web::scope("/users")
                .service(
                    web::resource("")
                        .route(web::get().to(employee::list_employees))
                        .route(web::post().to(employee::create_employee)),
                )
                .service(web::resource("/{id}").route(web::delete().to(employee::delete_employee))),
        )
        .service(
            web::scope("/lavoro")
                // /lavoro
                .service(web::resource("").route(web::post().to(job::jobs_of_day)))
                // /lavoro/nuovo
                .service(web::resource("/nuovo").route(web::post().to(job::create_job)))
                // /lavoro/{id}
                .service(web::resource("/{id}").route(web::delete().to(job::delete_job))),
        )
        .service(web::resource("/attivita").route(web::get().to(job::activity_report)))
        .service(
            web::resource("/esportazione/timbrature")
                .route(web::get().to(export::attendance_month)),
        )
        .service(
            web::scope("/esporta")
                .service(web::resource("/timbrature").route(web::get().to(export::attendance_pdf)))
                .service(web::resource("/attivita").route(web::get().to(export::activity_pdf))),
        );
}

#[cfg(test)]
mod tests {
    use crate::config::Config;
    use crate::db::test_pool;
    use actix_web::http::{Method, StatusCode, header};
    use actix_web::test;
    use serde_json::{Value, json};
    use std::net::SocketAddr;

    #[actix_web::test]
    async fn index_greets() {
        let pool = test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get().uri("/").to_request();
        let body: Value = test::call_and_read_body_json(&app, req).await;
        assert!(body["message"].as_str().unwrap().starts_with("Benvenuto"));
    }

    #[actix_web::test]
    async fn login_is_rate_limited_per_peer() {
        let pool = test_pool().await;
        let mut config = Config::for_tests();
        config.rate_login_per_min = 1;
        let app = test_app!(pool, config);
        let peer: SocketAddr = "10.0.0.7:40000".parse().unwrap();

        let login = || {
            test::TestRequest::post()
                .uri("/login")
                .peer_addr(peer)
                .set_json(json!({ "code": "0000" }))
                .to_request()
        };

        assert_eq!(test::call_service(&app, login()).await.status(), StatusCode::OK);
        assert_eq!(
            test::call_service(&app, login()).await.status(),
            StatusCode::TOO_MANY_REQUESTS
        );
    }

    #[actix_web::test]
    async fn cors_answers_cross_origin_requests() {
        let pool = test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:5500"))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));

        let preflight = test::TestRequest::default()
            .method(Method::OPTIONS)
            .uri("/login")
            .insert_header((header::ORIGIN, "null"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_METHOD, "POST"))
            .insert_header((header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type"))
            .to_request();
        let resp = test::call_service(&app, preflight).await;
        assert!(resp.status().is_success());
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "null"
        );
    }

    #[actix_web::test]
    async fn cors_rejects_unlisted_origins() {
        let pool = test_pool().await;
        let mut config = Config::for_tests();
        config.cors_origins = vec!["http://localhost:5500".to_string()];
        let app = test_app!(pool, config);

        let listed = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://localhost:5500"))
            .to_request();
        let resp = test::call_service(&app, listed).await;
        assert_eq!(
            resp.headers().get(header::ACCESS_CONTROL_ALLOW_ORIGIN).unwrap(),
            "http://localhost:5500"
        );

        let unlisted = test::TestRequest::get()
            .uri("/")
            .insert_header((header::ORIGIN, "http://elsewhere.example"))
            .to_request();
        let resp = test::call_service(&app, unlisted).await;
        assert!(!resp.headers().contains_key(header::ACCESS_CONTROL_ALLOW_ORIGIN));
    }

    #[actix_web::test]
    async fn malformed_body_uses_detail_shape() {
        let pool = test_pool().await;
        let app = test_app!(pool);

        let req = test::TestRequest::post()
            .uri("/timbrature")
            .set_json(json!({ "id_utente": "uno" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: Value = test::read_body_json(resp).await;
        assert!(body["detail"].is_string());

        let req = test::TestRequest::get().uri("/attivita?data_da=2025-03-01").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    }
}
