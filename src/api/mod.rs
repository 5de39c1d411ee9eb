/// Builds the full application around an in-memory database for handler tests.
#[cfg(test)]
macro_rules! test_app {
    ($pool:expr) => {
        test_app!($pool, crate::config::Config::for_tests())
    };
    ($pool:expr, $config:expr) => {{
        let config: crate::config::Config = $config;
        let routes_config = config.clone();
        actix_web::test::init_service(
            actix_web::App::new()
                .wrap(crate::routes::cors(&config))
                .app_data(actix_web::web::Data::new($pool.clone()))
                .app_data(actix_web::web::Data::new(config))
                .configure(move |cfg| crate::routes::configure(cfg, routes_config)),
        )
        .await
    }};
}

pub mod attendance;
pub mod employee;
pub mod export;
pub mod job;
