use actix_web::{App, HttpResponse, HttpServer, web};
use secure_policy::{SecureConfig, SecureHeaders};
use std::{env, io};
use tracing_subscriber::EnvFilter;

async fn ping() -> HttpResponse {
    HttpResponse::Ok().body("pong")
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);

    if env::var("LOG_FORMAT").is_ok_and(|format| format.eq_ignore_ascii_case("json")) {
        builder.json().init();
    } else {
        builder.init();
    }
}

fn load_config() -> io::Result<SecureConfig> {
    let config = match env::var("SECURE_CONFIG_FILE") {
        Ok(path) => SecureConfig::from_json_file(&path),
        Err(_) => SecureConfig::from_env(),
    };
    config.map_err(|err| io::Error::new(io::ErrorKind::InvalidInput, err))
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Run with RUST_LOG=secure=debug to see redirect and rejection decisions.
    init_logging();

    let config = load_config()?;
    let bind_addr = env::var("BIND_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string());

    tracing::info!(
        version = env!("CARGO_PKG_VERSION"),
        commit = option_env!("VERGEN_GIT_SHA").unwrap_or("unknown"),
        build_time = env!("VERGEN_BUILD_TIMESTAMP"),
        bind_addr = %bind_addr,
        "Starting secure-policy demo server"
    );

    let secure = SecureHeaders::new(config);

    HttpServer::new(move || {
        App::new()
            .wrap(secure.clone())
            .route("/ping", web::get().to(ping))
    })
    .bind(bind_addr)?
    .run()
    .await
}
