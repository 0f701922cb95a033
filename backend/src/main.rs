mod config;
mod database;
mod feed_controller;
mod services;

use crate::config::ServerConfig;
use crate::database::Database;
use crate::feed_controller::identity::IdentityState;
use crate::feed_controller::state::FeedState;
use actix_web::{web, App, HttpRequest, HttpResponse, HttpServer};
use env_logger::Env;
use include_dir::{include_dir, Dir};
use log::{error, info};
use mime_guess::from_path;
use std::io;
use std::thread;
use std::time::Duration;

static STATIC_DIR: Dir = include_dir!("$CARGO_MANIFEST_DIR/static/dist");

async fn serve_embedded(req: HttpRequest) -> HttpResponse {
    let path = req.path().trim_start_matches('/');
    let file_path = if path.is_empty() { "index.html" } else { path };

    match STATIC_DIR.get_file(file_path) {
        Some(file) => {
            let mime = from_path(file_path).first_or_octet_stream();
            HttpResponse::Ok()
                .content_type(mime.as_ref())
                .body(file.contents().to_vec())
        }
        None => match STATIC_DIR.get_file("index.html") {
            Some(index) => HttpResponse::Ok()
                .content_type("text/html; charset=utf-8")
                .body(index.contents().to_vec()),
            None => HttpResponse::NotFound().body("Not Found"),
        },
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    env_logger::init_from_env(Env::default().default_filter_or("info"));

    let config = ServerConfig::from_env().map_err(|e| {
        error!("{}", e);
        io::Error::new(io::ErrorKind::InvalidInput, e.to_string())
    })?;
    let url = config.url();

    let database = Database::new(config.database.clone());
    database.init_schema().map_err(|e| {
        error!("cannot prepare {}: {}", database.path().display(), e);
        io::Error::other(e.to_string())
    })?;

    let (feeds, rx) = FeedState::new(256);
    let dispatcher_state = feeds.clone();
    tokio::spawn(async move {
        feed_controller::state::start_change_dispatcher(dispatcher_state, rx).await;
    });

    let identities = IdentityState::with_limits(
        config.provisioned_tokens.clone(),
        config.identity_capacity,
        config.identity_ttl,
    );

    if config.open_browser {
        let browser_url = url.clone();
        thread::spawn(move || {
            thread::sleep(Duration::from_millis(500));
            let _ = webbrowser::open(&browser_url);
        });
    }

    info!(
        "Server running at {} (database {})",
        url,
        database.path().display()
    );

    let json_limit = config.json_limit;
    HttpServer::new(move || {
        App::new()
            .app_data(web::JsonConfig::default().limit(json_limit))
            .app_data(web::Data::new(database.clone()))
            .app_data(web::Data::new(feeds.clone()))
            .app_data(web::Data::new(identities.clone()))
            .configure(services::configure)
            .default_service(web::route().to(serve_embedded))
    })
    .bind((config.host.as_str(), config.port))?
    .run()
    .await
}
