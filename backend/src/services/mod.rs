pub mod documents;
pub mod identity;

use actix_web::web;

/// Registers every API scope. Shared by `main.rs` and the handler tests.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.service(identity::configure_routes())
        .service(documents::configure_routes());
}
