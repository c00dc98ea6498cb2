pub mod application;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod handlers;
pub mod infrastructure;
pub mod schema;

use actix_web::{middleware::Logger, web, App, HttpServer};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use application::checkout_service::CheckoutService;
use application::inventory_service::InventoryService;
use config::CheckoutSettings;
use infrastructure::checkout_repo::DieselCheckoutRepository;
use infrastructure::inventory_repo::DieselInventoryRepository;

pub use db::{create_pool, DbPool};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

#[derive(OpenApi)]
#[openapi(
    paths(
        handlers::checkout::create_cart_checkout,
        handlers::checkout::create_prescription_checkout,
        handlers::orders::get_order,
        handlers::orders::cancel_order,
        handlers::inventory::adjust_stock,
        handlers::inventory::stock_history,
    ),
    components(schemas(
        handlers::checkout::CheckoutBody,
        handlers::checkout::PharmacyGroupRequest,
        handlers::checkout::CheckoutResponse,
        handlers::checkout::InsufficientStockResponse,
        handlers::orders::OrderResponse,
        handlers::orders::OrderPharmacyResponse,
        handlers::orders::OrderItemResponse,
        handlers::inventory::AdjustStockRequest,
        handlers::inventory::ListingStockResponse,
        handlers::inventory::StockChangeResponse,
    )),
    tags(
        (name = "checkout", description = "Cart and prescription checkout"),
        (name = "orders", description = "Order lookup and cancellation"),
        (name = "inventory", description = "Listing stock and its audit trail"),
    )
)]
pub struct ApiDoc;

/// Run any pending Diesel migrations against the pool's database.
pub fn run_migrations(pool: &DbPool) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    let mut conn = pool.get()?;
    let applied = conn.run_pending_migrations(MIGRATIONS)?;
    log::info!("applied {} pending migration(s)", applied.len());
    Ok(())
}

/// Build and return an actix-web `Server` bound to `host:port`.
///
/// The caller is responsible for `.await`-ing (or `tokio::spawn`-ing) the
/// returned server.
pub fn build_server(
    pool: DbPool,
    settings: CheckoutSettings,
    host: &str,
    port: u16,
) -> std::io::Result<actix_web::dev::Server> {
    let checkout = web::Data::new(CheckoutService::new(DieselCheckoutRepository::new(
        pool.clone(),
        settings.clone(),
    )));
    let inventory = web::Data::new(InventoryService::new(DieselInventoryRepository::new(
        pool, settings,
    )));
    let openapi = ApiDoc::openapi();

    Ok(HttpServer::new(move || {
        App::new()
            .app_data(checkout.clone())
            .app_data(inventory.clone())
            .wrap(Logger::default())
            .route(
                "/checkout",
                web::post().to(handlers::checkout::create_cart_checkout),
            )
            .route(
                "/prescriptions/{id}/checkout",
                web::post().to(handlers::checkout::create_prescription_checkout),
            )
            .service(
                web::scope("/orders")
                    .route("/{id}", web::get().to(handlers::orders::get_order))
                    .route("/{id}/cancel", web::post().to(handlers::orders::cancel_order)),
            )
            .service(
                web::scope("/pharmacy-drugs")
                    .route("/{id}/stock", web::put().to(handlers::inventory::adjust_stock))
                    .route(
                        "/{id}/stock-changes",
                        web::get().to(handlers::inventory::stock_history),
                    ),
            )
            .service(
                SwaggerUi::new("/swagger-ui/{_:.*}").url("/api-docs/openapi.json", openapi.clone()),
            )
    })
    .bind((host.to_string(), port))?
    .run())
}
