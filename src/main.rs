use dotenvy::dotenv;
use pharmacy_checkout::config::Config;
use pharmacy_checkout::{build_server, create_pool, run_migrations};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().map_err(std::io::Error::other)?;

    let pool = create_pool(&config.database_url, config.pool_size).map_err(std::io::Error::other)?;
    run_migrations(&pool).map_err(std::io::Error::other)?;

    log::info!(
        "Starting server at http://{}:{} (sibling radius {} km, lock timeout {} ms)",
        config.host,
        config.port,
        config.checkout.sibling_radius_km,
        config.checkout.lock_timeout_ms
    );

    build_server(pool, config.checkout, &config.host, config.port)?.await
}
