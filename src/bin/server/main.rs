use actix_web::middleware::Logger;
use actix_web::{App, HttpServer};
use env_logger::Env;
use phin::app_config::AppConfig;
use phin::db::{get_db_pool, init_db};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv::dotenv().ok();
    env_logger::init_from_env(Env::new().default_filter_or("info"));

    init_db(std::env::var("DATABASE_URL").expect("DATABASE_URL must be set.")).await;

    // Build the restricted-word index before accepting any writes
    phin::word_filter::load_index(get_db_pool())
        .await
        .expect("Failed to load restricted words from database");

    let config = AppConfig::get();
    let bind = (config.server.bind.clone(), config.server.port);
    log::info!(
        "{} listening on {}:{}",
        config.site.name,
        bind.0,
        bind.1
    );

    HttpServer::new(|| {
        App::new()
            .wrap(Logger::default())
            .configure(phin::web::configure)
    })
    .bind(bind)?
    .run()
    .await
}
