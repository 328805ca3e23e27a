use actix_web::{App, HttpServer, middleware::Logger, web};
use dotenv::dotenv;
use pretty_env_logger::env_logger::{Builder, Env};

use premium_shop::cleaner;
use premium_shop::config::AppConfig;
use premium_shop::handlers;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();

    if cli::run_cli().await {
        return Ok(());
    }

    let logger_env = Env::default().default_filter_or("debug");
    let mut logger_builder = Builder::from_env(logger_env);
    logger_builder.init();

    let config = AppConfig::from_env().map_err(|e| {
        log::error!("Application initialization failed: {:#}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    let state = config.create_app_state().await.map_err(|e| {
        log::error!("Application initialization failed: {:#}", e);
        std::io::Error::new(std::io::ErrorKind::Other, e.to_string())
    })?;

    log::info!("App state initialized successfully");

    let data = web::Data::new(state);

    // Spawn the pending-order expiry sweeper
    {
        let cleaner_state = data.clone();
        let timeout_minutes = config.order_timeout_minutes;
        let interval_seconds = config.clean_interval_seconds;
        tokio::spawn(async move {
            cleaner::start_order_cleaner(cleaner_state, timeout_minutes, interval_seconds).await;
        });
    }

    log::info!(
        "Starting web server on {}:{}",
        config.bind_host,
        config.bind_port
    );

    HttpServer::new(move || {
        App::new()
            .app_data(data.clone())
            .wrap(Logger::new("%a %t %r %s  %{Referer}i %Dms"))
            .service(handlers::health)
            .service(handlers::notify_page)
            .service(handlers::notify_callback)
            .service(handlers::create_order)
            .service(handlers::get_order)
            .service(handlers::get_user_orders)
    })
    .bind((config.bind_host.clone(), config.bind_port))?
    .run()
    .await
}
