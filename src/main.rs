use std::env;

use actix_identity::IdentityMiddleware;
use actix_multipart::form::MultipartFormConfig;
use actix_session::{SessionMiddleware, storage::CookieSessionStore};
use actix_web::cookie::Key;
use actix_web::{App, HttpServer, middleware, web};
use dotenvy::dotenv;
use pushkind_common::db::establish_connection_pool;
use pushkind_common::models::config::CommonServerConfig;

use pushkind_storefront::repository::DieselRepository;
use pushkind_storefront::routes::generations::{
    delete_generation, generate_product, list_generations, show_generation,
};
use pushkind_storefront::routes::product_types::{
    create_product_type, delete_product_type, list_product_types, show_product_type,
    update_product_type,
};
use pushkind_storefront::routes::templates::{
    bulk_delete_templates, create_template, delete_template, export_templates,
    generate_from_template, import_templates, list_templates, preview_import, show_template,
    show_template_by_handle, update_template,
};

/// Upper bound for uploaded import files and JSON bodies.
const UPLOAD_LIMIT: usize = 10 * 1024 * 1024;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));
    dotenv().ok(); // Load .env file

    let database_url = env::var("DATABASE_URL").unwrap_or("app.db".to_string());
    let port = env::var("PORT").unwrap_or("8080".to_string());
    let port = port.parse::<u16>().unwrap_or(8080);
    let address = env::var("ADDRESS").unwrap_or("127.0.0.1".to_string());

    let secret = env::var("SECRET_KEY");
    let secret_key = match &secret {
        Ok(key) => Key::from(key.as_bytes()),
        Err(_) => Key::generate(),
    };

    let auth_service_url = env::var("AUTH_SERVICE_URL");
    let auth_service_url = match auth_service_url {
        Ok(auth_service_url) => auth_service_url,
        Err(_) => {
            log::error!("AUTH_SERVICE_URL environment variable not set");
            std::process::exit(1);
        }
    };

    let common_config = CommonServerConfig {
        secret: secret.unwrap_or_default(),
        auth_service_url,
    };

    let domain = env::var("DOMAIN").unwrap_or("localhost".to_string());

    let pool = match establish_connection_pool(&database_url) {
        Ok(pool) => pool,
        Err(e) => {
            log::error!("Failed to establish database connection: {e}");
            std::process::exit(1);
        }
    };
    let repo = DieselRepository::new(pool);

    log::info!("Starting storefront service on {address}:{port}");

    HttpServer::new(move || {
        App::new()
            .wrap(IdentityMiddleware::default())
            .wrap(
                SessionMiddleware::builder(CookieSessionStore::default(), secret_key.clone())
                    .cookie_secure(false) // set to true in prod
                    .cookie_domain(Some(format!(".{domain}")))
                    .build(),
            )
            .wrap(middleware::Compress::default())
            .wrap(middleware::Logger::default())
            .service(
                web::scope("/api/v1")
                    .service(list_templates)
                    .service(create_template)
                    .service(export_templates)
                    .service(import_templates)
                    .service(preview_import)
                    .service(bulk_delete_templates)
                    .service(show_template_by_handle)
                    .service(show_template)
                    .service(update_template)
                    .service(delete_template)
                    .service(generate_from_template)
                    .service(list_product_types)
                    .service(create_product_type)
                    .service(show_product_type)
                    .service(update_product_type)
                    .service(delete_product_type)
                    .service(list_generations)
                    .service(generate_product)
                    .service(show_generation)
                    .service(delete_generation),
            )
            .app_data(web::Data::new(repo.clone()))
            .app_data(web::Data::new(common_config.clone()))
            .app_data(web::JsonConfig::default().limit(UPLOAD_LIMIT))
            .app_data(
                MultipartFormConfig::default()
                    .total_limit(UPLOAD_LIMIT * 2)
                    .memory_limit(UPLOAD_LIMIT),
            )
    })
    .bind((address, port))?
    .run()
    .await
}
