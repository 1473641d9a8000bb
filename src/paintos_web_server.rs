use crate::core::razorpay::RazorpayClient;
use crate::core::AppConfig;
use crate::jobs::renewal_expiry::start_renewal_expiry_checker;
use crate::routes::paintos_routes;
use actix_cors::Cors;
use actix_web::http::header;
use actix_web::{dev::Server, web::Data, App, HttpServer};
use sqlx::mysql::MySqlPoolOptions;
use sqlx::MySqlPool;
use std::net::TcpListener;
use tracing_actix_web::TracingLogger;

pub struct PaintosWebServer {
    port: u16,
    server: Server,
}

impl PaintosWebServer {
    pub async fn build(configuration: AppConfig) -> Result<Self, anyhow::Error> {
        let address = format!(
            "{}:{}",
            configuration.paintos_server_config.host, configuration.paintos_server_config.port
        );

        let mysql_pool = MySqlPoolOptions::new()
            .acquire_timeout(std::time::Duration::from_secs(5))
            .connect_lazy_with(configuration.mysql.connect());

        start_renewal_expiry_checker(mysql_pool.clone()).await;

        let listener = TcpListener::bind(address)?;
        let port = listener.local_addr()?.port();

        let server = run(listener, mysql_pool, configuration).await?;

        Ok(Self { port, server })
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn run_until_stopped(self) -> Result<(), std::io::Error> {
        self.server.await
    }
}

pub async fn run(
    listener: TcpListener,
    mysql_pool: MySqlPool,
    configuration: AppConfig,
) -> Result<Server, anyhow::Error> {
    let mysql_pool = Data::new(mysql_pool);
    let razorpay_client = Data::new(RazorpayClient::new(&configuration.razorpay));
    let configuration = Data::new(configuration);

    let server = HttpServer::new(move || {
        let cors = Cors::default()
            .allow_any_origin()
            .allow_any_method()
            .allowed_headers(vec![
                header::CONTENT_TYPE,
                header::AUTHORIZATION,
                header::ACCEPT,
            ])
            .supports_credentials();
        App::new()
            .configure(paintos_routes)
            .app_data(mysql_pool.clone())
            .app_data(razorpay_client.clone())
            .app_data(configuration.clone())
            .wrap(TracingLogger::default())
            .wrap(cors)
    })
    .listen(listener)?
    .run();

    Ok(server)
}
