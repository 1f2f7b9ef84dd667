use mock_server::MockCredentials;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "mock_server=info".to_string());
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let secret = std::env::var("ILKBYTE_SECRET_KEY").unwrap_or_else(|_| "secret".to_string());
    let access = std::env::var("ILKBYTE_ACCESS_KEY").unwrap_or_else(|_| "access".to_string());

    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    mock_server::run(listener, MockCredentials::new(&secret, &access)).await
}
