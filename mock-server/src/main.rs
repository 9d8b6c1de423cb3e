use mock_server::{AppState, Credentials};
use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<(), std::io::Error> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let defaults = Credentials::default();
    let credentials = Credentials {
        access_key_id: std::env::var("SES_MOCK_ACCESS_KEY_ID").unwrap_or(defaults.access_key_id),
        secret_access_key: std::env::var("SES_MOCK_SECRET_ACCESS_KEY")
            .unwrap_or(defaults.secret_access_key),
    };

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("127.0.0.1:{port}");
    let listener = TcpListener::bind(&addr).await?;
    tracing::info!(%addr, access_key_id = %credentials.access_key_id, "mock SES listening");
    mock_server::run_with_state(listener, AppState::new(credentials)).await
}
