//src/main.rs

use tokio::net::TcpListener;
use tracing_subscriber::EnvFilter;

use imobras::{
    build_app,
    config::{AppConfig, AppState},
};

#[tokio::main]
async fn main() {
    // Inicializa o logger (RUST_LOG ou "info")
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .compact()
        .init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    let config = AppConfig::from_env().expect("Falha ao carregar a configuração.");
    let bind_addr = config.bind_addr.clone();

    // Conecta no armazenamento escolhido (e roda as migrações no Postgres)
    let app_state = AppState::new(config)
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    let app = build_app(app_state);

    // Inicia o servidor
    let listener = TcpListener::bind(&bind_addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", bind_addr);
    axum::serve(listener, app)
        .await
        .expect("Erro no servidor Axum");
}
