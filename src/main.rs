//src/main.rs

use tokio::net::TcpListener;

use securehome_backend::{build_router, config::AppState, services::reminder::ReminderService};

#[tokio::main]
async fn main() {
    // Inicializa o logger antes de qualquer coisa.
    tracing_subscriber::fmt().with_target(false).compact().init();

    // .expect() é bom aqui: se a configuração falhar, a aplicação não deve iniciar.
    // AppState::new() conecta no banco e roda as migrações do SQLx.
    let app_state = AppState::new()
        .await
        .expect("Falha ao inicializar o estado da aplicação.");

    // Varreduras periódicas de lembrete (24h e dia da visita) rodam em
    // background, independentes do tráfego de requisições.
    ReminderService::new(
        app_state.appointments.clone(),
        app_state.notifier.clone(),
    )
    .spawn();

    let app = build_router(app_state);

    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{port}");
    let listener = TcpListener::bind(&addr)
        .await
        .expect("Falha ao iniciar o listener TCP");
    tracing::info!("🚀 Servidor escutando em {}", addr);
    axum::serve(listener, app).await.expect("Erro no servidor Axum");
}
