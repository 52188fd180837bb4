//src/main.rs

use tokio::net::TcpListener;

use lucro_liquido_backend::{
    config::{init_tracing, AppState, Settings},
    db::{self, Repositories},
    routes::build_router,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    // Se a configuração falhar, a aplicação não deve iniciar
    let settings = Settings::from_env()?;

    let pool = db::connect(&settings).await?;
    db::run_migrations(&pool).await?;

    let app_state = AppState::new(&settings, Repositories::postgres(pool));
    let app = build_router(app_state);

    let listener = TcpListener::bind(&settings.bind_addr).await?;
    tracing::info!("🚀 Servidor escutando em {}", listener.local_addr()?);
    axum::serve(listener, app).await?;

    Ok(())
}
