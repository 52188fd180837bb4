//! # Migração de Categorias
//!
//! Vincula os lançamentos antigos (categoria em texto livre) ao Plano de Contas.
//!
//! ## Uso
//! ```bash
//! # Todas as empresas
//! cargo run --bin migrate_categories
//!
//! # Uma empresa só
//! cargo run --bin migrate_categories -- --company 5f0c...
//! ```
//!
//! Pode ser executado de novo sem efeito colateral: só processa lançamentos
//! que ainda não têm `category_id`.

use std::env;

use anyhow::Context;
use uuid::Uuid;

use lucro_liquido_backend::{
    config::{init_tracing, Settings},
    db::{self, Repositories},
    services::{classifier::CategoryClassifier, migration_service::MigrationService},
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let mut company_id: Option<Uuid> = None;

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--company" | "-c" => {
                let value = args.get(i + 1).context("--company precisa de um UUID")?;
                company_id = Some(Uuid::parse_str(value).context("UUID de empresa inválido")?);
                i += 1;
            }
            "--help" | "-h" => {
                println!("Migração de categorias para o Plano de Contas");
                println!();
                println!("Uso: migrate_categories [OPÇÕES]");
                println!();
                println!("Opções:");
                println!("  -c, --company <UUID>   Migra só os lançamentos desta empresa");
                println!("  -h, --help             Mostra esta ajuda");
                return Ok(());
            }
            other => anyhow::bail!("Argumento desconhecido: {}", other),
        }
        i += 1;
    }

    let settings = Settings::from_env()?;
    let pool = db::connect(&settings).await?;
    db::run_migrations(&pool).await?;

    let repos = Repositories::postgres(pool);
    let classifier = CategoryClassifier::new(repos.finance.clone());
    let service = MigrationService::new(repos.finance.clone(), classifier);

    let report = service.migrate_categories(company_id).await?;

    println!();
    println!("📊 Resultado da migração");
    println!("========================");
    println!("Migrados: {}", report.migrated);
    println!("Ignorados (sem categoria): {}", report.skipped);
    println!("Erros: {}", report.errors);

    Ok(())
}
