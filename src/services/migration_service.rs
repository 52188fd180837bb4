// src/services/migration_service.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{CategoryLink, MigrationReport, Transaction},
    services::classifier::{derive_competence, CategoryClassifier},
};

enum Outcome {
    Migrated,
    Skipped,
}

/// Vincula lançamentos antigos (categoria em texto livre) ao Plano de Contas.
#[derive(Clone)]
pub struct MigrationService {
    repo: Arc<dyn FinanceRepository>,
    classifier: CategoryClassifier,
}

impl MigrationService {
    pub fn new(repo: Arc<dyn FinanceRepository>, classifier: CategoryClassifier) -> Self {
        Self { repo, classifier }
    }

    /// Processa os lançamentos sem vínculo, um a um. Falhas de um registro são
    /// contadas e logadas sem interromper o lote; rodar de novo só pega o que falta.
    pub async fn migrate_categories(&self, company_id: Option<Uuid>) -> Result<MigrationReport, AppError> {
        let pending = self.repo.list_unlinked_transactions(company_id).await?;
        tracing::info!("🔄 Migrando categorias de {} lançamentos", pending.len());

        let mut report = MigrationReport::default();

        for transaction in &pending {
            match self.migrate_one(transaction).await {
                Ok(Outcome::Migrated) => report.migrated += 1,
                Ok(Outcome::Skipped) => {
                    tracing::warn!(transaction_id = %transaction.id, "Lançamento sem categoria, ignorado");
                    report.skipped += 1;
                }
                Err(e) => {
                    report.errors += 1;
                    tracing::error!(
                        transaction_id = %transaction.id,
                        date = %transaction.date,
                        errors = report.errors,
                        "Falha ao migrar lançamento: {}",
                        e
                    );
                }
            }
        }

        tracing::info!(
            migrated = report.migrated,
            skipped = report.skipped,
            errors = report.errors,
            "✅ Migração de categorias concluída"
        );

        Ok(report)
    }

    async fn migrate_one(&self, transaction: &Transaction) -> Result<Outcome, AppError> {
        if transaction.category.trim().is_empty() {
            return Ok(Outcome::Skipped);
        }

        // A competência vem antes para não criar categoria de um registro inválido
        let competence = derive_competence(&transaction.date)?;

        let category = self
            .classifier
            .resolve_category(transaction.company_id, &transaction.category)
            .await?;

        let link = CategoryLink::new(&category, competence);
        self.repo.link_transaction(transaction.id, &link).await?;

        Ok(Outcome::Migrated)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::memory::MemoryStore;
    use crate::models::finance::AccountGroup;
    use rust_decimal::Decimal;

    fn setup() -> (Arc<MemoryStore>, MigrationService) {
        let store = Arc::new(MemoryStore::default());
        let repo: Arc<dyn FinanceRepository> = store.clone();
        let service = MigrationService::new(repo.clone(), CategoryClassifier::new(repo));
        (store, service)
    }

    #[tokio::test]
    async fn test_migration_links_and_derives_competence() {
        let (store, service) = setup();
        let company_id = Uuid::new_v4();
        let legacy = store.insert_legacy_transaction(company_id, "Subempreitada", "2024-03-15", Decimal::new(1500, 0));

        let report = service.migrate_categories(Some(company_id)).await.unwrap();
        assert_eq!(report, MigrationReport { migrated: 1, skipped: 0, errors: 0 });

        let migrated = store.transaction(legacy.id).unwrap();
        assert_eq!(migrated.competence.as_deref(), Some("2024-03"));
        assert_eq!(migrated.category_name.as_deref(), Some("Subempreitada"));
        assert_eq!(migrated.account_group, Some(AccountGroup::DiretaObra));
        assert_eq!(migrated.excluded_from_markup, Some(true));
        assert!(migrated.category_id.is_some());
    }

    #[tokio::test]
    async fn test_bad_dates_are_counted_and_do_not_stop_the_batch() {
        let (store, service) = setup();
        let company_id = Uuid::new_v4();
        let bad = store.insert_legacy_transaction(company_id, "Aluguel", "15/03/2024", Decimal::new(2000, 0));
        store.insert_legacy_transaction(company_id, "Combustível", "2024-04-02", Decimal::new(300, 0));
        store.insert_legacy_transaction(company_id, "   ", "2024-04-02", Decimal::new(10, 0));

        let report = service.migrate_categories(Some(company_id)).await.unwrap();
        assert_eq!(report, MigrationReport { migrated: 1, skipped: 1, errors: 1 });

        // O registro com erro continua sem vínculo e não criou categoria
        assert!(store.transaction(bad.id).unwrap().category_id.is_none());
        let categories = store.list_categories(company_id).await.unwrap();
        assert_eq!(categories.len(), 1);
        assert_eq!(categories[0].name, "Combustível");
    }

    #[tokio::test]
    async fn test_rerun_is_a_noop() {
        let (store, service) = setup();
        let company_id = Uuid::new_v4();
        store.insert_legacy_transaction(company_id, "Material", "2024-01-10", Decimal::new(100, 0));
        store.insert_legacy_transaction(company_id, "material", "2024-02-10", Decimal::new(200, 0));

        let first = service.migrate_categories(None).await.unwrap();
        assert_eq!(first.migrated, 2);
        // "Material" e "material" compartilham a mesma categoria
        assert_eq!(store.list_categories(company_id).await.unwrap().len(), 1);

        let second = service.migrate_categories(None).await.unwrap();
        assert_eq!(second, MigrationReport::default());
        assert_eq!(store.list_categories(company_id).await.unwrap().len(), 1);
    }
}
