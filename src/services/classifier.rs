// src/services/classifier.rs

use std::sync::Arc;

use uuid::Uuid;

use crate::{
    common::error::AppError,
    db::FinanceRepository,
    models::finance::{AccountGroup, ExpenseCategory},
};

// Termos de obra, material e mão de obra -> custo direto (fora do markup)
const DIRECT_COST_KEYWORDS: &[&str] = &[
    "material",
    "materiais",
    "obra",
    "subempreitada",
    "empreitada",
    "empreiteiro",
    "construção",
    "construcao",
    "cimento",
    "areia",
    "brita",
    "tijolo",
    "bloco",
    "argamassa",
    "concreto",
    "ferragem",
    "madeira",
    "tinta",
    "piso",
    "revestimento",
    "hidráulic",
    "hidraulic",
    "elétric",
    "eletric",
    "pedreiro",
    "servente",
    "diarista",
    "terceirizad",
    "insumo",
    "locação de equipamento",
    "locacao de equipamento",
];

// Combustível, manutenção e escritório -> despesa variável indireta
const VARIABLE_INDIRECT_KEYWORDS: &[&str] = &[
    "combustível",
    "combustivel",
    "gasolina",
    "diesel",
    "etanol",
    "manutenção",
    "manutencao",
    "conserto",
    "oficina",
    "escritório",
    "escritorio",
    "papelaria",
    "impressão",
    "impressao",
    "frete",
    "pedágio",
    "pedagio",
    "estacionamento",
];

/// Classifica um nome de categoria no Plano de Contas.
/// Devolve o grupo e se a categoria fica fora da base do markup.
pub fn classify(name: &str) -> (AccountGroup, bool) {
    let lowered = name.to_lowercase();

    let group = if DIRECT_COST_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        AccountGroup::DiretaObra
    } else if VARIABLE_INDIRECT_KEYWORDS.iter().any(|k| lowered.contains(k)) {
        AccountGroup::VariavelIndireta
    } else {
        AccountGroup::Fixa
    };

    (group, group.excluded_from_markup())
}

/// Competência (AAAA-MM) a partir dos 7 primeiros caracteres da data.
pub fn derive_competence(date: &str) -> Result<String, AppError> {
    let prefix: String = date.trim().chars().take(7).collect();
    let bytes = prefix.as_bytes();

    let well_formed = bytes.len() == 7
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[4] == b'-'
        && bytes[5..].iter().all(u8::is_ascii_digit);

    if !well_formed {
        return Err(AppError::InvalidCompetence(date.to_string()));
    }
    Ok(prefix)
}

#[derive(Clone)]
pub struct CategoryClassifier {
    repo: Arc<dyn FinanceRepository>,
}

impl CategoryClassifier {
    pub fn new(repo: Arc<dyn FinanceRepository>) -> Self {
        Self { repo }
    }

    /// Reaproveita a categoria de mesmo nome (sem diferenciar maiúsculas) ou
    /// cria uma nova, classificada pelas palavras-chave.
    pub async fn resolve_category(
        &self,
        company_id: Uuid,
        name: &str,
    ) -> Result<ExpenseCategory, AppError> {
        let name = name.trim();

        if let Some(existing) = self.repo.find_category_by_name(company_id, name).await? {
            return Ok(existing);
        }

        let (group, excluded_from_markup) = classify(name);
        let category = self
            .repo
            .create_category(company_id, name, group, excluded_from_markup)
            .await?;

        tracing::info!(
            company_id = %company_id,
            category = %category.name,
            group = ?group,
            "Categoria criada automaticamente"
        );

        Ok(category)
    }
}
