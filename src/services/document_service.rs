// src/services/document_service.rs

use std::sync::Arc;

use chrono::Duration;
use genpdf::{elements, style, Element};
use image::Luma;
use qrcode::QrCode;
use uuid::Uuid;

use crate::{
    common::{error::AppError, money::format_brl},
    db::{CompanyRepository, QuoteRepository},
    models::{
        auth::Company,
        quotes::{Quote, QuoteItemKind},
    },
};

const FONT_FAMILY: &str = "Roboto";

/// Layout do PDF. Orçamentos com composição mostram os subtotais.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuoteTemplate {
    Simple,
    Detailed,
}

impl QuoteTemplate {
    pub fn for_quote(quote: &Quote) -> Self {
        if quote.breakdown().is_some() {
            QuoteTemplate::Detailed
        } else {
            QuoteTemplate::Simple
        }
    }
}

fn pdf_error(e: impl std::fmt::Display) -> AppError {
    AppError::InternalServerError(anyhow::Error::msg(e.to_string()))
}

#[derive(Clone)]
pub struct DocumentService {
    quotes: Arc<dyn QuoteRepository>,
    companies: Arc<dyn CompanyRepository>,
    fonts_dir: String,
}

impl DocumentService {
    pub fn new(quotes: Arc<dyn QuoteRepository>, companies: Arc<dyn CompanyRepository>, fonts_dir: String) -> Self {
        Self { quotes, companies, fonts_dir }
    }

    pub async fn generate_quote_pdf(&self, company_id: Uuid, quote_id: Uuid) -> Result<Vec<u8>, AppError> {
        // 1. Busca os Dados
        let quote = self
            .quotes
            .find(company_id, quote_id)
            .await?
            .ok_or_else(|| AppError::ResourceNotFound("Orçamento".to_string()))?;
        let company = self
            .companies
            .find_by_id(company_id)
            .await?
            .ok_or(AppError::CompanyNotFound)?;

        // 2. Renderiza fora do runtime (genpdf é síncrono)
        let fonts_dir = self.fonts_dir.clone();
        tokio::task::spawn_blocking(move || render_quote(&fonts_dir, &company, &quote))
            .await
            .map_err(pdf_error)?
    }
}

fn render_quote(fonts_dir: &str, company: &Company, quote: &Quote) -> Result<Vec<u8>, AppError> {
    let template = QuoteTemplate::for_quote(quote);

    let font_family = genpdf::fonts::from_files(fonts_dir, FONT_FAMILY, None)
        .map_err(|_| AppError::FontNotFound(format!("Fonte {} não encontrada em {}", FONT_FAMILY, fonts_dir)))?;

    let mut doc = genpdf::Document::new(font_family);
    doc.set_title(format!("Orçamento #{}", quote.number));
    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);

    // --- CABEÇALHO DA EMPRESA ---
    doc.push(elements::Paragraph::new(company.name.clone()).styled(style::Style::new().bold().with_font_size(18)));

    if let Some(doc_num) = &company.document_number {
        doc.push(elements::Paragraph::new(format!("CNPJ/CPF: {}", doc_num)).styled(style::Style::new().with_font_size(10)));
    }
    if let Some(phone) = &company.phone {
        doc.push(elements::Paragraph::new(format!("Telefone: {}", phone)).styled(style::Style::new().with_font_size(10)));
    }

    doc.push(elements::Break::new(1.5));

    doc.push(
        elements::Paragraph::new(format!("ORÇAMENTO #{}", quote.number))
            .styled(style::Style::new().bold().with_font_size(14)),
    );
    doc.push(elements::Paragraph::new(format!("Data: {}", quote.created_at.format("%d/%m/%Y"))));
    doc.push(elements::Paragraph::new(format!("Cliente: {}", quote.client_name)));
    if let Some(contact) = &quote.client_contact {
        doc.push(elements::Paragraph::new(format!("Contato: {}", contact)));
    }
    if let Some(description) = &quote.description {
        doc.push(elements::Break::new(1));
        doc.push(elements::Paragraph::new(description.clone()));
    }

    doc.push(elements::Break::new(2));

    // --- TABELA DE ITENS ---
    if !quote.items.is_empty() {
        let style_bold = style::Style::new().bold();
        let mut table = match template {
            QuoteTemplate::Detailed => elements::TableLayout::new(vec![4, 2, 1, 2, 2]),
            QuoteTemplate::Simple => elements::TableLayout::new(vec![4, 1, 2, 2]),
        };
        table.set_cell_decorator(elements::FrameCellDecorator::new(true, true, false));

        let mut header = table.row().element(elements::Paragraph::new("Descrição").styled(style_bold));
        if template == QuoteTemplate::Detailed {
            header = header.element(elements::Paragraph::new("Tipo").styled(style_bold));
        }
        header
            .element(elements::Paragraph::new("Qtd").styled(style_bold))
            .element(elements::Paragraph::new("Unitário").styled(style_bold))
            .element(elements::Paragraph::new("Total").styled(style_bold))
            .push()
            .map_err(pdf_error)?;

        for item in quote.items.iter() {
            let mut row = table.row().element(elements::Paragraph::new(item.description.clone()));
            if template == QuoteTemplate::Detailed {
                let kind = match item.kind {
                    QuoteItemKind::Service => "Serviço",
                    QuoteItemKind::Material => "Material",
                };
                row = row.element(elements::Paragraph::new(kind));
            }
            row.element(elements::Paragraph::new(format!("{:.2}", item.quantity)))
                .element(elements::Paragraph::new(format_brl(item.unit_price)))
                .element(elements::Paragraph::new(format_brl(item.total())))
                .push()
                .map_err(pdf_error)?;
        }

        doc.push(table);
        doc.push(elements::Break::new(2));
    }

    // --- TOTAIS ---
    if let Some(breakdown) = quote.breakdown() {
        let mut services = elements::Paragraph::new(format!("Serviços: {}", format_brl(breakdown.services_total)));
        services.set_alignment(genpdf::Alignment::Right);
        doc.push(services);

        let mut materials = elements::Paragraph::new(format!("Materiais: {}", format_brl(breakdown.materials_total)));
        materials.set_alignment(genpdf::Alignment::Right);
        doc.push(materials);
    }

    let mut total_paragraph = elements::Paragraph::new(format!("TOTAL: {}", format_brl(quote.practiced_price)));
    total_paragraph.set_alignment(genpdf::Alignment::Right);
    doc.push(total_paragraph.styled(style::Style::new().bold().with_font_size(12)));

    let valid_until = quote.created_at + Duration::days(i64::from(quote.validity_days));
    doc.push(elements::Break::new(1));
    doc.push(
        elements::Paragraph::new(format!(
            "Validade: {} dias (até {})",
            quote.validity_days,
            valid_until.format("%d/%m/%Y")
        ))
        .styled(style::Style::new().with_font_size(10)),
    );

    doc.push(elements::Break::new(2));

    // --- PAGAMENTO VIA PIX ---
    if let Some(key) = &company.pix_key {
        doc.push(elements::Paragraph::new("PAGAMENTO VIA PIX").styled(style::Style::new().bold().with_font_size(12)));
        doc.push(elements::Paragraph::new(format!("Chave: {}", key)));
        doc.push(elements::Break::new(1));

        // QR Code com a chave em texto puro (não é o BR Code EMV)
        let code = QrCode::new(key.as_bytes()).map_err(pdf_error)?;
        let image_buffer = code.render::<Luma<u8>>().build();
        let dynamic_image = image::DynamicImage::ImageLuma8(image_buffer);

        let pdf_image = elements::Image::from_dynamic_image(dynamic_image)
            .map_err(pdf_error)?
            .with_scale(genpdf::Scale::new(0.5, 0.5));

        doc.push(pdf_image);
    }

    // --- RODAPÉ ---
    if let Some(addr) = &company.address {
        doc.push(elements::Break::new(2));
        doc.push(elements::Paragraph::new(addr.clone()).styled(style::Style::new().italic().with_font_size(8)));
    }

    let mut buffer = Vec::new();
    doc.render(&mut buffer).map_err(pdf_error)?;

    Ok(buffer)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::Repositories;
    use crate::models::quotes::{NewQuote, QuoteBreakdown};
    use rust_decimal::Decimal;

    fn new_quote(company_id: Uuid, breakdown: Option<QuoteBreakdown>) -> NewQuote {
        NewQuote {
            company_id,
            seller_id: None,
            client_name: "Maria Souza".into(),
            client_contact: None,
            description: None,
            items: vec![],
            practiced_price: Decimal::new(14000, 0),
            breakdown,
            validity_days: 15,
        }
    }

    #[tokio::test]
    async fn test_template_follows_breakdown() {
        let repos = Repositories::in_memory();
        let company_id = Uuid::new_v4();

        let simple = repos.quotes.create(new_quote(company_id, None)).await.unwrap();
        let detailed = repos
            .quotes
            .create(new_quote(
                company_id,
                Some(QuoteBreakdown {
                    services_total: Decimal::new(10000, 0),
                    materials_total: Decimal::new(4000, 0),
                }),
            ))
            .await
            .unwrap();

        assert_eq!(QuoteTemplate::for_quote(&simple), QuoteTemplate::Simple);
        assert_eq!(QuoteTemplate::for_quote(&detailed), QuoteTemplate::Detailed);
    }

    #[tokio::test]
    async fn test_missing_quote_is_not_found() {
        let repos = Repositories::in_memory();
        let service = DocumentService::new(repos.quotes.clone(), repos.companies.clone(), "./fonts".into());
        let result = service.generate_quote_pdf(Uuid::new_v4(), Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::ResourceNotFound(_))));
    }

    #[tokio::test]
    async fn test_missing_fonts_are_reported() {
        let repos = Repositories::in_memory();
        let company = repos
            .companies
            .create("Reformas Silva", "silva@exemplo.com", "hash")
            .await
            .unwrap();
        let quote = repos.quotes.create(new_quote(company.id, None)).await.unwrap();

        let service = DocumentService::new(
            repos.quotes.clone(),
            repos.companies.clone(),
            "/caminho/que/nao/existe".into(),
        );
        let result = service.generate_quote_pdf(company.id, quote.id).await;
        assert!(matches!(result, Err(AppError::FontNotFound(_))));
    }
}
