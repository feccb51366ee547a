// src/services/pdf_service.rs
//
// Composição do laudo em PDF. Carta (612x792pt), margens de 50pt, cursor
// descendo do topo e quebra de página quando sobra menos de 100pt. Fontes
// embutidas (Helvetica) para não depender de arquivos em disco.

use printpdf::{
    BuiltinFont, Color, IndirectFontRef, Line, Mm, PdfDocument, PdfDocumentReference,
    PdfLayerReference, Point, Rgb,
};
use uuid::Uuid;

use crate::{
    common::error::AppError,
    models::{
        appointment::Appointment,
        audit::AuditItem,
        auth::User,
        report::ReportTotals,
    },
};

// Dimensões em pontos (carta US Letter).
const PAGE_WIDTH: f64 = 612.0;
const PAGE_HEIGHT: f64 = 792.0;
const MARGIN: f64 = 50.0;
const PAGE_BREAK_AT: f64 = 100.0;

// Colunas da tabela de itens: x inicial de cada coluna.
const COLUMNS: [f64; 5] = [
    MARGIN,
    MARGIN + 150.0,
    MARGIN + 250.0,
    MARGIN + 330.0,
    MARGIN + 390.0,
];
const DESCRIPTION_MAX_CHARS: usize = 20;

const SUPPORT_LINE: &str = "support@securehomeaudit.com | (555) 123-SECURE";

/// Tudo que o laudo renderizado precisa, lido numa única foto do banco.
pub struct ReportDocument<'a> {
    pub report_id: Uuid,
    pub report_number: &'a str,
    pub appointment: &'a Appointment,
    pub officer: &'a User,
    pub items: &'a [AuditItem],
    pub totals: &'a ReportTotals,
}

/// Quem compõe os bytes do laudo. O serviço de laudos só conhece este
/// contrato, então os testes podem trocar o compositor real por um que falha.
pub trait ReportRenderer: Send + Sync {
    fn render(&self, document: &ReportDocument<'_>) -> Result<Vec<u8>, AppError>;
}

#[derive(Clone, Default)]
pub struct PdfService;

impl PdfService {
    pub fn new() -> Self {
        Self
    }
}

impl ReportRenderer for PdfService {
    fn render(&self, document: &ReportDocument<'_>) -> Result<Vec<u8>, AppError> {
        let (doc, page, layer) = PdfDocument::new(
            "Home Security Audit Report",
            mm(PAGE_WIDTH),
            mm(PAGE_HEIGHT),
            "Layer 1",
        );
        let regular = doc
            .add_builtin_font(BuiltinFont::Helvetica)
            .map_err(|e| AppError::Render(e.to_string()))?;
        let bold = doc
            .add_builtin_font(BuiltinFont::HelveticaBold)
            .map_err(|e| AppError::Render(e.to_string()))?;

        let mut page = PageWriter {
            doc: &doc,
            layer: doc.get_page(page).get_layer(layer),
            regular,
            bold,
            y: PAGE_HEIGHT - MARGIN,
        };

        draw_header(&mut page, document);
        draw_customer_block(&mut page, document.appointment);
        draw_officer_block(&mut page, document.officer);
        draw_summary_block(&mut page, document.totals);
        draw_item_table(&mut page, document.items);
        draw_footer(&mut page, document.report_id);

        doc.save_to_bytes().map_err(|e| AppError::Render(e.to_string()))
    }
}

// Cursor de escrita: uma página corrente e o y (em pt, a partir da base).
struct PageWriter<'a> {
    doc: &'a PdfDocumentReference,
    layer: PdfLayerReference,
    regular: IndirectFontRef,
    bold: IndirectFontRef,
    y: f64,
}

impl PageWriter<'_> {
    fn text(&self, x: f64, size: f64, bold: bool, content: &str) {
        let font = if bold { &self.bold } else { &self.regular };
        self.layer.set_fill_color(gray(0.0));
        self.layer
            .use_text(content, size, mm(x), mm(self.y), font);
    }

    fn advance(&mut self, dy: f64) {
        self.y -= dy;
    }

    // Abre página nova quando o conteúdo seguinte não cabe.
    fn ensure_space(&mut self, needed: f64) -> bool {
        if self.y - needed >= PAGE_BREAK_AT {
            return false;
        }
        let (page, layer) = self
            .doc
            .add_page(mm(PAGE_WIDTH), mm(PAGE_HEIGHT), "Layer 1");
        self.layer = self.doc.get_page(page).get_layer(layer);
        self.y = PAGE_HEIGHT - MARGIN;
        true
    }

    // Retângulo preenchido com a base em `y_bottom`.
    fn shade(&self, x: f64, y_bottom: f64, width: f64, height: f64, level: f64) {
        let points = vec![
            (Point::new(mm(x), mm(y_bottom)), false),
            (Point::new(mm(x + width), mm(y_bottom)), false),
            (Point::new(mm(x + width), mm(y_bottom + height)), false),
            (Point::new(mm(x), mm(y_bottom + height)), false),
        ];
        self.layer.set_fill_color(gray(level));
        self.layer.add_shape(Line {
            points,
            is_closed: true,
            has_fill: true,
            has_stroke: false,
            is_clipping_path: false,
        });
    }

    fn rule(&self, x: f64, width: f64) {
        self.shade(x, self.y, width, 1.2, 0.2);
    }
}

fn draw_header(page: &mut PageWriter<'_>, document: &ReportDocument<'_>) {
    page.text(MARGIN, 24.0, true, "SecureHome Audit");
    page.advance(22.0);
    page.text(MARGIN, 14.0, false, "Official Home Security Audit Report");
    page.advance(14.0);
    page.rule(MARGIN, PAGE_WIDTH - 2.0 * MARGIN);
    page.advance(18.0);

    // Caixa de metadados do laudo
    let box_height = 54.0;
    page.shade(
        MARGIN,
        page.y - box_height + 12.0,
        PAGE_WIDTH - 2.0 * MARGIN,
        box_height,
        0.92,
    );
    page.text(
        MARGIN + 10.0,
        10.0,
        true,
        &format!("Report Number: {}", document.report_number),
    );
    page.advance(14.0);
    page.text(
        MARGIN + 10.0,
        10.0,
        false,
        &format!(
            "Date Generated: {}",
            chrono::Utc::now().format("%B %d, %Y")
        ),
    );
    page.advance(14.0);
    page.text(
        MARGIN + 10.0,
        10.0,
        false,
        &format!(
            "Audit Visit: {} at {}",
            document.appointment.preferred_date.format("%B %d, %Y"),
            document.appointment.preferred_time,
        ),
    );
    page.advance(28.0);
}

fn draw_customer_block(page: &mut PageWriter<'_>, appointment: &Appointment) {
    page.text(MARGIN, 12.0, true, "Customer Information");
    page.advance(16.0);
    page.text(MARGIN, 10.0, false, &appointment.full_name);
    page.advance(13.0);
    page.text(MARGIN, 10.0, false, &appointment.address);
    page.advance(13.0);
    page.text(
        MARGIN,
        10.0,
        false,
        &format!("{} | {}", appointment.phone, appointment.email),
    );
    page.advance(24.0);
}

fn draw_officer_block(page: &mut PageWriter<'_>, officer: &User) {
    page.text(MARGIN, 12.0, true, "Auditing Officer");
    page.advance(16.0);
    page.text(MARGIN, 10.0, false, &officer.full_name);
    page.advance(13.0);
    page.text(MARGIN, 10.0, false, "Licensed Security Professional");
    page.advance(24.0);
}

fn draw_summary_block(page: &mut PageWriter<'_>, totals: &ReportTotals) {
    page.text(MARGIN, 12.0, true, "Audit Summary");
    page.advance(16.0);
    let lines = [
        format!("Total Items Documented: {}", totals.total_items),
        format!("Total Estimated Value: ${:.2}", totals.total_value),
        format!("Items with Receipts: {}", totals.items_with_receipt),
        format!("Items with Photos: {}", totals.items_with_photo),
    ];
    for line in &lines {
        page.text(MARGIN, 10.0, false, line);
        page.advance(13.0);
    }
    page.advance(12.0);
}

fn draw_table_header(page: &mut PageWriter<'_>) {
    page.shade(
        MARGIN,
        page.y - 4.0,
        PAGE_WIDTH - 2.0 * MARGIN,
        16.0,
        0.82,
    );
    let headers = ["Item", "Category", "Value", "Receipt", "Serial"];
    for (x, header) in COLUMNS.iter().zip(headers) {
        page.text(*x + 4.0, 10.0, true, header);
    }
    page.advance(18.0);
}

fn draw_item_table(page: &mut PageWriter<'_>, items: &[AuditItem]) {
    page.text(MARGIN, 12.0, true, "Documented Items");
    page.advance(16.0);
    draw_table_header(page);

    for (index, item) in items.iter().enumerate() {
        if page.ensure_space(16.0) {
            draw_table_header(page);
        }
        if index % 2 == 1 {
            page.shade(
                MARGIN,
                page.y - 4.0,
                PAGE_WIDTH - 2.0 * MARGIN,
                15.0,
                0.94,
            );
        }

        let receipt = if item.receipt_url.is_some() { "Yes" } else { "No" };
        let serial = item.serial_number.as_deref().unwrap_or("N/A");
        let cells = [
            truncate(&item.description, DESCRIPTION_MAX_CHARS),
            item.category.to_string(),
            format!("${:.2}", item.estimated_value),
            receipt.to_string(),
            serial.to_string(),
        ];
        for (x, cell) in COLUMNS.iter().zip(&cells) {
            page.text(*x + 4.0, 9.0, false, cell);
        }
        page.advance(15.0);
    }
}

fn draw_footer(page: &mut PageWriter<'_>, report_id: Uuid) {
    page.ensure_space(40.0);
    page.y = 70.0;
    page.rule(MARGIN, PAGE_WIDTH - 2.0 * MARGIN);
    page.advance(14.0);
    page.text(MARGIN, 9.0, false, SUPPORT_LINE);
    page.advance(12.0);
    page.text(MARGIN, 8.0, false, &format!("Report ID: {report_id}"));
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}...")
}

fn mm(pt: f64) -> Mm {
    Mm(pt * 25.4 / 72.0)
}

fn gray(level: f64) -> Color {
    Color::Rgb(Rgb::new(level, level, level, None))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{
        appointment::{AppointmentStatus, TimeSlot},
        audit::ItemCategory,
        auth::UserRole,
    };
    use chrono::{NaiveDate, Utc};
    use rust_decimal::Decimal;

    fn fixture_appointment() -> Appointment {
        Appointment {
            id: Uuid::new_v4(),
            customer_id: Some(Uuid::new_v4()),
            officer_id: Some(Uuid::new_v4()),
            full_name: "Morgan Avery".to_string(),
            email: "morgan@example.com".to_string(),
            phone: "555-0199".to_string(),
            address: "77 Birch Road".to_string(),
            preferred_date: NaiveDate::from_ymd_opt(2026, 9, 4).unwrap(),
            preferred_time: TimeSlot::ThreePm,
            status: AppointmentStatus::InProgress,
            has_receipts_ready: true,
            notes: None,
            reminder_sent_at: None,
            day_of_reminder_sent_at: None,
            created_at: Utc::now(),
            completed_at: None,
        }
    }

    fn fixture_officer() -> User {
        User {
            id: Uuid::new_v4(),
            username: "reyes".to_string(),
            password_hash: "x".to_string(),
            email: "reyes@example.com".to_string(),
            full_name: "Officer Reyes".to_string(),
            phone: None,
            role: UserRole::Officer,
            is_active: true,
            created_at: Utc::now(),
        }
    }

    fn fixture_items(count: usize) -> Vec<AuditItem> {
        (0..count)
            .map(|i| AuditItem {
                id: Uuid::new_v4(),
                appointment_id: Uuid::new_v4(),
                category: ItemCategory::Electronics,
                description: format!("A very long item description number {i}"),
                estimated_value: Decimal::new(10000 + i as i64, 2),
                serial_number: (i % 2 == 0).then(|| format!("SN-{i}")),
                model: None,
                photo_url: None,
                receipt_url: (i % 3 == 0).then(|| "https://example.com/r.jpg".to_string()),
                notes: None,
                created_at: Utc::now(),
            })
            .collect()
    }

    fn render(items: &[AuditItem]) -> Vec<u8> {
        let appointment = fixture_appointment();
        let officer = fixture_officer();
        let totals = ReportTotals::from_items(items);
        PdfService::new()
            .render(&ReportDocument {
                report_id: Uuid::new_v4(),
                report_number: "RPT-2026-004217",
                appointment: &appointment,
                officer: &officer,
                items,
                totals: &totals,
            })
            .unwrap()
    }

    #[test]
    fn renders_a_valid_pdf() {
        let bytes = render(&fixture_items(3));
        assert!(bytes.starts_with(b"%PDF"));
        assert!(bytes.len() > 500);
    }

    #[test]
    fn long_item_lists_spill_onto_extra_pages() {
        let single_page = render(&fixture_items(3));
        let multi_page = render(&fixture_items(70));
        assert!(multi_page.starts_with(b"%PDF"));
        assert!(multi_page.len() > single_page.len());
    }

    #[test]
    fn descriptions_are_truncated_for_the_table() {
        assert_eq!(truncate("short", 20), "short");
        assert_eq!(
            truncate("a very long item description indeed", 20),
            "a very long item des..."
        );
    }
}
