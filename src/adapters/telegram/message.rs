use crate::domain::incident::{Flag, IncidentDetails};
use crate::domain::row::PersistedRow;

pub const TEST_MESSAGE: &str = "✅ Prueba de Telegram: todo OK.";

const NO_CAUSE: &str = "—";

/// Escapes text for Telegram's HTML parse mode.
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            other => escaped.push(other),
        }
    }
    escaped
}

/// Label of the first set flag, in the given order.
fn first_cause(causes: [(&Flag, &'static str); 3]) -> &'static str {
    causes
        .into_iter()
        .find(|(flag, _)| flag.is_set())
        .map_or(NO_CAUSE, |(_, label)| label)
}

pub fn build_message(row: &PersistedRow) -> String {
    let header = &row.report.header;
    let base = format!(
        "🏪 Tienda: {}\n📅 Fecha: {}\n🧑 Reporta: {} {}",
        escape_html(&header.store_name),
        escape_html(&header.event_date),
        escape_html(&header.first_name),
        escape_html(&header.last_name),
    );

    match &row.report.details {
        IncidentDetails::Pest(pest) => format!(
            "🚨 Registro de Evento - PLAGA\n\n{}\n\n🌿 Tipo de Plaga: {}\n📍 Sector: {}\n📝 Comentario: {}\n📌 Tipo de Evento: {}",
            base,
            escape_html(&pest.pest_type),
            escape_html(&pest.discovery_sector),
            escape_html(&pest.comment),
            escape_html(&pest.event_subtype),
        ),
        IncidentDetails::Aroma(aroma) => format!(
            "🚨 Registro de Evento - AROMA\n\n{}\n\n⚠️ Causa: {}\n📝 Comentario: {}",
            base,
            first_cause([
                (&aroma.incorrect_dosing, "Dosificación incorrecta"),
                (&aroma.faulty_equipment, "Equipo con fallas"),
                (&aroma.equipment_theft, "Hurto de equipo"),
            ]),
            escape_html(&aroma.comment),
        ),
        IncidentDetails::Chemical(chemical) => format!(
            "🚨 Registro de Evento - QUÍMICO\n\n{}\n\n⚠️ Causa: {}\n📝 Comentario: {}",
            base,
            first_cause([
                (&chemical.dilutor_failure, "Falla en dilutor"),
                (&chemical.other_incident, "Otra incidencia"),
                (&chemical.order_problem, "Problema en pedido"),
            ]),
            escape_html(&chemical.comment),
        ),
        IncidentDetails::Unrecognized => format!(
            "🚨 Registro de Evento - {}\n\n{}",
            escape_html(&header.event_type.to_uppercase()),
            base,
        ),
    }
}
