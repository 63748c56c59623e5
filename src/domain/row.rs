use chrono::{DateTime, SecondsFormat, Utc};
use uuid::Uuid;

use super::incident::{
    AromaDetails, ChemicalDetails, IncidentDetails, IncidentReport, PestDetails,
};

/// An accepted submission with its generated fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedRow {
    pub report: IncidentReport,
    pub response_id: String,
    pub timestamp: String,
    pub store_id: String,
    pub submitter_ip: String,
}

impl PersistedRow {
    pub fn new(report: IncidentReport, store_id: String, submitter_ip: String) -> Self {
        Self::with_identity(report, Uuid::new_v4(), Utc::now(), store_id, submitter_ip)
    }

    pub fn with_identity(
        report: IncidentReport,
        response_id: Uuid,
        accepted_at: DateTime<Utc>,
        store_id: String,
        submitter_ip: String,
    ) -> Self {
        Self {
            report,
            response_id: response_id.to_string(),
            timestamp: accepted_at.to_rfc3339_opts(SecondsFormat::Millis, true),
            store_id,
            submitter_ip,
        }
    }

    pub fn pest(&self) -> Option<&PestDetails> {
        match &self.report.details {
            IncidentDetails::Pest(details) => Some(details),
            _ => None,
        }
    }

    pub fn aroma(&self) -> Option<&AromaDetails> {
        match &self.report.details {
            IncidentDetails::Aroma(details) => Some(details),
            _ => None,
        }
    }

    pub fn chemical(&self) -> Option<&ChemicalDetails> {
        match &self.report.details {
            IncidentDetails::Chemical(details) => Some(details),
            _ => None,
        }
    }
}

pub type Accessor = fn(&PersistedRow) -> &str;

#[derive(Clone, Copy)]
pub struct Column {
    pub name: &'static str,
    pub value: Accessor,
}

const fn column(name: &'static str, value: Accessor) -> Column {
    Column { name, value }
}

/// Ordered column layout of one destination table.
#[derive(Clone, Copy)]
pub struct RowSchema {
    pub columns: &'static [Column],
}

impl RowSchema {
    pub fn headers(&self) -> Vec<&'static str> {
        self.columns.iter().map(|column| column.name).collect()
    }

    pub fn render(&self, row: &PersistedRow) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| (column.value)(row).to_string())
            .collect()
    }
}

impl std::fmt::Debug for RowSchema {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.headers()).finish()
    }
}

fn pest_field(row: &PersistedRow, field: fn(&PestDetails) -> &str) -> &str {
    row.pest().map_or("", field)
}

fn aroma_field(row: &PersistedRow, field: fn(&AromaDetails) -> &str) -> &str {
    row.aroma().map_or("", field)
}

fn chemical_field(row: &PersistedRow, field: fn(&ChemicalDetails) -> &str) -> &str {
    row.chemical().map_or("", field)
}

const RESPONSE_ID: Column = column("Response_ID", |r| r.response_id.as_str());
const TIMESTAMP: Column = column("Timestamp", |r| r.timestamp.as_str());
const STORE_ID: Column = column("Tienda_ID", |r| r.store_id.as_str());
const STORE_NAME: Column = column("Tienda_Nombre", |r| r.report.header.store_name.as_str());
const EVENT_DATE: Column = column("Fecha_Evento", |r| r.report.header.event_date.as_str());
const FIRST_NAME: Column = column("Nombre", |r| r.report.header.first_name.as_str());
const LAST_NAME: Column = column("Apellido", |r| r.report.header.last_name.as_str());
const EVENT_TYPE: Column = column("Tipo_Evento", |r| r.report.header.event_type.as_str());

const PEST_SUBTYPE: Column = column("Tipo_Evento_Plaga", |r| {
    pest_field(r, |p| p.event_subtype.as_str())
});
const PEST_TYPE: Column = column("Tipo_Plaga", |r| pest_field(r, |p| p.pest_type.as_str()));
const PEST_SECTOR: Column = column("Sector_Hallazgo", |r| {
    pest_field(r, |p| p.discovery_sector.as_str())
});
const PEST_COMMENT: Column = column("Comentario_Plaga", |r| pest_field(r, |p| p.comment.as_str()));

const AROMA_DOSING: Column = column("Dosif_inco_Aroma", |r| {
    aroma_field(r, |a| a.incorrect_dosing.as_str())
});
const AROMA_EQUIPMENT: Column = column("Equip_malo_Aroma", |r| {
    aroma_field(r, |a| a.faulty_equipment.as_str())
});
const AROMA_THEFT: Column = column("Hurto_Equip_Aroma", |r| {
    aroma_field(r, |a| a.equipment_theft.as_str())
});
const AROMA_COMMENT: Column = column("Comentario_Aroma", |r| aroma_field(r, |a| a.comment.as_str()));

const CHEMICAL_DILUTOR: Column = column("Falla_Dil_Quimico", |r| {
    chemical_field(r, |c| c.dilutor_failure.as_str())
});
const CHEMICAL_OTHER: Column = column("Otra_Inci_Quimico", |r| {
    chemical_field(r, |c| c.other_incident.as_str())
});
const CHEMICAL_ORDER: Column = column("Problema_Ped_Quimico", |r| {
    chemical_field(r, |c| c.order_problem.as_str())
});
const CHEMICAL_COMMENT: Column = column("Comentario_Quimicos", |r| {
    chemical_field(r, |c| c.comment.as_str())
});

const SUBMITTER_IP: Column = column("Submitter_IP", |r| r.submitter_ip.as_str());

pub const MASTER_SCHEMA: RowSchema = RowSchema {
    columns: &[
        RESPONSE_ID,
        TIMESTAMP,
        STORE_ID,
        STORE_NAME,
        EVENT_DATE,
        FIRST_NAME,
        LAST_NAME,
        EVENT_TYPE,
        PEST_SUBTYPE,
        PEST_TYPE,
        PEST_SECTOR,
        PEST_COMMENT,
        AROMA_DOSING,
        AROMA_EQUIPMENT,
        AROMA_THEFT,
        AROMA_COMMENT,
        CHEMICAL_DILUTOR,
        CHEMICAL_OTHER,
        CHEMICAL_ORDER,
        CHEMICAL_COMMENT,
        SUBMITTER_IP,
    ],
};

pub const PEST_SCHEMA: RowSchema = RowSchema {
    columns: &[
        RESPONSE_ID,
        TIMESTAMP,
        STORE_ID,
        STORE_NAME,
        EVENT_DATE,
        FIRST_NAME,
        LAST_NAME,
        PEST_SUBTYPE,
        PEST_TYPE,
        PEST_SECTOR,
        PEST_COMMENT,
    ],
};

pub const AROMA_SCHEMA: RowSchema = RowSchema {
    columns: &[
        RESPONSE_ID,
        TIMESTAMP,
        STORE_ID,
        STORE_NAME,
        EVENT_DATE,
        FIRST_NAME,
        LAST_NAME,
        AROMA_DOSING,
        AROMA_EQUIPMENT,
        AROMA_THEFT,
        AROMA_COMMENT,
    ],
};

pub const CHEMICAL_SCHEMA: RowSchema = RowSchema {
    columns: &[
        RESPONSE_ID,
        TIMESTAMP,
        STORE_ID,
        STORE_NAME,
        EVENT_DATE,
        FIRST_NAME,
        LAST_NAME,
        CHEMICAL_DILUTOR,
        CHEMICAL_OTHER,
        CHEMICAL_ORDER,
        CHEMICAL_COMMENT,
    ],
};
