use std::str::FromStr;

use serde::{Deserialize, Deserializer};
use serde_json::Value;
use strum::EnumString;
use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field {0}")]
    MissingField(&'static str),
}

/// Raw submission body as posted by the form.
///
/// Every field is optional on the wire; values may be any JSON scalar and are
/// flattened to the text a spreadsheet cell would hold.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SubmissionForm {
    #[serde(rename = "Tienda_Nombre", default, deserialize_with = "cell_text")]
    pub store_name: String,
    #[serde(rename = "Fecha_Evento", default, deserialize_with = "cell_text")]
    pub event_date: String,
    #[serde(rename = "Nombre", default, deserialize_with = "cell_text")]
    pub first_name: String,
    #[serde(rename = "Apellido", default, deserialize_with = "cell_text")]
    pub last_name: String,
    #[serde(rename = "Tipo_Evento", default, deserialize_with = "cell_text")]
    pub event_type: String,

    #[serde(rename = "Tipo_Evento_Plaga", default, deserialize_with = "cell_text")]
    pub pest_event_subtype: String,
    #[serde(rename = "Tipo_Plaga", default, deserialize_with = "cell_text")]
    pub pest_type: String,
    #[serde(rename = "Sector_Hallazgo", default, deserialize_with = "cell_text")]
    pub pest_sector: String,
    #[serde(rename = "Comentario_Plaga", default, deserialize_with = "cell_text")]
    pub pest_comment: String,

    #[serde(rename = "Dosif_inco_Aroma", default, deserialize_with = "cell_text")]
    pub aroma_incorrect_dosing: String,
    #[serde(rename = "Equip_malo_Aroma", default, deserialize_with = "cell_text")]
    pub aroma_faulty_equipment: String,
    #[serde(rename = "Hurto_Equip_Aroma", default, deserialize_with = "cell_text")]
    pub aroma_equipment_theft: String,
    #[serde(rename = "Comentario_Aroma", default, deserialize_with = "cell_text")]
    pub aroma_comment: String,

    #[serde(rename = "Falla_Dil_Quimico", default, deserialize_with = "cell_text")]
    pub chemical_dilutor_failure: String,
    #[serde(rename = "Otra_Inci_Quimico", default, deserialize_with = "cell_text")]
    pub chemical_other_incident: String,
    #[serde(rename = "Problema_Ped_Quimico", default, deserialize_with = "cell_text")]
    pub chemical_order_problem: String,
    #[serde(
        rename = "Comentario_Quimico",
        alias = "Comentario_Quimicos",
        default,
        deserialize_with = "cell_text"
    )]
    pub chemical_comment: String,
}

fn cell_text<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        None | Some(Value::Null) | Some(Value::Bool(false)) => String::new(),
        Some(Value::Bool(true)) => "TRUE".to_string(),
        Some(Value::String(text)) => text,
        Some(Value::Number(number)) => number.to_string(),
        Some(other) => other.to_string(),
    })
}

/// Mandatory fields, checked in this order; the first blank one is reported.
const REQUIRED_FIELDS: [(&str, fn(&SubmissionForm) -> &str); 5] = [
    ("Tienda_Nombre", |form| form.store_name.as_str()),
    ("Fecha_Evento", |form| form.event_date.as_str()),
    ("Nombre", |form| form.first_name.as_str()),
    ("Apellido", |form| form.last_name.as_str()),
    ("Tipo_Evento", |form| form.event_type.as_str()),
];

impl SubmissionForm {
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (name, field) in REQUIRED_FIELDS {
            if field(self).trim().is_empty() {
                return Err(ValidationError::MissingField(name));
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, EnumString)]
pub enum Category {
    #[strum(serialize = "Plaga")]
    Pest,
    #[strum(serialize = "Aroma")]
    Aroma,
    #[strum(serialize = "Químico", serialize = "Quimico")]
    Chemical,
    #[strum(default)]
    Other(String),
}

impl Category {
    /// Labels match exactly; padded or differently cased labels are `Other`.
    pub fn parse(label: &str) -> Self {
        Category::from_str(label).unwrap_or_else(|_| Category::Other(label.to_string()))
    }
}

/// A bool-like form value. Anything non-empty counts as set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Flag(pub String);

impl Flag {
    pub fn is_set(&self) -> bool {
        !self.0.trim().is_empty()
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportHeader {
    pub store_name: String,
    pub event_date: String,
    pub first_name: String,
    pub last_name: String,
    /// Category label exactly as submitted.
    pub event_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PestDetails {
    pub event_subtype: String,
    pub pest_type: String,
    pub discovery_sector: String,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AromaDetails {
    pub incorrect_dosing: Flag,
    pub faulty_equipment: Flag,
    pub equipment_theft: Flag,
    pub comment: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChemicalDetails {
    pub dilutor_failure: Flag,
    pub other_incident: Flag,
    pub order_problem: Flag,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentDetails {
    Pest(PestDetails),
    Aroma(AromaDetails),
    Chemical(ChemicalDetails),
    /// Category label outside the known set. Carries no category fields.
    Unrecognized,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncidentReport {
    pub header: ReportHeader,
    pub details: IncidentDetails,
}

impl IncidentReport {
    pub fn category(&self) -> Category {
        match &self.details {
            IncidentDetails::Pest(_) => Category::Pest,
            IncidentDetails::Aroma(_) => Category::Aroma,
            IncidentDetails::Chemical(_) => Category::Chemical,
            IncidentDetails::Unrecognized => Category::Other(self.header.event_type.clone()),
        }
    }
}

impl TryFrom<SubmissionForm> for IncidentReport {
    type Error = ValidationError;

    fn try_from(form: SubmissionForm) -> Result<Self, Self::Error> {
        form.validate()?;

        let details = match Category::parse(&form.event_type) {
            Category::Pest => IncidentDetails::Pest(PestDetails {
                event_subtype: form.pest_event_subtype,
                pest_type: form.pest_type,
                discovery_sector: form.pest_sector,
                comment: form.pest_comment,
            }),
            Category::Aroma => IncidentDetails::Aroma(AromaDetails {
                incorrect_dosing: Flag(form.aroma_incorrect_dosing),
                faulty_equipment: Flag(form.aroma_faulty_equipment),
                equipment_theft: Flag(form.aroma_equipment_theft),
                comment: form.aroma_comment,
            }),
            Category::Chemical => IncidentDetails::Chemical(ChemicalDetails {
                dilutor_failure: Flag(form.chemical_dilutor_failure),
                other_incident: Flag(form.chemical_other_incident),
                order_problem: Flag(form.chemical_order_problem),
                comment: form.chemical_comment,
            }),
            Category::Other(_) => IncidentDetails::Unrecognized,
        };

        Ok(IncidentReport {
            header: ReportHeader {
                store_name: form.store_name,
                event_date: form.event_date,
                first_name: form.first_name,
                last_name: form.last_name,
                event_type: form.event_type,
            },
            details,
        })
    }
}
