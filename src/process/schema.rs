use crate::process::{date_parser, utils};
use crate::record::{Condition, Record, TextField};

/// How a single source column turns into a `Record` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decoder {
    /// `YYYYMMDD` → `DD/MM/YYYY`
    CompactDate,
    /// leading integer
    Integer,
    Text(TextField),
    /// `"SIM"` → true
    Flag(Condition),
    OptionalText,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSpec {
    pub name: &'static str,
    pub decoder: Decoder,
}

const fn col(name: &'static str, decoder: Decoder) -> ColumnSpec {
    ColumnSpec { name, decoder }
}

/// The registry export, column by column. Mapping is positional; header
/// names in the file are never consulted.
pub const COLUMNS: [ColumnSpec; 24] = [
    col("data_cadastro", Decoder::CompactDate),
    col("codigo_ibge", Decoder::Integer),
    col("municipio", Decoder::Text(TextField::Municipality)),
    col("regiao", Decoder::Text(TextField::Region)),
    col("macrorregiao", Decoder::Text(TextField::MacroRegion)),
    col("sexo", Decoder::Text(TextField::Gender)),
    col("tempo_morador_de_rua", Decoder::Text(TextField::TimeHomeless)),
    col("faixa_etaria", Decoder::Text(TextField::AgeGroup)),
    col("raca_cor", Decoder::Text(TextField::RaceColor)),
    col("frequencia_alimentacao", Decoder::Flag(Condition::DietFrequency)),
    col("acesso_higiene", Decoder::Flag(Condition::HygieneAccess)),
    col("fumante", Decoder::Flag(Condition::Smoker)),
    col("uso_alcool", Decoder::Flag(Condition::AlcoholUse)),
    col("outras_drogas", Decoder::Flag(Condition::OtherDrugs)),
    col("gestante", Decoder::Flag(Condition::Pregnant)),
    col("internacao_ult_12meses", Decoder::Flag(Condition::HospitalizedLast12Months)),
    col("prob_saude_mental", Decoder::Flag(Condition::MentalHealthIssue)),
    col("hipertenso", Decoder::Flag(Condition::Hypertension)),
    col("diabetico", Decoder::Flag(Condition::Diabetes)),
    col("doenca_respiratoria", Decoder::Flag(Condition::RespiratoryDisease)),
    col("tuberculose", Decoder::Flag(Condition::Tuberculosis)),
    col("tem_teve_cancer", Decoder::Flag(Condition::CancerHistory)),
    col("possui_deficiencia", Decoder::Flag(Condition::Disability)),
    col("ultima_atualizacao", Decoder::OptionalText),
];

/// Literal marking a condition as present.
pub const FLAG_TRUE: &str = "SIM";

/// Decode one row; cells past the end of `cells` are treated as blank.
pub fn decode_row(cells: &[&str]) -> Record {
    let mut record = Record::default();
    for (i, spec) in COLUMNS.iter().enumerate() {
        let cell = utils::clean_cell(cells.get(i).copied());
        match spec.decoder {
            Decoder::CompactDate => {
                record.registration_date = cell
                    .map(|c| date_parser::format_display_date(date_parser::parse_compact_date(c)))
                    .filter(|d| !d.is_empty());
            }
            Decoder::Integer => {
                record.ibge_code = cell.and_then(utils::parse_int_prefix);
            }
            Decoder::Text(field) => {
                *record.text_mut(field) = cell.unwrap_or_default().to_string();
            }
            Decoder::Flag(condition) => {
                record.set_condition(condition, cell == Some(FLAG_TRUE));
            }
            Decoder::OptionalText => {
                record.last_update = cell.map(str::to_string);
            }
        }
    }
    record
}
