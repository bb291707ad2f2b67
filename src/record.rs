// src/record.rs

use anyhow::{anyhow, Result};
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::{collections::HashMap, fmt, str::FromStr};

/// Boolean registry columns; a cell holding exactly `"SIM"` sets the flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Condition {
    #[serde(rename = "frequencia_alimentacao")]
    DietFrequency,
    #[serde(rename = "acesso_higiene")]
    HygieneAccess,
    #[serde(rename = "fumante")]
    Smoker,
    #[serde(rename = "uso_alcool")]
    AlcoholUse,
    #[serde(rename = "outras_drogas")]
    OtherDrugs,
    #[serde(rename = "gestante")]
    Pregnant,
    #[serde(rename = "internacao_ult_12meses")]
    HospitalizedLast12Months,
    #[serde(rename = "prob_saude_mental")]
    MentalHealthIssue,
    #[serde(rename = "hipertenso")]
    Hypertension,
    #[serde(rename = "diabetico")]
    Diabetes,
    #[serde(rename = "doenca_respiratoria")]
    RespiratoryDisease,
    #[serde(rename = "tuberculose")]
    Tuberculosis,
    #[serde(rename = "tem_teve_cancer")]
    CancerHistory,
    #[serde(rename = "possui_deficiencia")]
    Disability,
}

impl Condition {
    /// All flags, in column order.
    pub const ALL: [Condition; 14] = [
        Condition::DietFrequency,
        Condition::HygieneAccess,
        Condition::Smoker,
        Condition::AlcoholUse,
        Condition::OtherDrugs,
        Condition::Pregnant,
        Condition::HospitalizedLast12Months,
        Condition::MentalHealthIssue,
        Condition::Hypertension,
        Condition::Diabetes,
        Condition::RespiratoryDisease,
        Condition::Tuberculosis,
        Condition::CancerHistory,
        Condition::Disability,
    ];

    /// The health conditions the dashboard charts, in legend order.
    pub const CHARTED: [Condition; 8] = [
        Condition::Hypertension,
        Condition::Diabetes,
        Condition::RespiratoryDisease,
        Condition::Tuberculosis,
        Condition::HospitalizedLast12Months,
        Condition::MentalHealthIssue,
        Condition::Disability,
        Condition::CancerHistory,
    ];

    /// Column key as it appears in the registry export.
    pub fn key(self) -> &'static str {
        match self {
            Condition::DietFrequency => "frequencia_alimentacao",
            Condition::HygieneAccess => "acesso_higiene",
            Condition::Smoker => "fumante",
            Condition::AlcoholUse => "uso_alcool",
            Condition::OtherDrugs => "outras_drogas",
            Condition::Pregnant => "gestante",
            Condition::HospitalizedLast12Months => "internacao_ult_12meses",
            Condition::MentalHealthIssue => "prob_saude_mental",
            Condition::Hypertension => "hipertenso",
            Condition::Diabetes => "diabetico",
            Condition::RespiratoryDisease => "doenca_respiratoria",
            Condition::Tuberculosis => "tuberculose",
            Condition::CancerHistory => "tem_teve_cancer",
            Condition::Disability => "possui_deficiencia",
        }
    }

    /// Legend label. Charted conditions carry a curated label, the rest fall
    /// back to the humanized key.
    pub fn label(self) -> String {
        let curated = match self {
            Condition::Hypertension => "Hipertenso",
            Condition::Diabetes => "Diabético",
            Condition::RespiratoryDisease => "Doença Respiratória",
            Condition::Tuberculosis => "Tuberculose",
            Condition::HospitalizedLast12Months => "Internação Ult. 12 meses",
            Condition::MentalHealthIssue => "Prob. Saúde Mental",
            Condition::Disability => "Possui Deficiência",
            Condition::CancerHistory => "Tem/Teve Câncer",
            _ => return humanize_key(self.key()),
        };
        curated.to_string()
    }

    fn index(self) -> usize {
        self as usize
    }
}

static CONDITION_BY_KEY: Lazy<HashMap<&'static str, Condition>> =
    Lazy::new(|| Condition::ALL.iter().map(|c| (c.key(), *c)).collect());

impl FromStr for Condition {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        CONDITION_BY_KEY
            .get(s.trim())
            .copied()
            .ok_or_else(|| anyhow!("unknown condition key `{}`", s))
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// `"tem_teve_cancer"` → `"Tem Teve Cancer"`.
pub fn humanize_key(key: &str) -> String {
    static WORD_START: Lazy<Regex> =
        Lazy::new(|| Regex::new(r"\b\w").expect("word-start pattern is valid"));
    let spaced = key.replace('_', " ");
    WORD_START
        .replace_all(&spaced, |caps: &Captures| caps[0].to_uppercase())
        .into_owned()
}

/// Free-text columns a chart can group by.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum TextField {
    #[serde(rename = "municipio")]
    Municipality,
    #[serde(rename = "regiao")]
    Region,
    #[serde(rename = "macrorregiao")]
    MacroRegion,
    #[serde(rename = "sexo")]
    Gender,
    #[serde(rename = "tempo_morador_de_rua")]
    TimeHomeless,
    #[serde(rename = "faixa_etaria")]
    AgeGroup,
    #[serde(rename = "raca_cor")]
    RaceColor,
}

impl TextField {
    pub const ALL: [TextField; 7] = [
        TextField::Municipality,
        TextField::Region,
        TextField::MacroRegion,
        TextField::Gender,
        TextField::TimeHomeless,
        TextField::AgeGroup,
        TextField::RaceColor,
    ];

    /// Choices offered by the location selector.
    pub const LOCATIONS: [TextField; 3] = [
        TextField::Municipality,
        TextField::Region,
        TextField::MacroRegion,
    ];

    pub fn key(self) -> &'static str {
        match self {
            TextField::Municipality => "municipio",
            TextField::Region => "regiao",
            TextField::MacroRegion => "macrorregiao",
            TextField::Gender => "sexo",
            TextField::TimeHomeless => "tempo_morador_de_rua",
            TextField::AgeGroup => "faixa_etaria",
            TextField::RaceColor => "raca_cor",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            TextField::Municipality => "Município",
            TextField::Region => "Região",
            TextField::MacroRegion => "Macrorregião",
            TextField::Gender => "Sexo",
            TextField::TimeHomeless => "Tempo em situação de rua",
            TextField::AgeGroup => "Faixa etária",
            TextField::RaceColor => "Raça/Cor",
        }
    }
}

impl FromStr for TextField {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        TextField::ALL
            .into_iter()
            .find(|f| f.key() == s)
            .ok_or_else(|| anyhow!("unknown field key `{}`", s))
    }
}

impl fmt::Display for TextField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// One registry row, decoded. Immutable once loaded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Record {
    /// `DD/MM/YYYY`, `None` when the source cell is blank or malformed.
    pub registration_date: Option<String>,
    pub ibge_code: Option<i64>,
    pub municipality: String,
    pub region: String,
    pub macro_region: String,
    pub gender: String,
    pub time_homeless: String,
    pub age_group: String,
    pub race_color: String,
    pub(crate) conditions: [bool; 14],
    pub last_update: Option<String>,
}

impl Record {
    pub fn has(&self, condition: Condition) -> bool {
        self.conditions[condition.index()]
    }

    pub fn set_condition(&mut self, condition: Condition, value: bool) {
        self.conditions[condition.index()] = value;
    }

    /// Builder-style flag setter, handy for assembling records in code.
    pub fn with_condition(mut self, condition: Condition) -> Self {
        self.set_condition(condition, true);
        self
    }

    pub fn text(&self, field: TextField) -> &str {
        match field {
            TextField::Municipality => &self.municipality,
            TextField::Region => &self.region,
            TextField::MacroRegion => &self.macro_region,
            TextField::Gender => &self.gender,
            TextField::TimeHomeless => &self.time_homeless,
            TextField::AgeGroup => &self.age_group,
            TextField::RaceColor => &self.race_color,
        }
    }

    pub fn text_mut(&mut self, field: TextField) -> &mut String {
        match field {
            TextField::Municipality => &mut self.municipality,
            TextField::Region => &mut self.region,
            TextField::MacroRegion => &mut self.macro_region,
            TextField::Gender => &mut self.gender,
            TextField::TimeHomeless => &mut self.time_homeless,
            TextField::AgeGroup => &mut self.age_group,
            TextField::RaceColor => &mut self.race_color,
        }
    }
}
