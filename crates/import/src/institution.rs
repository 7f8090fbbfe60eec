use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, warn};

use extrato_core::Institution;

use crate::ofx;

/// Document markers checked in priority order; first hit wins. Matching is
/// ASCII-case-insensitive, so `CAIXA ECON` also catches the accented
/// `CAIXA ECONÔMICA` before repair has run.
const MARKERS: &[(&str, Institution)] = &[
    ("ITAU UNIBANCO", Institution::Itau),
    ("BANCO ITAU", Institution::Itau),
    ("ITAUBANCO", Institution::Itau),
    ("ITAU", Institution::Itau),
    ("BRADESCO", Institution::Bradesco),
    ("SANTANDER", Institution::Santander),
    ("BANCO DO BRASIL", Institution::BancoDoBrasil),
    ("BCO DO BRASIL", Institution::BancoDoBrasil),
    ("CAIXA ECON", Institution::Caixa),
];

/// Identity tags consulted when no marker matches, in priority order.
const IDENTITY_TAGS: &[&str] = &["FID", "BANKID", "ORG"];

/// Selects the institution for a raw (pre-repair) document. Never fails:
/// an unrecognized export degrades to [`Institution::Unknown`] and the
/// generic repair rules.
pub fn classify(raw_text: &str) -> Institution {
    let haystack = raw_text.to_ascii_uppercase();
    for &(marker, institution) in MARKERS {
        if haystack.contains(marker) {
            debug!(marker, %institution, "classified statement by document marker");
            return institution;
        }
    }

    for &tag in IDENTITY_TAGS {
        if let Some(value) = ofx::tag_value(raw_text, tag) {
            if let Some(institution) = from_identity(&value) {
                debug!(tag, value = %value, %institution, "classified statement by identity tag");
                return institution;
            }
        }
    }

    warn!("no institution marker recognized, falling back to generic repair rules");
    Institution::Unknown
}

fn from_identity(value: &str) -> Option<Institution> {
    if let Some(institution) = Institution::from_bank_code(value) {
        return Some(institution);
    }
    let value = value.to_ascii_uppercase();
    MARKERS
        .iter()
        .find(|&&(marker, _)| value.contains(marker))
        .map(|&(_, institution)| institution)
}

/// How an institution populates the MEMO/NAME pair, driving the description
/// merge in the assembler.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DescriptionStyle {
    /// MEMO carries the useful text; NAME is a fallback, and both together
    /// merge as "name - memo".
    #[default]
    MemoPrimary,
    /// NAME carries the payee and MEMO repeats machine detail; NAME wins when
    /// both are present.
    NamePrimary,
}

/// Ordered substitution pair. An empty replacement strips the sequence.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Substitution {
    pub pattern: String,
    pub replacement: String,
}

impl Substitution {
    fn from_table(table: &[(&str, &str)]) -> Vec<Substitution> {
        table
            .iter()
            .map(|(pattern, replacement)| Substitution {
                pattern: (*pattern).to_string(),
                replacement: (*replacement).to_string(),
            })
            .collect()
    }
}

/// Repair rules and classification hints for one statement source.
///
/// Profiles are plain data: the built-in tables below cover the known
/// institutions, and [`InstitutionProfile::from_toml`] loads custom ones so a
/// new exporter quirk is a config change, not a release.
#[derive(Debug, Clone, Deserialize)]
pub struct InstitutionProfile {
    #[serde(default)]
    pub institution: Institution,
    /// Applied in order after the global repair table.
    #[serde(default)]
    pub substitutions: Vec<Substitution>,
    #[serde(default)]
    pub description_style: DescriptionStyle,
}

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("failed to parse institution profile: {0}")]
    Toml(#[from] toml::de::Error),
}

// Abbreviation expansions and exporter control junk, per institution.
// Longer patterns come before their substrings.

const ITAU_TABLE: &[(&str, &str)] = &[
    ("REND PAGO APLIC AUT", "RENDIMENTO APLICACAO AUTOMATICA"),
    ("MOV TIT COBRANCA", "MOVIMENTACAO TITULO COBRANCA"),
    ("SISPAG ", "PAGAMENTO SISPAG "),
    ("TBI ", "TRANSFERENCIA BANCARIA "),
    ("\u{1a}", ""),
];

const BRADESCO_TABLE: &[(&str, &str)] = &[
    ("TED TRANSF.AUTORIZADA", "TED TRANSFERENCIA AUTORIZADA"),
    ("CH COMPENSADO", "CHEQUE COMPENSADO"),
    ("DEP DINHEIRO", "DEPOSITO EM DINHEIRO"),
    ("*** ", ""),
];

const SANTANDER_TABLE: &[(&str, &str)] = &[
    ("PIX TRANSF", "PIX TRANSFERENCIA"),
    ("CXE ", "CAIXA ELETRONICO "),
    ("PAGTO", "PAGAMENTO"),
];

const BB_TABLE: &[(&str, &str)] = &[
    ("COMPRA CARTAO", "COMPRA COM CARTAO"),
    ("BENEF INSS", "BENEFICIO INSS"),
    ("TRANSF AGENDADA", "TRANSFERENCIA AGENDADA"),
];

const CAIXA_TABLE: &[(&str, &str)] = &[
    ("CRED TEV", "CREDITO TRANSFERENCIA"),
    ("SAQUE LOT", "SAQUE LOTERICA"),
    ("DEP LOT", "DEPOSITO LOTERICA"),
];

impl InstitutionProfile {
    /// The built-in profile for an institution. `Unknown` gets an empty
    /// substitution table, so only the global repairs apply.
    pub fn for_institution(institution: Institution) -> InstitutionProfile {
        let (table, description_style): (&[(&str, &str)], _) = match institution {
            Institution::Itau => (ITAU_TABLE, DescriptionStyle::MemoPrimary),
            Institution::Bradesco => (BRADESCO_TABLE, DescriptionStyle::MemoPrimary),
            Institution::Santander => (SANTANDER_TABLE, DescriptionStyle::MemoPrimary),
            Institution::BancoDoBrasil => (BB_TABLE, DescriptionStyle::NamePrimary),
            Institution::Caixa => (CAIXA_TABLE, DescriptionStyle::NamePrimary),
            Institution::Unknown => (&[], DescriptionStyle::MemoPrimary),
        };
        InstitutionProfile {
            institution,
            substitutions: Substitution::from_table(table),
            description_style,
        }
    }

    pub fn from_toml(content: &str) -> Result<InstitutionProfile, ProfileError> {
        Ok(toml::from_str(content)?)
    }
}
