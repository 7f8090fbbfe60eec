use serde::{Deserialize, Serialize};
use std::fmt;

/// Known statement sources, plus `Unknown` for exports nothing matched.
///
/// A closed set on purpose: adding an institution is one variant here plus a
/// data change in the import profiles, never a new string branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Institution {
    Itau,
    Bradesco,
    Santander,
    BancoDoBrasil,
    Caixa,
    #[default]
    Unknown,
}

impl Institution {
    pub const KNOWN: &'static [Institution] = &[
        Institution::Itau,
        Institution::Bradesco,
        Institution::Santander,
        Institution::BancoDoBrasil,
        Institution::Caixa,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Institution::Itau => "Itau Unibanco",
            Institution::Bradesco => "Bradesco",
            Institution::Santander => "Santander Brasil",
            Institution::BancoDoBrasil => "Banco do Brasil",
            Institution::Caixa => "Caixa Economica Federal",
            Institution::Unknown => "Unknown",
        }
    }

    /// Stable identifier used in fingerprints and logs.
    pub fn slug(self) -> &'static str {
        match self {
            Institution::Itau => "itau",
            Institution::Bradesco => "bradesco",
            Institution::Santander => "santander",
            Institution::BancoDoBrasil => "bb",
            Institution::Caixa => "caixa",
            Institution::Unknown => "unknown",
        }
    }

    /// COMPE code as it appears in BANKID/FID tags.
    pub fn bank_code(self) -> Option<&'static str> {
        match self {
            Institution::Itau => Some("341"),
            Institution::Bradesco => Some("237"),
            Institution::Santander => Some("033"),
            Institution::BancoDoBrasil => Some("001"),
            Institution::Caixa => Some("104"),
            Institution::Unknown => None,
        }
    }

    /// Maps a BANKID/FID value back to an institution. Leading zeros vary
    /// between exporters ("033" vs "33"), so codes are compared unpadded.
    pub fn from_bank_code(code: &str) -> Option<Institution> {
        let code = code.trim().trim_start_matches('0');
        match code {
            "341" => Some(Institution::Itau),
            "237" => Some(Institution::Bradesco),
            "33" => Some(Institution::Santander),
            "1" => Some(Institution::BancoDoBrasil),
            "104" => Some(Institution::Caixa),
            _ => None,
        }
    }

    pub fn is_known(self) -> bool {
        !matches!(self, Institution::Unknown)
    }
}

impl fmt::Display for Institution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bank_code_round_trip() {
        for inst in Institution::KNOWN {
            let code = inst.bank_code().unwrap();
            assert_eq!(Institution::from_bank_code(code), Some(*inst));
        }
    }

    #[test]
    fn from_bank_code_ignores_zero_padding() {
        assert_eq!(Institution::from_bank_code("33"), Some(Institution::Santander));
        assert_eq!(Institution::from_bank_code("033"), Some(Institution::Santander));
        assert_eq!(Institution::from_bank_code("0001"), Some(Institution::BancoDoBrasil));
    }

    #[test]
    fn from_bank_code_unknown() {
        assert_eq!(Institution::from_bank_code("999"), None);
        assert_eq!(Institution::from_bank_code(""), None);
        assert_eq!(Institution::from_bank_code("000"), None);
    }

    #[test]
    fn unknown_is_default_and_not_known() {
        assert_eq!(Institution::default(), Institution::Unknown);
        assert!(!Institution::Unknown.is_known());
        assert!(Institution::KNOWN.iter().all(|i| i.is_known()));
    }

    #[test]
    fn display_uses_full_name() {
        assert_eq!(Institution::Itau.to_string(), "Itau Unibanco");
        assert_eq!(Institution::BancoDoBrasil.slug(), "bb");
    }
}
