use regex::Regex;
use tracing::debug;

use crate::institution::InstitutionProfile;

/// Cross-institution corruption signatures, applied before any
/// institution-specific table. Order matters: some patterns are substrings of
/// later ones, and the bare mojibake lead byte must come last.
///
/// Three families:
/// 1. Punctured accents: legacy exporters emit `.` where an accented byte
///    stood (`Cobran.a` for `Cobrança`). These are literal signatures, not
///    wildcards.
/// 2. UTF-8 decoded as Latin-1 (`Ã§` for `ç`).
/// 3. Intact accents folded to ASCII, so clean exports normalize to the same
///    text and the final non-ASCII strip never eats letters.
const GLOBAL_TABLE: &[(&str, &str)] = &[
    // punctured accents
    ("COBRAN.A", "COBRANCA"),
    ("Cobran.a", "Cobranca"),
    ("SERVI.O", "SERVICO"),
    ("Servi.o", "Servico"),
    ("TRANSFER.NCIA", "TRANSFERENCIA"),
    ("Transfer.ncia", "Transferencia"),
    ("APLICA..O", "APLICACAO"),
    ("Aplica..o", "Aplicacao"),
    ("OPERA..O", "OPERACAO"),
    ("Opera..o", "Operacao"),
    ("MANUTEN..O", "MANUTENCAO"),
    ("Manuten..o", "Manutencao"),
    ("EMISS.O", "EMISSAO"),
    ("Emiss.o", "Emissao"),
    ("CART.O", "CARTAO"),
    ("Cart.o", "Cartao"),
    ("D.BITO", "DEBITO"),
    ("D.bito", "Debito"),
    ("CR.DITO", "CREDITO"),
    ("Cr.dito", "Credito"),
    ("DEP.SITO", "DEPOSITO"),
    ("Dep.sito", "Deposito"),
    ("SAL.RIO", "SALARIO"),
    ("Sal.rio", "Salario"),
    ("T.TULO", "TITULO"),
    ("T.tulo", "Titulo"),
    // UTF-8 read as Latin-1; two-byte signatures before the bare lead byte
    ("Ã§", "c"),
    ("Ã‡", "C"),
    ("Ã£", "a"),
    ("Ãµ", "o"),
    ("Ã¡", "a"),
    ("Ã©", "e"),
    ("Ã­", "i"),
    ("Ã³", "o"),
    ("Ãº", "u"),
    ("Ã¢", "a"),
    ("Ãª", "e"),
    ("Ã´", "o"),
    ("Ã‰", "E"),
    // intact accents folded to ASCII
    ("ç", "c"),
    ("Ç", "C"),
    ("ã", "a"),
    ("õ", "o"),
    ("á", "a"),
    ("é", "e"),
    ("í", "i"),
    ("ó", "o"),
    ("ú", "u"),
    ("â", "a"),
    ("ê", "e"),
    ("ô", "o"),
    ("à", "a"),
    ("Á", "A"),
    ("É", "E"),
    ("Í", "I"),
    ("Ó", "O"),
    ("Ú", "U"),
    ("Â", "A"),
    ("Ê", "E"),
    ("Ô", "O"),
    ("Õ", "O"),
    ("À", "A"),
    // bare mojibake lead byte; a substring of the pairs above
    ("Ã", "A"),
];

/// Two-stage substitution engine: the global table, then the institution's
/// own table, then a sweep of remaining non-printable bytes. Structural
/// whitespace (newlines, tabs) survives; the tokenizer needs it.
pub struct RepairEngine {
    profile: InstitutionProfile,
    non_printable: Regex,
}

impl RepairEngine {
    pub fn new(profile: InstitutionProfile) -> Self {
        RepairEngine {
            profile,
            non_printable: Regex::new(r"[\x00-\x08\x0B\x0C\x0E-\x1F\x7F]")
                .expect("non-printable class is a valid pattern"),
        }
    }

    pub fn repair(&self, text: &str) -> String {
        let mut out = text.to_string();
        for &(pattern, replacement) in GLOBAL_TABLE {
            if out.contains(pattern) {
                out = out.replace(pattern, replacement);
            }
        }
        for sub in &self.profile.substitutions {
            if !sub.pattern.is_empty() && out.contains(sub.pattern.as_str()) {
                debug!(pattern = %sub.pattern, "applying institution repair rule");
                out = out.replace(sub.pattern.as_str(), sub.replacement.as_str());
            }
        }
        self.non_printable.replace_all(&out, "").into_owned()
    }
}
