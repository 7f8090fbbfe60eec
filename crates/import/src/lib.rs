pub mod assemble;
pub mod date;
pub mod diagnostics;
pub mod fingerprint;
pub mod institution;
pub mod ofx;
pub mod pipeline;
pub mod repair;

pub use assemble::{AssembledRecord, RecordAssembler, SkipReason};
pub use diagnostics::ImportDiagnostics;
pub use institution::{classify, DescriptionStyle, InstitutionProfile, ProfileError, Substitution};
pub use ofx::{RawRecordFields, StatementHeader};
pub use pipeline::{parse_statement, parse_statement_at, ImportScope, StatementImport};
pub use repair::RepairEngine;

pub mod import {
    use crate::pipeline::{self, ImportScope, StatementImport};

    /// Byte-level entry point for upload handlers. Statement exports lie
    /// about their encoding often enough that a lossy decode is the right
    /// default; the repair tables clean up the rest.
    pub fn import_statement(data: &[u8], scope: &ImportScope) -> StatementImport {
        let content = String::from_utf8_lossy(data);
        pipeline::parse_statement(&content, scope)
    }
}
