use std::fs;
use std::path::Path;

use anyhow::{Context, Result, bail};
use chrono::Utc;
use rusqlite::Connection;
use tracing::{error, info, warn};

use super::dom::Document;
use super::records::Record;
use super::scan_conditions::scan_conditions;
use super::scan_sections::{scan_abilities, scan_special_abilities};
use super::statements::{TableBuilder, TextPolicy};
use super::store::{configure_connection, execute_table};
use super::table_shape::scan_ability_modifiers;
use crate::cli::ExtractArgs;
use crate::model::{ExtractPaths, ExtractRunManifest, TableOutcome, TableStatus};
use crate::util::{
    decode_document, ensure_directory, now_utc_string, sha256_bytes, sha256_file,
    utc_compact_string, write_json_pretty,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target {
    Conditions,
    SpecialAbilities,
    Abilities,
    AbilityModifiers,
}

/// Rebuild order.
pub const TARGETS: [Target; 4] = [
    Target::Conditions,
    Target::SpecialAbilities,
    Target::Abilities,
    Target::AbilityModifiers,
];

impl Target {
    pub fn table(self) -> &'static str {
        match self {
            Self::Conditions => "conditions",
            Self::SpecialAbilities => "special_abilities",
            Self::Abilities => "abilities",
            Self::AbilityModifiers => "abilities_table",
        }
    }

    pub fn document(self) -> &'static str {
        match self {
            Self::Conditions | Self::SpecialAbilities => "abilitiesAndConditions.html",
            Self::Abilities | Self::AbilityModifiers => "basics.html",
        }
    }

    pub fn from_table(table: &str) -> Option<Self> {
        TARGETS.into_iter().find(|target| target.table() == table)
    }

    fn scan<F>(self, doc: &Document, emit: F) -> Result<usize>
    where
        F: FnMut(Record) -> Result<()>,
    {
        let document = self.document();
        match self {
            Self::Conditions => scan_conditions(doc, document, emit),
            Self::SpecialAbilities => scan_special_abilities(doc, document, emit),
            Self::Abilities => scan_abilities(doc, document, emit),
            Self::AbilityModifiers => scan_ability_modifiers(doc, document, emit),
        }
    }
}

pub fn run(args: ExtractArgs) -> Result<()> {
    let started_ts = Utc::now();
    let started_at = now_utc_string();
    let run_id = format!("run-{}", utc_compact_string(started_ts));

    let targets = select_targets(&args.tables)?;
    let policy = if args.strict_text {
        TextPolicy::RejectQuotes
    } else {
        TextPolicy::Bind
    };

    ensure_directory(&args.manifest_dir)?;
    let manifest_path = args.manifest_dir.join(format!(
        "extract_run_{}.json",
        utc_compact_string(started_ts)
    ));

    info!(
        html_dir = %args.html_dir.display(),
        db_path = %args.db_path.display(),
        run_id = %run_id,
        "starting extract"
    );

    let mut connection = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;
    configure_connection(&connection)?;

    let mut outcomes = Vec::with_capacity(targets.len());
    for target in targets {
        let outcome = match rebuild_table(&mut connection, &args.html_dir, target, policy) {
            Ok(outcome) => outcome,
            Err(err) => {
                error!(table = target.table(), error = %format!("{err:#}"), "table rebuild failed");
                failed_outcome(&args.html_dir, target, &err)
            }
        };
        outcomes.push(outcome);
    }

    let failed = outcomes
        .iter()
        .filter(|outcome| outcome.status == TableStatus::Failed)
        .count();

    let manifest = ExtractRunManifest {
        manifest_version: 1,
        run_id,
        status: (if failed == 0 { "completed" } else { "partial" }).to_string(),
        started_at,
        updated_at: now_utc_string(),
        strict_text: args.strict_text,
        paths: ExtractPaths {
            html_dir: args.html_dir.display().to_string(),
            db_path: args.db_path.display().to_string(),
            manifest_path: manifest_path.display().to_string(),
        },
        tables: outcomes,
        notes: vec![
            "Each table is dropped and recreated inside a single transaction.".to_string(),
            "Data that no scanner extracts is injected by a separate pass.".to_string(),
        ],
    };
    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote extract run manifest");

    if failed > 0 {
        bail!("{failed} of {} tables failed to rebuild", manifest.tables.len());
    }

    info!(tables = manifest.tables.len(), "extract completed");
    Ok(())
}

fn select_targets(tables: &[String]) -> Result<Vec<Target>> {
    if tables.is_empty() {
        return Ok(TARGETS.to_vec());
    }

    let mut selected = Vec::with_capacity(tables.len());
    for table in tables {
        let Some(target) = Target::from_table(table) else {
            bail!("unknown table: {table}");
        };
        if !selected.contains(&target) {
            selected.push(target);
        }
    }
    selected.sort_by_key(|target| TARGETS.iter().position(|known| known == target));
    Ok(selected)
}

/// Scans one document into a fresh table and replaces the stored table.
pub(super) fn rebuild_table(
    connection: &mut Connection,
    html_dir: &Path,
    target: Target,
    policy: TextPolicy,
) -> Result<TableOutcome> {
    let table = target.table();
    let path = html_dir.join(target.document());

    let raw = fs::read(&path).with_context(|| format!("failed to read {}", path.display()))?;
    let sha256 = sha256_bytes(&raw);
    let doc = Document::parse(&decode_document(&raw));

    let mut builder = TableBuilder::new(table, policy)?;
    target
        .scan(&doc, |record| builder.push(record))
        .with_context(|| format!("failed to scan {} for {table}", target.document()))?;

    let records = builder.record_count();
    let columns = builder
        .columns()
        .iter()
        .map(|column| column.name.clone())
        .collect::<Vec<_>>();
    let statements = builder.finish();

    if statements.is_empty() {
        warn!(table, document = target.document(), "no records found; table left untouched");
        return Ok(TableOutcome {
            table: table.to_string(),
            document: target.document().to_string(),
            document_sha256: Some(sha256),
            status: TableStatus::Empty,
            records,
            statements: 0,
            columns,
            failure_reason: None,
        });
    }

    let executed = execute_table(connection, table, &statements)?;
    info!(table, records, statements = executed, "rebuilt table");

    Ok(TableOutcome {
        table: table.to_string(),
        document: target.document().to_string(),
        document_sha256: Some(sha256),
        status: TableStatus::Rebuilt,
        records,
        statements: executed,
        columns,
        failure_reason: None,
    })
}

fn failed_outcome(html_dir: &Path, target: Target, err: &anyhow::Error) -> TableOutcome {
    let document_sha256 = sha256_file(&html_dir.join(target.document()))
        .ok()
        .map(|(hash, _)| hash);

    TableOutcome {
        table: target.table().to_string(),
        document: target.document().to_string(),
        document_sha256,
        status: TableStatus::Failed,
        records: 0,
        statements: 0,
        columns: Vec::new(),
        failure_reason: Some(format!("{err:#}")),
    }
}
