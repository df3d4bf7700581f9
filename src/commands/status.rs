use std::fs;

use anyhow::{Context, Result};
use rusqlite::Connection;
use tracing::{info, warn};

use crate::cli::StatusArgs;
use crate::commands::extract::{TARGETS, describe_table};
use crate::commands::inventory::{INVENTORY_MANIFEST_NAME, required_documents};
use crate::model::SourceInventoryManifest;

pub fn run(args: StatusArgs) -> Result<()> {
    let inventory_path = args.manifest_dir.join(INVENTORY_MANIFEST_NAME);

    info!(html_dir = %args.html_dir.display(), "status requested");

    for filename in required_documents() {
        let path = args.html_dir.join(filename);
        if path.is_file() {
            info!(path = %path.display(), "source document present");
        } else {
            warn!(path = %path.display(), "source document missing");
        }
    }

    if inventory_path.exists() {
        let raw = fs::read(&inventory_path)
            .with_context(|| format!("failed to read {}", inventory_path.display()))?;
        let inventory: SourceInventoryManifest = serde_json::from_slice(&raw)
            .with_context(|| format!("failed to parse {}", inventory_path.display()))?;

        info!(
            generated_at = %inventory.generated_at,
            document_count = inventory.document_count,
            "loaded inventory manifest"
        );
    } else {
        warn!(path = %inventory_path.display(), "inventory manifest missing");
    }

    if !args.db_path.exists() {
        warn!(path = %args.db_path.display(), "database file missing");
        return Ok(());
    }

    let conn = Connection::open(&args.db_path)
        .with_context(|| format!("failed to open {}", args.db_path.display()))?;

    for target in TARGETS {
        match describe_table(&conn, target.table())? {
            Some(description) => {
                let columns = description
                    .columns
                    .iter()
                    .map(|column| format!("{} {}", column.name, column.declared_type))
                    .collect::<Vec<_>>()
                    .join(", ");
                info!(
                    table = target.table(),
                    rows = description.row_count,
                    columns = %columns,
                    "table status"
                );
            }
            None => warn!(table = target.table(), "table missing"),
        }
    }

    Ok(())
}
