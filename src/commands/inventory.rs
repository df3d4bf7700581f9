use std::path::Path;

use anyhow::{Context, Result, bail};
use tracing::{info, warn};

use crate::cli::InventoryArgs;
use crate::commands::extract::TARGETS;
use crate::model::{SourceEntry, SourceInventoryManifest};
use crate::util::{now_utc_string, sha256_file, write_json_pretty};

pub fn run(args: InventoryArgs) -> Result<()> {
    let manifest = build_manifest(&args.html_dir)?;

    if args.dry_run {
        info!(
            document_count = manifest.document_count,
            source = %manifest.source_directory,
            "inventory dry-run complete"
        );
        return Ok(());
    }

    let manifest_path = args
        .manifest_path
        .unwrap_or_else(|| Path::new("manifests").join(INVENTORY_MANIFEST_NAME));

    write_json_pretty(&manifest_path, &manifest)?;
    info!(path = %manifest_path.display(), "wrote inventory manifest");
    info!(document_count = manifest.document_count, "inventory completed");

    Ok(())
}

pub const INVENTORY_MANIFEST_NAME: &str = "source_inventory.json";

/// Names of the documents the scanners read, in first-use order.
pub fn required_documents() -> Vec<&'static str> {
    let mut documents = Vec::new();
    for target in TARGETS {
        if !documents.contains(&target.document()) {
            documents.push(target.document());
        }
    }
    documents
}

pub fn build_manifest(html_dir: &Path) -> Result<SourceInventoryManifest> {
    if !html_dir.is_dir() {
        bail!("html directory not found: {}", html_dir.display());
    }

    let mut documents = Vec::new();
    let mut missing = Vec::new();

    for filename in required_documents() {
        let path = html_dir.join(filename);
        if !path.is_file() {
            warn!(path = %path.display(), "required document missing");
            missing.push(filename);
            continue;
        }

        let (sha256, bytes) = sha256_file(&path)
            .with_context(|| format!("failed to inventory {}", path.display()))?;
        documents.push(SourceEntry {
            filename: filename.to_string(),
            bytes,
            sha256,
        });
    }

    if !missing.is_empty() {
        bail!(
            "missing required documents in {}: {}",
            html_dir.display(),
            missing.join(", ")
        );
    }

    Ok(SourceInventoryManifest {
        manifest_version: 1,
        generated_at: now_utc_string(),
        source_directory: html_dir.display().to_string(),
        document_count: documents.len(),
        documents,
    })
}
