use crate::adapter::SnapshotAdapter;
use crate::error::StorageError;
use crate::model::{
    FeeStructure, Parent, PaymentRecord, Role, StudentFeeRecord, FEE_STRUCTURES_KEY, PARENTS_KEY,
    PAYMENTS_KEY, ROLES_KEY, STUDENT_FEES_KEY,
};
use anyhow::{anyhow, Context};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fs::File;
use std::io::{Read, Write};
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};
use zip::write::FileOptions;
use thiserror::Error;
use tracing::warn;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

const MANIFEST_ENTRY: &str = "manifest.json";
const SNAPSHOT_DIR: &str = "snapshots";
pub const BUNDLE_FORMAT_V1: &str = "schooladmin-snapshots-v1";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Manifest {
    format: String,
    version: u32,
    app_version: String,
    exported_at: u64,
    entries: Vec<ManifestEntry>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ManifestEntry {
    key: String,
    path: String,
    sha256: String,
}

#[derive(Debug, Clone)]
pub struct ExportSummary {
    pub bundle_format: String,
    pub entry_count: usize,
}

#[derive(Debug, Clone)]
pub struct ImportSummary {
    pub bundle_format_detected: String,
    pub restored_keys: Vec<String>,
}

/// A restore that failed after some snapshots were already replaced.
#[derive(Debug, Error)]
#[error("restore stopped at {failed}; already restored: [{}]", .restored.join(", "))]
pub struct PartialRestore {
    pub restored: Vec<String>,
    pub failed: String,
    #[source]
    pub source: StorageError,
}

fn decodes_as<T: DeserializeOwned>(path: &str, raw: &str) -> anyhow::Result<()> {
    serde_json::from_str::<Vec<T>>(raw)
        .map(|_| ())
        .with_context(|| format!("{} does not hold valid records", path))
}

/// Only the snapshot keys backing a store are restorable, and each entry must
/// decode as that store's record list.
fn check_snapshot(key: &str, path: &str, raw: &str) -> anyhow::Result<()> {
    match key {
        FEE_STRUCTURES_KEY => decodes_as::<FeeStructure>(path, raw),
        STUDENT_FEES_KEY => decodes_as::<StudentFeeRecord>(path, raw),
        PAYMENTS_KEY => decodes_as::<PaymentRecord>(path, raw),
        PARENTS_KEY => decodes_as::<Parent>(path, raw),
        ROLES_KEY => decodes_as::<Role>(path, raw),
        other => Err(anyhow!("unknown snapshot key in bundle: {:?}", other)),
    }
}

fn sha256_hex(bytes: &[u8]) -> String {
    Sha256::digest(bytes)
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

pub fn export_bundle(
    adapter: &dyn SnapshotAdapter,
    out_path: &Path,
) -> anyhow::Result<ExportSummary> {
    let mut snapshots = Vec::new();
    for key in adapter.keys().context("failed to list snapshots")? {
        if let Some(raw) = adapter.read(&key)? {
            snapshots.push((key, raw));
        }
    }

    if let Some(parent) = out_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("failed to create directory {}", parent.to_string_lossy()))?;
    }

    let out_file = File::create(out_path).with_context(|| {
        format!(
            "failed to create output file {}",
            out_path.to_string_lossy()
        )
    })?;
    let mut zip = ZipWriter::new(out_file);
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);

    let manifest = Manifest {
        format: BUNDLE_FORMAT_V1.to_string(),
        version: 1,
        app_version: env!("CARGO_PKG_VERSION").to_string(),
        exported_at: SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_secs(),
        entries: snapshots
            .iter()
            .map(|(key, raw)| ManifestEntry {
                key: key.clone(),
                path: format!("{}/{}.json", SNAPSHOT_DIR, key),
                sha256: sha256_hex(raw.as_bytes()),
            })
            .collect(),
    };
    zip.start_file(MANIFEST_ENTRY, opts)
        .context("failed to start manifest entry")?;
    zip.write_all(
        serde_json::to_string_pretty(&manifest)
            .context("failed to serialize manifest")?
            .as_bytes(),
    )
    .context("failed to write manifest entry")?;

    for (entry, (_, raw)) in manifest.entries.iter().zip(&snapshots) {
        zip.start_file(entry.path.as_str(), opts)
            .with_context(|| format!("failed to start entry {}", entry.path))?;
        zip.write_all(raw.as_bytes())
            .with_context(|| format!("failed to write entry {}", entry.path))?;
    }

    zip.finish().context("failed to finalize zip bundle")?;

    Ok(ExportSummary {
        bundle_format: BUNDLE_FORMAT_V1.to_string(),
        entry_count: 1 + manifest.entries.len(),
    })
}

/// Restores every snapshot in the bundle. All entries are verified before
/// the first write, so a damaged bundle leaves the adapter untouched.
pub fn import_bundle(
    adapter: &dyn SnapshotAdapter,
    in_path: &Path,
) -> anyhow::Result<ImportSummary> {
    if !is_zip_file(in_path)? {
        return Err(anyhow!(
            "not a backup bundle: {}",
            in_path.to_string_lossy()
        ));
    }

    let in_file = File::open(in_path)
        .with_context(|| format!("failed to open bundle {}", in_path.to_string_lossy()))?;
    let mut archive = ZipArchive::new(in_file).context("invalid zip archive")?;

    let mut manifest_text = String::new();
    archive
        .by_name(MANIFEST_ENTRY)
        .context("bundle missing manifest.json")?
        .read_to_string(&mut manifest_text)
        .context("failed to read manifest.json")?;
    let manifest: Manifest =
        serde_json::from_str(&manifest_text).context("manifest.json is invalid")?;
    if manifest.format != BUNDLE_FORMAT_V1 {
        return Err(anyhow!("unsupported bundle format: {}", manifest.format));
    }

    let mut restored: Vec<(String, String)> = Vec::with_capacity(manifest.entries.len());
    for entry in &manifest.entries {
        if restored.iter().any(|(k, _)| *k == entry.key) {
            return Err(anyhow!("duplicate snapshot key in bundle: {}", entry.key));
        }
        let mut raw = String::new();
        archive
            .by_name(&entry.path)
            .with_context(|| format!("bundle missing {}", entry.path))?
            .read_to_string(&mut raw)
            .with_context(|| format!("failed to read {}", entry.path))?;
        if sha256_hex(raw.as_bytes()) != entry.sha256 {
            return Err(anyhow!("checksum mismatch for {}", entry.path));
        }
        check_snapshot(&entry.key, &entry.path, &raw)?;
        restored.push((entry.key.clone(), raw));
    }

    for (i, (key, raw)) in restored.iter().enumerate() {
        if let Err(source) = adapter.write(key, raw) {
            let done: Vec<String> = restored[..i].iter().map(|(k, _)| k.clone()).collect();
            warn!(failed = %key, restored = ?done, "bundle restore stopped partway");
            return Err(PartialRestore {
                restored: done,
                failed: key.clone(),
                source,
            }
            .into());
        }
    }

    Ok(ImportSummary {
        bundle_format_detected: manifest.format,
        restored_keys: restored.into_iter().map(|(k, _)| k).collect(),
    })
}

fn is_zip_file(path: &Path) -> anyhow::Result<bool> {
    let mut f = File::open(path)
        .with_context(|| format!("failed to open input file {}", path.to_string_lossy()))?;
    let mut sig = [0u8; 4];
    let read = f.read(&mut sig).context("failed to read file signature")?;
    if read < 4 {
        return Ok(false);
    }
    Ok(sig == [0x50, 0x4B, 0x03, 0x04])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapter::{FileAdapter, MemoryAdapter};

    fn write_bundle(path: &Path, entries: &[(&str, &str)]) {
        let manifest = Manifest {
            format: BUNDLE_FORMAT_V1.to_string(),
            version: 1,
            app_version: "0.0.0".into(),
            exported_at: 0,
            entries: entries
                .iter()
                .map(|(key, raw)| ManifestEntry {
                    key: key.to_string(),
                    path: format!("{}/{}.json", SNAPSHOT_DIR, key.replace('/', "_")),
                    sha256: sha256_hex(raw.as_bytes()),
                })
                .collect(),
        };
        let mut zip = ZipWriter::new(File::create(path).expect("create"));
        let opts = FileOptions::default();
        zip.start_file(MANIFEST_ENTRY, opts).expect("manifest");
        zip.write_all(serde_json::to_string(&manifest).expect("json").as_bytes())
            .expect("write");
        for (entry, (_, raw)) in manifest.entries.iter().zip(entries) {
            zip.start_file(entry.path.as_str(), opts).expect("entry");
            zip.write_all(raw.as_bytes()).expect("write");
        }
        zip.finish().expect("finish");
    }

    /// Fails writes to one key and delegates everything else.
    struct FailingKey {
        inner: MemoryAdapter,
        key: &'static str,
    }

    impl SnapshotAdapter for FailingKey {
        fn read(&self, key: &str) -> Result<Option<String>, StorageError> {
            self.inner.read(key)
        }
        fn write(&self, key: &str, snapshot: &str) -> Result<(), StorageError> {
            if key == self.key {
                return Err(StorageError::write(key, "disk full"));
            }
            self.inner.write(key, snapshot)
        }
        fn keys(&self) -> Result<Vec<String>, StorageError> {
            self.inner.keys()
        }
        fn kind(&self) -> &'static str {
            "failing"
        }
    }

    #[test]
    fn export_and_import_roundtrip() {
        let dir = tempfile::tempdir().expect("tempdir");
        let src = MemoryAdapter::new();
        src.write("roles", r#"[{"id":1,"name":"Principal"}]"#)
            .expect("write");
        src.write(
            "parents",
            r#"[{"id":1,"name":"Sébastien Côté","relation":"Father"}]"#,
        )
        .expect("write");

        let bundle = dir.path().join("out/school.backup.zip");
        let export = export_bundle(&src, &bundle).expect("export");
        assert_eq!(export.bundle_format, BUNDLE_FORMAT_V1);
        assert_eq!(export.entry_count, 3);

        let dst = MemoryAdapter::new();
        let import = import_bundle(&dst, &bundle).expect("import");
        assert_eq!(import.bundle_format_detected, BUNDLE_FORMAT_V1);
        assert_eq!(
            import.restored_keys,
            vec!["parents".to_string(), "roles".to_string()]
        );
        assert_eq!(dst.read("parents").expect("read"), src.read("parents").expect("read"));
        assert_eq!(dst.read("roles").expect("read"), src.read("roles").expect("read"));
    }

    #[test]
    fn tampered_entry_is_rejected_before_any_write() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bundle = dir.path().join("bad.zip");
        let manifest = Manifest {
            format: BUNDLE_FORMAT_V1.to_string(),
            version: 1,
            app_version: "0.0.0".into(),
            exported_at: 0,
            entries: vec![
                ManifestEntry {
                    key: "roles".into(),
                    path: "snapshots/roles.json".into(),
                    sha256: sha256_hex(b"[]"),
                },
                ManifestEntry {
                    key: "parents".into(),
                    path: "snapshots/parents.json".into(),
                    sha256: sha256_hex(b"[]"),
                },
            ],
        };
        {
            let mut zip = ZipWriter::new(File::create(&bundle).expect("create"));
            let opts = FileOptions::default();
            zip.start_file(MANIFEST_ENTRY, opts).expect("manifest");
            zip.write_all(serde_json::to_string(&manifest).expect("json").as_bytes())
                .expect("write");
            zip.start_file("snapshots/roles.json", opts).expect("roles");
            zip.write_all(b"[]").expect("write");
            zip.start_file("snapshots/parents.json", opts).expect("parents");
            zip.write_all(b"[{}]").expect("write");
            zip.finish().expect("finish");
        }

        let dst = MemoryAdapter::new();
        let err = import_bundle(&dst, &bundle).expect_err("checksum mismatch");
        assert!(err.to_string().contains("checksum mismatch"));
        assert!(dst.keys().expect("keys").is_empty());
    }

    #[test]
    fn keys_outside_the_known_stores_are_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bundle = dir.path().join("escape.zip");
        write_bundle(
            &bundle,
            &[("roles", "[]"), ("../../escaped", "[]")],
        );

        let adapter = FileAdapter::open(&dir.path().join("ws")).expect("adapter");
        let err = import_bundle(&adapter, &bundle).expect_err("unknown key");
        assert!(format!("{err:?}").contains("unknown snapshot key"));
        assert!(!dir.path().join("escaped.json").exists());
        assert!(adapter.keys().expect("keys").is_empty());
    }

    #[test]
    fn entries_must_decode_as_their_store_records() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bundle = dir.path().join("shape.zip");
        write_bundle(
            &bundle,
            &[
                ("parents", r#"[{"id":1,"name":"Zoë Brandt","relation":"Mother"}]"#),
                ("roles", r#"[{"id":1,"foo":"bar"}]"#),
            ],
        );

        let dst = MemoryAdapter::new();
        let err = import_bundle(&dst, &bundle).expect_err("bad roles");
        assert!(format!("{err:?}").contains("snapshots/roles.json"));
        assert!(dst.keys().expect("keys").is_empty());
    }

    #[test]
    fn failed_write_reports_the_keys_already_restored() {
        let dir = tempfile::tempdir().expect("tempdir");
        let bundle = dir.path().join("partial.zip");
        write_bundle(
            &bundle,
            &[
                ("feeStructures", "[]"),
                ("parents", "[]"),
                ("roles", "[]"),
            ],
        );

        let dst = FailingKey {
            inner: MemoryAdapter::new(),
            key: "parents",
        };
        let err = import_bundle(&dst, &bundle).expect_err("write failure");
        let partial = err.downcast_ref::<PartialRestore>().expect("partial restore");
        assert_eq!(partial.failed, "parents");
        assert_eq!(partial.restored, vec!["feeStructures".to_string()]);
        assert_eq!(dst.keys().expect("keys"), vec!["feeStructures".to_string()]);
    }

    #[test]
    fn non_zip_input_is_rejected() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("notes.txt");
        std::fs::write(&path, b"plain text").expect("write");
        let err = import_bundle(&MemoryAdapter::new(), &path).expect_err("not a bundle");
        assert!(err.to_string().contains("not a backup bundle"));
    }
}
