//! Review staging areas under the configured docs directory.
//!
//! ```text
//! {root}/review/            review copies + `{stem}.json` sidecars
//! {root}/approved/          reviewed_{filename}
//! {root}/licensing_ready/   licensing_reviewed_{filename}
//!                           {product}_v{version}/  packages
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use chrono::{DateTime, NaiveDate, Utc};
use glob::Pattern;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, instrument};

use crate::errors::StagingError;
use crate::headers::{Provenance, ReviewHeader, render_licensing};

type Result<T> = std::result::Result<T, StagingError>;

/// Sidecar metadata written next to each review copy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReviewSidecar {
    /// Document id.
    pub doc_id: i64,
    /// Owning activity.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub activity_id: Option<i64>,
    /// Document type.
    pub doc_type: String,
    /// Generated filename.
    pub filename: String,
    /// Generation timestamp.
    pub generated_at: String,
    /// Generation cost in USD.
    pub cost: f64,
    /// Tokens billed.
    pub tokens: i64,
    /// Model used.
    pub model: String,
    /// Review copy path.
    pub filepath: String,
    /// `pending_review` or `reviewed`.
    pub status: String,
    /// When the review copy was written.
    pub saved_at: String,
    /// Review completion timestamp.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_at: Option<String>,
    /// Reviewer name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewer: Option<String>,
    /// Reviewer's summary of changes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub changes_summary: Option<String>,
    /// Approved file path.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reviewed_filepath: Option<String>,
}

impl ReviewSidecar {
    /// Sidecar for a freshly staged review copy.
    pub fn pending(
        header: &ReviewHeader,
        activity_id: Option<i64>,
        filename: &str,
        filepath: &Path,
        saved_at: &str,
    ) -> Self {
        Self {
            doc_id: header.doc_id,
            activity_id,
            doc_type: header.doc_type.clone(),
            filename: filename.to_string(),
            generated_at: header.generated_at.clone(),
            cost: header.cost,
            tokens: header.tokens,
            model: header.model.clone(),
            filepath: filepath.display().to_string(),
            status: "pending_review".into(),
            saved_at: saved_at.to_string(),
            reviewed_at: None,
            reviewer: None,
            changes_summary: None,
            reviewed_filepath: None,
        }
    }

    /// Record the outcome of a review.
    pub fn mark_reviewed(&mut self, provenance: &Provenance, approved: &Path) {
        self.status = "reviewed".into();
        self.reviewed_at = Some(provenance.reviewed_at.clone());
        self.reviewer = Some(provenance.reviewer.clone());
        self.changes_summary = Some(provenance.changes_summary.clone());
        self.reviewed_filepath = Some(approved.display().to_string());
    }
}

/// `manifest.json` of a licensing package.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    /// Product name.
    pub product_name: String,
    /// Product version.
    pub version: String,
    /// Package creation timestamp.
    pub generated_date: String,
    /// Included licensing files, by name.
    pub documents: Vec<String>,
    /// `documents.len()`.
    pub total_documents: usize,
}

/// The three staging directories under one root.
#[derive(Clone, Debug)]
pub struct ReviewAreas {
    root: PathBuf,
    review_dir: PathBuf,
    approved_dir: PathBuf,
    licensing_dir: PathBuf,
}

impl ReviewAreas {
    /// Areas rooted at `root`. Nothing is created until [`Self::ensure`].
    pub fn new(root: impl Into<PathBuf>) -> Self {
        let root = root.into();
        Self {
            review_dir: root.join("review"),
            approved_dir: root.join("approved"),
            licensing_dir: root.join("licensing_ready"),
            root,
        }
    }

    /// Docs root.
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// `review/` directory.
    pub fn review_dir(&self) -> &Path {
        &self.review_dir
    }

    /// `approved/` directory.
    pub fn approved_dir(&self) -> &Path {
        &self.approved_dir
    }

    /// `licensing_ready/` directory.
    pub fn licensing_dir(&self) -> &Path {
        &self.licensing_dir
    }

    /// Create every area that does not exist yet.
    pub fn ensure(&self) -> Result<()> {
        for dir in [&self.review_dir, &self.approved_dir, &self.licensing_dir] {
            fs::create_dir_all(dir).map_err(|e| StagingError::io(dir, e))?;
        }
        Ok(())
    }

    // ── Review copies ───────────────────────────────────────────────────────

    /// Write `review/{filename}` and its sidecar. Returns the review path.
    #[instrument(skip(self, header, body), fields(document_id = header.doc_id))]
    pub fn write_review_copy(
        &self,
        header: &ReviewHeader,
        activity_id: Option<i64>,
        filename: &str,
        body: &str,
        saved_at: &str,
    ) -> Result<PathBuf> {
        validate_component("filename", filename)?;
        self.ensure()?;
        let path = self.review_dir.join(filename);
        write_text(&path, &header.render(body))?;

        let sidecar = ReviewSidecar::pending(header, activity_id, filename, &path, saved_at);
        write_sidecar(&sidecar_path(&path), &sidecar)?;
        debug!(path = %path.display(), "review copy written");
        Ok(path)
    }

    /// Write `approved/reviewed_{filename}`. Returns the approved path.
    #[instrument(skip(self, provenance, body), fields(document_id = provenance.doc_id))]
    pub fn write_approved(
        &self,
        filename: &str,
        provenance: &Provenance,
        body: &str,
    ) -> Result<PathBuf> {
        validate_component("filename", filename)?;
        self.ensure()?;
        let path = self.approved_dir.join(format!("reviewed_{filename}"));
        write_text(&path, &provenance.render(body))?;
        Ok(path)
    }

    /// Load and update the sidecar of a review copy after its review.
    ///
    /// Returns `false` when the review copy has no sidecar.
    pub fn record_review(
        &self,
        review_copy: &Path,
        provenance: &Provenance,
        approved: &Path,
    ) -> Result<bool> {
        let path = sidecar_path(review_copy);
        if !path.exists() {
            return Ok(false);
        }
        let mut sidecar = read_sidecar(&path)?;
        sidecar.mark_reviewed(provenance, approved);
        write_sidecar(&path, &sidecar)?;
        Ok(true)
    }

    // ── Licensing ───────────────────────────────────────────────────────────

    /// Write `licensing_ready/licensing_{approved_name}`.
    #[instrument(skip(self, body))]
    pub fn write_licensing(
        &self,
        approved_name: &str,
        body: &str,
        date: NaiveDate,
    ) -> Result<PathBuf> {
        validate_component("filename", approved_name)?;
        self.ensure()?;
        let path = self.licensing_dir.join(format!("licensing_{approved_name}"));
        write_text(&path, &render_licensing(body, date))?;
        Ok(path)
    }

    /// Copy every `licensing_*.md` into `licensing_ready/{product}_v{version}/`
    /// and write its manifest and README.
    #[instrument(skip(self))]
    pub fn create_package(
        &self,
        product_name: &str,
        version: &str,
        now: DateTime<Utc>,
    ) -> Result<(PathBuf, PackageManifest)> {
        validate_component("product name", product_name)?;
        validate_component("version", version)?;
        self.ensure()?;

        let package_dir = self
            .licensing_dir
            .join(format!("{product_name}_v{version}"));
        fs::create_dir_all(&package_dir).map_err(|e| StagingError::io(&package_dir, e))?;

        let mut documents = Vec::new();
        for source in self.licensing_files()? {
            let Some(name) = source.file_name().and_then(|n| n.to_str()) else {
                continue;
            };
            let dest = package_dir.join(name);
            let _ = fs::copy(&source, &dest).map_err(|e| StagingError::io(&dest, e))?;
            documents.push(name.to_string());
        }

        let manifest = PackageManifest {
            product_name: product_name.to_string(),
            version: version.to_string(),
            generated_date: now.to_rfc3339_opts(chrono::SecondsFormat::Secs, true),
            total_documents: documents.len(),
            documents,
        };

        let manifest_path = package_dir.join("manifest.json");
        let json = serde_json::to_string_pretty(&manifest)
            .map_err(|e| StagingError::json(&manifest_path, e))?;
        write_text(&manifest_path, &json)?;
        write_text(
            &package_dir.join("README.md"),
            &package_readme(&manifest, now.date_naive()),
        )?;

        info!(
            package = %package_dir.display(),
            documents = manifest.total_documents,
            "licensing package created"
        );
        Ok((package_dir, manifest))
    }

    /// Top-level `licensing_*.md` files, sorted by name.
    fn licensing_files(&self) -> Result<Vec<PathBuf>> {
        let dir = self
            .licensing_dir
            .to_str()
            .ok_or_else(|| StagingError::InvalidName {
                what: "licensing directory",
                value: self.licensing_dir.display().to_string(),
            })?;
        let pattern = format!("{}/licensing_*.md", Pattern::escape(dir));
        let entries = glob::glob(&pattern).map_err(|e| StagingError::Glob(e.to_string()))?;

        let mut files = Vec::new();
        for entry in entries {
            let path = entry.map_err(|e| StagingError::Glob(e.to_string()))?;
            if path.is_file() {
                files.push(path);
            }
        }
        files.sort();
        Ok(files)
    }
}

// ── Sidecars ────────────────────────────────────────────────────────────────

/// `review/{stem}.json` for `review/{stem}.md`.
pub fn sidecar_path(review_copy: &Path) -> PathBuf {
    review_copy.with_extension("json")
}

/// Read a sidecar file.
pub fn read_sidecar(path: &Path) -> Result<ReviewSidecar> {
    let raw = fs::read_to_string(path).map_err(|e| StagingError::io(path, e))?;
    serde_json::from_str(&raw).map_err(|e| StagingError::json(path, e))
}

/// Write a sidecar file.
pub fn write_sidecar(path: &Path, sidecar: &ReviewSidecar) -> Result<()> {
    let json = serde_json::to_string_pretty(sidecar).map_err(|e| StagingError::json(path, e))?;
    write_text(path, &json)
}

// ── Helpers ─────────────────────────────────────────────────────────────────

fn write_text(path: &Path, content: &str) -> Result<()> {
    fs::write(path, content).map_err(|e| StagingError::io(path, e))
}

/// Reject names that would escape their area when joined as a path.
/// Reject names that are empty or could escape their directory.
pub fn validate_component(what: &'static str, value: &str) -> Result<()> {
    let bad = value.trim().is_empty()
        || value.contains('/')
        || value.contains('\\')
        || value.contains("..");
    if bad {
        return Err(StagingError::InvalidName {
            what,
            value: value.to_string(),
        });
    }
    Ok(())
}

fn package_readme(manifest: &PackageManifest, date: NaiveDate) -> String {
    let listing: Vec<String> = manifest.documents.iter().map(|d| format!("- {d}")).collect();
    format!(
        "# SOFTWARE LICENSING DOCUMENTATION PACKAGE\n\
         \n\
         ## Product: {product}\n\
         ## Version: {version}\n\
         ## Package Date: {date}\n\
         \n\
         ### INCLUDED DOCUMENTS:\n\
         {listing}\n\
         \n\
         ### PURPOSE:\n\
         This package contains all technical documentation required for software licensing,\n\
         including technical specifications, API documentation, user manuals, and licensing\n\
         readiness documents.\n\
         \n\
         ### CONFIDENTIALITY:\n\
         These documents contain proprietary information and are provided under\n\
         confidentiality agreement for the purpose of software licensing evaluation.\n\
         \n\
         ### CONTACT:\n\
         For questions or additional information, contact the licensing department.\n",
        product = manifest.product_name,
        version = manifest.version,
        date = date.format("%Y-%m-%d"),
        listing = listing.join("\n"),
    )
}

#[cfg(test)]
#[allow(unused_results)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn areas() -> (TempDir, ReviewAreas) {
        let dir = TempDir::new().unwrap();
        let areas = ReviewAreas::new(dir.path().join("docs"));
        (dir, areas)
    }

    fn header() -> ReviewHeader {
        ReviewHeader {
            doc_id: 3,
            doc_type: "api_docs".into(),
            generated_at: "2024-01-01T12:00:00Z".into(),
            cost: 0.0016,
            tokens: 800,
            model: "gpt-3.5-turbo".into(),
        }
    }

    fn provenance() -> Provenance {
        Provenance {
            doc_id: 3,
            doc_type: "api_docs".into(),
            generated_at: "2024-01-01T12:00:00Z".into(),
            reviewed_at: "2024-01-02T08:00:00Z".into(),
            reviewer: "Jo".into(),
            changes_summary: "fixed endpoints".into(),
        }
    }

    #[test]
    fn ensure_creates_all_areas() {
        let (_dir, areas) = areas();
        areas.ensure().unwrap();
        assert!(areas.review_dir().is_dir());
        assert!(areas.approved_dir().is_dir());
        assert!(areas.licensing_dir().is_dir());
    }

    #[test]
    fn review_copy_has_header_and_sidecar() {
        let (_dir, areas) = areas();
        let path = areas
            .write_review_copy(&header(), Some(9), "api_docs_9.md", "Body", "2024-01-01T12:00:01Z")
            .unwrap();
        assert_eq!(path, areas.review_dir().join("api_docs_9.md"));

        let text = fs::read_to_string(&path).unwrap();
        assert!(text.starts_with("---\n# DOCUMENT FOR REVIEW\n# ID: 3\n"));
        assert!(text.ends_with("\nBody\n"));

        let sidecar = read_sidecar(&areas.review_dir().join("api_docs_9.json")).unwrap();
        assert_eq!(sidecar.doc_id, 3);
        assert_eq!(sidecar.activity_id, Some(9));
        assert_eq!(sidecar.status, "pending_review");
        assert_eq!(sidecar.reviewer, None);
    }

    #[test]
    fn sidecar_omits_unset_review_fields() {
        let sidecar = ReviewSidecar::pending(&header(), None, "a.md", Path::new("a.md"), "now");
        let value = serde_json::to_value(&sidecar).unwrap();
        assert!(value.get("reviewer").is_none());
        assert!(value.get("activity_id").is_none());
        assert_eq!(value["status"], "pending_review");
    }

    #[test]
    fn record_review_updates_sidecar() {
        let (_dir, areas) = areas();
        let copy = areas
            .write_review_copy(&header(), None, "api_docs_9.md", "Body", "now")
            .unwrap();
        let approved = areas
            .write_approved("api_docs_9.md", &provenance(), "Better body")
            .unwrap();
        assert_eq!(approved, areas.approved_dir().join("reviewed_api_docs_9.md"));

        assert!(areas.record_review(&copy, &provenance(), &approved).unwrap());
        let sidecar = read_sidecar(&sidecar_path(&copy)).unwrap();
        assert_eq!(sidecar.status, "reviewed");
        assert_eq!(sidecar.reviewer.as_deref(), Some("Jo"));
        assert_eq!(
            sidecar.reviewed_filepath,
            Some(approved.display().to_string())
        );
    }

    #[test]
    fn record_review_without_sidecar_is_noop() {
        let (dir, areas) = areas();
        let loose = dir.path().join("loose.md");
        fs::write(&loose, "x").unwrap();
        assert!(!areas.record_review(&loose, &provenance(), &loose).unwrap());
    }

    #[test]
    fn licensing_file_name_and_wrapper() {
        let (_dir, areas) = areas();
        let date = NaiveDate::from_ymd_opt(2024, 3, 1).unwrap();
        let path = areas
            .write_licensing("reviewed_api_docs_9.md", "Final body", date)
            .unwrap();
        assert_eq!(
            path,
            areas.licensing_dir().join("licensing_reviewed_api_docs_9.md")
        );
        let text = fs::read_to_string(path).unwrap();
        assert!(text.contains("# Preparation Date: 2024-03-01"));
        assert!(text.contains("\nFinal body\n"));
    }

    #[test]
    fn package_copies_licensing_files_only() {
        let (_dir, areas) = areas();
        areas.ensure().unwrap();
        let lic = areas.licensing_dir();
        fs::write(lic.join("licensing_b.md"), "B").unwrap();
        fs::write(lic.join("licensing_a.md"), "A").unwrap();
        fs::write(lic.join("notes.md"), "skip").unwrap();

        let now = Utc.with_ymd_and_hms(2024, 3, 1, 10, 0, 0).unwrap();
        let (dir, manifest) = areas.create_package("Widget", "2.0", now).unwrap();

        assert_eq!(dir, lic.join("Widget_v2.0"));
        assert_eq!(manifest.documents, vec!["licensing_a.md", "licensing_b.md"]);
        assert_eq!(manifest.total_documents, 2);
        assert_eq!(manifest.generated_date, "2024-03-01T10:00:00Z");
        assert_eq!(fs::read_to_string(dir.join("licensing_a.md")).unwrap(), "A");
        assert!(!dir.join("notes.md").exists());

        let on_disk: PackageManifest =
            serde_json::from_str(&fs::read_to_string(dir.join("manifest.json")).unwrap()).unwrap();
        assert_eq!(on_disk, manifest);

        let readme = fs::read_to_string(dir.join("README.md")).unwrap();
        assert!(readme.contains("## Product: Widget\n## Version: 2.0\n## Package Date: 2024-03-01"));
        assert!(readme.contains("- licensing_a.md\n- licensing_b.md\n"));
    }

    #[test]
    fn repackaging_ignores_previous_package_contents() {
        let (_dir, areas) = areas();
        areas.ensure().unwrap();
        fs::write(areas.licensing_dir().join("licensing_a.md"), "A").unwrap();
        let now = Utc::now();
        areas.create_package("Widget", "1.0", now).unwrap();
        let (_, manifest) = areas.create_package("Widget", "1.1", now).unwrap();
        assert_eq!(manifest.documents, vec!["licensing_a.md"]);
    }

    #[test]
    fn empty_package_is_allowed() {
        let (_dir, areas) = areas();
        let (_, manifest) = areas.create_package("Widget", "1.0", Utc::now()).unwrap();
        assert_eq!(manifest.total_documents, 0);
    }

    #[test]
    fn path_like_names_rejected() {
        let (_dir, areas) = areas();
        assert_matches!(
            areas.create_package("../etc", "1.0", Utc::now()),
            Err(StagingError::InvalidName { what: "product name", .. })
        );
        assert_matches!(
            areas.create_package("Widget", "", Utc::now()),
            Err(StagingError::InvalidName { what: "version", .. })
        );
        assert_matches!(
            areas.write_approved("a/b.md", &provenance(), "x"),
            Err(StagingError::InvalidName { .. })
        );
    }
}
