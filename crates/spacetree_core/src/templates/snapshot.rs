//! Snapshot document shape and named snapshot files.
//!
//! # Invariants
//! - A snapshot is a JSON object with a `pages` array; `roles` is optional.
//! - Snapshot names match `^[A-Za-z0-9][A-Za-z0-9._-]*\.json$`, so a name can
//!   never leave the export directory.

use super::{TemplateError, TemplateResult};
use crate::model::block::ContainerBlock;
use crate::model::bounty::BountyWithPermissions;
use crate::model::page::PageNode;
use crate::model::permission::PagePermission;
use crate::model::proposal::ProposalWithEvaluations;
use crate::model::vote::VoteWithOptions;
use crate::model::RoleId;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

static SNAPSHOT_NAME_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[A-Za-z0-9][A-Za-z0-9._-]*\.json$").expect("valid snapshot name regex")
});

/// Portable form of one or more page forests.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkspacePagesExport {
    pub pages: Vec<ExportedPage>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub roles: Vec<ExportedRole>,
}

impl WorkspacePagesExport {
    /// Number of pages across every exported forest.
    pub fn page_count(&self) -> usize {
        self.pages.iter().map(ExportedPage::page_count).sum()
    }
}

/// Role referenced by exported grants, matched by name on import.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedRole {
    pub id: RoleId,
    pub name: String,
}

/// One page with its specialized payloads and exported children.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedPage {
    #[serde(flatten)]
    pub page: PageNode,
    #[serde(default)]
    pub children: Vec<ExportedPage>,
    #[serde(default)]
    pub permissions: Vec<PagePermission>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub blocks: Option<ExportedBlocks>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub proposal: Option<ProposalWithEvaluations>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bounty: Option<BountyWithPermissions>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub votes: Vec<VoteWithOptions>,
}

impl ExportedPage {
    pub fn new(page: PageNode) -> Self {
        Self {
            page,
            children: Vec::new(),
            permissions: Vec::new(),
            blocks: None,
            proposal: None,
            bounty: None,
            votes: Vec::new(),
        }
    }

    pub fn page_count(&self) -> usize {
        1 + self
            .children
            .iter()
            .map(ExportedPage::page_count)
            .sum::<usize>()
    }
}

/// Board/view/card payload of board-like and card pages.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportedBlocks {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub board: Option<ContainerBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub views: Vec<ContainerBlock>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub card: Option<ContainerBlock>,
}

/// Parses a snapshot document.
///
/// # Errors
/// - `InvalidInput` when the document is not a JSON object.
/// - `DataNotFound` when the object has no `pages` collection.
/// - `Json` when the collection does not match the snapshot schema.
pub fn parse_snapshot(document: Value) -> TemplateResult<WorkspacePagesExport> {
    let Value::Object(fields) = &document else {
        return Err(TemplateError::InvalidInput(
            "snapshot must be a JSON object".to_string(),
        ));
    };
    if !fields.get("pages").is_some_and(|pages| !pages.is_null()) {
        return Err(TemplateError::DataNotFound(
            "snapshot has no `pages` collection".to_string(),
        ));
    }
    Ok(serde_json::from_value(document)?)
}

/// Parses a snapshot from JSON text.
pub fn parse_snapshot_str(text: &str) -> TemplateResult<WorkspacePagesExport> {
    let document: Value = serde_json::from_str(text)?;
    parse_snapshot(document)
}

/// Rejects names that are not plain `*.json` file names.
pub fn validate_snapshot_name(name: &str) -> TemplateResult<()> {
    if SNAPSHOT_NAME_RE.is_match(name) {
        return Ok(());
    }
    Err(TemplateError::InvalidInput(format!(
        "snapshot name `{name}` must be a plain file name ending in .json"
    )))
}

/// Writes `snapshot` as pretty JSON to `<dir>/<name>`, creating `dir`.
pub fn write_snapshot(
    dir: &Path,
    name: &str,
    snapshot: &WorkspacePagesExport,
) -> TemplateResult<PathBuf> {
    validate_snapshot_name(name)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(name);
    let text = serde_json::to_string_pretty(snapshot)?;
    fs::write(&path, text)?;
    Ok(path)
}

/// Reads the snapshot stored at `<dir>/<name>`.
pub fn read_snapshot(dir: &Path, name: &str) -> TemplateResult<WorkspacePagesExport> {
    validate_snapshot_name(name)?;
    let path = dir.join(name);
    let text = match fs::read_to_string(&path) {
        Ok(text) => text,
        Err(err) if err.kind() == ErrorKind::NotFound => {
            return Err(TemplateError::NotFound(format!("snapshot `{name}`")));
        }
        Err(err) => return Err(err.into()),
    };
    parse_snapshot_str(&text)
}

#[cfg(test)]
mod tests {
    use super::{
        parse_snapshot, read_snapshot, validate_snapshot_name, write_snapshot, ExportedPage,
        WorkspacePagesExport,
    };
    use crate::model::page::{PageNode, PageType};
    use crate::templates::TemplateError;
    use serde_json::json;
    use uuid::Uuid;

    fn sample() -> WorkspacePagesExport {
        let root = PageNode::new(Uuid::new_v4(), None, PageType::Page, "Root", Uuid::new_v4());
        let child = PageNode::new(
            root.space_id,
            Some(root.id),
            PageType::Page,
            "Child",
            root.created_by,
        );
        let mut exported = ExportedPage::new(root);
        exported.children.push(ExportedPage::new(child));
        WorkspacePagesExport {
            pages: vec![exported],
            roles: Vec::new(),
        }
    }

    #[test]
    fn non_object_document_is_invalid_input() {
        assert!(matches!(
            parse_snapshot(json!([1, 2, 3])),
            Err(TemplateError::InvalidInput(_))
        ));
        assert!(matches!(
            parse_snapshot(json!("pages")),
            Err(TemplateError::InvalidInput(_))
        ));
    }

    #[test]
    fn object_without_pages_is_data_not_found() {
        assert!(matches!(
            parse_snapshot(json!({ "roles": [] })),
            Err(TemplateError::DataNotFound(_))
        ));
        assert!(matches!(
            parse_snapshot(json!({ "pages": null })),
            Err(TemplateError::DataNotFound(_))
        ));
    }

    #[test]
    fn empty_pages_collection_parses() {
        let snapshot = parse_snapshot(json!({ "pages": [] })).unwrap();
        assert!(snapshot.pages.is_empty());
        assert!(snapshot.roles.is_empty());
    }

    #[test]
    fn exported_page_uses_camel_case_and_flattened_page_fields() {
        let snapshot = sample();
        let value = serde_json::to_value(&snapshot).unwrap();
        let root = &value["pages"][0];
        assert_eq!(root["type"], "page");
        assert_eq!(root["title"], "Root");
        assert!(root.get("parentId").is_some());
        assert_eq!(root["children"][0]["title"], "Child");
        assert!(root.get("blocks").is_none());
    }

    #[test]
    fn snapshot_names_are_restricted_to_plain_json_files() {
        assert!(validate_snapshot_name("space-export_1.json").is_ok());
        for bad in ["../escape.json", "export.txt", ".hidden.json", "dir/x.json", ""] {
            assert!(
                matches!(validate_snapshot_name(bad), Err(TemplateError::InvalidInput(_))),
                "{bad} should be rejected"
            );
        }
    }

    #[test]
    fn written_snapshot_reads_back() {
        let dir = tempfile::tempdir().unwrap();
        let snapshot = sample();
        let path = write_snapshot(dir.path(), "sample.json", &snapshot).unwrap();
        assert!(path.ends_with("sample.json"));

        let loaded = read_snapshot(dir.path(), "sample.json").unwrap();
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.page_count(), 2);
    }

    #[test]
    fn missing_named_snapshot_is_not_found() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            read_snapshot(dir.path(), "absent.json"),
            Err(TemplateError::NotFound(_))
        ));
    }
}
