use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::patch::{PatchError, validate_patch_set};
use crate::utils::collate::locale_cmp;
use crate::utils::diff::Hunk;

/// Whether a record carries line hunks or a full snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PatchKind {
    Text,
    Binary,
}

/// Payload of a patch record.
///
/// The serialized form has no tag: a JSON array is a list of hunks and a JSON
/// string is a base64 encoded snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PatchData {
    Text(Vec<Hunk>),
    Binary(#[serde(with = "blob")] Vec<u8>),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PatchRecord {
    pub path: String,
    pub data: PatchData,
}

impl PatchRecord {
    pub fn kind(&self) -> PatchKind {
        match self.data {
            PatchData::Text(_) => PatchKind::Text,
            PatchData::Binary(_) => PatchKind::Binary,
        }
    }
}

/// Ordered, immutable collection of patch records.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PatchSet {
    records: Vec<PatchRecord>,
}

impl PatchSet {
    /// Build a set in canonical order: sorted by path with the locale
    /// comparator. Fails on duplicate or unsafe paths.
    pub fn new(mut records: Vec<PatchRecord>) -> Result<Self, PatchError> {
        validate_patch_set(&records)?;
        records.sort_by(|a, b| locale_cmp(&a.path, &b.path));
        Ok(PatchSet { records })
    }

    pub fn records(&self) -> &[PatchRecord] {
        &self.records
    }

    pub fn iter(&self) -> std::slice::Iter<'_, PatchRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Parse a serialized set. Record order is kept as stored.
    pub fn from_json(content: &str) -> Result<Self, PatchError> {
        let records: Vec<PatchRecord> =
            serde_json::from_str(content).map_err(|e| PatchError::PatchSetError {
                reason: e.to_string(),
            })?;
        validate_patch_set(&records)?;
        Ok(PatchSet { records })
    }

    /// Serialize with tab indentation.
    pub fn to_json(&self) -> Result<String, PatchError> {
        let mut buffer = Vec::new();
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"\t");
        let mut serializer = serde_json::Serializer::with_formatter(&mut buffer, formatter);
        self.serialize(&mut serializer)
            .map_err(|e| PatchError::PatchSetError {
                reason: e.to_string(),
            })?;
        String::from_utf8(buffer).map_err(|e| PatchError::PatchSetError {
            reason: e.to_string(),
        })
    }

    pub fn load(path: &Path) -> Result<Self, PatchError> {
        let content = fs::read_to_string(path).map_err(|e| PatchError::read(path, e))?;
        Self::from_json(&content)
    }

    pub fn save(&self, path: &Path) -> Result<(), PatchError> {
        let content = self.to_json()?;
        fs::write(path, content).map_err(|e| PatchError::write(path, e))
    }
}

impl<'a> IntoIterator for &'a PatchSet {
    type Item = &'a PatchRecord;
    type IntoIter = std::slice::Iter<'a, PatchRecord>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Record counts for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PatchSummary {
    pub records: usize,
    pub text: usize,
    pub binary: usize,
    pub hunks: usize,
}

impl PatchSummary {
    pub fn from_patch_set(patch_set: &PatchSet) -> Self {
        let mut text = 0;
        let mut binary = 0;
        let mut hunks = 0;
        for record in patch_set {
            match &record.data {
                PatchData::Text(record_hunks) => {
                    text += 1;
                    hunks += record_hunks.len();
                }
                PatchData::Binary(_) => binary += 1,
            }
        }
        PatchSummary {
            records: patch_set.len(),
            text,
            binary,
            hunks,
        }
    }
}

mod blob {
    use base64::Engine;
    use base64::engine::general_purpose::STANDARD;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD
            .decode(encoded.as_bytes())
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::NamedTempFile;

    fn text_record(path: &str) -> PatchRecord {
        PatchRecord {
            path: path.to_string(),
            data: PatchData::Text(vec![Hunk {
                old_start: 1,
                old_lines: 2,
                new_start: 1,
                new_lines: 2,
                lines: vec![
                    " line1".to_string(),
                    "-line2".to_string(),
                    "+CHANGED".to_string(),
                ],
            }]),
        }
    }

    fn binary_record(path: &str, bytes: &[u8]) -> PatchRecord {
        PatchRecord {
            path: path.to_string(),
            data: PatchData::Binary(bytes.to_vec()),
        }
    }

    #[test]
    fn new_sorts_by_locale_order() {
        let set = PatchSet::new(vec![
            binary_record("smali/b.smali", b"b"),
            binary_record("Zeta.txt", b"z"),
            binary_record("smali_classes2/a.smali", b"a"),
            binary_record("alpha.txt", b"x"),
        ])
        .unwrap();

        let paths: Vec<_> = set.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["alpha.txt", "smali_classes2/a.smali", "smali/b.smali", "Zeta.txt"]
        );
    }

    #[test]
    fn new_rejects_duplicates() {
        let result = PatchSet::new(vec![text_record("a.txt"), binary_record("a.txt", b"x")]);
        assert!(matches!(result, Err(PatchError::DuplicatePath(_))));
    }

    #[test]
    fn kind_follows_data_shape() {
        assert_eq!(text_record("a.txt").kind(), PatchKind::Text);
        assert_eq!(binary_record("logo.png", b"png").kind(), PatchKind::Binary);
    }

    #[test]
    fn text_data_serializes_as_hunk_array() {
        let set = PatchSet::new(vec![text_record("a.txt")]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();

        assert_eq!(value[0]["path"], "a.txt");
        assert!(value[0]["data"].is_array());
        assert_eq!(value[0]["data"][0]["oldStart"], 1);
        assert_eq!(value[0]["data"][0]["lines"][2], "+CHANGED");
    }

    #[test]
    fn binary_data_serializes_as_base64_string() {
        let set = PatchSet::new(vec![binary_record("logo.png", &[0x89, b'P', b'N', b'G'])]).unwrap();

        let value: serde_json::Value = serde_json::from_str(&set.to_json().unwrap()).unwrap();

        assert_eq!(value[0]["data"], "iVBORw==");
    }

    #[test]
    fn shape_decides_kind_when_loading() {
        let json = r#"[
            {"path": "a.txt", "data": [{"oldStart": 1, "oldLines": 1, "newStart": 1, "newLines": 1, "lines": ["-a", "+b"]}]},
            {"path": "logo.png", "data": "AAEC"}
        ]"#;

        let set = PatchSet::from_json(json).unwrap();

        assert_eq!(set.records()[0].kind(), PatchKind::Text);
        assert_eq!(set.records()[1].data, PatchData::Binary(vec![0, 1, 2]));
    }

    #[test]
    fn uses_tab_indentation() {
        let set = PatchSet::new(vec![binary_record("a.bin", b"a")]).unwrap();

        let json = set.to_json().unwrap();

        assert!(json.starts_with("[\n\t{\n\t\t\"path\": \"a.bin\""));
    }

    #[test]
    fn save_and_load_preserves_records() {
        let set = PatchSet::new(vec![text_record("a.txt"), binary_record("logo.png", b"\0\xff")])
            .unwrap();

        let file = NamedTempFile::new().unwrap();
        set.save(file.path()).unwrap();
        let loaded = PatchSet::load(file.path()).unwrap();

        assert_eq!(loaded, set);
    }

    #[test]
    fn load_rejects_invalid_base64() {
        let result = PatchSet::from_json(r#"[{"path": "a.bin", "data": "not base64!"}]"#);
        assert!(matches!(result, Err(PatchError::PatchSetError { .. })));
    }

    #[test]
    fn load_rejects_unsafe_paths() {
        let result = PatchSet::from_json(r#"[{"path": "../a.bin", "data": "AAEC"}]"#);
        assert!(matches!(result, Err(PatchError::InvalidPath { .. })));
    }

    #[test]
    fn load_missing_file_returns_error() {
        let result = PatchSet::load(Path::new("/nonexistent/patches.json"));
        assert!(matches!(result, Err(PatchError::Read { .. })));
    }

    #[test]
    fn summary_counts_kinds_and_hunks() {
        let set = PatchSet::new(vec![
            text_record("a.txt"),
            text_record("b.txt"),
            binary_record("logo.png", b"x"),
        ])
        .unwrap();

        let summary = PatchSummary::from_patch_set(&set);

        assert_eq!(
            summary,
            PatchSummary {
                records: 3,
                text: 2,
                binary: 1,
                hunks: 2,
            }
        );
    }
}
