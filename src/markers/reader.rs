use crate::error::Result;
use crate::files::is_marker_file;
use crate::model::ColorStatus;
use serde::Deserialize;
use std::collections::HashMap;
use std::path::Path;
use walkdir::WalkDir;

/// A color-marker document: `{ "Player": { "Nickname": .. }, "ColorMarker": { "IsReg": .. } }`
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MarkerDocument {
    pub player: MarkerPlayer,
    pub color_marker: ColorMarker,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct MarkerPlayer {
    pub nickname: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ColorMarker {
    pub is_reg: bool,
}

impl MarkerDocument {
    pub fn status(&self) -> ColorStatus {
        ColorStatus::from_is_reg(self.color_marker.is_reg)
    }
}

pub fn read_marker(content: &str) -> Result<MarkerDocument> {
    let content = content.trim_start_matches('\u{feff}');
    Ok(serde_json::from_str(content)?)
}

/// Read every marker file under `root` into a nickname -> status map.
///
/// Documents that cannot be read or miss a required field are skipped.
pub fn read_markers(root: &Path) -> Result<HashMap<String, ColorStatus>> {
    let mut markers = HashMap::new();
    let mut skipped = 0;

    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        let is_marker = path
            .file_name()
            .and_then(|s| s.to_str())
            .map(is_marker_file)
            .unwrap_or(false);
        if !is_marker {
            continue;
        }

        let document = std::fs::read_to_string(path)
            .map_err(Into::into)
            .and_then(|content| read_marker(&content));
        match document {
            Ok(doc) => {
                let status = doc.status();
                markers.insert(doc.player.nickname, status);
            }
            Err(e) => {
                log::warn!("Skipping color marker {}: {}", path.display(), e);
                skipped += 1;
            }
        }
    }

    log::info!(
        "Got {} colored players ({} marker files skipped)",
        markers.len(),
        skipped
    );
    Ok(markers)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_read_marker() {
        let doc = read_marker(
            r##"{"Player": {"Nickname": "Bob", "Site": "WNX"}, "ColorMarker": {"IsReg": true, "Color": "#ff0000"}}"##,
        )
        .unwrap();
        assert_eq!(doc.player.nickname, "Bob");
        assert_eq!(doc.status(), ColorStatus::Reg);
    }

    #[test]
    fn test_read_marker_with_bom() {
        let doc = read_marker("\u{feff}{\"Player\":{\"Nickname\":\"x\"},\"ColorMarker\":{\"IsReg\":false}}")
            .unwrap();
        assert_eq!(doc.status(), ColorStatus::Fish);
    }

    #[test]
    fn test_read_marker_missing_field() {
        assert!(read_marker(r#"{"Player": {"Nickname": "Bob"}}"#).is_err());
    }

    #[test]
    fn test_read_markers_skips_bad_documents() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        fs::create_dir_all(&nested).unwrap();
        fs::write(
            dir.path().join("bob.WNX.cm"),
            r#"{"Player":{"Nickname":"Bob"},"ColorMarker":{"IsReg":true}}"#,
        )
        .unwrap();
        fs::write(
            nested.join("carol.WNX.cm"),
            r#"{"Player":{"Nickname":"Carol"},"ColorMarker":{"IsReg":false}}"#,
        )
        .unwrap();
        fs::write(dir.path().join("broken.WNX.cm"), "{").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let markers = read_markers(dir.path()).unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers["Bob"], ColorStatus::Reg);
        assert_eq!(markers["Carol"], ColorStatus::Fish);
    }
}
