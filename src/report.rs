use log::info;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::Path;

use crate::error::Result;
use crate::node_map::{InMemoryNodeMap, NodeWrite, PropertyValue};

/// What a configuration run did to the node map.
#[derive(Debug, Serialize)]
pub struct WriteReport<'a> {
    pub model: &'a str,
    pub writes: &'a [NodeWrite],
    pub final_values: BTreeMap<String, PropertyValue>,
}

impl<'a> WriteReport<'a> {
    pub fn new(model: &'a str, node_map: &'a InMemoryNodeMap) -> Self {
        Self {
            model,
            writes: node_map.writes(),
            final_values: node_map.snapshot(),
        }
    }
}

pub fn save_write_report(report: &WriteReport<'_>, save_path: &Path) -> Result<()> {
    info!("Saving write log to {}", save_path.display());

    let file = File::create(save_path)?;
    serde_json::to_writer_pretty(file, report)?;

    info!("Saved {} writes", report.writes.len());

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::AppError;
    use crate::node_map::NodeMap;

    #[test]
    fn test_report_serializes_writes_in_order() {
        let mut nm = InMemoryNodeMap::flea3_mono();
        nm.set_enum("GainAuto", "Off").unwrap();
        nm.set_float("Gain", 3.0).unwrap();

        let report = WriteReport::new("mono", &nm);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["model"], "mono");
        assert_eq!(json["writes"][0]["name"], "GainAuto");
        assert_eq!(json["writes"][0]["value"], "Off");
        assert_eq!(json["writes"][1]["value"], 3.0);
        assert_eq!(json["final_values"]["Gain"], 3.0);
    }

    #[test]
    fn test_missing_folder_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("absent").join("writes.json");
        let nm = InMemoryNodeMap::flea3_color();

        let err = save_write_report(&WriteReport::new("color", &nm), &path).unwrap_err();
        assert!(matches!(err, AppError::Io(_)));
    }

    #[test]
    fn test_json_errors_convert_to_serialization_errors() {
        let err: AppError = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, AppError::Serialization(_)));
    }
}
