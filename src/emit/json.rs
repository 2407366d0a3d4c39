use serde::Serialize;

use crate::resolve::{Diagnostics, Report};
use crate::types::{Language, Origin, SymbolName};

#[derive(Serialize)]
pub struct JsonOutput {
    pub version: String,
    pub input_digest: String,
    pub root: String,
    pub stages: Vec<Vec<String>>,
    pub order: Vec<String>,
    pub diagnostics: Diagnostics,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub units: Option<Vec<UnitOutput>>,
}

#[derive(Serialize)]
pub struct UnitOutput {
    pub path: String,
    pub language: Language,
    pub origin: Origin,
    pub defines: Vec<SymbolName>,
    pub requires: Vec<SymbolName>,
    pub depends_on: Vec<String>,
}

impl JsonOutput {
    pub fn from_report(report: &Report, include_units: bool) -> Self {
        let resolution = &report.resolution;

        let units = include_units.then(|| {
            resolution
                .units
                .iter()
                .enumerate()
                .map(|(id, unit)| UnitOutput {
                    path: unit.path.display().to_string(),
                    language: unit.language,
                    origin: unit.origin,
                    defines: unit.defines.clone(),
                    requires: unit.requires.iter().cloned().collect(),
                    depends_on: resolution
                        .graph
                        .dependencies(id)
                        .into_iter()
                        .map(|dep| resolution.unit(dep).path.display().to_string())
                        .collect(),
                })
                .collect()
        });

        Self {
            version: env!("CARGO_PKG_VERSION").to_string(),
            input_digest: report.input_digest.clone(),
            root: report.root.display().to_string(),
            stages: resolution
                .stage_paths()
                .into_iter()
                .map(|stage| stage.iter().map(|p| p.display().to_string()).collect())
                .collect(),
            order: resolution
                .ordered_paths()
                .iter()
                .map(|p| p.display().to_string())
                .collect(),
            diagnostics: report.diagnostics(),
            units,
        }
    }

    pub fn to_json(&self) -> String {
        serde_json::to_string_pretty(self).unwrap_or_else(|_| "{}".to_string())
    }
}
