use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// One reportable problem type, e.g. "Pothole"; the id is its catalog key
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportType {
    pub name: String,
    /// ML labels the backend matches against this report type
    #[serde(default)]
    pub labels: Vec<String>,
}

impl ReportType {
    pub fn new(name: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            name: name.into(),
            labels,
        }
    }
}

/// Static report-type reference data keyed by id, in the order the backend listed it
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportCatalog {
    types: IndexMap<String, ReportType>,
}

impl ReportCatalog {
    pub fn get(&self, id: &str) -> Option<&ReportType> {
        self.types.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.types.contains_key(id)
    }

    /// Display name for `id`, `None` when the catalog does not know it
    pub fn name_of(&self, id: &str) -> Option<&str> {
        self.get(id).map(|t| t.name.as_str())
    }

    /// `(id, report type)` pairs in catalog order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ReportType)> {
        self.types.iter().map(|(id, report)| (id.as_str(), report))
    }

    pub fn len(&self) -> usize {
        self.types.len()
    }

    pub fn is_empty(&self) -> bool {
        self.types.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, ReportType)> for ReportCatalog {
    fn from_iter<I: IntoIterator<Item = (K, ReportType)>>(iter: I) -> Self {
        Self {
            types: iter.into_iter().map(|(id, report)| (id.into(), report)).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_keeps_backend_order() {
        let json = r#"{
            "report-pothole": {"name": "Pothole", "labels": ["Road", "Hole"]},
            "report-graffiti": {"name": "Graffiti", "labels": ["Art"]},
            "report-streetlight": {"name": "Broken Streetlight"}
        }"#;

        let catalog: ReportCatalog = serde_json::from_str(json).unwrap();
        let ids: Vec<_> = catalog.iter().map(|(id, _)| id).collect();
        assert_eq!(
            ids,
            vec!["report-pothole", "report-graffiti", "report-streetlight"]
        );
        assert_eq!(catalog.name_of("report-graffiti"), Some("Graffiti"));
        assert!(catalog.get("report-streetlight").unwrap().labels.is_empty());
        assert_eq!(catalog.name_of("report-unknown"), None);
        assert!(!catalog.contains("report-unknown"));
    }

    #[test]
    fn test_catalog_serializes_as_id_map() {
        let catalog: ReportCatalog = [
            ("report-trash", ReportType::new("Overflowing Trash", vec![])),
            ("report-pothole", ReportType::new("Pothole", vec!["Road".to_string()])),
        ]
        .into_iter()
        .collect();

        let value = serde_json::to_value(&catalog).unwrap();
        assert_eq!(value["report-pothole"]["name"], "Pothole");
        assert_eq!(value["report-pothole"]["labels"][0], "Road");
        assert_eq!(
            serde_json::to_string(&catalog).unwrap(),
            r#"{"report-trash":{"name":"Overflowing Trash","labels":[]},"report-pothole":{"name":"Pothole","labels":["Road"]}}"#
        );
    }

    #[test]
    fn test_catalog_rejects_entry_without_name() {
        let json = r#"{"report-pothole": {"labels": ["Road"]}}"#;
        assert!(serde_json::from_str::<ReportCatalog>(json).is_err());
    }
}
