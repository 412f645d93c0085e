use crate::navigator::FetchError;
use serde::{Deserialize, Serialize};

/// Column captions used for tabular output and CSV export
pub const COLUMNS: [&str; 5] = [
    "Project Name",
    "RERA Number",
    "Promoter Name",
    "Address",
    "GST Number",
];

/// Identity of a project as shown on its detail view
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRecord {
    /// Project name
    pub name: String,

    /// RERA registration number
    pub regulatory_id: String,
}

/// Identity of the promoter behind a project
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PromoterRecord {
    /// Proprietor or company name
    pub entity_name: String,

    /// Residence or registered office address
    pub address: String,

    /// GST number
    pub tax_id: String,
}

/// One fully processed listing entry
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombinedRecord {
    #[serde(flatten)]
    pub project: ProjectRecord,

    #[serde(flatten)]
    pub promoter: PromoterRecord,
}

impl CombinedRecord {
    /// Merge the two halves captured for one item
    pub fn merge(project: ProjectRecord, promoter: PromoterRecord) -> Self {
        Self { project, promoter }
    }

    /// Field values in `COLUMNS` order
    pub fn to_row(&self) -> Vec<String> {
        vec![
            self.project.name.clone(),
            self.project.regulatory_id.clone(),
            self.promoter.entity_name.clone(),
            self.promoter.address.clone(),
            self.promoter.tax_id.clone(),
        ]
    }
}

/// Records in visitation order
pub type ResultSet = Vec<CombinedRecord>;

/// A recoverable failure on a single listing entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemWarning {
    /// 1-based position of the entry in the listing
    pub item: usize,

    pub message: String,
}

impl std::fmt::Display for ItemWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.item, self.message)
    }
}

/// Outcome of one run: whatever was captured, plus what went wrong
#[derive(Debug, Default)]
pub struct FetchReport {
    pub records: ResultSet,
    pub warnings: Vec<ItemWarning>,
    pub failure: Option<FetchError>,
}

impl FetchReport {
    /// Report for a run that failed before any entry was visited
    pub fn failed(failure: FetchError) -> Self {
        Self {
            records: Vec::new(),
            warnings: Vec::new(),
            failure: Some(failure),
        }
    }

    pub fn is_success(&self) -> bool {
        self.failure.is_none()
    }

    /// Drop warnings and turn the report into a plain result
    pub fn into_result(self) -> Result<ResultSet, FetchError> {
        match self.failure {
            Some(e) => Err(e),
            None => Ok(self.records),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> CombinedRecord {
        CombinedRecord::merge(
            ProjectRecord {
                name: "Alpha Heights".to_string(),
                regulatory_id: "RERA/2023/001".to_string(),
            },
            PromoterRecord {
                entity_name: "Alpha Builders".to_string(),
                address: "Bhubaneswar".to_string(),
                tax_id: String::new(),
            },
        )
    }

    #[test]
    fn test_row_follows_column_order() {
        let row = sample().to_row();
        assert_eq!(row.len(), COLUMNS.len());
        assert_eq!(
            row,
            vec![
                "Alpha Heights",
                "RERA/2023/001",
                "Alpha Builders",
                "Bhubaneswar",
                ""
            ]
        );
    }

    #[test]
    fn test_serialized_record_is_flat() {
        let value = serde_json::to_value(sample()).unwrap();
        assert_eq!(value["name"], "Alpha Heights");
        assert_eq!(value["tax_id"], "");
        assert!(value.get("project").is_none());
    }

    #[test]
    fn test_report_into_result() {
        let report = FetchReport {
            records: vec![sample()],
            ..FetchReport::default()
        };
        assert!(report.is_success());
        assert_eq!(report.into_result().unwrap().len(), 1);

        let report = FetchReport::failed(FetchError::NoViewControls {
            selector: "a.btn.btn-primary".to_string(),
            timeout: std::time::Duration::from_secs(15),
        });
        assert!(!report.is_success());
        assert!(report.into_result().is_err());
    }

    #[test]
    fn test_warning_display() {
        let warning = ItemWarning {
            item: 3,
            message: "Unable to access promoter tab".to_string(),
        };
        assert_eq!(warning.to_string(), "[3] Unable to access promoter tab");
    }
}
