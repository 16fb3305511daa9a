//! Opportunity catalog import from JSON (array of records) or CSV exports.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Deserializer};

use super::domain::{parse_deadline, OpportunityDraft, ProvinceScope};

#[derive(Debug)]
pub enum CatalogError {
    Io(std::io::Error),
    Csv(csv::Error),
    Json(serde_json::Error),
    InvalidRow { row: usize, message: String },
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::Io(err) => write!(f, "failed to read opportunity catalog: {}", err),
            CatalogError::Csv(err) => write!(f, "invalid opportunity CSV data: {}", err),
            CatalogError::Json(err) => write!(f, "invalid opportunity JSON data: {}", err),
            CatalogError::InvalidRow { row, message } => {
                write!(f, "catalog row {} rejected: {}", row, message)
            }
        }
    }
}

impl std::error::Error for CatalogError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CatalogError::Io(err) => Some(err),
            CatalogError::Csv(err) => Some(err),
            CatalogError::Json(err) => Some(err),
            CatalogError::InvalidRow { .. } => None,
        }
    }
}

impl From<std::io::Error> for CatalogError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<csv::Error> for CatalogError {
    fn from(err: csv::Error) -> Self {
        Self::Csv(err)
    }
}

impl From<serde_json::Error> for CatalogError {
    fn from(err: serde_json::Error) -> Self {
        Self::Json(err)
    }
}

/// Supported catalog encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CatalogFormat {
    Json,
    Csv,
}

impl CatalogFormat {
    /// `.csv` files are CSV; everything else is read as JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("csv") => Self::Csv,
            _ => Self::Json,
        }
    }
}

pub struct CatalogImporter;

impl CatalogImporter {
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Vec<OpportunityDraft>, CatalogError> {
        let path = path.as_ref();
        let file = std::fs::File::open(path)?;
        Self::from_reader(file, CatalogFormat::from_path(path))
    }

    pub fn from_reader<R: Read>(
        reader: R,
        format: CatalogFormat,
    ) -> Result<Vec<OpportunityDraft>, CatalogError> {
        match format {
            CatalogFormat::Json => Ok(serde_json::from_reader(reader)?),
            CatalogFormat::Csv => parse_csv(reader),
        }
    }
}

#[derive(Debug, Deserialize)]
struct CatalogRow {
    #[serde(rename = "Title")]
    title: String,
    #[serde(rename = "Organisation", default, deserialize_with = "empty_string_as_none")]
    organisation: Option<String>,
    #[serde(rename = "Url", default, deserialize_with = "empty_string_as_none")]
    url: Option<String>,
    #[serde(rename = "Deadline", default, deserialize_with = "empty_string_as_none")]
    deadline: Option<String>,
    #[serde(rename = "Fields", default)]
    fields: String,
    #[serde(rename = "Eligible Years", default)]
    eligible_years: String,
    #[serde(rename = "Provinces", default)]
    provinces: String,
    #[serde(rename = "Min Average", default, deserialize_with = "empty_string_as_none")]
    min_average: Option<String>,
    #[serde(rename = "Income Cap", default, deserialize_with = "empty_string_as_none")]
    income_cap: Option<String>,
    #[serde(rename = "Description", default, deserialize_with = "empty_string_as_none")]
    description: Option<String>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let opt = Option::<String>::deserialize(deserializer)?;
    Ok(opt.filter(|value| !value.trim().is_empty()))
}

fn split_list(raw: &str) -> impl Iterator<Item = &str> {
    raw.split(';').map(str::trim).filter(|item| !item.is_empty())
}

fn parse_csv<R: Read>(reader: R) -> Result<Vec<OpportunityDraft>, CatalogError> {
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);
    let mut drafts = Vec::new();

    for (index, record) in csv_reader.deserialize::<CatalogRow>().enumerate() {
        let row = index + 1;
        drafts.push(row_to_draft(record?, row)?);
    }

    Ok(drafts)
}

fn row_to_draft(row: CatalogRow, index: usize) -> Result<OpportunityDraft, CatalogError> {
    let invalid = |message: String| CatalogError::InvalidRow {
        row: index,
        message,
    };

    let eligible_years = split_list(&row.eligible_years)
        .map(|year| {
            year.parse::<u8>()
                .map_err(|_| invalid(format!("eligible year '{year}' is not a number")))
        })
        .collect::<Result<BTreeSet<u8>, _>>()?;

    let number = |raw: Option<String>, column: &str| -> Result<Option<f64>, CatalogError> {
        raw.map(|value| {
            value
                .parse::<f64>()
                .map_err(|_| invalid(format!("{column} '{value}' is not a number")))
        })
        .transpose()
    };

    let deadline = row
        .deadline
        .as_deref()
        .map(parse_deadline)
        .transpose()
        .map_err(invalid)?;

    Ok(OpportunityDraft {
        title: row.title,
        organisation: row.organisation,
        fields: split_list(&row.fields).map(str::to_string).collect(),
        eligible_years,
        provinces: ProvinceScope::from(
            split_list(&row.provinces)
                .map(str::to_string)
                .collect::<Vec<_>>(),
        ),
        min_average: number(row.min_average, "min average")?,
        income_cap: number(row.income_cap, "income cap")?,
        deadline,
        url: row.url,
        description: row.description,
        requirements: Vec::new(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CSV: &str = "Title,Organisation,Url,Deadline,Fields,Eligible Years,Provinces,Min Average,Income Cap,Description\n\
        Sasol STEM Undergraduate Bursary,Sasol Foundation,https://www.sasolbursaries.com/stem-undergraduate,2025-11-30,Engineering;Information Technology,1;2;3;4,Mpumalanga;Gauteng,65,600000,Full funding\n\
        Transnet Bursary,Transnet,,2025-10-06,Engineering;Accounting,1;2;3;4,All,65,,\n";

    #[test]
    fn imports_csv_rows() {
        let drafts =
            CatalogImporter::from_reader(Cursor::new(CSV), CatalogFormat::Csv).expect("csv parses");
        assert_eq!(drafts.len(), 2);

        let sasol = &drafts[0];
        assert_eq!(sasol.eligible_years.len(), 4);
        assert_eq!(sasol.income_cap, Some(600_000.0));
        assert!(matches!(sasol.provinces, ProvinceScope::RestrictedTo(ref set) if set.len() == 2));

        let transnet = &drafts[1];
        assert_eq!(transnet.provinces, ProvinceScope::Unrestricted);
        assert!(transnet.url.is_none());
        assert!(transnet.income_cap.is_none());
    }

    #[test]
    fn reports_bad_numbers_with_row_index() {
        let csv = "Title,Eligible Years,Provinces,Min Average\nBroken,1;two,All,65\n";
        match CatalogImporter::from_reader(Cursor::new(csv), CatalogFormat::Csv) {
            Err(CatalogError::InvalidRow { row, message }) => {
                assert_eq!(row, 1);
                assert!(message.contains("two"));
            }
            other => panic!("expected invalid row, got {other:?}"),
        }
    }

    #[test]
    fn imports_json_array() {
        let json = r#"[{"title":"NSTF Available Undergraduate Bursaries","provinces":["All"],"eligibleYears":[1,2,3,4],"fields":["Science"],"deadline":"2025-09-30"}]"#;
        let drafts = CatalogImporter::from_reader(Cursor::new(json), CatalogFormat::Json)
            .expect("json parses");
        assert_eq!(drafts[0].title, "NSTF Available Undergraduate Bursaries");
        assert!(drafts[0].deadline.is_some());
    }

    #[test]
    fn csv_extension_selects_csv_format() {
        assert_eq!(
            CatalogFormat::from_path(Path::new("seed/opportunities.CSV")),
            CatalogFormat::Csv
        );
        assert_eq!(
            CatalogFormat::from_path(Path::new("seed/opportunities.json")),
            CatalogFormat::Json
        );
    }
}
