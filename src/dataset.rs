use std::{fs::File, io::Read, path::Path};

use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

/// Column the vectorizer is trained on
pub const DESCRIPTION_COLUMN: &str = "description";

/// The document table a similarity index is trained from.
/// Every CSV column is kept. The position of a record is its document id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DatasetData")]
pub struct Dataset {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    description_col: usize,
}

#[derive(Deserialize)]
struct DatasetData {
    headers: Vec<String>,
    records: Vec<Vec<String>>,
    description_col: usize,
}

impl TryFrom<DatasetData> for Dataset {
    type Error = String;

    fn try_from(data: DatasetData) -> std::result::Result<Self, Self::Error> {
        if data.headers.get(data.description_col).map(String::as_str) != Some(DESCRIPTION_COLUMN) {
            return Err(format!(
                "column {} is not `{DESCRIPTION_COLUMN}`",
                data.description_col
            ));
        }
        if let Some(i) = data.records.iter().position(|r| r.len() != data.headers.len()) {
            return Err(format!(
                "record {i} does not have {} fields",
                data.headers.len()
            ));
        }
        Ok(Dataset {
            headers: data.headers,
            records: data.records,
            description_col: data.description_col,
        })
    }
}

impl Dataset {
    /// Load from a local path or an `http(s)://` URL.
    pub fn load(source: &str) -> Result<Self> {
        if source.starts_with("http://") || source.starts_with("https://") {
            Self::from_url(source)
        } else {
            Self::from_path(source)
        }
    }

    /// An unreadable file is reported like an unreachable URL.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| EngineError::Fetch {
            url: path.display().to_string(),
            reason: e.to_string(),
        })?;
        Self::from_reader(file)
    }

    pub fn from_url(url: &str) -> Result<Self> {
        let fetch_err = |e: reqwest::Error| EngineError::Fetch {
            url: url.to_string(),
            reason: e.to_string(),
        };
        let body = reqwest::blocking::get(url)
            .and_then(|resp| resp.error_for_status())
            .and_then(|resp| resp.bytes())
            .map_err(fetch_err)?;
        Self::from_reader(body.as_ref())
    }

    /// Parse CSV with a header row.
    /// Rows with a different field count than the header are a parse error.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let mut rdr = csv::ReaderBuilder::new().has_headers(true).from_reader(reader);
        let headers: Vec<String> = rdr.headers()?.iter().map(str::to_string).collect();
        let description_col = headers
            .iter()
            .position(|h| h == DESCRIPTION_COLUMN)
            .ok_or_else(|| EngineError::MissingColumn {
                column: DESCRIPTION_COLUMN.to_string(),
            })?;
        let records = rdr
            .records()
            .map(|rec| rec.map(|r| r.iter().map(str::to_string).collect()))
            .collect::<std::result::Result<Vec<Vec<String>>, csv::Error>>()?;
        Ok(Dataset {
            headers,
            records,
            description_col,
        })
    }

    /// Single-column dataset
    pub fn from_descriptions<I, S>(descriptions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Dataset {
            headers: vec![DESCRIPTION_COLUMN.to_string()],
            records: descriptions.into_iter().map(|d| vec![d.into()]).collect(),
            description_col: 0,
        }
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn description(&self, row: usize) -> Option<&str> {
        self.records
            .get(row)
            .and_then(|r| r.get(self.description_col))
            .map(String::as_str)
    }

    /// Descriptions in row order
    pub fn descriptions(&self) -> Vec<&str> {
        self.records
            .iter()
            .map(|r| r[self.description_col].as_str())
            .collect()
    }
}
