//! Client info payload served by the client lookup

use crate::dataset::{ClientRecord, ColumnKind, Schema, Value};
use crate::error::QueryError;
use anyhow::{ensure, Result};
use serde::{Deserialize, Serialize};

/// Personal information of one client: age, income, credit and annuity amounts
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientInfo {
    /// Age in days before the application (negative)
    #[serde(rename = "DAYS_BIRTH")]
    pub days_birth: Option<i64>,

    /// Total income of the client
    #[serde(rename = "AMT_INCOME_TOTAL")]
    pub amt_income_total: Option<f64>,

    /// Credit amount of the loan
    #[serde(rename = "AMT_CREDIT")]
    pub amt_credit: Option<f64>,

    /// Loan annuity
    #[serde(rename = "AMT_ANNUITY")]
    pub amt_annuity: Option<f64>,
}

impl ClientInfo {
    /// Columns every dataset must provide, all numeric
    pub const COLUMNS: [&'static str; 4] =
        ["DAYS_BIRTH", "AMT_INCOME_TOTAL", "AMT_CREDIT", "AMT_ANNUITY"];

    /// Startup check that the schema can serve client info
    pub fn check_schema(schema: &Schema) -> Result<()> {
        for name in Self::COLUMNS {
            let spec = schema.resolve(name).ok().map(|(_, spec)| spec);
            ensure!(spec.is_some(), "Dataset is missing column {name}");
            ensure!(
                spec.is_some_and(|spec| spec.kind.is_numeric()),
                "Column {name} must be numeric"
            );
        }
        // Age is served as whole days
        let (_, days) = schema.resolve("DAYS_BIRTH")?;
        ensure!(
            days.kind == ColumnKind::Integer,
            "Column DAYS_BIRTH must hold whole days"
        );
        Ok(())
    }

    /// Extract the payload from a raw record
    pub fn from_record(record: &ClientRecord<'_>) -> Result<Self, QueryError> {
        Ok(Self {
            days_birth: match record.value("DAYS_BIRTH")? {
                Value::Integer(days) => Some(days),
                _ => None,
            },
            amt_income_total: record.number("AMT_INCOME_TOTAL")?,
            amt_credit: record.number("AMT_CREDIT")?,
            amt_annuity: record.number("AMT_ANNUITY")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::{ClientStore, DatasetLoader};

    fn load(csv: &str) -> ClientStore {
        let dataset = DatasetLoader::with_settings(100, "SK_ID_CURR")
            .load_reader(csv.as_bytes())
            .unwrap();
        ClientStore::fit(dataset).unwrap()
    }

    #[test]
    fn test_client_info_from_record() {
        let store = load(
            "SK_ID_CURR,DAYS_BIRTH,AMT_INCOME_TOTAL,AMT_CREDIT,AMT_ANNUITY\n\
             100002,-9461,202500.0,406597.5,24700.5\n",
        );
        let record = store.get_client(100002).unwrap();
        let info = ClientInfo::from_record(&record).unwrap();

        assert_eq!(
            info,
            ClientInfo {
                days_birth: Some(-9461),
                amt_income_total: Some(202500.0),
                amt_credit: Some(406597.5),
                amt_annuity: Some(24700.5),
            }
        );
    }

    #[test]
    fn test_client_info_serialization() {
        let info = ClientInfo {
            days_birth: Some(-9461),
            amt_income_total: Some(202500.0),
            amt_credit: Some(406597.5),
            amt_annuity: None,
        };

        let json = serde_json::to_value(&info).unwrap();
        assert_eq!(json["DAYS_BIRTH"], -9461);
        assert_eq!(json["AMT_INCOME_TOTAL"], 202500.0);
        assert_eq!(json["AMT_CREDIT"], 406597.5);
        assert!(json["AMT_ANNUITY"].is_null());
    }

    #[test]
    fn test_check_schema() {
        let store = load("SK_ID_CURR,DAYS_BIRTH,AMT_INCOME_TOTAL,AMT_CREDIT\n1,-1,1.0,1.0\n");
        let err = ClientInfo::check_schema(store.schema()).unwrap_err();
        assert!(err.to_string().contains("AMT_ANNUITY"));

        let store = load(
            "SK_ID_CURR,DAYS_BIRTH,AMT_INCOME_TOTAL,AMT_CREDIT,AMT_ANNUITY\n1,young,1.0,1.0,1.0\n",
        );
        let err = ClientInfo::check_schema(store.schema()).unwrap_err();
        assert!(err.to_string().contains("numeric"));
    }

    #[test]
    fn test_fractional_days_birth_rejected() {
        let store = load(
            "SK_ID_CURR,DAYS_BIRTH,AMT_INCOME_TOTAL,AMT_CREDIT,AMT_ANNUITY
             100002,-9461.5,202500.0,406597.5,24700.5
",
        );
        let err = ClientInfo::check_schema(store.schema()).unwrap_err();
        assert!(err.to_string().contains("DAYS_BIRTH"));
    }
}
