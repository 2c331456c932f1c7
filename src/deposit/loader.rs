//! Load deposit inputs from CSV

use std::path::Path;

use chrono::NaiveDate;
use csv::Reader;

use super::{CompoundingFrequency, DepositInput, TenureType};
use crate::error::{FdError, FdResult};

/// Raw CSV row
#[derive(Debug, serde::Deserialize)]
struct CsvRow {
    #[serde(rename = "Title", default)]
    title: Option<String>,
    #[serde(rename = "Principal")]
    principal: f64,
    #[serde(rename = "Rate")]
    rate: f64,
    #[serde(rename = "TenureValue")]
    tenure_value: u32,
    #[serde(rename = "TenureType")]
    tenure_type: String,
    #[serde(rename = "Compounding")]
    compounding: String,
    #[serde(rename = "StartDate")]
    start_date: String,
}

impl CsvRow {
    fn into_input(self) -> FdResult<DepositInput> {
        let tenure_type: TenureType = self.tenure_type.parse()?;
        let compounding_frequency: CompoundingFrequency = self.compounding.parse()?;
        let start_date = NaiveDate::parse_from_str(self.start_date.trim(), "%Y-%m-%d")
            .map_err(|e| FdError::invalid("start_date", format!("'{}': {}", self.start_date, e)))?;

        let title = self.title.filter(|t| !t.trim().is_empty());

        let input = DepositInput {
            title,
            principal: self.principal,
            rate: self.rate,
            tenure_value: self.tenure_value,
            tenure_type,
            compounding_frequency,
            start_date,
        };
        input.validate()?;
        Ok(input)
    }
}

/// Load all deposit inputs from a CSV file
pub fn load_deposits<P: AsRef<Path>>(path: P) -> FdResult<Vec<DepositInput>> {
    let reader = Reader::from_path(path).map_err(csv_error)?;
    read_all(reader)
}

/// Load deposit inputs from any reader
pub fn load_deposits_from_reader<R: std::io::Read>(reader: R) -> FdResult<Vec<DepositInput>> {
    read_all(Reader::from_reader(reader))
}

fn read_all<R: std::io::Read>(mut reader: Reader<R>) -> FdResult<Vec<DepositInput>> {
    let headers = reader.headers().map_err(csv_error)?.clone();
    let mut inputs = Vec::new();

    for result in reader.records() {
        let record = result.map_err(csv_error)?;
        let line = record.position().map(|p| p.line()).unwrap_or(0);
        let row: CsvRow = record
            .deserialize(Some(&headers))
            .map_err(|e| FdError::Import {
                line,
                reason: e.to_string(),
            })?;
        let input = row.into_input().map_err(|e| FdError::Import {
            line,
            reason: e.to_string(),
        })?;
        inputs.push(input);
    }

    log::debug!("Loaded {} deposit inputs from CSV", inputs.len());
    Ok(inputs)
}

fn csv_error(e: csv::Error) -> FdError {
    let line = e.position().map(|p| p.line()).unwrap_or(0);
    match e.into_kind() {
        csv::ErrorKind::Io(io) => FdError::Io(io),
        kind => FdError::Import {
            line,
            reason: format!("{:?}", kind),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\
Title,Principal,Rate,TenureValue,TenureType,Compounding,StartDate
Wedding Fund,250000,6.5,2,Years,Quarterly,2024-01-01
,150000,7.1,18,Months,12,2024-03-15
Short,120000,5,90,Days,Yearly,2024-06-30
";

    #[test]
    fn test_load_from_reader() {
        let inputs = load_deposits_from_reader(SAMPLE.as_bytes()).unwrap();
        assert_eq!(inputs.len(), 3);

        assert_eq!(inputs[0].title.as_deref(), Some("Wedding Fund"));
        assert_eq!(inputs[0].compounding_frequency, CompoundingFrequency::Quarterly);

        assert_eq!(inputs[1].title, None);
        assert_eq!(inputs[1].tenure_type, TenureType::Months);
        assert_eq!(inputs[1].compounding_frequency, CompoundingFrequency::Monthly);

        assert_eq!(inputs[2].tenure_value, 90);
        assert_eq!(inputs[2].start_date, NaiveDate::from_ymd_opt(2024, 6, 30).unwrap());
    }

    #[test]
    fn test_unknown_tenure_type_is_reported_with_line() {
        let csv = "\
Title,Principal,Rate,TenureValue,TenureType,Compounding,StartDate
Bad,250000,6.5,2,Weeks,Quarterly,2024-01-01
";
        match load_deposits_from_reader(csv.as_bytes()) {
            Err(FdError::Import { line, reason }) => {
                assert_eq!(line, 2);
                assert!(reason.contains("Weeks"), "{}", reason);
            }
            other => panic!("expected import error, got {:?}", other),
        }
    }

    #[test]
    fn test_bad_date_is_rejected() {
        let csv = "\
Title,Principal,Rate,TenureValue,TenureType,Compounding,StartDate
Bad,250000,6.5,2,Years,Quarterly,01/01/2024
";
        assert!(matches!(
            load_deposits_from_reader(csv.as_bytes()),
            Err(FdError::Import { .. })
        ));
    }
}
