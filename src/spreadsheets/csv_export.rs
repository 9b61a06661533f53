use crate::domain::lead::LeadRecord;
use crate::errors::ServerError;
use crate::responses::{csv_response, ResultResp};
use crate::spreadsheets::{lead_cells, LEAD_COLUMNS};
use chrono::NaiveDate;

pub fn export_filename(date: NaiveDate) -> String {
    format!("buyers-{}.csv", date.format("%Y-%m-%d"))
}

pub fn leads_to_csv(leads: &[LeadRecord]) -> Result<Vec<u8>, ServerError> {
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer.write_record(LEAD_COLUMNS)?;
    for lead in leads {
        writer.write_record(lead_cells(&lead.fields))?;
    }
    writer
        .into_inner()
        .map_err(|e| ServerError::CsvError(format!("Failed to flush CSV: {e}")))
}

pub fn export_leads_csv(leads: &[LeadRecord], date: NaiveDate) -> ResultResp {
    let buffer = leads_to_csv(leads)?;
    csv_response(buffer, &export_filename(date))
}
