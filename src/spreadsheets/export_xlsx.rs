use crate::domain::lead::LeadRecord;
use crate::errors::ServerError;
use crate::responses::xlsx_response;
use crate::responses::ResultResp;
use crate::spreadsheets::{lead_cells, LEAD_COLUMNS};
use chrono::NaiveDate;
use rust_xlsxwriter::{Format, Workbook};

/// Budget columns are written as numbers so the sheet can sum them.
const NUMERIC_COLUMNS: [usize; 2] = [7, 8];

pub fn leads_to_xlsx(leads: &[LeadRecord]) -> Result<Vec<u8>, ServerError> {
    let mut workbook = Workbook::new();
    let worksheet = workbook.add_worksheet();
    let bold = Format::new().set_bold();

    for (col, header) in LEAD_COLUMNS.iter().enumerate() {
        worksheet
            .write_string_with_format(0, col as u16, *header, &bold)
            .map_err(|e| {
                ServerError::XlsxError(format!("Failed to write header '{}': {}", header, e))
            })?;
    }

    for (i, lead) in leads.iter().enumerate() {
        let r = (i + 1) as u32;
        let f = &lead.fields;

        for (col, value) in lead_cells(f).iter().enumerate() {
            if NUMERIC_COLUMNS.contains(&col) {
                let amount = if col == 7 { f.budget_min } else { f.budget_max };
                if let Some(n) = amount {
                    worksheet.write_number(r, col as u16, n as f64).map_err(|e| {
                        ServerError::XlsxError(format!("Failed to write {}: {}", LEAD_COLUMNS[col], e))
                    })?;
                }
                continue;
            }

            worksheet.write_string(r, col as u16, value).map_err(|e| {
                ServerError::XlsxError(format!("Failed to write {}: {}", LEAD_COLUMNS[col], e))
            })?;
        }
    }

    workbook
        .save_to_buffer()
        .map_err(|e| ServerError::XlsxError(format!("Failed to save workbook: {}", e)))
}

pub fn export_leads_xlsx(leads: &[LeadRecord], date: NaiveDate) -> ResultResp {
    let buffer = leads_to_xlsx(leads)?;
    xlsx_response(buffer, &format!("buyers-{}.xlsx", date.format("%Y-%m-%d")))
}
