use crate::errors::ServerError;
use crate::responses::ResultResp;
use astra::{Body, ResponseBuilder};

const XLSX_MIME: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A file the browser saves as `filename` instead of rendering.
fn attachment(content_type: &str, buffer: Vec<u8>, filename: &str) -> ResultResp {
    ResponseBuilder::new()
        .status(200)
        .header("Content-Type", content_type)
        .header(
            "Content-Disposition",
            format!("attachment; filename=\"{filename}\""),
        )
        .header("Cache-Control", "no-store")
        .body(Body::from(buffer))
        .map_err(|_| ServerError::InternalError)
}

pub fn csv_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    attachment("text/csv; charset=utf-8", buffer, filename)
}

pub fn xlsx_response(buffer: Vec<u8>, filename: &str) -> ResultResp {
    attachment(XLSX_MIME, buffer, filename)
}
