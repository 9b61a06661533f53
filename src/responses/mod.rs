pub mod download;
pub mod errors;
pub mod html;
pub mod json;
pub mod redirect;

pub use download::{csv_response, xlsx_response};
pub use errors::{api_error_response, html_error_response, ResultResp};
pub use html::{html_response, html_response_with_status};
pub use json::{json_response, json_response_with_status};
pub use redirect::{redirect, redirect_with_cookie};
