pub mod csv_export;
pub mod csv_import;
pub mod export_xlsx;

pub use csv_export::{export_leads_csv, export_filename};
pub use csv_import::{parse_import, ImportReport, ParsedImport, RowError};
pub use export_xlsx::export_leads_xlsx;

use crate::domain::lead::{join_tags, LeadFields};

/// Column order shared by CSV import, CSV export and the XLSX sheet.
pub const LEAD_COLUMNS: [&str; 14] = [
    "fullName",
    "email",
    "phone",
    "city",
    "propertyType",
    "bhk",
    "purpose",
    "budgetMin",
    "budgetMax",
    "timeline",
    "source",
    "notes",
    "tags",
    "status",
];

/// A lead as one row of cells, in `LEAD_COLUMNS` order.
pub fn lead_cells(f: &LeadFields) -> [String; 14] {
    let opt_num = |v: Option<i64>| v.map(|n| n.to_string()).unwrap_or_default();
    [
        f.full_name.clone(),
        f.email.clone().unwrap_or_default(),
        f.phone.clone(),
        f.city.to_string(),
        f.property_type.to_string(),
        f.bhk.map(|b| b.to_string()).unwrap_or_default(),
        f.purpose.to_string(),
        opt_num(f.budget_min),
        opt_num(f.budget_max),
        f.timeline.to_string(),
        f.source.to_string(),
        f.notes.clone().unwrap_or_default(),
        join_tags(&f.tags),
        f.status.to_string(),
    ]
}
