// src/domain/query.rs

use crate::domain::lead::{City, LeadRecord, PropertyType, Status, Timeline};
use crate::errors::ServerError;
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;

/// Search and exact-match filters shared by the list page, the JSON list and
/// the CSV/XLSX exports.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LeadFilter {
    pub search: Option<String>,
    pub city: Option<City>,
    pub property_type: Option<PropertyType>,
    pub status: Option<Status>,
    pub timeline: Option<Timeline>,
}

impl LeadFilter {
    /// Builds a filter from query-string pairs. Blank values mean "any".
    pub fn from_params(params: &HashMap<String, String>) -> Result<Self, ServerError> {
        Ok(Self {
            search: params.get("search").and_then(|s| {
                let s = s.trim();
                (!s.is_empty()).then(|| s.to_string())
            }),
            city: parse_param(params, "city")?,
            property_type: parse_param(params, "propertyType")?,
            status: parse_param(params, "status")?,
            timeline: parse_param(params, "timeline")?,
        })
    }

    /// The filter as query-string pairs, for pagination and export links.
    pub fn to_params(&self) -> Vec<(&'static str, String)> {
        let mut out = Vec::new();
        if let Some(s) = &self.search {
            out.push(("search", s.clone()));
        }
        if let Some(c) = self.city {
            out.push(("city", c.as_str().to_string()));
        }
        if let Some(p) = self.property_type {
            out.push(("propertyType", p.as_str().to_string()));
        }
        if let Some(s) = self.status {
            out.push(("status", s.as_str().to_string()));
        }
        if let Some(t) = self.timeline {
            out.push(("timeline", t.as_str().to_string()));
        }
        out
    }

    pub fn query_string(&self, page: Option<i64>) -> String {
        let mut ser = url::form_urlencoded::Serializer::new(String::new());
        for (k, v) in self.to_params() {
            ser.append_pair(k, &v);
        }
        if let Some(p) = page {
            ser.append_pair("page", &p.to_string());
        }
        ser.finish()
    }
}

fn parse_param<T>(params: &HashMap<String, String>, key: &str) -> Result<Option<T>, ServerError>
where
    T: FromStr<Err = String>,
{
    match params.get(key).map(|v| v.trim()).filter(|v| !v.is_empty()) {
        Some(raw) => raw
            .parse()
            .map(Some)
            .map_err(|e| ServerError::BadRequest(format!("{key}: {e}"))),
        None => Ok(None),
    }
}

/// `page` query parameter; missing, unparsable or < 1 means the first page.
pub fn page_param(params: &HashMap<String, String>) -> i64 {
    params
        .get("page")
        .and_then(|p| p.trim().parse::<i64>().ok())
        .unwrap_or(1)
        .max(1)
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: i64,
    pub limit: i64,
    pub total: i64,
    pub total_pages: i64,
}

impl Pagination {
    /// `page` is clamped to `1..=total_pages`, so a request past the end
    /// lands on the last page.
    pub fn new(page: i64, limit: i64, total: i64) -> Self {
        let total_pages = if limit > 0 { (total + limit - 1) / limit } else { 0 };
        Self {
            page: page.clamp(1, total_pages.max(1)),
            limit,
            total,
            total_pages,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.page - 1).saturating_mul(self.limit)
    }

    pub fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub fn has_next(&self) -> bool {
        self.page < self.total_pages
    }
}

/// One page of leads plus its position in the full result.
#[derive(Debug, Clone, Serialize)]
pub struct LeadPage {
    pub buyers: Vec<LeadRecord>,
    pub pagination: Pagination,
}
