use std::fmt;

use base64::{engine::general_purpose, Engine as _};
use chrono::NaiveDate;

use crate::constants::OUTPUT_DATE_FORMAT;
use crate::models::{Category, ForecastSeries};

// ============================================================================
// Forecast document
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForecastRecord {
    pub date: String,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryNode {
    pub category: Category,
    pub records: Vec<ForecastRecord>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ForecastDocument {
    pub categories: Vec<CategoryNode>,
}

impl ForecastDocument {
    pub fn category(&self, category: Category) -> Option<&CategoryNode> {
        self.categories.iter().find(|node| node.category == category)
    }
}

/// Keeps the points strictly after `today` from every present forecast.
/// Categories without a forecast get no node at all.
pub fn assemble(
    forecasts: impl IntoIterator<Item = (Category, Option<ForecastSeries>)>,
    today: NaiveDate,
) -> ForecastDocument {
    let categories = forecasts
        .into_iter()
        .filter_map(|(category, forecast)| {
            let forecast = forecast?;
            let records = forecast
                .points
                .iter()
                .filter(|point| point.date > today)
                .map(|point| ForecastRecord {
                    date: point.date.format(OUTPUT_DATE_FORMAT).to_string(),
                    value: format_value(point.value),
                })
                .collect();
            Some(CategoryNode { category, records })
        })
        .collect();

    ForecastDocument { categories }
}

/// Shortest round-trip decimal text, always with a fraction or exponent.
pub fn format_value(value: f64) -> String {
    format!("{:?}", value)
}

/// Renders the document as UTF-8 XML.
pub fn render_xml(document: &ForecastDocument) -> String {
    let mut output = String::from("<?xml version='1.0' encoding='utf-8'?>\n");

    if document.categories.is_empty() {
        output.push_str("<forecast_data />");
        return output;
    }

    output.push_str("<forecast_data>");
    for node in &document.categories {
        let tag = node.category.code();
        if node.records.is_empty() {
            output.push_str(&format!("<{} />", tag));
            continue;
        }
        output.push_str(&format!("<{}>", tag));
        for record in &node.records {
            output.push_str(&format!(
                "<record><date>{}</date><value>{}</value></record>",
                record.date, record.value
            ));
        }
        output.push_str(&format!("</{}>", tag));
    }
    output.push_str("</forecast_data>");
    output
}

// ============================================================================
// Run report
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Failure,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Status::Success => f.write_str("Success"),
            Status::Failure => f.write_str("Failure"),
        }
    }
}

/// The single result of a run: either the rendered document or a diagnostic
/// that replaces it wholesale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunReport {
    pub payload: String,
    pub status: Status,
}

impl RunReport {
    pub fn success(document: &ForecastDocument) -> Self {
        Self {
            payload: render_xml(document),
            status: Status::Success,
        }
    }

    pub fn failure(error: &dyn fmt::Display) -> Self {
        Self {
            payload: format!("Error: {}", error),
            status: Status::Failure,
        }
    }

    pub fn from_result<E: fmt::Display>(result: Result<ForecastDocument, E>) -> Self {
        match result {
            Ok(document) => Self::success(&document),
            Err(e) => Self::failure(&e),
        }
    }

    /// `<base64 payload> <payload byte length> <status>`
    pub fn to_line(&self) -> String {
        let encoded = general_purpose::STANDARD.encode(self.payload.as_bytes());
        format!("{} {} {}", encoded, self.payload.len(), self.status)
    }
}
