//! Regex extraction from water.gov.ge HTML
//!
//! The listing and incident pages are rendered HTML with fixed label
//! text and fixed block ordering, not an API. Everything here is pure and
//! synchronous so it can be exercised against stored fixtures.

use chrono::{DateTime, FixedOffset};
use regex::Regex;
use scraper::Html;

use crate::outage::{
    error::ExtractError,
    types::{Location, MapMarker, OutageRecord},
};
use crate::translit::translit;

/// Suffix ("service center") carried by every listing title.
pub const TITLE_SUFFIX_GE: &str = " სერვის ცენტრი";

/// Layout of the start/end timestamps on incident pages.
pub const OUTAGE_DATE_TIME_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

/// Number of leading `<div>` blocks on an incident page that are not addresses.
const HEADER_BLOCKS: usize = 3;

/// Compiled patterns for the listing and incident documents.
pub struct WaterGovGeParser {
    map_markers: Regex,
    outage_start: Regex,
    outage_end: Regex,
    affected_customers: Regex,
    text_block: Regex,
}

impl Default for WaterGovGeParser {
    fn default() -> Self {
        Self::new()
    }
}

impl WaterGovGeParser {
    pub fn new() -> Self {
        Self {
            map_markers: Regex::new(r"var markers = (\[.+\]);").expect("valid regex"),
            outage_start: Regex::new(
                r"<div>\s+წყალმომარაგების\s+შეწყვეტის\s+დრო:\s+([\d/\s:]+)\s+</div>",
            )
            .expect("valid regex"),
            outage_end: Regex::new(
                r"<div>\s+წყალმომარაგების\s+აღდგენის\s+დრო:\s+([\d/\s:]+)\s+</div>",
            )
            .expect("valid regex"),
            affected_customers: Regex::new(
                r"<div>\sგამორთული\sაბონენტების\sრაოდენობა:\s(\d+)\s</div>",
            )
            .expect("valid regex"),
            text_block: Regex::new(r"<div>\s*([^<>]+)\s*</div>").expect("valid regex"),
        }
    }

    /// Decode the `var markers = [...];` payload embedded in the listing page.
    pub fn parse_map_markers(&self, html: &str) -> Result<Vec<MapMarker>, ExtractError> {
        let payload = self
            .map_markers
            .captures(html)
            .and_then(|cap| cap.get(1))
            .ok_or(ExtractError::ListingPayloadNotFound)?;

        serde_json::from_str(payload.as_str())
            .map_err(|source| ExtractError::MalformedListing { source })
    }

    /// Parse one incident page into a record for `location`.
    pub fn parse_incident(
        &self,
        location: Location,
        html: &str,
    ) -> Result<OutageRecord, ExtractError> {
        let raw_start = capture(&self.outage_start, html).ok_or(ExtractError::OutageStartNotFound)?;
        let raw_end = capture(&self.outage_end, html).ok_or(ExtractError::OutageEndNotFound)?;

        let start = parse_outage_time("outage start", raw_start)?;
        let end = parse_outage_time("outage end", raw_end)?;

        let raw_affected = capture(&self.affected_customers, html)
            .ok_or(ExtractError::AffectedCustomersNotFound)?;
        let affected_customers =
            raw_affected
                .parse::<u32>()
                .map_err(|_| ExtractError::InvalidAffectedCustomers {
                    value: raw_affected.to_string(),
                })?;

        let blocks: Vec<&str> = self
            .text_block
            .captures_iter(html)
            .filter_map(|cap| cap.get(1).map(|m| m.as_str()))
            .collect();
        if blocks.len() <= HEADER_BLOCKS {
            return Err(ExtractError::NoAddresses);
        }

        let addresses_ge = blocks[HEADER_BLOCKS..]
            .iter()
            .map(|block| decode_entities(block).trim().to_string())
            .collect();

        Ok(OutageRecord {
            location,
            start,
            end,
            affected_customers,
            addresses_ge,
        })
    }
}

/// Build the [`Location`] for a listing marker.
///
/// The "service center" suffix is dropped from the title before
/// transliteration; a title without it is kept whole.
pub fn marker_location(marker: &MapMarker) -> Location {
    let title = marker.title.trim();
    let title_ge = match title.strip_suffix(TITLE_SUFFIX_GE) {
        Some(short) => short,
        None => {
            tracing::warn!(marker_id = %marker.id.trim(), title, "no suffix found");
            title
        }
    };

    Location {
        id: marker.id.trim().to_string(),
        title_ge: title_ge.to_string(),
        title_lat: translit(title_ge),
        lat: marker.lat.trim().to_string(),
        lng: marker.lng.trim().to_string(),
    }
}

/// Parse `DD/MM/YYYY HH:MM:SS` as civil time in the source zone.
pub fn parse_outage_time(
    field: &'static str,
    raw: &str,
) -> Result<DateTime<FixedOffset>, ExtractError> {
    let value = raw.trim();
    let offset = crate::outage::types::source_offset();
    DateTime::parse_from_str(
        &format!("{value} {offset}"),
        &format!("{OUTAGE_DATE_TIME_FORMAT} %:z"),
    )
    .map_err(|source| ExtractError::InvalidTimestamp {
        field,
        value: value.to_string(),
        source,
    })
}

fn capture<'h>(re: &Regex, html: &'h str) -> Option<&'h str> {
    re.captures(html)
        .and_then(|cap| cap.get(1))
        .map(|m| m.as_str().trim())
}

/// Decode the HTML character references that appear in address text.
///
/// Follows the HTML5 tokenizer rules: the full named set, legacy names
/// without a trailing `;`, and U+FFFD for `&#0;` or out-of-range code
/// points. Text that is not a reference is left as written.
pub fn decode_entities(s: &str) -> String {
    if !s.contains('&') {
        return s.to_string();
    }
    Html::parse_fragment(s).root_element().text().collect()
}
