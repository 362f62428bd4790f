use serde::Deserialize;
use std::collections::HashMap;

/// Query string of `GET /api/records/view`.
///
/// The three named filters mirror the search boxes of the records page.
/// Any other column can be filtered with a `filter[COLUMN]=pattern` pair,
/// which lands in `extra`.
#[derive(Debug, Default, Deserialize)]
pub struct ViewQuery {
    pub name_filter: Option<String>,
    pub rms_filter: Option<String>,
    pub pin_filter: Option<String>,
    /// Sort selector, e.g. `RMS,PIN,-NAME`.
    pub sort: Option<String>,
    /// `all` or `contact`.
    pub dedup: Option<String>,
    /// `clear_repetitions_expired` drops expired and repeated rows.
    pub action: Option<String>,
    #[serde(flatten)]
    pub extra: HashMap<String, String>,
}

impl ViewQuery {
    /// Column filters given as `filter[COLUMN]=pattern`.
    pub fn column_filters(&self) -> impl Iterator<Item = (&str, &str)> {
        self.extra.iter().filter_map(|(k, v)| {
            k.strip_prefix("filter[")
                .and_then(|rest| rest.strip_suffix(']'))
                .map(|column| (column, v.as_str()))
        })
    }
}

/// Query string of `GET /api/labels/pdf`.
#[derive(Debug, Default, Deserialize)]
pub struct LabelQuery {
    #[serde(default)]
    pub layout: crate::model::query::LabelLayout,
}
