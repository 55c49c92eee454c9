use serde::{Deserialize, Serialize};

/// Static safety bounds consulted by the normalizer, the renderers and the
/// streaming decoders.
///
/// Every field has a default, so a host may override only the bounds it
/// cares about: `{"maxSections": 10}` deserializes to the defaults with a
/// smaller section budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Limits {
    /// Total sections accepted per normalization pass, nested ones included.
    pub max_sections: usize,
    /// Deepest container nesting level that is still normalized (root is 0).
    pub max_depth: usize,
    /// Generic collection cap (feature grids, lists, steps, stats, buttons).
    pub max_items: usize,
    pub max_faq_items: usize,
    pub max_table_rows: usize,
    pub max_table_columns: usize,
    pub max_tabs: usize,
    pub max_columns: usize,
    pub max_fields: usize,
    pub max_options: usize,
    /// Character cap for every string field.
    pub max_string_length: usize,
    /// Character cap for the `code` field of code sections.
    pub max_code_length: usize,
    pub max_url_length: usize,
    pub max_action_length: usize,
    pub max_id_length: usize,
    /// Longest value a field pattern is ever tested against.
    pub max_pattern_input: usize,
    pub max_pattern_length: usize,
    /// Bytes a streaming decoder may hold for one unfinished fragment.
    pub max_stream_buffer: usize,
}

pub const DEFAULT_MAX_SECTIONS: usize = 60;
pub const DEFAULT_MAX_DEPTH: usize = 4;

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_sections: DEFAULT_MAX_SECTIONS,
            max_depth: DEFAULT_MAX_DEPTH,
            max_items: 24,
            max_faq_items: 30,
            max_table_rows: 50,
            max_table_columns: 8,
            max_tabs: 8,
            max_columns: 4,
            max_fields: 20,
            max_options: 30,
            max_string_length: 4000,
            max_code_length: 20_000,
            max_url_length: 2048,
            max_action_length: 64,
            max_id_length: 64,
            max_pattern_input: 1000,
            max_pattern_length: 200,
            max_stream_buffer: 1024 * 1024,
        }
    }
}

impl Limits {
    pub fn new() -> Self {
        Self::default()
    }
}
