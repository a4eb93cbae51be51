//! `{{variable}}` substitution in displayed copy.

use std::collections::HashMap;

use regex::{Captures, Regex};
use walko_config::VisitorConfig;

const PLACEHOLDER: &str = r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}";

/// Substitutes visitor fields into titles, bodies and button labels.
pub struct Personalizer {
    values: HashMap<&'static str, String>,
    placeholder: Option<Regex>,
}

impl Personalizer {
    pub fn new(visitor: &VisitorConfig) -> Self {
        let field = |value: &Option<String>| value.clone().unwrap_or_default();
        let values = HashMap::from([
            ("firstName", field(&visitor.first_name)),
            ("lastName", field(&visitor.last_name)),
            ("userName", field(&visitor.user_name)),
            ("userEmail", field(&visitor.user_email)),
            ("userId", field(&visitor.user_id)),
        ]);

        Self {
            values,
            placeholder: Regex::new(PLACEHOLDER).ok(),
        }
    }

    /// Replace known placeholders; unknown ones are kept verbatim.
    pub fn apply(&self, text: &str) -> String {
        let Some(re) = &self.placeholder else {
            return text.to_string();
        };
        if !text.contains("{{") {
            return text.to_string();
        }

        re.replace_all(text, |caps: &Captures<'_>| match self.values.get(&caps[1]) {
            Some(value) => value.clone(),
            None => caps[0].to_string(),
        })
        .into_owned()
    }
}
