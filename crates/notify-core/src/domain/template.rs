//! Message templates
//!
//! Templates are read-only here; authoring happens elsewhere.

use chrono::{DateTime, Utc};
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::fmt;
use std::str::FromStr;
use std::sync::OnceLock;

fn placeholder() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\$([A-Za-z0-9_]+)").expect("static placeholder pattern"))
}

/// Notification channel
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Email,
    Sms,
    WhatsApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Email => "email",
            Self::Sms => "sms",
            Self::WhatsApp => "whatsapp",
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Channel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "email" => Ok(Self::Email),
            "sms" => Ok(Self::Sms),
            "whatsapp" => Ok(Self::WhatsApp),
            other => Err(format!("unknown channel: {}", other)),
        }
    }
}

/// Reusable message skeleton with named parameters.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Template {
    pub id: String,
    pub name: String,
    #[serde(rename = "type")]
    pub channel: Channel,
    #[serde(default)]
    pub provider: String,
    /// Provider-side template id (e.g. WhatsApp content id)
    #[serde(default)]
    pub external_id: String,
    /// Declared parameters, in positional order
    #[serde(default)]
    pub parameters: Vec<String>,
    /// Body text; `$name` placeholders are substituted for SMS
    #[serde(default)]
    pub description: String,
    pub active: bool,
    pub created_at: DateTime<Utc>,
}

/// Outcome of comparing supplied parameters with a template's declaration
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ParameterCheck {
    /// Declared but not supplied, in declaration order
    pub missing: Vec<String>,
    /// Supplied but not declared, sorted
    pub extra: Vec<String>,
}

impl ParameterCheck {
    pub fn is_complete(&self) -> bool {
        self.missing.is_empty()
    }
}

impl Template {
    /// Compare supplied parameters with the declared ones
    pub fn check_parameters(&self, supplied: &HashMap<String, String>) -> ParameterCheck {
        let missing = self
            .parameters
            .iter()
            .filter(|name| !supplied.contains_key(name.as_str()))
            .cloned()
            .collect();

        let declared: BTreeSet<&str> = self.parameters.iter().map(String::as_str).collect();
        let mut extra: Vec<String> = supplied
            .keys()
            .filter(|name| !declared.contains(name.as_str()))
            .cloned()
            .collect();
        extra.sort();

        ParameterCheck { missing, extra }
    }

    /// Substitute `$name` placeholders in the body.
    ///
    /// One pass over the body: substituted values are never rescanned. Each
    /// placeholder takes the longest supplied name it starts with, so `$date`
    /// does not clobber `$date_end`. Unknown placeholders are left as is.
    pub fn render(&self, values: &HashMap<String, String>) -> String {
        placeholder()
            .replace_all(&self.description, |caps: &Captures<'_>| {
                let ident = &caps[1];
                let known = (1..=ident.len())
                    .rev()
                    .filter(|&end| ident.is_char_boundary(end))
                    .find_map(|end| values.get(&ident[..end]).map(|value| (end, value)));
                match known {
                    Some((end, value)) => format!("{}{}", value, &ident[end..]),
                    None => caps[0].to_string(),
                }
            })
            .into_owned()
    }
}
