use serde::{Deserialize, Serialize};

use crate::error::InvalidRecipientId;
use crate::types::ChatId;

/// Rules for turning a bare directory identifier into a provider address.
///
/// - Identifiers that already contain `@` (with something on both sides) are
///   used as-is.
/// - All-digit identifiers starting with one of `group_prefixes` get
///   `group_suffix` appended.
/// - All-digit identifiers (a leading `+` is dropped) starting with one of
///   `phone_prefixes` get `contact_suffix` appended.
/// - Everything else is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AddressingPolicy {
    /// Leading digits that mark a bare group identifier.
    #[serde(default = "default_group_prefixes")]
    pub group_prefixes: Vec<String>,
    /// Suffix appended to bare group identifiers.
    #[serde(default = "default_group_suffix")]
    pub group_suffix: String,
    /// Leading digits (country codes) that mark a phone number.
    #[serde(default = "default_phone_prefixes")]
    pub phone_prefixes: Vec<String>,
    /// Suffix appended to phone numbers.
    #[serde(default = "default_contact_suffix")]
    pub contact_suffix: String,
}

impl Default for AddressingPolicy {
    fn default() -> Self {
        Self {
            group_prefixes: default_group_prefixes(),
            group_suffix: default_group_suffix(),
            phone_prefixes: default_phone_prefixes(),
            contact_suffix: default_contact_suffix(),
        }
    }
}

fn default_group_prefixes() -> Vec<String> {
    vec!["1203".to_owned()]
}

fn default_group_suffix() -> String {
    "@g.us".to_owned()
}

fn default_phone_prefixes() -> Vec<String> {
    vec!["972".to_owned()]
}

fn default_contact_suffix() -> String {
    "@s.whatsapp.net".to_owned()
}

impl AddressingPolicy {
    /// Normalize `raw` into a fully qualified [`ChatId`].
    pub fn normalize(&self, raw: &str) -> Result<ChatId, InvalidRecipientId> {
        let trimmed = raw.trim();
        let invalid = || InvalidRecipientId(raw.to_owned());

        if trimmed.is_empty() {
            return Err(invalid());
        }

        if let Some((local, domain)) = trimmed.split_once('@') {
            if local.is_empty() || domain.is_empty() || domain.contains('@') {
                return Err(invalid());
            }
            return Ok(ChatId::new_unchecked(trimmed.to_owned()));
        }

        if is_digits(trimmed) && has_prefix(trimmed, &self.group_prefixes) {
            return Ok(ChatId::new_unchecked(format!(
                "{trimmed}{}",
                self.group_suffix
            )));
        }

        let phone = trimmed.strip_prefix('+').unwrap_or(trimmed);
        if is_digits(phone) && has_prefix(phone, &self.phone_prefixes) {
            return Ok(ChatId::new_unchecked(format!(
                "{phone}{}",
                self.contact_suffix
            )));
        }

        Err(invalid())
    }
}

fn is_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

fn has_prefix(s: &str, prefixes: &[String]) -> bool {
    prefixes.iter().any(|p| !p.is_empty() && s.starts_with(p.as_str()))
}
