use serde::{Deserialize, Serialize};

/// Where a trip endpoint lies, as classified upstream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationClass {
    Home,  // H
    Cabin, // C
    Other, // O
}

impl LocationClass {
    pub fn code(&self) -> &'static str {
        match self {
            LocationClass::Home => "H",
            LocationClass::Cabin => "C",
            LocationClass::Other => "O",
        }
    }

    /// Convert enum → DB string
    pub fn to_db_str(&self) -> &'static str {
        self.code()
    }

    /// Convert DB string → enum
    pub fn from_db_str(s: &str) -> Option<Self> {
        match s {
            "H" => Some(LocationClass::Home),
            "C" => Some(LocationClass::Cabin),
            "O" => Some(LocationClass::Other),
            _ => None,
        }
    }

    /// Helper: accepts codes or names, any case.
    pub fn from_code(code: &str) -> Option<Self> {
        match code.to_lowercase().as_str() {
            "home" => Some(LocationClass::Home),
            "cabin" => Some(LocationClass::Cabin),
            "other" => Some(LocationClass::Other),
            other => LocationClass::from_db_str(&other.to_uppercase()),
        }
    }

    pub fn is_cabin(&self) -> bool {
        matches!(self, LocationClass::Cabin)
    }

    pub fn is_home(&self) -> bool {
        matches!(self, LocationClass::Home)
    }
}
