use {
    serde::{Deserialize, Serialize},
    std::fmt,
};

/// DNS record type as numbered in the DoH JSON API.
#[allow(clippy::upper_case_acronyms)]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RecordType {
    A,
    AAAA,
}

impl RecordType {
    pub fn code(self) -> u16 {
        match self {
            RecordType::A => 1,
            RecordType::AAAA => 28,
        }
    }

    pub fn from_code(code: u16) -> Option<Self> {
        match code {
            1 => Some(RecordType::A),
            28 => Some(RecordType::AAAA),
            _ => None,
        }
    }
}

impl fmt::Display for RecordType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RecordType::A => f.write_str("A"),
            RecordType::AAAA => f.write_str("AAAA"),
        }
    }
}

/// A DoH JSON endpoint, queried with `?name=<domain>&type=<A|AAAA>`.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct Provider {
    pub name: String,
    pub url: String,
}

impl Provider {
    pub fn new(name: &str, url: &str) -> Self {
        Provider {
            name: name.to_owned(),
            url: url.to_owned(),
        }
    }
}

/// Body of a DoH JSON response. Only `Answer` matters here.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct DohResponse {
    #[serde(rename = "Answer", default)]
    pub answer: Vec<DohRecord>,
}

#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct DohRecord {
    #[serde(rename = "type")]
    pub record_type: u16,
    pub data: String,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DnsAnswer {
    pub ip: String,
    pub record_type: RecordType,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CheckResult {
    pub domain: String,
    pub ip: String,
    pub is_discounted: bool,
}

/// One past check, stored with the same keys the history file always used.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub url: String,
    pub domain: String,
    pub ip: String,
    pub is_discounted: bool,
    /// Milliseconds since the Unix epoch.
    pub timestamp: i64,
}
