use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;

/// Field keys the backend sends for every chart sample.
pub mod fields {
    pub const LTP: &str = "ltp";
    pub const LTP_MA: &str = "ltp_ma";
    pub const NET_OI_CHANGE: &str = "net_oi_change";
    pub const NET_OI_MA: &str = "net_oi_ma";
    pub const NET_DEX: &str = "net_dex";
    pub const NET_DEX_MA: &str = "net_dex_ma";
}

/// One chart-data observation: a market time of day plus named numeric fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<String>,
    #[serde(flatten)]
    pub fields: BTreeMap<String, Value>,
}

impl Sample {
    pub fn new(time: impl Into<String>) -> Self {
        Self {
            time: Some(time.into()),
            fields: BTreeMap::new(),
        }
    }

    pub fn with(mut self, key: &str, value: f64) -> Self {
        self.set_field(key, value);
        self
    }

    /// Non-empty time string, if any.
    pub fn time(&self) -> Option<&str> {
        self.time.as_deref().filter(|t| !t.trim().is_empty())
    }

    /// The named field when it is a finite JSON number.
    pub fn field(&self, key: &str) -> Option<f64> {
        self.fields
            .get(key)
            .and_then(Value::as_f64)
            .filter(|v| v.is_finite())
    }

    pub fn set_field(&mut self, key: &str, value: f64) {
        // Non-finite values become JSON null and read back as absent.
        self.fields.insert(key.to_string(), Value::from(value));
    }
}

/// A single chart point, `time` in Unix seconds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub time: i64,
    pub value: f64,
}

impl Point {
    pub fn new(time: i64, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum LevelName {
    #[serde(rename = "PDH")]
    PriorDayHigh,
    #[serde(rename = "PDL")]
    PriorDayLow,
    #[serde(rename = "CWH")]
    CurrentWeekHigh,
    #[serde(rename = "CWL")]
    CurrentWeekLow,
    #[serde(rename = "PWH")]
    PriorWeekHigh,
    #[serde(rename = "PWL")]
    PriorWeekLow,
    #[serde(rename = "PMH")]
    PriorMonthHigh,
    #[serde(rename = "PML")]
    PriorMonthLow,
}

impl LevelName {
    pub const ALL: [LevelName; 8] = [
        LevelName::PriorDayHigh,
        LevelName::PriorDayLow,
        LevelName::CurrentWeekHigh,
        LevelName::CurrentWeekLow,
        LevelName::PriorWeekHigh,
        LevelName::PriorWeekLow,
        LevelName::PriorMonthHigh,
        LevelName::PriorMonthLow,
    ];

    pub fn code(&self) -> &'static str {
        match self {
            LevelName::PriorDayHigh => "PDH",
            LevelName::PriorDayLow => "PDL",
            LevelName::CurrentWeekHigh => "CWH",
            LevelName::CurrentWeekLow => "CWL",
            LevelName::PriorWeekHigh => "PWH",
            LevelName::PriorWeekLow => "PWL",
            LevelName::PriorMonthHigh => "PMH",
            LevelName::PriorMonthLow => "PML",
        }
    }
}

impl fmt::Display for LevelName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

fn finite_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| v.as_f64()).filter(|v| v.is_finite()))
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Support/resistance levels for one index as served by `/api/levels`.
///
/// Missing, `null` or non-numeric thresholds are kept as `None`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LevelSet {
    #[serde(default, deserialize_with = "lenient_string")]
    pub symbol: Option<String>,
    #[serde(rename = "PDH", default, deserialize_with = "finite_number")]
    pub pdh: Option<f64>,
    #[serde(rename = "PDL", default, deserialize_with = "finite_number")]
    pub pdl: Option<f64>,
    #[serde(rename = "CWH", default, deserialize_with = "finite_number")]
    pub cwh: Option<f64>,
    #[serde(rename = "CWL", default, deserialize_with = "finite_number")]
    pub cwl: Option<f64>,
    #[serde(rename = "PWH", default, deserialize_with = "finite_number")]
    pub pwh: Option<f64>,
    #[serde(rename = "PWL", default, deserialize_with = "finite_number")]
    pub pwl: Option<f64>,
    #[serde(rename = "PMH", default, deserialize_with = "finite_number")]
    pub pmh: Option<f64>,
    #[serde(rename = "PML", default, deserialize_with = "finite_number")]
    pub pml: Option<f64>,
}

impl LevelSet {
    pub fn get(&self, name: LevelName) -> Option<f64> {
        match name {
            LevelName::PriorDayHigh => self.pdh,
            LevelName::PriorDayLow => self.pdl,
            LevelName::CurrentWeekHigh => self.cwh,
            LevelName::CurrentWeekLow => self.cwl,
            LevelName::PriorWeekHigh => self.pwh,
            LevelName::PriorWeekLow => self.pwl,
            LevelName::PriorMonthHigh => self.pmh,
            LevelName::PriorMonthLow => self.pml,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Status {
    Above,
    Below,
    Unknown,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Above => "ABOVE",
            Status::Below => "BELOW",
            Status::Unknown => "UNKNOWN",
        }
    }

    /// CSS class used by the status table.
    pub fn style_tag(&self) -> &'static str {
        match self {
            Status::Above => "above",
            Status::Below => "below",
            Status::Unknown => "",
        }
    }

    /// Table cell text; unknown levels show a dash.
    pub fn cell_text(&self) -> &'static str {
        match self {
            Status::Unknown => "-",
            other => other.as_str(),
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
