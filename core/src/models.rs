use std::fmt;
use std::str::FromStr;

use chrono::{NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::{MedError, Result};

// --- Profile ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Gender {
    #[serde(alias = "Male", alias = "남성")]
    Male,
    #[serde(alias = "Female", alias = "여성")]
    Female,
}

impl Gender {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Male => "male",
            Self::Female => "female",
        }
    }
}

impl fmt::Display for Gender {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Gender {
    type Err = MedError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "male" | "m" | "남성" => Ok(Self::Male),
            "female" | "f" | "여성" => Ok(Self::Female),
            other => Err(MedError::validation(
                "gender",
                format!("'{other}' is not a gender. Use 'male' or 'female'"),
            )),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub name: String,
    pub age: u32,
    pub gender: Gender,
    #[serde(rename = "height", alias = "height_cm")]
    pub height_cm: f64,
    #[serde(rename = "weight", alias = "weight_kg")]
    pub weight_kg: f64,
    #[serde(default)]
    pub notes: String,
}

/// Profile fields exactly as the user typed them.
#[derive(Debug, Clone, Default)]
pub struct ProfileForm {
    pub name: String,
    pub age: String,
    pub gender: String,
    pub height: String,
    pub weight: String,
    pub notes: String,
}

impl From<&Profile> for ProfileForm {
    fn from(p: &Profile) -> Self {
        Self {
            name: p.name.clone(),
            age: p.age.to_string(),
            gender: p.gender.to_string(),
            height: p.height_cm.to_string(),
            weight: p.weight_kg.to_string(),
            notes: p.notes.clone(),
        }
    }
}

impl ProfileForm {
    /// Required fields first, then numeric parsing, then ranges.
    pub fn validate(&self) -> Result<Profile> {
        let required = [
            ("name", &self.name),
            ("age", &self.age),
            ("height", &self.height),
            ("weight", &self.weight),
        ];
        for (field, value) in required {
            if value.trim().is_empty() {
                return Err(MedError::validation(field, "this field is required"));
            }
        }

        let age: u32 = self
            .age
            .trim()
            .parse()
            .map_err(|_| MedError::validation("age", "must be a whole number"))?;
        let height_cm: f64 = self
            .height
            .trim()
            .parse()
            .map_err(|_| MedError::validation("height", "must be a number"))?;
        let weight_kg: f64 = self
            .weight
            .trim()
            .parse()
            .map_err(|_| MedError::validation("weight", "must be a number"))?;

        if !height_cm.is_finite() || height_cm <= 0.0 {
            return Err(MedError::validation("height", "must be greater than 0"));
        }
        if !weight_kg.is_finite() || weight_kg <= 0.0 {
            return Err(MedError::validation("weight", "must be greater than 0"));
        }

        let gender = if self.gender.trim().is_empty() {
            Gender::Male
        } else {
            self.gender.parse()?
        };

        Ok(Profile {
            name: self.name.trim().to_string(),
            age,
            gender,
            height_cm,
            weight_kg,
            notes: self.notes.trim().to_string(),
        })
    }
}

// --- Catalog ---

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub product_name: String,
    pub company: String,
    pub main_ingredient: String,
    pub effectiveness: String,
    pub how_to_take: String,
    pub precautions: String,
    pub warnings: String,
    pub interactions: String,
    pub side_effects: String,
    pub storage: String,
}

/// Spreadsheet header for each catalog column, in file order.
pub const CATALOG_COLUMNS: [&str; 10] = [
    "Product Name",
    "Company Name",
    "Main Ingredient",
    "Effectiveness",
    "How to Take It",
    "Precautions",
    "Warnings",
    "Medications to Avoid",
    "Major Side Effects",
    "Storage Instructions",
];

impl CatalogEntry {
    /// Field values in `CATALOG_COLUMNS` order.
    #[must_use]
    pub fn fields(&self) -> [&str; 10] {
        [
            &self.product_name,
            &self.company,
            &self.main_ingredient,
            &self.effectiveness,
            &self.how_to_take,
            &self.precautions,
            &self.warnings,
            &self.interactions,
            &self.side_effects,
            &self.storage,
        ]
    }

    /// Build from values in `CATALOG_COLUMNS` order.
    #[must_use]
    pub fn from_fields(fields: [String; 10]) -> Self {
        let [
            product_name,
            company,
            main_ingredient,
            effectiveness,
            how_to_take,
            precautions,
            warnings,
            interactions,
            side_effects,
            storage,
        ] = fields;
        Self {
            product_name,
            company,
            main_ingredient,
            effectiveness,
            how_to_take,
            precautions,
            warnings,
            interactions,
            side_effects,
            storage,
        }
    }

    /// Case-insensitive substring match on name, main ingredient, or effectiveness.
    /// `needle` must already be lowercase.
    #[must_use]
    pub fn matches(&self, needle: &str) -> bool {
        self.product_name.to_lowercase().contains(needle)
            || self.main_ingredient.to_lowercase().contains(needle)
            || self.effectiveness.to_lowercase().contains(needle)
    }
}

// --- Schedule ---

/// A reminder time of day, strictly "HH:MM" on a 24-hour clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct NotificationTime(NaiveTime);

impl NotificationTime {
    /// Parse strictly: two-digit hour 00-23, colon, two-digit minute 00-59.
    pub fn parse(s: &str) -> Result<Self> {
        let bytes = s.as_bytes();
        let well_formed = bytes.len() == 5
            && bytes[2] == b':'
            && [0, 1, 3, 4].iter().all(|&i| bytes[i].is_ascii_digit());
        if !well_formed {
            return Err(MedError::Format(s.to_string()));
        }
        let hour = u32::from(bytes[0] - b'0') * 10 + u32::from(bytes[1] - b'0');
        let minute = u32::from(bytes[3] - b'0') * 10 + u32::from(bytes[4] - b'0');
        NaiveTime::from_hms_opt(hour, minute, 0)
            .map(Self)
            .ok_or_else(|| MedError::Format(s.to_string()))
    }

    /// Empty or whitespace-only input means "no reminder".
    pub fn parse_optional(s: &str) -> Result<Option<Self>> {
        let s = s.trim();
        if s.is_empty() {
            Ok(None)
        } else {
            Self::parse(s).map(Some)
        }
    }

    /// The minute containing `time`, dropping seconds.
    #[must_use]
    pub fn from_time(time: NaiveTime) -> Self {
        Self(time.with_second(0).and_then(|t| t.with_nanosecond(0)).unwrap_or(time))
    }
}

impl fmt::Display for NotificationTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.format("%H:%M"))
    }
}

impl FromStr for NotificationTime {
    type Err = MedError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl Serialize for NotificationTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for NotificationTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TakingCondition {
    BeforeMeal,
    #[default]
    AfterMeal,
    EmptyStomach,
}

pub const TAKING_CONDITIONS: &[&str] = &["before-meal", "after-meal", "empty-stomach"];

impl TakingCondition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BeforeMeal => "before-meal",
            Self::AfterMeal => "after-meal",
            Self::EmptyStomach => "empty-stomach",
        }
    }

    /// What the user should do for this condition.
    #[must_use]
    pub fn guidance(self) -> &'static str {
        match self {
            Self::BeforeMeal => "Take 30 minutes before a meal.",
            Self::AfterMeal => "Take right after a meal.",
            Self::EmptyStomach => {
                "Take between meals, once enough time has passed since eating (usually 2 hours after a meal)."
            }
        }
    }
}

impl fmt::Display for TakingCondition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TakingCondition {
    type Err = MedError;

    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace(['_', ' '], "-");
        match normalized.as_str() {
            "before-meal" | "식전" => Ok(Self::BeforeMeal),
            "after-meal" | "식후" => Ok(Self::AfterMeal),
            "empty-stomach" | "공복" => Ok(Self::EmptyStomach),
            _ => Err(MedError::validation(
                "taking_condition",
                format!(
                    "'{s}' is not a taking condition. Must be one of: {}",
                    TAKING_CONDITIONS.join(", ")
                ),
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Schedule {
    pub notification_time: Option<NotificationTime>,
    pub notifications_enabled: bool,
    pub taking_condition: Option<TakingCondition>,
}

impl Schedule {
    /// Validate raw schedule input. An empty `time` means no reminder.
    pub fn parse(time: &str, notifications_enabled: bool, condition: Option<&str>) -> Result<Self> {
        let notification_time = NotificationTime::parse_optional(time)?;
        let taking_condition = condition
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::parse)
            .transpose()?;
        Ok(Self {
            notification_time,
            notifications_enabled,
            taking_condition,
        })
    }
}

// --- Regimen ---

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimenEntry {
    #[serde(flatten)]
    pub medication: CatalogEntry,
    pub notification_time: Option<NotificationTime>,
    pub notifications_enabled: bool,
    pub taking_condition: Option<TakingCondition>,
}

/// Columns appended after `CATALOG_COLUMNS` in the regimen spreadsheet.
pub const SCHEDULE_COLUMNS: [&str; 3] =
    ["Notification Time", "Notifications_Enabled", "Taking_Condition"];

impl RegimenEntry {
    #[must_use]
    pub fn new(medication: CatalogEntry, schedule: Schedule) -> Self {
        Self {
            medication,
            notification_time: schedule.notification_time,
            notifications_enabled: schedule.notifications_enabled,
            taking_condition: schedule.taking_condition,
        }
    }

    #[must_use]
    pub fn product_name(&self) -> &str {
        &self.medication.product_name
    }

    #[must_use]
    pub fn schedule(&self) -> Schedule {
        Schedule {
            notification_time: self.notification_time,
            notifications_enabled: self.notifications_enabled,
            taking_condition: self.taking_condition,
        }
    }

    /// Condition to show when none was ever saved. Not written back.
    #[must_use]
    pub fn effective_condition(&self) -> TakingCondition {
        self.taking_condition.unwrap_or_default()
    }

    /// Reminders fire only when enabled and a time is set.
    #[must_use]
    pub fn reminder_time(&self) -> Option<NotificationTime> {
        self.notification_time.filter(|_| self.notifications_enabled)
    }

    pub fn apply(&mut self, update: &RegimenUpdate) {
        if let Some(time) = update.notification_time {
            self.notification_time = time;
        }
        if let Some(enabled) = update.notifications_enabled {
            self.notifications_enabled = enabled;
        }
        if let Some(condition) = update.taking_condition {
            self.taking_condition = Some(condition);
        }
    }
}

#[derive(Debug, Clone, Default)]
#[allow(clippy::option_option)]
pub struct RegimenUpdate {
    /// `Some(None)` clears the time, `None` leaves it alone.
    pub notification_time: Option<Option<NotificationTime>>,
    pub notifications_enabled: Option<bool>,
    pub taking_condition: Option<TakingCondition>,
}

impl RegimenUpdate {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.notification_time.is_none()
            && self.notifications_enabled.is_none()
            && self.taking_condition.is_none()
    }
}

// --- Reminders ---

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notification {
    pub product_name: String,
    pub time: NotificationTime,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub taking_condition: Option<TakingCondition>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub condition_guidance: Option<&'static str>,
    pub how_to_take: String,
}

impl Notification {
    #[must_use]
    pub fn for_entry(entry: &RegimenEntry, time: NotificationTime) -> Self {
        Self {
            product_name: entry.medication.product_name.clone(),
            time,
            taking_condition: entry.taking_condition,
            condition_guidance: entry.taking_condition.map(TakingCondition::guidance),
            how_to_take: entry.medication.how_to_take.clone(),
        }
    }
}

/// Lenient boolean parsing for spreadsheet cells.
pub(crate) fn parse_bool_cell(s: &str) -> Option<bool> {
    match s.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}
