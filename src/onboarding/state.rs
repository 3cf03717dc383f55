//! Onboarding state machine — tracks which wizard step the user is on and
//! what each step has captured.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use tracing::debug;

/// The wizard steps, in order.
///
/// Progresses linearly: BusinessDetails → IndustryNeeds → Availability →
/// CustomLabels. Finishing the last step is signalled by a redirect, not by a
/// further step.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
pub enum OnboardingStep {
    #[default]
    BusinessDetails = 1,
    IndustryNeeds = 2,
    Availability = 3,
    CustomLabels = 4,
}

impl OnboardingStep {
    pub const FIRST: Self = Self::BusinessDetails;
    pub const LAST: Self = Self::CustomLabels;

    pub const ALL: [Self; 4] = [
        Self::BusinessDetails,
        Self::IndustryNeeds,
        Self::Availability,
        Self::CustomLabels,
    ];

    /// 1-based position of the step.
    pub fn number(&self) -> u8 {
        *self as u8
    }

    /// The step at position `n`, if `n` is in 1..=4.
    pub fn from_number(n: i64) -> Option<Self> {
        match n {
            1 => Some(Self::BusinessDetails),
            2 => Some(Self::IndustryNeeds),
            3 => Some(Self::Availability),
            4 => Some(Self::CustomLabels),
            _ => None,
        }
    }

    /// The step at `clamp(n, 1, 4)`.
    pub fn clamped(n: i64) -> Self {
        Self::from_number(n.clamp(1, 4)).unwrap_or(Self::FIRST)
    }

    /// Following step, saturating at the last.
    pub fn next(&self) -> Self {
        Self::clamped(i64::from(self.number()) + 1)
    }

    /// Preceding step, saturating at the first.
    pub fn previous(&self) -> Self {
        Self::clamped(i64::from(self.number()) - 1)
    }

    pub fn is_last(&self) -> bool {
        *self == Self::LAST
    }

    /// Heading shown by the progress indicator.
    pub fn title(&self) -> &'static str {
        match self {
            Self::BusinessDetails => "Business details",
            Self::IndustryNeeds => "Industry needs",
            Self::Availability => "Availability",
            Self::CustomLabels => "Custom labels",
        }
    }
}

impl From<OnboardingStep> for u8 {
    fn from(step: OnboardingStep) -> Self {
        step.number()
    }
}

impl TryFrom<u8> for OnboardingStep {
    type Error = String;

    fn try_from(n: u8) -> Result<Self, Self::Error> {
        Self::from_number(i64::from(n)).ok_or_else(|| format!("invalid onboarding step {n}"))
    }
}

impl std::fmt::Display for OnboardingStep {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Which steps the progress indicator may jump to.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JumpPolicy {
    /// Any step in 1..=4.
    #[default]
    Any,
    /// Only steps up to the furthest one reached so far.
    VisitedOnly,
}

impl std::str::FromStr for JumpPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "any" => Ok(Self::Any),
            "visited" | "visited_only" => Ok(Self::VisitedOnly),
            other => Err(format!("unknown jump policy '{other}' (expected 'any' or 'visited')")),
        }
    }
}

/// In-memory onboarding state.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingState {
    /// Step currently shown.
    pub current_step: OnboardingStep,
    /// Furthest step reached.
    pub highest_step: OnboardingStep,
    /// Captured form fields, owned and validated by each step's form.
    pub step_data: BTreeMap<OnboardingStep, serde_json::Value>,
    /// When the wizard was finished.
    pub completed_at: Option<DateTime<Utc>>,
}

impl Default for OnboardingState {
    fn default() -> Self {
        Self {
            current_step: OnboardingStep::FIRST,
            highest_step: OnboardingStep::FIRST,
            step_data: BTreeMap::new(),
            completed_at: None,
        }
    }
}

impl OnboardingState {
    /// Move to `step`, remembering the furthest step reached.
    pub fn move_to(&mut self, step: OnboardingStep) {
        self.current_step = step;
        self.highest_step = self.highest_step.max(step);
    }

    /// Merge `data` into the payload for `step`.
    ///
    /// Objects are merged key by key, new keys winning. Anything else
    /// replaces the stored payload.
    pub fn merge_step_data(&mut self, step: OnboardingStep, data: serde_json::Value) {
        if let Some(serde_json::Value::Object(existing)) = self.step_data.get_mut(&step) {
            if let serde_json::Value::Object(incoming) = data {
                existing.extend(incoming);
                return;
            }
        }
        self.step_data.insert(step, data);
    }

    pub fn is_completed(&self) -> bool {
        self.completed_at.is_some()
    }

    /// One entry per wizard step, for the progress indicator.
    pub fn steps(&self) -> Vec<StepSummary> {
        OnboardingStep::ALL
            .iter()
            .map(|&step| StepSummary {
                step,
                title: step.title(),
                is_last: step.is_last(),
                current: step == self.current_step,
                visited: step <= self.highest_step,
                has_data: self.step_data.contains_key(&step),
            })
            .collect()
    }

    /// Encode into the persisted record shape.
    pub fn to_record(&self) -> OnboardingRecord {
        OnboardingRecord {
            current_step: Some(i64::from(self.current_step.number())),
            highest_step: Some(i64::from(self.highest_step.number())),
            step_data: self
                .step_data
                .iter()
                .map(|(step, data)| (step.number().to_string(), data.clone()))
                .collect(),
            completed_at: self.completed_at,
        }
    }

    /// Decode a persisted record, repairing what can be repaired.
    ///
    /// A current step outside 1..=4 restarts at step 1; the highest step is
    /// raised to at least the current one; step data under unknown keys is
    /// dropped.
    pub fn from_record(record: OnboardingRecord) -> Self {
        let current_step = record
            .current_step
            .and_then(OnboardingStep::from_number)
            .unwrap_or(OnboardingStep::FIRST);
        let highest_step = record
            .highest_step
            .and_then(OnboardingStep::from_number)
            .unwrap_or(current_step)
            .max(current_step);
        let step_data = record
            .step_data
            .into_iter()
            .filter_map(|(key, data)| {
                let step = key.trim().parse::<i64>().ok().and_then(OnboardingStep::from_number)?;
                Some((step, data))
            })
            .collect();

        Self {
            current_step,
            highest_step,
            step_data,
            completed_at: record.completed_at,
        }
    }
}

/// Progress indicator entry for one step.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub step: OnboardingStep,
    pub title: &'static str,
    pub is_last: bool,
    pub current: bool,
    pub visited: bool,
    pub has_data: bool,
}

/// Persisted onboarding record.
///
/// Stored under `"onboarding_state"`. Every field is optional on the way in
/// and a field of the wrong type decodes as absent, so partially written
/// records still restore what they can.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OnboardingRecord {
    #[serde(default, deserialize_with = "lenient_step")]
    pub current_step: Option<i64>,
    #[serde(default, deserialize_with = "lenient_step")]
    pub highest_step: Option<i64>,
    #[serde(default, deserialize_with = "lenient_step_data")]
    pub step_data: BTreeMap<String, serde_json::Value>,
    #[serde(default, deserialize_with = "lenient_timestamp")]
    pub completed_at: Option<DateTime<Utc>>,
}

fn lenient_step<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    let step = value.as_i64();
    if step.is_none() && !value.is_null() {
        debug!(value = %value, "Ignoring non-integer onboarding step");
    }
    Ok(step)
}

fn lenient_step_data<'de, D>(deserializer: D) -> Result<BTreeMap<String, Value>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) => Ok(map.into_iter().collect()),
        Value::Null => Ok(BTreeMap::new()),
        other => {
            debug!(value = %other, "Ignoring non-object onboarding step data");
            Ok(BTreeMap::new())
        }
    }
}

fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value(value) {
        Ok(at) => Ok(Some(at)),
        Err(e) => {
            debug!(error = %e, "Ignoring unreadable onboarding completion time");
            Ok(None)
        }
    }
}
