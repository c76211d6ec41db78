use std::collections::{BTreeMap, BTreeSet};

use chrono::Duration;
use serde::{Deserialize, Serialize};

use desk_types::{Channel, FieldValue, Ordered, Priority, Ticket};

use crate::config::ScopeMatch;
use crate::error::{Result, SlaError};

/// Longest accepted first response target, in hours (one year).
pub const MAX_FIRST_RESPONSE_HOURS: u32 = 24 * 365;

/// Longest accepted resolution target, in days (ten years).
pub const MAX_RESOLUTION_DAYS: u32 = 3650;

// ---------------------------------------------------------------------------
// Targets
// ---------------------------------------------------------------------------

/// A target duration measured from ticket creation.
pub trait SlaTarget {
    /// The offset from `createdAt` at which the deadline falls.
    fn duration(&self) -> Duration;
}

/// Maximum time until the first agent response.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstResponseTarget {
    pub hours: u32,
    pub minutes: u32,
}

impl FirstResponseTarget {
    pub fn new(hours: u32, minutes: u32) -> Self {
        Self { hours, minutes }
    }
}

impl SlaTarget for FirstResponseTarget {
    fn duration(&self) -> Duration {
        Duration::hours(i64::from(self.hours)) + Duration::minutes(i64::from(self.minutes))
    }
}

/// Maximum time until the ticket is resolved.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolutionTarget {
    pub days: u32,
    pub hours: u32,
}

impl ResolutionTarget {
    pub fn new(days: u32, hours: u32) -> Self {
        Self { days, hours }
    }
}

impl SlaTarget for ResolutionTarget {
    fn duration(&self) -> Duration {
        Duration::days(i64::from(self.days)) + Duration::hours(i64::from(self.hours))
    }
}

// ---------------------------------------------------------------------------
// Scope
// ---------------------------------------------------------------------------

/// A `(fieldKey, value)` pair a ticket's custom fields are compared against.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomFieldScope {
    pub field_key: String,
    pub value: FieldValue,
}

impl CustomFieldScope {
    pub fn new(field_key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            field_key: field_key.into(),
            value: value.into(),
        }
    }

    fn matches(&self, ticket: &Ticket) -> bool {
        !self.value.is_null() && ticket.field(&self.field_key) == Some(&self.value)
    }
}

/// Predicate deciding which tickets a policy applies to.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlaScope {
    pub all_tickets: bool,
    pub channels: BTreeSet<Channel>,
    pub priorities: BTreeSet<Priority>,
    pub custom_field_scopes: Vec<CustomFieldScope>,
}

impl SlaScope {
    /// Scope matching every ticket.
    pub fn all() -> Self {
        Self {
            all_tickets: true,
            ..Default::default()
        }
    }

    pub fn channels(channels: impl IntoIterator<Item = Channel>) -> Self {
        Self {
            channels: channels.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn priorities(priorities: impl IntoIterator<Item = Priority>) -> Self {
        Self {
            priorities: priorities.into_iter().collect(),
            ..Default::default()
        }
    }

    pub fn custom_field(key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        Self {
            custom_field_scopes: vec![CustomFieldScope::new(key, value)],
            ..Default::default()
        }
    }

    pub fn with_channel(mut self, channel: Channel) -> Self {
        self.channels.insert(channel);
        self
    }

    pub fn with_priority(mut self, priority: Priority) -> Self {
        self.priorities.insert(priority);
        self
    }

    pub fn with_custom_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.custom_field_scopes.push(CustomFieldScope::new(key, value));
        self
    }

    /// Returns `true` if at least one of channels, priorities, or custom
    /// fields is populated.
    pub fn has_dimensions(&self) -> bool {
        !self.channels.is_empty()
            || !self.priorities.is_empty()
            || !self.custom_field_scopes.is_empty()
    }

    /// Check whether this scope applies to the given ticket.
    ///
    /// An all-tickets scope always matches. Otherwise each populated
    /// dimension yields one check, combined according to `mode`. A scope
    /// with no populated dimension never matches.
    pub fn matches(&self, ticket: &Ticket, mode: ScopeMatch) -> bool {
        if self.all_tickets {
            return true;
        }

        let mut checks: Vec<bool> = Vec::with_capacity(3);
        if !self.channels.is_empty() {
            checks.push(self.channels.contains(&ticket.channel));
        }
        if !self.priorities.is_empty() {
            checks.push(self.priorities.contains(&ticket.priority));
        }
        match mode {
            ScopeMatch::Any => {
                if !self.custom_field_scopes.is_empty() {
                    checks.push(self.custom_field_scopes.iter().any(|s| s.matches(ticket)));
                }
            }
            ScopeMatch::All => {
                let mut by_key: BTreeMap<&str, bool> = BTreeMap::new();
                for scope in &self.custom_field_scopes {
                    *by_key.entry(scope.field_key.as_str()).or_insert(false) |= scope.matches(ticket);
                }
                checks.extend(by_key.into_values());
            }
        }

        if checks.is_empty() {
            return false;
        }
        match mode {
            ScopeMatch::Any => checks.into_iter().any(|c| c),
            ScopeMatch::All => checks.into_iter().all(|c| c),
        }
    }
}

// ---------------------------------------------------------------------------
// Policy
// ---------------------------------------------------------------------------

/// A named SLA policy.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SlaPolicy {
    /// Unique identifier for this policy.
    pub id: String,
    /// Human-readable policy name.
    pub name: String,
    /// Evaluation rank; lower is evaluated first.
    pub order: u32,
    /// Which tickets this policy applies to.
    pub scope: SlaScope,
    #[serde(default, rename = "firstResponseSLA")]
    pub first_response_sla: Option<FirstResponseTarget>,
    #[serde(default, rename = "resolutionSLA")]
    pub resolution_sla: Option<ResolutionTarget>,
}

impl SlaPolicy {
    pub fn new(id: impl Into<String>, name: impl Into<String>, order: u32, scope: SlaScope) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            scope,
            first_response_sla: None,
            resolution_sla: None,
        }
    }

    pub fn with_first_response(mut self, hours: u32, minutes: u32) -> Self {
        self.first_response_sla = Some(FirstResponseTarget::new(hours, minutes));
        self
    }

    pub fn with_resolution(mut self, days: u32, hours: u32) -> Self {
        self.resolution_sla = Some(ResolutionTarget::new(days, hours));
        self
    }

    /// Check whether this policy's scope applies to the ticket.
    pub fn applies(&self, ticket: &Ticket, mode: ScopeMatch) -> bool {
        self.scope.matches(ticket, mode)
    }

    /// Creation-time validation.
    pub fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(SlaError::invalid(&self.id, "policy id must not be empty"));
        }
        if self.name.trim().is_empty() {
            return Err(SlaError::invalid(&self.id, "policy name must not be empty"));
        }

        if !self.scope.all_tickets && !self.scope.has_dimensions() {
            return Err(SlaError::invalid(
                &self.id,
                "scope must apply to all tickets or select at least one channel, priority, or custom field",
            ));
        }
        if self.scope.all_tickets && self.scope.has_dimensions() {
            return Err(SlaError::invalid(
                &self.id,
                "an all-tickets policy cannot also select channels, priorities, or custom fields",
            ));
        }

        for cf in &self.scope.custom_field_scopes {
            if cf.field_key.trim().is_empty() {
                return Err(SlaError::invalid(&self.id, "custom field scope key must not be empty"));
            }
            if cf.value.is_null() {
                return Err(SlaError::invalid(
                    &self.id,
                    format!("custom field scope '{}' must have a value", cf.field_key),
                ));
            }
        }

        if self.scope.all_tickets
            && self.first_response_sla.is_none()
            && self.resolution_sla.is_none()
        {
            return Err(SlaError::invalid(
                &self.id,
                "an all-tickets policy must define a first response or resolution target",
            ));
        }

        if let Some(fr) = &self.first_response_sla {
            if fr.minutes >= 60 {
                return Err(SlaError::invalid(
                    &self.id,
                    format!("first response minutes must be below 60, got {}", fr.minutes),
                ));
            }
            if fr.hours > MAX_FIRST_RESPONSE_HOURS {
                return Err(SlaError::invalid(
                    &self.id,
                    format!(
                        "first response hours must be at most {MAX_FIRST_RESPONSE_HOURS}, got {}",
                        fr.hours
                    ),
                ));
            }
            if fr.hours == 0 && fr.minutes == 0 {
                return Err(SlaError::invalid(&self.id, "first response target must be greater than zero"));
            }
        }

        if let Some(res) = &self.resolution_sla {
            if res.hours >= 24 {
                return Err(SlaError::invalid(
                    &self.id,
                    format!("resolution hours must be below 24, got {}", res.hours),
                ));
            }
            if res.days > MAX_RESOLUTION_DAYS {
                return Err(SlaError::invalid(
                    &self.id,
                    format!("resolution days must be at most {MAX_RESOLUTION_DAYS}, got {}", res.days),
                ));
            }
            if res.days == 0 && res.hours == 0 {
                return Err(SlaError::invalid(&self.id, "resolution target must be greater than zero"));
            }
        }

        Ok(())
    }

    /// One-line description of the targets, e.g.
    /// `1h 0m first response · 2d 0h resolution`.
    pub fn summary(&self) -> String {
        let mut parts = Vec::new();
        if let Some(fr) = &self.first_response_sla {
            parts.push(format!("{}h {}m first response", fr.hours, fr.minutes));
        }
        if let Some(res) = &self.resolution_sla {
            parts.push(format!("{}d {}h resolution", res.days, res.hours));
        }
        if parts.is_empty() {
            "no targets".to_string()
        } else {
            parts.join(" · ")
        }
    }
}

impl Ordered for SlaPolicy {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }
}
