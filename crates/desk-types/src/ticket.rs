use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::field::{CustomFields, FieldValue};
use crate::timestamp::Timestamp;

// ---------------------------------------------------------------------------
// Identifiers
// ---------------------------------------------------------------------------

/// Opaque ticket identifier assigned by the ticket backend.
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TicketId(String);

impl TicketId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for TicketId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for TicketId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl fmt::Debug for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "TicketId({})", self.0)
    }
}

impl fmt::Display for TicketId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a ticket message (UUID v7 for time-ordering).
#[derive(Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MessageId(uuid::Uuid);

impl MessageId {
    /// Generate a new time-ordered message ID.
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7())
    }

    /// Short representation (first 8 characters of the UUID).
    pub fn short_id(&self) -> String {
        self.0.to_string()[..8].to_string()
    }
}

impl Default for MessageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "MessageId({})", self.short_id())
    }
}

// ---------------------------------------------------------------------------
// Enumerations
// ---------------------------------------------------------------------------

/// Lifecycle status of a ticket.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TicketStatus {
    Open,
    Pending,
    Resolved,
    Closed,
}

impl TicketStatus {
    /// Resolved and closed tickets no longer need agent action.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Closed)
    }
}

/// Ticket priority. Serialized capitalized (`"High"`), as the dashboard
/// stores it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Priority {
    High,
    Medium,
    Low,
}

/// Inbound channel a ticket arrived through.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Slack,
    Email,
    Teams,
    Web,
}

impl fmt::Display for TicketStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Open => write!(f, "open"),
            Self::Pending => write!(f, "pending"),
            Self::Resolved => write!(f, "resolved"),
            Self::Closed => write!(f, "closed"),
        }
    }
}

impl fmt::Display for Priority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::High => write!(f, "High"),
            Self::Medium => write!(f, "Medium"),
            Self::Low => write!(f, "Low"),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Slack => write!(f, "slack"),
            Self::Email => write!(f, "email"),
            Self::Teams => write!(f, "teams"),
            Self::Web => write!(f, "web"),
        }
    }
}

impl FromStr for TicketStatus {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "open" => Ok(Self::Open),
            "pending" => Ok(Self::Pending),
            "resolved" => Ok(Self::Resolved),
            "closed" => Ok(Self::Closed),
            _ => Err(TypeError::UnknownVariant {
                kind: "status",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Priority {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            _ => Err(TypeError::UnknownVariant {
                kind: "priority",
                value: s.to_string(),
            }),
        }
    }
}

impl FromStr for Channel {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "slack" => Ok(Self::Slack),
            "email" => Ok(Self::Email),
            "teams" => Ok(Self::Teams),
            "web" => Ok(Self::Web),
            _ => Err(TypeError::UnknownVariant {
                kind: "channel",
                value: s.to_string(),
            }),
        }
    }
}

// ---------------------------------------------------------------------------
// Message
// ---------------------------------------------------------------------------

/// A single message in a ticket conversation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: MessageId,
    pub author: String,
    pub body: String,
    pub created_at: Timestamp,
}

impl Message {
    pub fn new(author: impl Into<String>, body: impl Into<String>, created_at: Timestamp) -> Self {
        Self {
            id: MessageId::new(),
            author: author.into(),
            body: body.into(),
            created_at,
        }
    }
}

// ---------------------------------------------------------------------------
// Ticket
// ---------------------------------------------------------------------------

/// A support ticket, reduced to the attributes the rule engines read.
///
/// `first_response_deadline` and `resolution_deadline` are derived by the
/// SLA evaluator; the backend never sets them directly.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ticket {
    pub id: TicketId,
    #[serde(default)]
    pub subject: String,
    pub status: TicketStatus,
    pub priority: Priority,
    pub channel: Channel,
    #[serde(default)]
    pub custom_fields: CustomFields,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    #[serde(default)]
    pub messages: Vec<Message>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first_response_deadline: Option<Timestamp>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution_deadline: Option<Timestamp>,
}

impl Ticket {
    /// Create an open ticket with no fields, tags, or messages.
    pub fn new(
        id: impl Into<TicketId>,
        priority: Priority,
        channel: Channel,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id: id.into(),
            subject: String::new(),
            status: TicketStatus::Open,
            priority,
            channel,
            custom_fields: CustomFields::new(),
            tags: BTreeSet::new(),
            messages: Vec::new(),
            created_at,
            updated_at: created_at,
            first_response_deadline: None,
            resolution_deadline: None,
        }
    }

    pub fn with_subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    pub fn with_status(mut self, status: TicketStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<FieldValue>) -> Self {
        self.custom_fields.insert(key.into(), value.into());
        self
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tags.insert(tag.into());
        self
    }

    pub fn with_message(mut self, message: Message) -> Self {
        self.messages.push(message);
        self
    }

    /// The value of a custom field, treating `Null` as absent.
    pub fn field(&self, key: &str) -> Option<&FieldValue> {
        self.custom_fields.get(key).filter(|v| !v.is_null())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timestamp::parse_timestamp;

    fn created() -> Timestamp {
        parse_timestamp("2024-01-15T10:00:00Z").unwrap()
    }

    #[test]
    fn enum_wire_names() {
        assert_eq!(serde_json::to_string(&TicketStatus::Pending).unwrap(), "\"pending\"");
        assert_eq!(serde_json::to_string(&Priority::High).unwrap(), "\"High\"");
        assert_eq!(serde_json::to_string(&Channel::Teams).unwrap(), "\"teams\"");
    }

    #[test]
    fn from_str_is_case_insensitive() {
        assert_eq!("HIGH".parse::<Priority>().unwrap(), Priority::High);
        assert_eq!("Email".parse::<Channel>().unwrap(), Channel::Email);
        assert_eq!(" closed ".parse::<TicketStatus>().unwrap(), TicketStatus::Closed);
        let err = "fax".parse::<Channel>().unwrap_err();
        assert_eq!(err.to_string(), "unknown channel 'fax'");
    }

    #[test]
    fn null_fields_read_as_absent() {
        let ticket = Ticket::new("T-1", Priority::Low, Channel::Web, created())
            .with_field("region", FieldValue::Null)
            .with_field("product", "Pro");
        assert!(ticket.field("region").is_none());
        assert_eq!(ticket.field("product"), Some(&FieldValue::from("Pro")));
        assert!(ticket.field("missing").is_none());
    }

    #[test]
    fn json_uses_camel_case_and_omits_unset_deadlines() {
        let ticket = Ticket::new("T-1", Priority::High, Channel::Slack, created())
            .with_subject("Login broken")
            .with_tag("vip");
        let json = serde_json::to_value(&ticket).unwrap();
        assert_eq!(json["customFields"], serde_json::json!({}));
        assert_eq!(json["createdAt"], "2024-01-15T10:00:00Z");
        assert!(json.get("firstResponseDeadline").is_none());

        let parsed: Ticket = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, ticket);
    }

    #[test]
    fn minimal_json_fills_defaults() {
        let json = r#"{
            "id": "T-9",
            "status": "open",
            "priority": "Medium",
            "channel": "email",
            "createdAt": "2024-01-15T10:00:00Z",
            "updatedAt": "2024-01-15T10:00:00Z"
        }"#;
        let ticket: Ticket = serde_json::from_str(json).unwrap();
        assert!(ticket.tags.is_empty());
        assert!(ticket.messages.is_empty());
        assert!(ticket.custom_fields.is_empty());
        assert_eq!(ticket.id.as_str(), "T-9");
    }

    #[test]
    fn terminal_statuses() {
        assert!(TicketStatus::Closed.is_terminal());
        assert!(TicketStatus::Resolved.is_terminal());
        assert!(!TicketStatus::Pending.is_terminal());
    }
}
