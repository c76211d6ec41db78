//! SLA policy engine for the support desk.
//!
//! Every ticket is checked against an ordered list of SLA policies. The
//! first policy (lowest `order`) whose scope matches the ticket supplies the
//! first-response and resolution targets; deadlines are measured from the
//! ticket's creation time and rendered as time remaining against "now".
//!
//! # Quick Start
//!
//! ```rust
//! use desk_sla::{SlaConfig, SlaEvaluator, SlaPolicy, SlaScope};
//! use desk_types::{parse_timestamp, Channel, Priority, Ticket};
//!
//! let policies = vec![
//!     SlaPolicy::new("high", "High priority", 1, SlaScope::priorities([Priority::High]))
//!         .with_first_response(1, 0),
//!     SlaPolicy::new("default", "Everything else", 2, SlaScope::all())
//!         .with_first_response(4, 0),
//! ];
//! let evaluator = SlaEvaluator::new(SlaConfig::default(), policies).unwrap();
//!
//! let created = parse_timestamp("2024-01-15T10:00:00Z").unwrap();
//! let ticket = Ticket::new("T-1", Priority::Low, Channel::Email, created);
//! assert_eq!(evaluator.resolve(&ticket).unwrap().id, "default");
//! ```

pub mod config;
pub mod deadline;
pub mod error;
pub mod evaluator;
pub mod policy;

// Re-exports for convenience.
pub use config::{ScopeMatch, SlaConfig};
pub use deadline::{compute_deadline, format_time_remaining, TimeRemaining};
pub use error::{Result, SlaError};
pub use evaluator::{
    resolve_applicable_policy, resolve_applicable_policy_with, SlaEvaluator, SlaTimer, TicketSla,
};
pub use policy::{
    CustomFieldScope, FirstResponseTarget, ResolutionTarget, SlaPolicy, SlaScope, SlaTarget,
    MAX_FIRST_RESPONSE_HOURS, MAX_RESOLUTION_DAYS,
};

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use desk_types::{format_timestamp, parse_timestamp, Channel, Priority, Ticket, Timestamp};

    fn created() -> Timestamp {
        parse_timestamp("2024-01-15T10:00:00Z").unwrap()
    }

    /// Helper: the two-policy list used by the dashboard's default setup.
    fn high_then_fallback() -> Vec<SlaPolicy> {
        vec![
            SlaPolicy::new("sla-high", "High priority", 1, SlaScope::priorities([Priority::High]))
                .with_first_response(1, 0),
            SlaPolicy::new("sla-all", "All tickets", 2, SlaScope::all()).with_first_response(4, 0),
        ]
    }

    // -----------------------------------------------------------------------
    // 1. High priority hits the scoped policy, low falls back
    // -----------------------------------------------------------------------
    #[test]
    fn high_priority_matches_first_policy_low_falls_back() {
        let evaluator = SlaEvaluator::new(SlaConfig::default(), high_then_fallback()).unwrap();

        let high = Ticket::new("T-1", Priority::High, Channel::Email, created());
        let sla = evaluator.evaluate(&high, created());
        assert_eq!(sla.policy_id.as_deref(), Some("sla-high"));
        assert_eq!(
            format_timestamp(&sla.first_response.unwrap().deadline),
            "2024-01-15T11:00:00Z"
        );

        let low = Ticket::new("T-2", Priority::Low, Channel::Email, created());
        let sla = evaluator.evaluate(&low, created());
        assert_eq!(sla.policy_id.as_deref(), Some("sla-all"));
        assert_eq!(
            format_timestamp(&sla.first_response.unwrap().deadline),
            "2024-01-15T14:00:00Z"
        );
    }

    // -----------------------------------------------------------------------
    // 2. No matching policy means no deadlines
    // -----------------------------------------------------------------------
    #[test]
    fn no_match_no_deadlines() {
        let policies = vec![SlaPolicy::new("slack", "Slack", 1, SlaScope::channels([Channel::Slack]))
            .with_first_response(1, 0)];
        let ticket = Ticket::new("T-1", Priority::High, Channel::Web, created());
        assert!(resolve_applicable_policy(&ticket, &policies).is_none());

        let evaluator = SlaEvaluator::new(SlaConfig::default(), policies).unwrap();
        let sla = evaluator.evaluate(&ticket, created());
        assert!(sla.first_response.is_none());
        assert!(sla.resolution.is_none());
    }

    // -----------------------------------------------------------------------
    // 3. Overdue clocks mark the ticket as breached
    // -----------------------------------------------------------------------
    #[test]
    fn overdue_first_response_is_breached() {
        let evaluator = SlaEvaluator::new(SlaConfig::default(), high_then_fallback()).unwrap();
        let ticket = Ticket::new("T-1", Priority::High, Channel::Email, created());

        let now = created() + Duration::hours(3);
        let sla = evaluator.evaluate(&ticket, now);
        let timer = sla.first_response.clone().unwrap();
        assert!(timer.remaining.overdue);
        assert_eq!(timer.remaining.human_text, "Overdue");
        assert!(sla.is_breached());
    }

    // -----------------------------------------------------------------------
    // 4. Resolution targets render in days once a day or more remains
    // -----------------------------------------------------------------------
    #[test]
    fn resolution_timer_renders_days() {
        let policies = vec![SlaPolicy::new("sla", "Default", 1, SlaScope::all())
            .with_first_response(1, 0)
            .with_resolution(3, 0)];
        let evaluator = SlaEvaluator::new(SlaConfig::default(), policies).unwrap();
        let ticket = Ticket::new("T-1", Priority::Medium, Channel::Teams, created());

        let sla = evaluator.evaluate(&ticket, created() + Duration::hours(5));
        assert_eq!(sla.resolution.unwrap().remaining.human_text, "2d 19h");
        assert_eq!(sla.first_response.unwrap().remaining.human_text, "Overdue");
    }

    // -----------------------------------------------------------------------
    // 5. Custom-field scopes select tickets by field value
    // -----------------------------------------------------------------------
    #[test]
    fn custom_field_scope_selects_enterprise_tickets() {
        let policies = vec![
            SlaPolicy::new("enterprise", "Enterprise", 1, SlaScope::custom_field("plan", "Enterprise"))
                .with_first_response(0, 30),
            SlaPolicy::new("all", "All", 2, SlaScope::all()).with_first_response(8, 0),
        ];
        let evaluator = SlaEvaluator::new(SlaConfig::default(), policies).unwrap();

        let enterprise = Ticket::new("T-1", Priority::Low, Channel::Web, created())
            .with_field("plan", "Enterprise");
        let starter = Ticket::new("T-2", Priority::Low, Channel::Web, created())
            .with_field("plan", "Starter");

        assert_eq!(evaluator.resolve(&enterprise).unwrap().id, "enterprise");
        assert_eq!(evaluator.resolve(&starter).unwrap().id, "all");
    }

    // -----------------------------------------------------------------------
    // 6. Evaluation is idempotent
    // -----------------------------------------------------------------------
    #[test]
    fn evaluation_is_idempotent() {
        let evaluator = SlaEvaluator::new(SlaConfig::default(), high_then_fallback()).unwrap();
        let ticket = Ticket::new("T-1", Priority::High, Channel::Slack, created());
        let now = created() + Duration::minutes(20);
        assert_eq!(evaluator.evaluate(&ticket, now), evaluator.evaluate(&ticket, now));
    }

    // -----------------------------------------------------------------------
    // 7. TicketSla serializes camelCase for API consumers
    // -----------------------------------------------------------------------
    #[test]
    fn ticket_sla_json_shape() {
        let evaluator = SlaEvaluator::new(SlaConfig::default(), high_then_fallback()).unwrap();
        let ticket = Ticket::new("T-1", Priority::High, Channel::Slack, created());
        let sla = evaluator.evaluate(&ticket, created());
        let json = serde_json::to_value(&sla).unwrap();
        assert_eq!(json["policyId"], "sla-high");
        assert_eq!(json["firstResponse"]["remaining"]["humanText"], "1h 0m");
        assert_eq!(json["firstResponse"]["deadline"], "2024-01-15T11:00:00Z");
        assert!(json["resolution"].is_null());
    }
}
