//! Payload builder: one uniform payload per (candidate, run).

use opsflow_domain::candidate::TargetCandidate;
use opsflow_domain::id::ExecutionId;
use opsflow_domain::payload::{
    CandidateIdentity, ExecutionPayload, RuleSnapshot, TriggerDetails, UserIdentity,
};

/// Builds the [`ExecutionPayload`] an action receives.
///
/// The match over [`TargetCandidate`] is exhaustive, so adding a trigger
/// type without a payload mapping does not compile.
pub struct PayloadBuilder;

impl PayloadBuilder {
    #[must_use]
    pub fn build(
        candidate: &TargetCandidate,
        rule: &RuleSnapshot,
        invoking_user: &UserIdentity,
        execution_id: ExecutionId,
    ) -> ExecutionPayload {
        let details = match candidate {
            TargetCandidate::MeetingReminder(m) => TriggerDetails::MeetingReminder {
                meeting_title: m.title.clone(),
                meeting_date: m.meeting_date.clone(),
                meeting_time: m.meeting_time.clone(),
                start_time: m.start_time,
                duration_minutes: m.duration_minutes,
            },
            TargetCandidate::ClientInactive(c) => TriggerDetails::ClientInactive {
                inactivity_reason: c.inactivity_reason,
                days_since_last_activity: c.days_since_last_activity,
            },
            TargetCandidate::ProjectDelayed(p) => TriggerDetails::ProjectDelayed {
                project_name: p.project_name.clone(),
                days_overdue: p.days_overdue,
                end_date: p.end_date,
            },
            TargetCandidate::Generic(c) => TriggerDetails::Generic {
                project_count: c.project_count,
                invoice_count: c.invoice_count,
            },
        };

        ExecutionPayload {
            execution_id,
            rule: rule.clone(),
            invoking_user: invoking_user.clone(),
            candidate: CandidateIdentity {
                key: candidate.key(),
                display_label: candidate.display_label().to_string(),
                contact: candidate.contact().clone(),
            },
            details,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::enricher::EntityEnricher;
    use crate::trigger_resolver::tests::{client, meeting_at};
    use opsflow_domain::id::UserId;
    use opsflow_domain::record::MeetingStatus;
    use opsflow_domain::rule::{AutomationRule, TriggerType};

    fn snapshot(trigger: TriggerType) -> RuleSnapshot {
        let rule = AutomationRule::builder()
            .name("Reminders")
            .trigger_type(trigger)
            .build()
            .unwrap();
        RuleSnapshot::new(&rule, Vec::new())
    }

    fn user() -> UserIdentity {
        UserIdentity {
            id: UserId::new(),
            email: "owner@example.com".to_string(),
        }
    }

    #[test]
    fn should_carry_meeting_fields_and_contact() {
        let meeting = meeting_at("Review", 1, MeetingStatus::Scheduled);
        let meeting_id = meeting.id;
        let candidate = EntityEnricher::default().meeting(meeting);
        let execution_id = ExecutionId::new();

        let payload = PayloadBuilder::build(
            &candidate,
            &snapshot(TriggerType::MeetingReminder),
            &user(),
            execution_id,
        );

        assert_eq!(payload.execution_id, execution_id);
        assert_eq!(payload.candidate.key, meeting_id.to_string());
        assert_eq!(payload.candidate.contact.email, "review@example.com");
        let TriggerDetails::MeetingReminder {
            meeting_title,
            duration_minutes,
            ..
        } = payload.details
        else {
            panic!("expected meeting details");
        };
        assert_eq!(meeting_title, "Review");
        assert_eq!(duration_minutes, 30);
    }

    #[test]
    fn should_carry_counts_for_generic_client() {
        let candidate = EntityEnricher::default().client(client("Ada"), 3, 0);
        let payload = PayloadBuilder::build(
            &candidate,
            &snapshot(TriggerType::Generic),
            &user(),
            ExecutionId::new(),
        );
        assert_eq!(
            payload.details,
            TriggerDetails::Generic {
                project_count: 3,
                invoice_count: 0
            }
        );
        assert_eq!(payload.invoking_user.email, "owner@example.com");
    }
}
