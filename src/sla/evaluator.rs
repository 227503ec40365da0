use crate::calendar::{subtract_duration, BusinessCalendar, BusinessDuration};
use crate::domain::model::{
    SlaKind, SlaOutcome, SlaOverride, SlaRecord, SlaStatus, Ticket, TicketEvaluation, TicketKind,
    TimeSource,
};
use crate::domain::ports::{ReportPeriod, TeamDirectory};
use crate::sla::activity::TeamActivity;
use crate::sla::targets::SlaTargets;
use crate::sla::work_notes::parse_work_notes;
use crate::utils::error::{ReportError, Result};
use chrono::NaiveDateTime;

/// Start and stop of the response clock before the month window is applied.
#[derive(Debug, Clone, Copy)]
struct ResponseClock {
    start: NaiveDateTime,
    start_source: TimeSource,
    stop: Option<NaiveDateTime>,
    stop_source: Option<TimeSource>,
    /// Priority whose response target applies.
    priority: u8,
}

/// Classifies response and resolution SLAs of tickets within a reporting
/// month.
pub struct SlaEvaluator<T: TeamDirectory> {
    calendar: BusinessCalendar,
    targets: SlaTargets,
    team: T,
}

impl<T: TeamDirectory> SlaEvaluator<T> {
    pub fn new(calendar: BusinessCalendar, targets: SlaTargets, team: T) -> Self {
        Self {
            calendar,
            targets,
            team,
        }
    }

    /// Evaluates one ticket.
    ///
    /// `sla_records` and `overrides` must belong to the ticket. Returns
    /// `Ok(None)` when the ticket falls outside `period`: resolved before it
    /// starts or received after it ends.
    pub fn evaluate(
        &self,
        ticket: &Ticket,
        sla_records: &[SlaRecord],
        overrides: &[SlaOverride],
        period: &ReportPeriod,
    ) -> Result<Option<TicketEvaluation>> {
        if ticket.resolved.is_some_and(|resolved| resolved < period.start) {
            tracing::debug!("{} resolved before the reporting period", ticket.number);
            return Ok(None);
        }

        let priority = ticket.priority_level().ok_or_else(|| ReportError::ValidationError {
            message: format!("{} has no priority between 1 and 5: '{}'", ticket.number, ticket.report_priority),
        })?;

        let notes = parse_work_notes(&ticket.comments_and_work_notes);
        let activity = TeamActivity::analyse(&notes, &self.team);

        let mut clock = self.response_clock(ticket, &activity, sla_records, priority);

        if let Some(o) = find_override(overrides, SlaKind::Response) {
            if let Some(start) = o.start_time {
                clock.start = start;
                clock.start_source = TimeSource::Override;
            }
            if let Some(end) = o.end_time {
                clock.stop = Some(end);
                clock.stop_source = Some(TimeSource::Override);
            }
        }

        if clock.start > period.end {
            tracing::debug!("{} received after the reporting period", ticket.number);
            return Ok(None);
        }

        let response_target = self
            .targets
            .response(ticket.kind, clock.priority)
            .or_else(|| self.targets.response(ticket.kind, priority))
            .unwrap_or_default();
        let mut response = self.measure(clock.start, clock.stop, response_target)?;
        response.start_source = Some(clock.start_source);
        response.stop_source = clock.stop_source;

        let response_outside_period = match ticket.kind {
            TicketKind::Incident => clock.stop.is_some_and(|stop| stop < period.start),
            TicketKind::Request => clock.start < period.start,
        };
        if response_outside_period {
            response.status = SlaStatus::NotApplicable;
        }

        let (mut resolved, mut resolved_source) = (ticket.resolved, TimeSource::Resolved);
        if ticket.kind == TicketKind::Incident {
            if let Some(end) = find_override(overrides, SlaKind::Resolve).and_then(|o| o.end_time) {
                resolved = Some(end);
                resolved_source = TimeSource::Override;
            }
        }

        let resolve_target = self.targets.resolve(ticket.kind, priority).unwrap_or_default();
        let mut resolution = match resolved.filter(|r| *r < period.end) {
            Some(stop) => self.measure(clock.start, Some(stop), resolve_target)?,
            None => not_measured(clock.start, resolved, resolve_target),
        };
        resolution.start_source = Some(clock.start_source);
        resolution.stop_source = resolved.map(|_| resolved_source);
        if resolution.status == SlaStatus::Breached && !activity.transfers.is_empty() {
            resolution.status = SlaStatus::Transferred;
        }

        let team_duration = match (ticket.kind, activity.last_transfer(), resolved) {
            (TicketKind::Incident, Some(transfer), Some(resolved)) => {
                self.team_only_duration(&ticket.number, clock.start, resolved, transfer.from, transfer.to)
            }
            _ => None,
        };

        Ok(Some(TicketEvaluation {
            kind: ticket.kind,
            number: ticket.number.clone(),
            service: ticket.service.clone(),
            priority,
            caller: ticket.caller.clone(),
            assigned_to: ticket.assigned_to.clone(),
            short_description: ticket.short_description.clone(),
            opened: ticket.opened,
            response,
            resolution,
            transfers: activity.transfers,
            team_duration,
            notes: ticket.notes.clone(),
        }))
    }

    fn response_clock(
        &self,
        ticket: &Ticket,
        activity: &TeamActivity,
        sla_records: &[SlaRecord],
        priority: u8,
    ) -> ResponseClock {
        let touch_source = activity.first_team_touch.map(|_| TimeSource::Touch);

        if self.team.is_team_member(&ticket.caller) {
            return ResponseClock {
                start: ticket.opened,
                start_source: TimeSource::Open,
                stop: Some(ticket.opened),
                stop_source: Some(TimeSource::Open),
                priority,
            };
        }

        if let Some(received) = activity.receive_touch {
            return ResponseClock {
                start: received,
                start_source: TimeSource::Assigned,
                stop: activity.first_team_touch,
                stop_source: touch_source,
                priority,
            };
        }

        if ticket.kind == TicketKind::Request {
            return ResponseClock {
                start: ticket.opened,
                start_source: TimeSource::Open,
                stop: activity.first_team_touch,
                stop_source: touch_source,
                priority,
            };
        }

        let from_record = |record: &SlaRecord, source: TimeSource, priority: u8| ResponseClock {
            start: record.start_time.unwrap_or(ticket.opened),
            start_source: source,
            stop: record.stop_time,
            stop_source: record.stop_time.map(|_| source),
            priority,
        };

        let definition = ticket
            .exported_priority_level()
            .map(|p| format!("P{} Response", p))
            .unwrap_or_default();

        if let Some(record) = sla_records.iter().find(|r| r.definition == definition) {
            return from_record(record, TimeSource::Sla, priority);
        }

        if let Some(record) = sla_records.iter().find(|r| r.is_response()) {
            let original = record.definition_priority().unwrap_or(priority);
            tracing::debug!(
                "{} response measured under original priority P{}",
                ticket.number,
                original
            );
            return from_record(record, TimeSource::OriginalPriority, original);
        }

        if let Some(record) = sla_records.iter().find(|r| r.is_resolution()) {
            return from_record(record, TimeSource::ResolveStart, priority);
        }

        ResponseClock {
            start: ticket.opened,
            start_source: TimeSource::Open,
            stop: ticket.resolved,
            stop_source: ticket.resolved.map(|_| TimeSource::Resolved),
            priority,
        }
    }

    fn measure(
        &self,
        start: NaiveDateTime,
        stop: Option<NaiveDateTime>,
        target: BusinessDuration,
    ) -> Result<SlaOutcome> {
        let Some(stop) = stop else {
            return Ok(not_measured(start, None, target));
        };
        if stop < start {
            tracing::warn!("Stop {} is before start {}; not measured", stop, start);
            return Ok(not_measured(start, Some(stop), target));
        }

        let duration = self.calendar.elapsed(start, stop)?;
        let breach_at = self.calendar.advance(start, &target);
        let status = if stop > breach_at {
            SlaStatus::Breached
        } else {
            SlaStatus::Met
        };

        Ok(SlaOutcome {
            target,
            start: Some(start),
            start_source: None,
            stop: Some(stop),
            stop_source: None,
            breach_at: Some(breach_at),
            duration: Some(duration),
            status,
        })
    }

    /// Resolution time with the last transfer to another team taken out.
    fn team_only_duration(
        &self,
        number: &str,
        received: NaiveDateTime,
        resolved: NaiveDateTime,
        transfer_from: NaiveDateTime,
        transfer_to: NaiveDateTime,
    ) -> Option<BusinessDuration> {
        let result = self.calendar.elapsed(received, resolved).and_then(|total| {
            let away = self.calendar.elapsed(transfer_from, transfer_to)?;
            subtract_duration(total, away)
        });

        match result {
            Ok(duration) => Some(duration),
            Err(e) => {
                tracing::warn!("{}: cannot compute team-only duration: {}", number, e);
                None
            }
        }
    }
}

fn find_override(overrides: &[SlaOverride], kind: SlaKind) -> Option<&SlaOverride> {
    overrides.iter().find(|o| o.sla == kind)
}

fn not_measured(start: NaiveDateTime, stop: Option<NaiveDateTime>, target: BusinessDuration) -> SlaOutcome {
    SlaOutcome {
        target,
        start: Some(start),
        start_source: None,
        stop,
        stop_source: None,
        breach_at: None,
        duration: None,
        status: SlaStatus::NotApplicable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calendar::test_support::{calendar_2024, ts};
    use crate::sla::activity::test_support::FixedTeam;

    fn evaluator() -> SlaEvaluator<FixedTeam> {
        SlaEvaluator::new(
            calendar_2024(),
            SlaTargets::default(),
            FixedTeam::new(&["Wilson Lee", "Wayne Moss"], &["Max Sekula"]),
        )
    }

    fn july() -> ReportPeriod {
        ReportPeriod {
            start: ts("2024-07-01 00:00:00"),
            end: ts("2024-07-31 23:59:59"),
        }
    }

    fn incident(number: &str, priority: &str, opened: &str, resolved: Option<&str>) -> Ticket {
        Ticket {
            kind: TicketKind::Incident,
            number: number.to_string(),
            service: "Data Storage".to_string(),
            state: "Resolved".to_string(),
            priority: priority.to_string(),
            report_priority: priority.to_string(),
            caller: "Jane Citizen".to_string(),
            assigned_to: "Wilson Lee".to_string(),
            short_description: "Array degraded".to_string(),
            opened: ts(opened),
            resolved: resolved.map(ts),
            updated: None,
            comments_and_work_notes: String::new(),
            notes: String::new(),
            exclude: false,
        }
    }

    fn record(number: &str, definition: &str, start: &str, stop: Option<&str>) -> SlaRecord {
        SlaRecord {
            number: number.to_string(),
            definition: definition.to_string(),
            stage: "Completed".to_string(),
            start_time: Some(ts(start)),
            stop_time: stop.map(ts),
            breach_time: None,
            made_sla: None,
        }
    }

    #[test]
    fn test_response_from_matching_sla_record() {
        let ticket = incident("INC001", "3 - Moderate", "2024-07-01 08:50:00", Some("2024-07-01 15:00:00"));
        let records = vec![record("INC001", "P3 Response", "2024-07-01 09:00:00", Some("2024-07-01 09:40:00"))];

        let eval = evaluator().evaluate(&ticket, &records, &[], &july()).unwrap().unwrap();

        assert_eq!(eval.priority, 3);
        assert_eq!(eval.response.start_source, Some(TimeSource::Sla));
        assert_eq!(eval.response.duration, Some(BusinessDuration::new(0, 0, 40)));
        assert_eq!(eval.response.breach_at, Some(ts("2024-07-01 10:00:00")));
        assert_eq!(eval.response.status, SlaStatus::Met);

        // P3 resolve target is ten business hours
        assert_eq!(eval.resolution.duration, Some(BusinessDuration::new(0, 6, 0)));
        assert_eq!(eval.resolution.status, SlaStatus::Met);
    }

    #[test]
    fn test_response_breach() {
        let ticket = incident("INC002", "1 - Critical", "2024-07-05 16:00:00", None);
        let records = vec![record("INC002", "P1 Response", "2024-07-05 17:55:00", Some("2024-07-08 07:20:00"))];

        let eval = evaluator().evaluate(&ticket, &records, &[], &july()).unwrap().unwrap();

        // 10 minute target from Friday 17:55 lands on Monday 07:05
        assert_eq!(eval.response.breach_at, Some(ts("2024-07-08 07:05:00")));
        assert_eq!(eval.response.status, SlaStatus::Breached);
        assert_eq!(eval.response.duration, Some(BusinessDuration::new(0, 0, 25)));
        assert_eq!(eval.resolution.status, SlaStatus::NotApplicable);
    }

    #[test]
    fn test_response_under_original_priority() {
        let ticket = incident("INC003", "4 - Low", "2024-07-02 09:00:00", None);
        let records = vec![record("INC003", "P2 Response", "2024-07-02 09:00:00", Some("2024-07-02 09:20:00"))];

        let eval = evaluator().evaluate(&ticket, &records, &[], &july()).unwrap().unwrap();

        assert_eq!(eval.response.start_source, Some(TimeSource::OriginalPriority));
        assert_eq!(eval.response.target, BusinessDuration::new(0, 0, 30));
        assert_eq!(eval.resolution.target, BusinessDuration::new(5, 0, 0));
    }

    #[test]
    fn test_falls_back_to_resolution_record_then_open_time() {
        let ticket = incident("INC004", "3", "2024-07-02 09:00:00", Some("2024-07-02 12:00:00"));
        let records = vec![record("INC004", "P3 Resolution", "2024-07-02 09:05:00", None)];

        let eval = evaluator().evaluate(&ticket, &records, &[], &july()).unwrap().unwrap();
        assert_eq!(eval.response.start, Some(ts("2024-07-02 09:05:00")));
        assert_eq!(eval.response.start_source, Some(TimeSource::ResolveStart));
        assert_eq!(eval.response.status, SlaStatus::NotApplicable);

        let eval = evaluator().evaluate(&ticket, &[], &[], &july()).unwrap().unwrap();
        assert_eq!(eval.response.start_source, Some(TimeSource::Open));
        assert_eq!(eval.response.stop_source, Some(TimeSource::Resolved));
        assert_eq!(eval.response.duration, Some(BusinessDuration::new(0, 3, 0)));
    }

    #[test]
    fn test_team_caller_responds_instantly() {
        let mut ticket = incident("INC005", "2", "2024-07-03 10:00:00", Some("2024-07-03 11:00:00"));
        ticket.caller = "Wayne Moss".to_string();

        let eval = evaluator().evaluate(&ticket, &[], &[], &july()).unwrap().unwrap();
        assert!(eval.response.duration.unwrap().is_zero());
        assert_eq!(eval.response.status, SlaStatus::Met);
    }

    #[test]
    fn test_assigned_then_touched() {
        let mut ticket = incident("INC006", "3", "2024-07-03 08:00:00", None);
        ticket.comments_and_work_notes = "03-07-2024 11:30:00 - Wilson Lee (Work notes)\nOn it\n\
03-07-2024 09:00:00 - Service Desk (Work notes)\nAssigned to storage"
            .to_string();

        let eval = evaluator().evaluate(&ticket, &[], &[], &july()).unwrap().unwrap();
        assert_eq!(eval.response.start, Some(ts("2024-07-03 09:00:00")));
        assert_eq!(eval.response.start_source, Some(TimeSource::Assigned));
        assert_eq!(eval.response.stop, Some(ts("2024-07-03 11:30:00")));
        assert_eq!(eval.response.stop_source, Some(TimeSource::Touch));
        assert_eq!(eval.response.status, SlaStatus::Breached);
    }

    #[test]
    fn test_overrides_replace_clock() {
        let ticket = incident("INC007", "3", "2024-07-03 08:00:00", Some("2024-07-10 08:00:00"));
        let records = vec![record("INC007", "P3 Response", "2024-07-03 08:00:00", Some("2024-07-04 08:00:00"))];
        let overrides = vec![
            SlaOverride {
                number: "INC007".to_string(),
                sla: SlaKind::Response,
                start_time: None,
                end_time: Some(ts("2024-07-03 08:30:00")),
            },
            SlaOverride {
                number: "INC007".to_string(),
                sla: SlaKind::Resolve,
                start_time: None,
                end_time: Some(ts("2024-07-03 17:00:00")),
            },
        ];

        let eval = evaluator().evaluate(&ticket, &records, &overrides, &july()).unwrap().unwrap();
        assert_eq!(eval.response.stop_source, Some(TimeSource::Override));
        assert_eq!(eval.response.status, SlaStatus::Met);
        assert_eq!(eval.resolution.stop, Some(ts("2024-07-03 17:00:00")));
        assert_eq!(eval.resolution.stop_source, Some(TimeSource::Override));
        assert_eq!(eval.resolution.duration, Some(BusinessDuration::new(0, 9, 0)));
        assert_eq!(eval.resolution.status, SlaStatus::Met);
    }

    #[test]
    fn test_transferred_breach_and_team_duration() {
        let mut ticket = incident("INC008", "2", "2024-07-01 09:00:00", Some("2024-07-02 12:00:00"));
        ticket.comments_and_work_notes = "02-07-2024 12:00:00 - Wilson Lee (Work notes)\nFixed\n\
01-07-2024 15:00:00 - Network Team (Work notes)\nLooking\n\
01-07-2024 10:00:00 - Wayne Moss (Work notes)\nSent to network"
            .to_string();
        let records = vec![record("INC008", "P2 Response", "2024-07-01 09:00:00", Some("2024-07-01 09:10:00"))];

        let eval = evaluator().evaluate(&ticket, &records, &[], &july()).unwrap().unwrap();

        assert_eq!(eval.transfers.len(), 1);
        // 9h on Monday + 5h on Tuesday
        assert_eq!(eval.resolution.duration, Some(BusinessDuration::new(1, 3, 0)));
        assert_eq!(eval.resolution.status, SlaStatus::Transferred);
        // minus Monday 10:00 to 15:00
        assert_eq!(eval.team_duration, Some(BusinessDuration::new(0, 9, 0)));
    }

    #[test]
    fn test_period_filters() {
        let resolved_early = incident("INC009", "3", "2024-06-20 09:00:00", Some("2024-06-28 09:00:00"));
        assert!(evaluator().evaluate(&resolved_early, &[], &[], &july()).unwrap().is_none());

        let received_late = incident("INC010", "3", "2024-08-01 09:00:00", None);
        assert!(evaluator().evaluate(&received_late, &[], &[], &july()).unwrap().is_none());

        let carried_over = incident("INC011", "3", "2024-06-28 09:00:00", Some("2024-07-02 09:00:00"));
        let records = vec![record("INC011", "P3 Response", "2024-06-28 09:00:00", Some("2024-06-28 09:30:00"))];
        let eval = evaluator().evaluate(&carried_over, &records, &[], &july()).unwrap().unwrap();
        assert_eq!(eval.response.status, SlaStatus::NotApplicable);
        assert!(eval.resolution.status.is_evaluated());
    }

    #[test]
    fn test_request_uses_open_time_and_first_touch() {
        let mut ticket = incident("RITM001", "4", "2024-07-08 10:00:00", Some("2024-07-09 10:00:00"));
        ticket.kind = TicketKind::Request;
        ticket.comments_and_work_notes = "08-07-2024 13:00:00 - Wayne Moss (Work notes)\nDone".to_string();

        let eval = evaluator().evaluate(&ticket, &[], &[], &july()).unwrap().unwrap();
        assert_eq!(eval.response.start_source, Some(TimeSource::Open));
        assert_eq!(eval.response.stop, Some(ts("2024-07-08 13:00:00")));
        assert_eq!(eval.response.status, SlaStatus::Met);
        // P4 request resolve target is ten business days
        assert_eq!(eval.resolution.target, BusinessDuration::new(10, 0, 0));
        assert_eq!(eval.resolution.status, SlaStatus::Met);
    }

    #[test]
    fn test_missing_priority_is_an_error() {
        let ticket = incident("INC012", "", "2024-07-02 09:00:00", None);
        let err = evaluator().evaluate(&ticket, &[], &[], &july()).unwrap_err();
        assert!(matches!(err, ReportError::ValidationError { .. }));
    }

    #[test]
    fn test_resolved_before_late_outside_comment_is_kept() {
        let mut ticket = incident("INC013", "3 - Moderate", "2024-07-03 08:00:00", Some("2024-07-03 10:00:00"));
        ticket.comments_and_work_notes =
            "04-07-2024 09:00:00 - Service Desk (Additional comments)\nAny update?".to_string();

        let eval = evaluator().evaluate(&ticket, &[], &[], &july()).unwrap().unwrap();

        assert_eq!(eval.response.start, Some(ts("2024-07-04 09:00:00")));
        assert_eq!(eval.response.status, SlaStatus::NotApplicable);
        assert_eq!(eval.resolution.stop, Some(ts("2024-07-03 10:00:00")));
        assert_eq!(eval.resolution.duration, None);
        assert_eq!(eval.resolution.breach_at, None);
        assert_eq!(eval.resolution.status, SlaStatus::NotApplicable);
    }
}
