use crate::calendar::BusinessDuration;
use crate::domain::model::TicketKind;
use crate::utils::error::{ReportError, Result};
use serde::{Deserialize, Serialize};

const PRIORITY_LEVELS: usize = 5;

/// Response and resolve targets for priorities 1 to 5, in that order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityTargets {
    pub response: Vec<BusinessDuration>,
    pub resolve: Vec<BusinessDuration>,
}

impl PriorityTargets {
    fn from_strs(response: [&str; PRIORITY_LEVELS], resolve: [&str; PRIORITY_LEVELS]) -> Self {
        let parse = |values: [&str; PRIORITY_LEVELS]| {
            values
                .iter()
                .filter_map(|v| v.parse().ok())
                .collect::<Vec<BusinessDuration>>()
        };
        Self {
            response: parse(response),
            resolve: parse(resolve),
        }
    }

    fn lookup(values: &[BusinessDuration], priority: u8) -> Option<BusinessDuration> {
        (priority as usize).checked_sub(1).and_then(|i| values.get(i)).copied()
    }

    fn validate(&self, section: &str) -> Result<()> {
        for (name, values) in [("response", &self.response), ("resolve", &self.resolve)] {
            if values.len() != PRIORITY_LEVELS {
                return Err(ReportError::InvalidConfigValueError {
                    field: format!("targets.{}.{}", section, name),
                    value: values.len().to_string(),
                    reason: format!("Exactly {} targets are required, one per priority", PRIORITY_LEVELS),
                });
            }
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaTargets {
    #[serde(default = "SlaTargets::default_incident")]
    pub incident: PriorityTargets,
    #[serde(default = "SlaTargets::default_request")]
    pub request: PriorityTargets,
}

impl SlaTargets {
    fn default_incident() -> PriorityTargets {
        PriorityTargets::from_strs(
            ["0:00:10", "0:00:30", "0:01:00", "0:04:00", "0:08:00"],
            ["0:01:00", "0:04:00", "0:10:00", "5:00:00", "20:00:00"],
        )
    }

    fn default_request() -> PriorityTargets {
        PriorityTargets::from_strs(
            ["0:00:10", "0:00:30", "0:01:00", "0:04:00", "0:08:00"],
            ["0:02:00", "1:00:00", "5:00:00", "10:00:00", "260:00:00"],
        )
    }

    fn for_kind(&self, kind: TicketKind) -> &PriorityTargets {
        match kind {
            TicketKind::Incident => &self.incident,
            TicketKind::Request => &self.request,
        }
    }

    pub fn response(&self, kind: TicketKind, priority: u8) -> Option<BusinessDuration> {
        PriorityTargets::lookup(&self.for_kind(kind).response, priority)
    }

    pub fn resolve(&self, kind: TicketKind, priority: u8) -> Option<BusinessDuration> {
        PriorityTargets::lookup(&self.for_kind(kind).resolve, priority)
    }

    pub fn validate(&self) -> Result<()> {
        self.incident.validate("incident")?;
        self.request.validate("request")
    }
}

impl Default for SlaTargets {
    fn default() -> Self {
        Self {
            incident: Self::default_incident(),
            request: Self::default_request(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_targets() {
        let targets = SlaTargets::default();
        assert!(targets.validate().is_ok());

        assert_eq!(targets.response(TicketKind::Incident, 1), Some(BusinessDuration::new(0, 0, 10)));
        assert_eq!(targets.resolve(TicketKind::Incident, 4), Some(BusinessDuration::new(5, 0, 0)));
        assert_eq!(targets.resolve(TicketKind::Request, 5), Some(BusinessDuration::new(260, 0, 0)));
        assert_eq!(targets.response(TicketKind::Request, 0), None);
        assert_eq!(targets.response(TicketKind::Request, 6), None);
    }

    #[test]
    fn test_wrong_number_of_targets_is_rejected() {
        let mut targets = SlaTargets::default();
        targets.request.resolve.pop();
        let err = targets.validate().unwrap_err();
        assert!(err.to_string().contains("targets.request.resolve"));
    }
}
