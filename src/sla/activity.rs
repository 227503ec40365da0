use crate::domain::model::Transfer;
use crate::domain::ports::TeamDirectory;
use crate::sla::work_notes::WorkNote;
use chrono::NaiveDateTime;

/// Who touched a ticket and when, seen from the support team.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeamActivity {
    /// First update by a team member.
    pub first_team_touch: Option<NaiveDateTime>,
    /// Latest update by someone outside the team before the team first
    /// touched the ticket (e.g. the service desk assigning it).
    pub receive_touch: Option<NaiveDateTime>,
    /// Periods the ticket was with another team after the support team had
    /// picked it up.
    pub transfers: Vec<Transfer>,
}

impl TeamActivity {
    /// Walks the notes oldest first.
    pub fn analyse<T: TeamDirectory + ?Sized>(notes: &[WorkNote], team: &T) -> Self {
        let mut activity = TeamActivity::default();
        let mut last_team_touch: Option<NaiveDateTime> = None;
        let mut other_team_touch: Option<NaiveDateTime> = None;

        for note in notes {
            if team.is_team_member(&note.author) {
                activity.first_team_touch.get_or_insert(note.at);

                if let (Some(from), Some(to)) = (last_team_touch, other_team_touch.take()) {
                    activity.transfers.push(Transfer { from, to });
                }
                last_team_touch = Some(note.at);
            } else if !team.is_ignored(&note.author) {
                if activity.first_team_touch.is_none() {
                    activity.receive_touch = Some(note.at);
                } else {
                    other_team_touch = Some(note.at);
                }
            }
        }

        if let Some(to) = other_team_touch {
            tracing::debug!("Ticket still with another team since {}", to);
        }

        activity
    }

    pub fn last_transfer(&self) -> Option<&Transfer> {
        self.transfers.last()
    }
}
