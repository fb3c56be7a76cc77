//! Mode controller and the mode-scoped selections (Arena teams, Focus set).

use super::CouncilController;
use crate::ports::council_event::{CouncilEvent, SessionEndReason};
use council_domain::{Assignment, CouncilError, CouncilMode};
use tracing::{debug, info};

impl CouncilController {
    /// Switch mode. Rejected while a session is running; otherwise resets the
    /// floor, any paused session and both selections.
    pub(super) fn set_mode(&mut self, mode: CouncilMode) -> Result<(), CouncilError> {
        if self.session_running() {
            return Err(CouncilError::conflict(
                "stop the running session before changing mode",
            ));
        }

        self.cancel_floor();
        if self.session.is_some() {
            debug!("Ending paused session on mode change");
            self.end_session(SessionEndReason::Stopped);
        }
        self.teams.clear();
        self.focus.clear();
        let previous = std::mem::replace(&mut self.mode, mode);

        let board = mode.board();
        info!(from = %previous, to = %mode, ?board, "Mode changed");
        self.transcript(
            "mode_changed",
            serde_json::json!({ "from": previous.as_str(), "to": mode.as_str() }),
        );
        self.emit(CouncilEvent::ModeChanged { mode, board });
        Ok(())
    }

    /// Click-assign an agent to an Arena team.
    pub(super) fn assign_team_member(&mut self, reference: &str) -> Result<Assignment, CouncilError> {
        self.ensure_arena_setup()?;
        let agent = self.resolve_agent(reference)?;

        let assignment = self.teams.assign(agent);
        if assignment == Assignment::Full {
            return Err(CouncilError::conflict("both teams are full"));
        }
        self.emit(CouncilEvent::TeamsChanged {
            teams: self.teams.clone(),
        });
        Ok(assignment)
    }

    pub(super) fn clear_teams(&mut self) -> Result<(), CouncilError> {
        self.ensure_arena_setup()?;
        self.teams.clear();
        self.emit(CouncilEvent::TeamsChanged {
            teams: self.teams.clone(),
        });
        Ok(())
    }

    /// Toggle an agent in the Focus selection. Returns `true` if now selected.
    pub(super) fn toggle_focus(&mut self, reference: &str) -> Result<bool, CouncilError> {
        if self.mode != CouncilMode::Focus {
            return Err(CouncilError::validation(format!(
                "focus selection requires focus mode (current mode: {})",
                self.mode
            )));
        }
        let agent = self.resolve_agent(reference)?;

        let selected = self.focus.toggle(agent);
        self.emit(CouncilEvent::FocusChanged {
            selected: self.focus.selected().to_vec(),
        });
        Ok(selected)
    }

    fn ensure_arena_setup(&self) -> Result<(), CouncilError> {
        if self.mode != CouncilMode::Arena {
            return Err(CouncilError::validation(format!(
                "team assignment requires arena mode (current mode: {})",
                self.mode
            )));
        }
        if self.session.is_some() {
            return Err(CouncilError::conflict(
                "teams cannot change while a session exists; stop it first",
            ));
        }
        Ok(())
    }
}
