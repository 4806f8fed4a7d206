//! Cycle State Machine.
//!
//! Pure transition function: given a user's state and an event, computes the
//! next state, the intervals it closes, the activity entry to log and how the
//! user's deadline changes. Nothing is mutated here; the coordinator applies
//! a `Transition` only after its audit output is durable.

use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use super::{
    CycleError, CycleEvent, CycleState, CycleStatus, DeadlineKind, PendingRest, RestInterval,
    WorkInterval,
};
use crate::domain::audit::{
    ActivityAction, ActivityNote, ClosedInterval, SessionRecordStatus, SessionType,
};
use crate::domain::foundation::{Timestamp, UserId};
use crate::domain::zone::{most_stringent, ZoneId, ZonePolicyTable};

/// How rest begins once a work interval completes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RestStart {
    /// Rest starts the moment work completes.
    #[default]
    Automatic,
    /// Work completion parks the user until a `StartRest` event.
    Confirmation,
}

/// What the scheduler must do with the user's deadline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeadlineChange {
    /// Replace whatever is armed with this deadline.
    Arm { kind: DeadlineKind, due: Timestamp },
    Cancel,
    Unchanged,
}

/// Result of a successful `CycleMachine::apply`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub from: CycleStatus,
    pub next: CycleState,
    /// Intervals closed by this transition, in order.
    pub closed_intervals: Vec<ClosedInterval>,
    /// Exactly one entry per transition.
    pub activity: ActivityNote,
    pub deadline: DeadlineChange,
}

/// Applies cycle events against the configured zone table.
#[derive(Debug, Clone)]
pub struct CycleMachine {
    zones: Arc<ZonePolicyTable>,
    rest_start: RestStart,
}

impl CycleMachine {
    pub fn new(zones: Arc<ZonePolicyTable>, rest_start: RestStart) -> Self {
        Self { zones, rest_start }
    }

    pub fn zones(&self) -> &ZonePolicyTable {
        &self.zones
    }

    pub fn rest_start(&self) -> RestStart {
        self.rest_start
    }

    /// Computes the transition for `event` from `state`.
    ///
    /// # Errors
    ///
    /// - `UnknownZone` if `SetZone` names an unconfigured zone
    /// - `InvalidTransition` for `SetZone` while resting or awaiting rest,
    ///   and `StartRest` when no rest is pending
    /// - `StaleDeadline` if a deadline event does not match the armed deadline
    ///
    /// `ManualReset` and `MandatoryRest` apply in every state.
    pub fn apply(&self, state: &CycleState, event: &CycleEvent) -> Result<Transition, CycleError> {
        match event {
            CycleEvent::SetZone { zone, at, .. } => self.set_zone(state, zone, *at),
            CycleEvent::WorkDeadlineReached {
                user_id,
                deadline,
                at,
            } => self.work_deadline(state, *user_id, *deadline, *at),
            CycleEvent::RestDeadlineReached {
                user_id,
                deadline,
                at,
            } => self.rest_deadline(state, *user_id, *deadline, *at),
            CycleEvent::StartRest { at, .. } => self.start_rest(state, *at),
            CycleEvent::ManualReset { reason, at, .. } => {
                Ok(self.reset(state, reason.action(), *at))
            }
            CycleEvent::MandatoryRest { at, .. } => Ok(self.mandatory_rest(state, *at)),
        }
    }

    fn set_zone(
        &self,
        state: &CycleState,
        zone: &ZoneId,
        at: Timestamp,
    ) -> Result<Transition, CycleError> {
        let policy = self.zones.lookup(zone)?;

        match state {
            CycleState::Idle => {
                let ends_at = at.plus(policy.work());
                Ok(Transition {
                    from: state.status(),
                    next: CycleState::Working(WorkInterval {
                        current_zone: zone.clone(),
                        most_stringent_zone: zone.clone(),
                        started_at: at,
                        ends_at,
                    }),
                    closed_intervals: Vec::new(),
                    activity: ActivityNote::new(
                        ActivityAction::StartWork,
                        Some(zone.clone()),
                        format!(
                            "Started work in {} zone, work limit {}",
                            zone,
                            duration_label(policy.work())
                        ),
                    ),
                    deadline: DeadlineChange::Arm {
                        kind: DeadlineKind::Work,
                        due: ends_at,
                    },
                })
            }
            CycleState::Working(work) => {
                let governing =
                    most_stringent(&self.zones, Some(&work.most_stringent_zone), zone)?;
                let escalated = governing != work.most_stringent_zone;

                let (ends_at, deadline) = if escalated {
                    let ends_at = work.started_at.plus(self.zones.lookup(&governing)?.work());
                    (
                        ends_at,
                        DeadlineChange::Arm {
                            kind: DeadlineKind::Work,
                            due: ends_at,
                        },
                    )
                } else {
                    (work.ends_at, DeadlineChange::Unchanged)
                };

                let details = if escalated {
                    format!(
                        "Zone changed from {} to {}, most stringent now {}, work ends {}",
                        work.current_zone,
                        zone,
                        governing,
                        ends_at.time_of_day()
                    )
                } else {
                    format!(
                        "Zone changed from {} to {}, most stringent remains {}",
                        work.current_zone, zone, governing
                    )
                };

                Ok(Transition {
                    from: state.status(),
                    next: CycleState::Working(WorkInterval {
                        current_zone: zone.clone(),
                        most_stringent_zone: governing,
                        started_at: work.started_at,
                        ends_at,
                    }),
                    closed_intervals: Vec::new(),
                    activity: ActivityNote::new(ActivityAction::ZoneChanged, Some(zone.clone()), details),
                    deadline,
                })
            }
            CycleState::AwaitingRest(_) | CycleState::Resting(_) => {
                Err(CycleError::invalid_transition(state.status(), "set_zone"))
            }
        }
    }

    fn work_deadline(
        &self,
        state: &CycleState,
        user_id: UserId,
        deadline: Timestamp,
        at: Timestamp,
    ) -> Result<Transition, CycleError> {
        let work = match state {
            CycleState::Working(work) if work.ends_at == deadline => work,
            _ => {
                return Err(CycleError::StaleDeadline {
                    user_id,
                    kind: DeadlineKind::Work,
                    deadline,
                })
            }
        };

        let governing = work.most_stringent_zone.clone();
        let rest = self.zones.lookup(&governing)?.rest();
        let closed = ClosedInterval {
            session_type: SessionType::Work,
            zone: governing.clone(),
            started_at: work.started_at,
            ended_at: at,
            status: SessionRecordStatus::Completed,
        };

        let transition = match self.rest_start {
            RestStart::Automatic => {
                let ends_at = at.plus(rest);
                Transition {
                    from: state.status(),
                    next: CycleState::Resting(RestInterval {
                        zone: governing.clone(),
                        last_zone: work.current_zone.clone(),
                        started_at: at,
                        ends_at,
                    }),
                    closed_intervals: vec![closed],
                    activity: ActivityNote::new(
                        ActivityAction::CompletedWork,
                        Some(governing.clone()),
                        format!(
                            "Completed work, resting {} for most stringent zone {}",
                            duration_label(rest),
                            governing
                        ),
                    ),
                    deadline: DeadlineChange::Arm {
                        kind: DeadlineKind::Rest,
                        due: ends_at,
                    },
                }
            }
            RestStart::Confirmation => Transition {
                from: state.status(),
                next: CycleState::AwaitingRest(PendingRest {
                    zone: governing.clone(),
                    last_zone: work.current_zone.clone(),
                    work_ended_at: at,
                }),
                closed_intervals: vec![closed],
                activity: ActivityNote::new(
                    ActivityAction::CompletedWork,
                    Some(governing.clone()),
                    format!(
                        "Completed work, {} rest pending for most stringent zone {}",
                        duration_label(rest),
                        governing
                    ),
                ),
                deadline: DeadlineChange::Cancel,
            },
        };

        Ok(transition)
    }

    fn rest_deadline(
        &self,
        state: &CycleState,
        user_id: UserId,
        deadline: Timestamp,
        at: Timestamp,
    ) -> Result<Transition, CycleError> {
        let rest = match state {
            CycleState::Resting(rest) if rest.ends_at == deadline => rest,
            _ => {
                return Err(CycleError::StaleDeadline {
                    user_id,
                    kind: DeadlineKind::Rest,
                    deadline,
                })
            }
        };

        Ok(Transition {
            from: state.status(),
            next: CycleState::Idle,
            closed_intervals: vec![ClosedInterval {
                session_type: SessionType::Rest,
                zone: rest.zone.clone(),
                started_at: rest.started_at,
                ended_at: at,
                status: SessionRecordStatus::Completed,
            }],
            activity: ActivityNote::new(
                ActivityAction::CompletedRest,
                Some(rest.zone.clone()),
                format!(
                    "Completed {} rest for zone {}",
                    duration_label(rest.ends_at.duration_since(&rest.started_at)),
                    rest.zone
                ),
            ),
            deadline: DeadlineChange::Cancel,
        })
    }

    fn start_rest(&self, state: &CycleState, at: Timestamp) -> Result<Transition, CycleError> {
        let pending = match state {
            CycleState::AwaitingRest(pending) => pending,
            _ => return Err(CycleError::invalid_transition(state.status(), "start_rest")),
        };

        let rest = self.zones.lookup(&pending.zone)?.rest();
        let ends_at = at.plus(rest);

        Ok(Transition {
            from: state.status(),
            next: CycleState::Resting(RestInterval {
                zone: pending.zone.clone(),
                last_zone: pending.last_zone.clone(),
                started_at: at,
                ends_at,
            }),
            closed_intervals: Vec::new(),
            activity: ActivityNote::new(
                ActivityAction::StartRest,
                Some(pending.zone.clone()),
                format!(
                    "Started {} rest for most stringent zone {}",
                    duration_label(rest),
                    pending.zone
                ),
            ),
            deadline: DeadlineChange::Arm {
                kind: DeadlineKind::Rest,
                due: ends_at,
            },
        })
    }

    fn reset(&self, state: &CycleState, action: ActivityAction, at: Timestamp) -> Transition {
        let interrupted = interrupted_interval(state, at);

        let details = match &interrupted {
            Some(interval) => format!(
                "Cycle reset, {} interval interrupted after {}",
                interval.session_type,
                duration_label(at.duration_since(&interval.started_at))
            ),
            None => "Cycle reset with no interval in progress".to_string(),
        };

        Transition {
            from: state.status(),
            next: CycleState::Idle,
            closed_intervals: interrupted.into_iter().collect(),
            activity: ActivityNote::new(action, state.most_stringent_zone().cloned(), details),
            deadline: DeadlineChange::Cancel,
        }
    }

    /// Any state rests for the strictest zone's rest duration. An open
    /// interval is recorded as interrupted first.
    fn mandatory_rest(&self, state: &CycleState, at: Timestamp) -> Transition {
        let strictest = self.zones.strictest();
        let zone = strictest.zone().clone();
        let rest = strictest.rest();
        let ends_at = at.plus(rest);

        Transition {
            from: state.status(),
            next: CycleState::Resting(RestInterval {
                zone: zone.clone(),
                last_zone: state.current_zone().cloned().unwrap_or_else(|| zone.clone()),
                started_at: at,
                ends_at,
            }),
            closed_intervals: interrupted_interval(state, at).into_iter().collect(),
            activity: ActivityNote::new(
                ActivityAction::MandatoryRest,
                Some(zone.clone()),
                format!(
                    "Cut-off lifted, mandatory {} rest for zone {}",
                    duration_label(rest),
                    zone
                ),
            ),
            deadline: DeadlineChange::Arm {
                kind: DeadlineKind::Rest,
                due: ends_at,
            },
        }
    }
}

/// The open interval of `state`, closed at `at` as interrupted.
fn interrupted_interval(state: &CycleState, at: Timestamp) -> Option<ClosedInterval> {
    match state {
        CycleState::Working(work) => Some(ClosedInterval {
            session_type: SessionType::Work,
            zone: work.most_stringent_zone.clone(),
            started_at: work.started_at,
            ended_at: at,
            status: SessionRecordStatus::Interrupted,
        }),
        CycleState::Resting(rest) => Some(ClosedInterval {
            session_type: SessionType::Rest,
            zone: rest.zone.clone(),
            started_at: rest.started_at,
            ended_at: at,
            status: SessionRecordStatus::Interrupted,
        }),
        CycleState::Idle | CycleState::AwaitingRest(_) => None,
    }
}

/// "15 min" for whole minutes, "7 s" otherwise.
fn duration_label(duration: Duration) -> String {
    let secs = duration.num_seconds().max(0);
    if secs % 60 == 0 {
        format!("{} min", secs / 60)
    } else {
        format!("{} s", secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::cycle::ResetReason;
    use crate::domain::zone::ZoneSpec;

    fn machine(rest_start: RestStart) -> CycleMachine {
        let zones = ZonePolicyTable::new(ZonePolicyTable::heat_zone_specs()).unwrap();
        CycleMachine::new(Arc::new(zones), rest_start)
    }

    fn zone(name: &str) -> ZoneId {
        ZoneId::new(name).unwrap()
    }

    fn t(secs: i64) -> Timestamp {
        Timestamp::from_unix_secs(1_700_000_000 + secs)
    }

    fn set_zone(user: UserId, name: &str, at: Timestamp) -> CycleEvent {
        CycleEvent::SetZone {
            user_id: user,
            zone: zone(name),
            at,
        }
    }

    /// Applies an event and returns the next state.
    fn step(m: &CycleMachine, state: &CycleState, event: CycleEvent) -> CycleState {
        m.apply(state, &event).unwrap().next
    }

    fn work_of(state: &CycleState) -> &WorkInterval {
        match state {
            CycleState::Working(work) => work,
            other => panic!("expected working, got {:?}", other),
        }
    }

    // ════════════════════════════════════════════════════════════════════════
    // SetZone
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn idle_set_zone_starts_work_and_arms_deadline() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();

        let tr = m.apply(&CycleState::Idle, &set_zone(user, "white", t(0))).unwrap();

        let work = work_of(&tr.next);
        assert_eq!(work.current_zone, zone("white"));
        assert_eq!(work.most_stringent_zone, zone("white"));
        assert_eq!(work.ends_at, t(60 * 60));
        assert_eq!(
            tr.deadline,
            DeadlineChange::Arm {
                kind: DeadlineKind::Work,
                due: t(3600)
            }
        );
        assert_eq!(tr.activity.action, ActivityAction::StartWork);
        assert!(tr.closed_intervals.is_empty());
    }

    #[test]
    fn escalation_recomputes_end_from_interval_start() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "white", t(0)));

        let tr = m.apply(&state, &set_zone(user, "black", t(300))).unwrap();

        let work = work_of(&tr.next);
        assert_eq!(work.most_stringent_zone, zone("black"));
        assert_eq!(work.started_at, t(0));
        assert_eq!(work.ends_at, t(15 * 60));
        assert_eq!(
            tr.deadline,
            DeadlineChange::Arm {
                kind: DeadlineKind::Work,
                due: t(900)
            }
        );
        assert_eq!(tr.activity.action, ActivityAction::ZoneChanged);
    }

    #[test]
    fn de_escalation_keeps_governing_zone_and_deadline() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "red", t(0)));

        let tr = m.apply(&state, &set_zone(user, "white", t(60))).unwrap();

        let work = work_of(&tr.next);
        assert_eq!(work.current_zone, zone("white"));
        assert_eq!(work.most_stringent_zone, zone("red"));
        assert_eq!(work.ends_at, t(30 * 60));
        assert_eq!(tr.deadline, DeadlineChange::Unchanged);
        assert_eq!(tr.activity.action, ActivityAction::ZoneChanged);
    }

    #[test]
    fn unknown_zone_is_rejected_in_every_state() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let working = step(&m, &CycleState::Idle, set_zone(user, "green", t(0)));

        for state in [CycleState::Idle, working] {
            let err = m.apply(&state, &set_zone(user, "purple", t(10))).unwrap_err();
            assert_eq!(err, CycleError::UnknownZone("purple".to_string()));
        }
    }

    #[test]
    fn set_zone_while_resting_is_invalid() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "black", t(0)));
        let state = step(
            &m,
            &state,
            CycleEvent::WorkDeadlineReached {
                user_id: user,
                deadline: t(900),
                at: t(900),
            },
        );
        assert_eq!(state.status(), CycleStatus::Resting);

        let err = m.apply(&state, &set_zone(user, "white", t(901))).unwrap_err();
        assert_eq!(
            err,
            CycleError::invalid_transition(CycleStatus::Resting, "set_zone")
        );
    }

    // ════════════════════════════════════════════════════════════════════════
    // Deadlines
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn white_green_black_white_rests_for_black() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let mut state = CycleState::Idle;
        for (i, name) in ["white", "green", "black", "white"].iter().enumerate() {
            state = step(&m, &state, set_zone(user, name, t(i as i64 * 60)));
        }
        assert_eq!(work_of(&state).most_stringent_zone, zone("black"));

        let tr = m
            .apply(
                &state,
                &CycleEvent::WorkDeadlineReached {
                    user_id: user,
                    deadline: t(900),
                    at: t(900),
                },
            )
            .unwrap();

        match &tr.next {
            CycleState::Resting(rest) => {
                assert_eq!(rest.zone, zone("black"));
                assert_eq!(rest.last_zone, zone("white"));
                assert_eq!(rest.ends_at.duration_since(&rest.started_at), Duration::minutes(30));
            }
            other => panic!("expected resting, got {:?}", other),
        }
        assert_eq!(tr.closed_intervals.len(), 1);
        assert_eq!(tr.closed_intervals[0].zone, zone("black"));
        assert_eq!(tr.closed_intervals[0].status, SessionRecordStatus::Completed);
        assert!(tr.activity.details.contains("30 min"));
    }

    #[test]
    fn superseded_work_deadline_is_stale() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "white", t(0)));
        let state = step(&m, &state, set_zone(user, "black", t(60)));

        let err = m
            .apply(
                &state,
                &CycleEvent::WorkDeadlineReached {
                    user_id: user,
                    deadline: t(3600),
                    at: t(3600),
                },
            )
            .unwrap_err();

        assert!(err.is_stale());
    }

    #[test]
    fn deadline_after_reset_is_stale() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();

        let err = m
            .apply(
                &CycleState::Idle,
                &CycleEvent::RestDeadlineReached {
                    user_id: user,
                    deadline: t(100),
                    at: t(100),
                },
            )
            .unwrap_err();

        assert_eq!(
            err,
            CycleError::StaleDeadline {
                user_id: user,
                kind: DeadlineKind::Rest,
                deadline: t(100)
            }
        );
    }

    #[test]
    fn round_trip_white_produces_two_completed_intervals() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let mut intervals = Vec::new();

        let tr = m.apply(&CycleState::Idle, &set_zone(user, "white", t(0))).unwrap();
        let tr = m
            .apply(
                &tr.next,
                &CycleEvent::WorkDeadlineReached {
                    user_id: user,
                    deadline: t(3600),
                    at: t(3600),
                },
            )
            .unwrap();
        intervals.extend(tr.closed_intervals.clone());
        assert_eq!(
            tr.deadline,
            DeadlineChange::Arm {
                kind: DeadlineKind::Rest,
                due: t(3600 + 15 * 60)
            }
        );

        let tr = m
            .apply(
                &tr.next,
                &CycleEvent::RestDeadlineReached {
                    user_id: user,
                    deadline: t(4500),
                    at: t(4500),
                },
            )
            .unwrap();
        intervals.extend(tr.closed_intervals.clone());

        assert!(tr.next.is_idle());
        assert_eq!(tr.activity.action, ActivityAction::CompletedRest);
        assert_eq!(intervals.len(), 2);
        assert_eq!(intervals[0].session_type, SessionType::Work);
        assert_eq!(intervals[1].session_type, SessionType::Rest);
        assert!(intervals
            .iter()
            .all(|i| i.status == SessionRecordStatus::Completed));
    }

    #[test]
    fn fractional_work_minutes_resolve_to_seconds() {
        let zones = ZonePolicyTable::new(vec![ZoneSpec::new("test", 7.0 / 60.0, 1, 6)]).unwrap();
        let m = CycleMachine::new(Arc::new(zones), RestStart::Automatic);
        let user = UserId::new();

        let tr = m.apply(&CycleState::Idle, &set_zone(user, "test", t(0))).unwrap();

        assert_eq!(work_of(&tr.next).ends_at, t(7));
        assert!(tr.activity.details.contains("7 s"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // Confirmation mode
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn confirmation_mode_parks_user_until_start_rest() {
        let m = machine(RestStart::Confirmation);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "red", t(0)));

        let tr = m
            .apply(
                &state,
                &CycleEvent::WorkDeadlineReached {
                    user_id: user,
                    deadline: t(1800),
                    at: t(1800),
                },
            )
            .unwrap();
        assert!(matches!(tr.next, CycleState::AwaitingRest(_)));
        assert_eq!(tr.next.status(), CycleStatus::Idle);
        assert_eq!(tr.deadline, DeadlineChange::Cancel);
        assert_eq!(tr.closed_intervals.len(), 1);

        let err = m.apply(&tr.next, &set_zone(user, "white", t(1810))).unwrap_err();
        assert!(matches!(err, CycleError::InvalidTransition { .. }));

        let tr = m
            .apply(
                &tr.next,
                &CycleEvent::StartRest {
                    user_id: user,
                    at: t(1900),
                },
            )
            .unwrap();
        assert_eq!(tr.activity.action, ActivityAction::StartRest);
        assert_eq!(
            tr.deadline,
            DeadlineChange::Arm {
                kind: DeadlineKind::Rest,
                due: t(1900 + 30 * 60)
            }
        );
    }

    #[test]
    fn start_rest_without_pending_rest_is_invalid() {
        let m = machine(RestStart::Confirmation);
        let err = m
            .apply(
                &CycleState::Idle,
                &CycleEvent::StartRest {
                    user_id: UserId::new(),
                    at: t(0),
                },
            )
            .unwrap_err();
        assert_eq!(err, CycleError::invalid_transition(CycleStatus::Idle, "start_rest"));
    }

    // ════════════════════════════════════════════════════════════════════════
    // ManualReset
    // ════════════════════════════════════════════════════════════════════════

    fn reset(user: UserId, at: Timestamp) -> CycleEvent {
        CycleEvent::ManualReset {
            user_id: user,
            reason: ResetReason::Stopped,
            at,
        }
    }

    #[test]
    fn reset_while_working_interrupts_work() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "yellow", t(0)));

        let tr = m.apply(&state, &reset(user, t(120))).unwrap();

        assert!(tr.next.is_idle());
        assert_eq!(tr.deadline, DeadlineChange::Cancel);
        assert_eq!(tr.closed_intervals.len(), 1);
        assert_eq!(tr.closed_intervals[0].status, SessionRecordStatus::Interrupted);
        assert_eq!(tr.closed_intervals[0].ended_at, t(120));
        assert_eq!(tr.activity.action, ActivityAction::EarlyCompletion);
    }

    #[test]
    fn reset_while_resting_interrupts_rest() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "black", t(0)));
        let state = step(
            &m,
            &state,
            CycleEvent::WorkDeadlineReached {
                user_id: user,
                deadline: t(900),
                at: t(900),
            },
        );

        let tr = m.apply(&state, &reset(user, t(1000))).unwrap();

        assert_eq!(tr.closed_intervals.len(), 1);
        assert_eq!(tr.closed_intervals[0].session_type, SessionType::Rest);
        assert_eq!(tr.closed_intervals[0].status, SessionRecordStatus::Interrupted);
    }

    #[test]
    fn reset_while_idle_closes_nothing_but_still_logs() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();

        let tr = m
            .apply(
                &CycleState::Idle,
                &CycleEvent::ManualReset {
                    user_id: user,
                    reason: ResetReason::RemovedFromConduct,
                    at: t(0),
                },
            )
            .unwrap();

        assert!(tr.next.is_idle());
        assert!(tr.closed_intervals.is_empty());
        assert_eq!(tr.activity.action, ActivityAction::UserRemoved);
    }

    #[test]
    fn reset_while_awaiting_rest_closes_nothing() {
        let m = machine(RestStart::Confirmation);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "green", t(0)));
        let state = step(
            &m,
            &state,
            CycleEvent::WorkDeadlineReached {
                user_id: user,
                deadline: t(2700),
                at: t(2700),
            },
        );

        let tr = m.apply(&state, &reset(user, t(2800))).unwrap();

        assert!(tr.next.is_idle());
        assert!(tr.closed_intervals.is_empty());
    }

    // ════════════════════════════════════════════════════════════════════════
    // MandatoryRest
    // ════════════════════════════════════════════════════════════════════════

    #[test]
    fn mandatory_rest_from_idle_uses_strictest_zone() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();

        let tr = m
            .apply(&CycleState::Idle, &CycleEvent::MandatoryRest { user_id: user, at: t(0) })
            .unwrap();

        match &tr.next {
            CycleState::Resting(rest) => {
                assert_eq!(rest.zone, zone("cut-off"));
                assert_eq!(rest.ends_at, t(30 * 60));
            }
            other => panic!("expected resting, got {:?}", other),
        }
        assert!(tr.closed_intervals.is_empty());
        assert_eq!(tr.activity.action, ActivityAction::MandatoryRest);
        assert_eq!(
            tr.deadline,
            DeadlineChange::Arm {
                kind: DeadlineKind::Rest,
                due: t(1800)
            }
        );
    }

    #[test]
    fn mandatory_rest_interrupts_running_work() {
        let m = machine(RestStart::Automatic);
        let user = UserId::new();
        let state = step(&m, &CycleState::Idle, set_zone(user, "green", t(0)));

        let tr = m
            .apply(&state, &CycleEvent::MandatoryRest { user_id: user, at: t(600) })
            .unwrap();

        assert_eq!(tr.next.status(), CycleStatus::Resting);
        assert_eq!(tr.next.current_zone(), Some(&zone("green")));
        assert_eq!(tr.closed_intervals.len(), 1);
        assert_eq!(tr.closed_intervals[0].status, SessionRecordStatus::Interrupted);
        assert_eq!(tr.closed_intervals[0].ended_at, t(600));
    }

    #[test]
    fn duration_label_prefers_minutes() {
        assert_eq!(duration_label(Duration::minutes(30)), "30 min");
        assert_eq!(duration_label(Duration::seconds(7)), "7 s");
    }
}
