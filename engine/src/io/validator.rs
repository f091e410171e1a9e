//! Tour descriptor validation
//!
//! Checks a loaded [`Tour`] for problems the viewer would trip over: links to
//! unknown states, broken angles, and states nobody can navigate to.

use super::tour::Tour;
use std::collections::{HashMap, HashSet, VecDeque};
use std::f32::consts::PI;
use tracing::debug;

/// Slack allowed on angle ranges for f32 rounding
const ANGLE_TOLERANCE: f32 = 1e-4;

/// Result of validating a tour
#[derive(Debug, Default)]
pub struct TourValidationResult {
    pub is_valid: bool,
    pub errors: Vec<TourIssue>,
    pub warnings: Vec<TourIssue>,
}

/// A single finding, tied to the state it was found on
#[derive(Debug, Clone, PartialEq)]
pub struct TourIssue {
    /// State id, or `None` for tour-level findings
    pub state: Option<String>,
    pub kind: IssueKind,
}

/// Types of findings
#[derive(Debug, Clone, PartialEq)]
pub enum IssueKind {
    UnknownLinkTarget { target: String },
    DuplicateStateId,
    InvalidLinkAngles { target: String, f: f32, o: f32 },
    UnknownFirstState { id: String },
    MissingFirstState,
    DuplicateTitle { title: String },
    UnreachableState,
    EmptyUrl,
}

impl std::fmt::Display for TourIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(state) = &self.state {
            write!(f, "[{state}] ")?;
        }
        match &self.kind {
            IssueKind::UnknownLinkTarget { target } => write!(f, "link to unknown state {target}"),
            IssueKind::DuplicateStateId => write!(f, "state id is used more than once"),
            IssueKind::InvalidLinkAngles { target, f: az, o } => {
                write!(f, "link to {target} has invalid angles f={az} o={o}")
            }
            IssueKind::UnknownFirstState { id } => write!(f, "first state {id} does not exist"),
            IssueKind::MissingFirstState => write!(f, "no first state set"),
            IssueKind::DuplicateTitle { title } => {
                write!(f, "title \"{title}\" is shared with another state")
            }
            IssueKind::UnreachableState => write!(f, "not reachable from the first state"),
            IssueKind::EmptyUrl => write!(f, "no media url"),
        }
    }
}

impl TourIssue {
    fn on_state(state: &str, kind: IssueKind) -> Self {
        Self {
            state: Some(state.to_string()),
            kind,
        }
    }

    fn on_tour(kind: IssueKind) -> Self {
        Self { state: None, kind }
    }
}

/// Validate a tour descriptor
pub fn validate_tour(tour: &Tour) -> TourValidationResult {
    let mut result = TourValidationResult::default();

    let known_ids = check_state_ids(tour, &mut result);
    check_links(tour, &known_ids, &mut result);
    check_first_state(tour, &known_ids, &mut result);
    check_titles(tour, &mut result);
    check_reachability(tour, &known_ids, &mut result);

    debug!(
        errors = result.errors.len(),
        warnings = result.warnings.len(),
        "Validated tour"
    );

    result.is_valid = result.errors.is_empty();
    result
}

fn check_state_ids<'a>(tour: &'a Tour, result: &mut TourValidationResult) -> HashSet<&'a str> {
    let mut known_ids = HashSet::new();
    for state in &tour.states {
        if !known_ids.insert(state.id.as_str()) {
            result
                .errors
                .push(TourIssue::on_state(&state.id, IssueKind::DuplicateStateId));
        }
        if state.url.is_empty() {
            result
                .warnings
                .push(TourIssue::on_state(&state.id, IssueKind::EmptyUrl));
        }
    }
    known_ids
}

fn check_links(tour: &Tour, known_ids: &HashSet<&str>, result: &mut TourValidationResult) {
    for state in &tour.states {
        for link in &state.links {
            if !known_ids.contains(link.id.as_str()) {
                result.errors.push(TourIssue::on_state(
                    &state.id,
                    IssueKind::UnknownLinkTarget {
                        target: link.id.clone(),
                    },
                ));
            }

            let f_valid = link.f.is_finite() && link.f.abs() <= PI + ANGLE_TOLERANCE;
            let o_valid =
                link.o.is_finite() && link.o >= -ANGLE_TOLERANCE && link.o <= PI + ANGLE_TOLERANCE;
            if !f_valid || !o_valid {
                result.errors.push(TourIssue::on_state(
                    &state.id,
                    IssueKind::InvalidLinkAngles {
                        target: link.id.clone(),
                        f: link.f,
                        o: link.o,
                    },
                ));
            }
        }
    }
}

fn check_first_state(tour: &Tour, known_ids: &HashSet<&str>, result: &mut TourValidationResult) {
    if tour.first_state_id.is_empty() {
        result
            .warnings
            .push(TourIssue::on_tour(IssueKind::MissingFirstState));
    } else if !known_ids.contains(tour.first_state_id.as_str()) {
        result.errors.push(TourIssue::on_tour(IssueKind::UnknownFirstState {
            id: tour.first_state_id.clone(),
        }));
    }
}

fn check_titles(tour: &Tour, result: &mut TourValidationResult) {
    let mut seen: HashMap<&str, usize> = HashMap::new();
    for state in &tour.states {
        *seen.entry(state.title.as_str()).or_default() += 1;
    }
    for state in &tour.states {
        if seen.get(state.title.as_str()).copied().unwrap_or(0) > 1 {
            result.warnings.push(TourIssue::on_state(
                &state.id,
                IssueKind::DuplicateTitle {
                    title: state.title.clone(),
                },
            ));
        }
    }
}

/// Breadth-first walk over links starting at the first state
fn check_reachability(tour: &Tour, known_ids: &HashSet<&str>, result: &mut TourValidationResult) {
    if !known_ids.contains(tour.first_state_id.as_str()) {
        return;
    }

    let mut visited: HashSet<&str> = HashSet::new();
    let mut queue = VecDeque::from([tour.first_state_id.as_str()]);
    while let Some(id) = queue.pop_front() {
        if !visited.insert(id) {
            continue;
        }
        if let Some(state) = tour.state(id) {
            queue.extend(state.links.iter().map(|link| link.id.as_str()));
        }
    }

    for state in &tour.states {
        if !visited.contains(state.id.as_str()) {
            result
                .warnings
                .push(TourIssue::on_state(&state.id, IssueKind::UnreachableState));
        }
    }
}
