//! Block allocation policies.
//!
//! Turns "N blocks with policy P" into one or more
//! [`RoomTimeGrid::place_contiguous`] calls, choosing days by fixed
//! preference orders.
//!
//! # Layouts
//!
//! | Policy | Groups | Day choice |
//! |--------|--------|-----------|
//! | `Contiguous` | 1 run | Thu, Tue, Fri, Wed, Mon: first day the run fits |
//! | `GroupsOf2` | 1–5 × 2 blocks | MWF first, Tue/Thu as fallback |
//! | `GroupsOf3` | 1–3 × 3 blocks | Tue/Thu first, MWF with 4-block groups |
//! | `GroupsOf2Or3` | either | the layout whose day family has more slack |
//!
//! # Failure
//! Placement is not transactional. Groups are written one day at a time;
//! when a later group does not fit, the earlier ones stay on the grid and
//! the request is rejected with [`Rejection::Interrupted`]. No rebalancing
//! of existing assignments is attempted.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::{BlockRun, RoomAssignment, RoomTimeGrid};
use crate::models::{AllocationPolicy, Usage, Weekday};

/// Contiguous-run day preference, most preferred first.
const CONTIGUOUS_DAY_ORDER: [Weekday; 5] = [
    Weekday::Thursday,
    Weekday::Tuesday,
    Weekday::Friday,
    Weekday::Wednesday,
    Weekday::Monday,
];

/// Priority of the day left out of a four-day layout.
const EXCLUSION_ORDER: [Weekday; 5] = [
    Weekday::Tuesday,
    Weekday::Thursday,
    Weekday::Friday,
    Weekday::Wednesday,
    Weekday::Monday,
];

/// A request for blocks in one room.
#[derive(Debug, Clone)]
pub struct BlockRequest<'a> {
    pub course_id: &'a str,
    pub usage: Usage,
    /// Seats the resulting section will offer.
    pub seats: u32,
    /// 25-minute blocks needed per week.
    pub blocks: usize,
    pub policy: AllocationPolicy,
}

/// Why a request could not be placed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Rejection {
    /// The request asked for zero blocks.
    EmptyRequest,
    /// The policy cannot lay out this many groups.
    UnsupportedGroupCount {
        policy: AllocationPolicy,
        groups: usize,
    },
    /// No day combination fits; the grid is unchanged.
    NoFittingDay,
    /// Some groups were placed before one did not fit. They stay placed.
    Interrupted { placed: Vec<BlockRun> },
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::EmptyRequest => write!(f, "no blocks requested"),
            Rejection::UnsupportedGroupCount { policy, groups } => {
                write!(f, "{policy} cannot lay out {groups} groups")
            }
            Rejection::NoFittingDay => write!(f, "no fitting day combination"),
            Rejection::Interrupted { placed } => {
                write!(f, "interrupted after {} placed group(s)", placed.len())
            }
        }
    }
}

/// Outcome of an allocation request.
#[derive(Debug, Clone)]
pub enum Placement {
    Placed(RoomAssignment),
    Rejected(Rejection),
}

impl Placement {
    /// The assignment, if placed.
    pub fn assignment(&self) -> Option<&RoomAssignment> {
        match self {
            Placement::Placed(a) => Some(a),
            Placement::Rejected(_) => None,
        }
    }

    #[inline]
    pub fn is_placed(&self) -> bool {
        matches!(self, Placement::Placed(_))
    }
}

/// Concrete layout tried by one attempt.
#[derive(Debug, Clone, Copy)]
enum Layout {
    Run,
    Pairs,
    Triples,
}

impl Layout {
    fn policy(self) -> AllocationPolicy {
        match self {
            Layout::Run => AllocationPolicy::Contiguous,
            Layout::Pairs => AllocationPolicy::GroupsOf2,
            Layout::Triples => AllocationPolicy::GroupsOf3,
        }
    }
}

/// Places a request on a room's grid according to its policy.
///
/// On success the assignment is recorded on the grid and returned.
///
/// # Example
/// ```
/// use u_facility::grid::{allocate, BlockRequest, Placement, RoomTimeGrid};
/// use u_facility::models::{AllocationPolicy, Room, Usage, Weekday};
///
/// let mut grid = RoomTimeGrid::new(&Room::new("R1", 40, 9));
/// let request = BlockRequest {
///     course_id: "HIST-110",
///     usage: Usage::Classroom,
///     seats: 40,
///     blocks: 4,
///     policy: AllocationPolicy::Contiguous,
/// };
/// let placement = allocate(&mut grid, &request);
/// assert_eq!(placement.assignment().unwrap().runs[0].day, Weekday::Thursday);
/// ```
pub fn allocate(grid: &mut RoomTimeGrid, request: &BlockRequest<'_>) -> Placement {
    if request.blocks == 0 {
        return Placement::Rejected(Rejection::EmptyRequest);
    }

    match request.policy {
        AllocationPolicy::Contiguous => attempt(grid, request, Layout::Run),
        AllocationPolicy::GroupsOf2 => attempt(grid, request, Layout::Pairs),
        AllocationPolicy::GroupsOf3 => attempt(grid, request, Layout::Triples),
        AllocationPolicy::GroupsOf2Or3 => {
            let mwf_slack = grid.min_free(&Weekday::MWF);
            let tr_slack = grid.min_free(&Weekday::TR);
            let (first, second) = if mwf_slack > tr_slack {
                (Layout::Pairs, Layout::Triples)
            } else {
                (Layout::Triples, Layout::Pairs)
            };

            match attempt(grid, request, first) {
                placed @ Placement::Placed(_) => placed,
                Placement::Rejected(first_reason) => match attempt(grid, request, second) {
                    placed @ Placement::Placed(_) => placed,
                    // Keep the record of blocks the first layout left behind.
                    Placement::Rejected(second_reason) => match first_reason {
                        Rejection::Interrupted { .. } => Placement::Rejected(first_reason),
                        _ => Placement::Rejected(second_reason),
                    },
                },
            }
        }
    }
}

fn attempt(grid: &mut RoomTimeGrid, request: &BlockRequest<'_>, layout: Layout) -> Placement {
    let id = grid.next_assignment_id();
    let result = match layout {
        Layout::Run => place_run(grid, request.blocks, id),
        Layout::Pairs => place_pairs(grid, request.blocks.div_ceil(2), id),
        Layout::Triples => place_triples(grid, request.blocks.div_ceil(3), id),
    };

    match result {
        Ok(runs) => {
            let assignment = RoomAssignment {
                id,
                room_id: grid.room_id().to_string(),
                course_id: request.course_id.to_string(),
                seats: request.seats,
                usage: request.usage,
                block_count: request.blocks,
                policy: layout.policy(),
                runs,
            };
            log::debug!(
                "placed {} {} in {} as #{} ({})",
                request.course_id,
                request.usage,
                grid.room_id(),
                id,
                assignment.policy
            );
            grid.record(assignment.clone());
            Placement::Placed(assignment)
        }
        Err(reason) => {
            log::debug!(
                "{} {} rejected by {} under {:?}: {}",
                request.course_id,
                request.usage,
                grid.room_id(),
                layout,
                reason
            );
            Placement::Rejected(reason)
        }
    }
}

/// Places one `len`-block group on each day in order, stopping at the
/// first day that refuses.
fn place_on(
    grid: &mut RoomTimeGrid,
    days: &[Weekday],
    len: usize,
    id: u32,
) -> Result<Vec<BlockRun>, Rejection> {
    let mut placed = Vec::with_capacity(days.len());
    for &day in days {
        match grid.place_contiguous(day, len, id) {
            Some(run) => placed.push(run),
            None if placed.is_empty() => return Err(Rejection::NoFittingDay),
            None => return Err(Rejection::Interrupted { placed }),
        }
    }
    Ok(placed)
}

/// Day with the most free blocks (first one wins ties), if it has at least `min`.
fn most_free(grid: &RoomTimeGrid, days: &[Weekday], min: usize) -> Option<Weekday> {
    let best = days
        .iter()
        .copied()
        .reduce(|best, d| if grid.free_blocks(d) > grid.free_blocks(best) { d } else { best })?;
    (grid.free_blocks(best) >= min).then_some(best)
}

/// Day with the fewest free blocks (first one wins ties).
fn least_free(grid: &RoomTimeGrid, days: &[Weekday]) -> Option<Weekday> {
    days.iter()
        .copied()
        .reduce(|best, d| if grid.free_blocks(d) < grid.free_blocks(best) { d } else { best })
}

fn all_have(grid: &RoomTimeGrid, days: &[Weekday], min: usize) -> bool {
    days.iter().all(|&d| grid.free_blocks(d) >= min)
}

fn place_run(grid: &mut RoomTimeGrid, blocks: usize, id: u32) -> Result<Vec<BlockRun>, Rejection> {
    for day in CONTIGUOUS_DAY_ORDER {
        if grid.free_blocks(day) < blocks {
            continue;
        }
        // A blocked period can cut the first free run short; the day stays untouched.
        if let Some(run) = grid.place_contiguous(day, blocks, id) {
            return Ok(vec![run]);
        }
    }
    Err(Rejection::NoFittingDay)
}

fn place_pairs(grid: &mut RoomTimeGrid, groups: usize, id: u32) -> Result<Vec<BlockRun>, Rejection> {
    match groups {
        1 => {
            let day = most_free(grid, &Weekday::MWF, 2)
                .or_else(|| most_free(grid, &Weekday::TR, 2))
                .ok_or(Rejection::NoFittingDay)?;
            place_on(grid, &[day], 2, id)
        }
        2 => {
            let floor = grid.min_free(&Weekday::MWF);
            let roomier: Vec<Weekday> = Weekday::MWF
                .into_iter()
                .filter(|&d| grid.free_blocks(d) > floor)
                .collect();
            if roomier.len() == 2 && all_have(grid, &roomier, 2) {
                return place_on(grid, &roomier, 2, id);
            }

            let open: Vec<Weekday> = Weekday::MWF
                .into_iter()
                .filter(|&d| grid.free_blocks(d) >= 2)
                .take(2)
                .collect();
            if open.len() == 2 {
                return place_on(grid, &open, 2, id);
            }

            if all_have(grid, &Weekday::TR, 2) {
                return place_on(grid, &Weekday::TR, 2, id);
            }
            Err(Rejection::NoFittingDay)
        }
        3 => place_on(grid, &Weekday::MWF, 2, id),
        4 => {
            // Least free first; the exclusion priority breaks ties.
            let mut candidates = EXCLUSION_ORDER;
            candidates.sort_by_key(|&d| grid.free_blocks(d));
            for excluded in candidates {
                let remaining: Vec<Weekday> = Weekday::ALL
                    .into_iter()
                    .filter(|&d| d != excluded)
                    .collect();
                if all_have(grid, &remaining, 2) {
                    return place_on(grid, &remaining, 2, id);
                }
            }
            Err(Rejection::NoFittingDay)
        }
        5 => place_on(grid, &Weekday::ALL, 2, id),
        groups => Err(Rejection::UnsupportedGroupCount {
            policy: AllocationPolicy::GroupsOf2,
            groups,
        }),
    }
}

fn place_triples(grid: &mut RoomTimeGrid, groups: usize, id: u32) -> Result<Vec<BlockRun>, Rejection> {
    match groups {
        1 => {
            let day = most_free(grid, &Weekday::TR, 3)
                .or_else(|| most_free(grid, &Weekday::MWF, 3))
                .ok_or(Rejection::NoFittingDay)?;
            place_on(grid, &[day], 3, id)
        }
        2 => {
            if all_have(grid, &Weekday::TR, 3) {
                return place_on(grid, &Weekday::TR, 3, id);
            }
            // MWF meetings are widened to 4 blocks to stay on the MWF grid.
            let excluded = least_free(grid, &Weekday::MWF).ok_or(Rejection::NoFittingDay)?;
            let pair: Vec<Weekday> = Weekday::MWF
                .into_iter()
                .filter(|&d| d != excluded)
                .collect();
            place_on(grid, &pair, 4, id)
        }
        3 => place_on(grid, &Weekday::MWF, 4, id),
        groups => Err(Rejection::UnsupportedGroupCount {
            policy: AllocationPolicy::GroupsOf3,
            groups,
        }),
    }
}
