//! The attendance cycle state machine.
//!
//! This is the entire business rule of the system, expressed once as a pure
//! function. Storage backends apply it inside their atomic transition unit;
//! transports surface its result. Nothing else re-derives this logic.

use crate::record::AttendanceRecord;

/// The transition chosen for one scan of a stored record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
  /// First scan of the cycle: entry recorded at the given Unix time.
  Entry(i64),
  /// Second scan: exit recorded at the given Unix time.
  Exit(i64),
  /// Both timestamps already set; the record is terminal and unchanged.
  AlreadyComplete,
}

/// Advance `record` one step through its cycle.
///
/// `now` is injected by the caller rather than read from a clock, keeping
/// this function pure. Whether `now` is before `entry_time` is not checked;
/// a paradoxical exit is the caller's clock problem.
pub fn advance(
  mut record: AttendanceRecord,
  now: i64,
) -> (Transition, AttendanceRecord) {
  if record.entry_time == 0 {
    record.entry_time = now;
    (Transition::Entry(now), record)
  } else if record.exit_time == 0 {
    record.exit_time = now;
    (Transition::Exit(now), record)
  } else {
    (Transition::AlreadyComplete, record)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::record::{CycleStage, IdentityToken, PersonDetails};

  fn fresh() -> AttendanceRecord {
    let token: IdentityToken = "c".repeat(64).parse().unwrap();
    AttendanceRecord::fresh(token, PersonDetails::default())
  }

  #[test]
  fn first_scan_records_entry() {
    let (t, rec) = advance(fresh(), 1_000);
    assert_eq!(t, Transition::Entry(1_000));
    assert_eq!(rec.entry_time, 1_000);
    assert_eq!(rec.exit_time, 0);
    assert_eq!(rec.stage(), CycleStage::AwaitingExit);
  }

  #[test]
  fn second_scan_records_exit() {
    let (_, rec) = advance(fresh(), 1_000);
    let (t, rec) = advance(rec, 1_060);
    assert_eq!(t, Transition::Exit(1_060));
    assert_eq!(rec.entry_time, 1_000);
    assert_eq!(rec.exit_time, 1_060);
    assert_eq!(rec.stage(), CycleStage::Completed);
  }

  #[test]
  fn third_scan_is_a_no_op() {
    let (_, rec) = advance(fresh(), 1_000);
    let (_, rec) = advance(rec, 1_060);
    let before = rec.clone();
    let (t, rec) = advance(rec, 2_000);
    assert_eq!(t, Transition::AlreadyComplete);
    assert_eq!(rec, before);
  }

  #[test]
  fn exit_before_entry_is_not_rejected() {
    // Permissive on purpose: no ordering invariant between the two clocks.
    let (_, rec) = advance(fresh(), 1_000);
    let (t, rec) = advance(rec, 900);
    assert_eq!(t, Transition::Exit(900));
    assert_eq!(rec.exit_time, 900);
  }
}
