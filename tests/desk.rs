#![forbid(unsafe_code)]
use chrono::{DateTime, Duration, NaiveDate, TimeZone, Utc};
use permanence::{
    AllocateMode, Allocator, Board, Caller, Desk, DeskError, Directory, JsonStorage, LockReason,
    Phase, Reporter, ReporterId, Settings, Shift, ShiftCatalog, ShiftId, Storage,
};
use std::fs;
use tempfile::{tempdir, TempDir};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 12, 1, 9, 0, 0).unwrap()
}

fn reporter(name: &str, is_manager: bool) -> Reporter {
    Reporter {
        name: name.into(),
        is_manager,
        password: "not-a-real-hash".into(),
        email: String::new(),
    }
}

fn setup() -> (TempDir, Desk<JsonStorage>) {
    let dir = tempdir().unwrap();
    let storage = JsonStorage::open(dir.path()).unwrap();

    let mut directory = Directory::new();
    directory.insert(ReporterId::new("admin"), reporter("Admin", true));
    directory.insert(ReporterId::new("alice"), reporter("Alice", false));
    directory.insert(ReporterId::new("bob"), reporter("Bob", false));

    let board = Board {
        settings: Settings {
            deadline: now() + Duration::days(7),
            is_locked: false,
        },
        ..Board::default()
    };
    storage.init(&directory, &board).unwrap();

    let date = NaiveDate::from_ymd_opt(2025, 12, 25).unwrap();
    let catalog = ShiftCatalog::new(vec![
        Shift::new("Christmas", date, "7am-3pm", 1)
            .unwrap()
            .with_id(ShiftId::new("x")),
        Shift::new("Christmas", date, "3pm-11pm", 2)
            .unwrap()
            .with_id(ShiftId::new("y")),
    ]);
    storage.save_catalog(&catalog).unwrap();

    (dir, Desk::new(storage))
}

fn ids(raw: &[&str]) -> Vec<ShiftId> {
    raw.iter().map(ShiftId::new).collect()
}

#[test]
fn allocation_locks_submissions() {
    let (_dir, desk) = setup();
    let admin = Caller::manager("admin");
    let alice = Caller::reporter("alice");

    desk.submit_interest(&alice, ids(&["x", "y"]), now()).unwrap();
    assert_eq!(desk.phase(now()).unwrap(), Phase::Open);

    let allocation = desk
        .allocate(&admin, AllocateMode::Fresh, &mut Allocator::seeded(5))
        .unwrap();
    assert!(allocation.assignments.contains_key(&alice.id));
    assert_eq!(
        desk.phase(now()).unwrap(),
        Phase::Locked(LockReason::Allocated)
    );

    let err = desk.submit_interest(&alice, ids(&["x"]), now()).unwrap_err();
    assert!(matches!(err, DeskError::Locked(LockReason::Allocated)));

    // le manager garde la main
    desk.submit_interest(&admin, ids(&["y"]), now()).unwrap();

    let board = desk.storage().load_board().unwrap();
    assert_eq!(board.assignments, allocation.assignments);
    assert!(board.settings.is_locked);
}

#[test]
fn deadline_closes_submissions_for_reporters() {
    let (_dir, desk) = setup();
    let late = now() + Duration::days(8);

    let err = desk
        .submit_interest(&Caller::reporter("bob"), ids(&["x"]), late)
        .unwrap_err();
    assert!(matches!(err, DeskError::Locked(LockReason::DeadlinePassed)));
    assert!(desk.storage().load_board().unwrap().signups.is_empty());

    desk.submit_interest(&Caller::manager("admin"), ids(&["x"]), late)
        .unwrap();
}

#[test]
fn manager_only_operations() {
    let (_dir, desk) = setup();
    let bob = Caller::reporter("bob");

    let err = desk
        .allocate(&bob, AllocateMode::Fresh, &mut Allocator::seeded(0))
        .unwrap_err();
    assert!(matches!(err, DeskError::Unauthorized));

    let err = desk.reset(&bob, "RESET").unwrap_err();
    assert!(matches!(err, DeskError::Unauthorized));

    let err = desk.set_deadline(&bob, now()).unwrap_err();
    assert!(matches!(err, DeskError::Unauthorized));

    let err = desk.manager_summary(&bob, now()).unwrap_err();
    assert!(matches!(err, DeskError::Unauthorized));

    assert!(!desk.storage().load_board().unwrap().settings.is_locked);
}

#[test]
fn reset_reopens_the_campaign() {
    let (_dir, desk) = setup();
    let admin = Caller::manager("admin");
    let alice = Caller::reporter("alice");

    desk.submit_interest(&alice, ids(&["x"]), now()).unwrap();
    desk.allocate(&admin, AllocateMode::Fresh, &mut Allocator::seeded(1))
        .unwrap();
    assert!(desk.submit_interest(&alice, ids(&["y"]), now()).is_err());

    let err = desk.reset(&admin, "reset").unwrap_err();
    assert!(matches!(err, DeskError::InvalidConfirmation));
    assert!(desk.storage().load_board().unwrap().settings.is_locked);

    desk.reset(&admin, "RESET").unwrap();
    let board = desk.storage().load_board().unwrap();
    assert!(board.assignments.is_empty());
    assert!(board.signups.is_empty());
    assert!(!board.settings.is_locked);

    desk.submit_interest(&alice, ids(&["y"]), now()).unwrap();
}

#[test]
fn reallocation_requires_explicit_reroll() {
    let (_dir, desk) = setup();
    let admin = Caller::manager("admin");
    desk.submit_interest(&Caller::reporter("alice"), ids(&["x"]), now())
        .unwrap();
    desk.submit_interest(&Caller::reporter("bob"), ids(&["x"]), now())
        .unwrap();

    desk.allocate(&admin, AllocateMode::Fresh, &mut Allocator::seeded(1))
        .unwrap();
    let err = desk
        .allocate(&admin, AllocateMode::Fresh, &mut Allocator::seeded(2))
        .unwrap_err();
    assert!(matches!(err, DeskError::AlreadyAllocated));

    let rerolled = desk
        .allocate(&admin, AllocateMode::Reroll, &mut Allocator::seeded(2))
        .unwrap();
    assert_eq!(rerolled.assignments.len(), 1);
    assert_eq!(
        desk.storage().load_board().unwrap().assignments,
        rerolled.assignments
    );
}

#[test]
fn unknown_shift_is_rejected() {
    let (_dir, desk) = setup();
    let err = desk
        .submit_interest(&Caller::reporter("alice"), ids(&["x", "ghost"]), now())
        .unwrap_err();
    assert!(matches!(err, DeskError::UnknownShift(ref id) if id == "ghost"));
}

#[test]
fn unreadable_catalog_leaves_state_untouched() {
    let (dir, desk) = setup();
    desk.submit_interest(&Caller::reporter("alice"), ids(&["x"]), now())
        .unwrap();
    let before = desk.storage().load_board().unwrap();

    fs::write(dir.path().join("holidays.json"), "{ not json").unwrap();
    let err = desk
        .allocate(
            &Caller::manager("admin"),
            AllocateMode::Fresh,
            &mut Allocator::seeded(0),
        )
        .unwrap_err();
    assert!(matches!(err, DeskError::Other(_)));
    assert_eq!(desk.storage().load_board().unwrap(), before);
}

#[test]
fn signups_visibility_follows_role() {
    let (_dir, desk) = setup();
    let alice = Caller::reporter("alice");
    desk.submit_interest(&alice, ids(&["x"]), now()).unwrap();
    desk.submit_interest(&Caller::reporter("bob"), ids(&["y"]), now())
        .unwrap();

    let own = desk.signups(&alice).unwrap();
    assert_eq!(own.len(), 1);
    assert_eq!(own[&alice.id], ids(&["x"]));

    let all = desk.signups(&Caller::manager("admin")).unwrap();
    assert_eq!(all.len(), 2);
}

#[test]
fn dashboards_reflect_the_board() {
    let (_dir, desk) = setup();
    let admin = Caller::manager("admin");
    let alice = Caller::reporter("alice");
    desk.submit_interest(&alice, ids(&["y"]), now()).unwrap();
    desk.submit_interest(&Caller::reporter("bob"), Vec::new(), now())
        .unwrap();

    let summary = desk.manager_summary(&admin, now()).unwrap();
    assert_eq!(summary.submitted_count, 1);
    assert_eq!(summary.total_reporters, 2);
    let y = summary
        .shifts
        .iter()
        .find(|s| s.shift.id.as_str() == "y")
        .unwrap();
    assert_eq!(y.interested, 1);
    assert_eq!(y.filled, 0);
    assert_eq!(y.vacancies(), 2);

    desk.allocate(&admin, AllocateMode::Fresh, &mut Allocator::seeded(3))
        .unwrap();
    let view = desk.reporter_view(&alice, now()).unwrap();
    assert!(view.is_locked);
    assert_eq!(view.interests, ids(&["y"]));
    assert_eq!(view.assignment.map(|s| s.id), Some(ShiftId::new("y")));

    let summary = desk.manager_summary(&admin, now()).unwrap();
    assert_eq!(summary.phase, Phase::Locked(LockReason::Allocated));
    let y = summary
        .shifts
        .iter()
        .find(|s| s.shift.id.as_str() == "y")
        .unwrap();
    assert_eq!(y.filled, 1);
}

#[test]
fn deadline_can_be_moved() {
    let (_dir, desk) = setup();
    let admin = Caller::manager("admin");
    desk.set_deadline(&admin, now() - Duration::hours(1)).unwrap();
    assert_eq!(
        desk.phase(now()).unwrap(),
        Phase::Locked(LockReason::DeadlinePassed)
    );
}

#[test]
fn unreadable_board_aborts_without_writing() {
    let (dir, desk) = setup();
    let admin = Caller::manager("admin");
    let board_path = dir.path().join("board.json");
    fs::write(&board_path, "{ not json").unwrap();

    let err = desk
        .allocate(&admin, AllocateMode::Fresh, &mut Allocator::seeded(0))
        .unwrap_err();
    assert!(matches!(err, DeskError::Other(_)));

    let err = desk.reset(&admin, "RESET").unwrap_err();
    assert!(matches!(err, DeskError::Other(_)));

    let err = desk
        .submit_interest(&Caller::reporter("alice"), ids(&["x"]), now())
        .unwrap_err();
    assert!(matches!(err, DeskError::Other(_)));

    assert_eq!(fs::read(&board_path).unwrap(), b"{ not json");
}
