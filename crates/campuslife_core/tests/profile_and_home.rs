use campuslife_core::db::open_db_in_memory;
use campuslife_core::model::schedule::hhmm;
use campuslife_core::{
    AvatarConfig, AvatarError, AvatarService, AvatarSlot, BudgetCategory, BudgetService,
    HomeService, KvStore, NewClass, NewEvent, ScheduleService, Semester, SqliteKvStore,
    TaskService, TutorialService, User,
};
use chrono::{NaiveDate, Weekday};

#[test]
fn avatar_defaults_to_none_and_persists_valid_options() {
    let conn = open_db_in_memory().unwrap();
    let service = AvatarService::new(SqliteKvStore::new(&conn));

    assert_eq!(service.load_avatar(User::Luna).unwrap(), AvatarConfig::default());

    let updated = service
        .set_option(User::Luna, AvatarSlot::Accessory, "glasses")
        .unwrap();
    assert_eq!(updated.accessory, "glasses");
    assert_eq!(service.load_avatar(User::Luna).unwrap(), updated);
    assert_eq!(service.load_avatar(User::Maria).unwrap(), AvatarConfig::default());
}

#[test]
fn avatar_rejects_unknown_options() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    let service = AvatarService::new(store);

    assert!(matches!(
        service.set_option(User::Reni, AvatarSlot::Outfit, "cape"),
        Err(AvatarError::InvalidOption(_))
    ));
    let broken = AvatarConfig {
        upper_hair: "upper9".to_string(),
        ..AvatarConfig::default()
    };
    assert!(matches!(
        service.save_avatar(User::Reni, &broken),
        Err(AvatarError::InvalidOption(_))
    ));
    assert!(store.get_all_keys().unwrap().is_empty());
}

#[test]
fn tutorial_flag_is_shared_across_sessions() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);

    let mut first = TutorialService::new(store);
    assert!(first.should_show());
    first.skip().unwrap();

    let mut second = TutorialService::new(store);
    assert!(!second.should_show());
    assert_eq!(second.next_step().unwrap(), None);

    second.reset().unwrap();
    assert!(TutorialService::new(store).should_show());
}

#[test]
fn home_summary_collects_every_section() {
    let conn = open_db_in_memory().unwrap();
    let store = SqliteKvStore::new(&conn);
    let wednesday = NaiveDate::from_ymd_opt(2025, 9, 3).unwrap();

    let tasks = TaskService::new(store);
    let done = tasks.add_task(User::Reni, "finish essay").unwrap();
    tasks.add_task(User::Reni, "call home").unwrap();
    tasks.toggle_task(User::Reni, done.id).unwrap();

    let budget = BudgetService::new(store);
    budget
        .set_limit(User::Reni, BudgetCategory::Food, 80.0)
        .unwrap();
    budget
        .add_expense(User::Reni, BudgetCategory::Food, 20.0, "pizza")
        .unwrap();

    let schedule = ScheduleService::new(store);
    schedule
        .add_class(
            User::Reni,
            NewClass {
                name: "Chemistry".to_string(),
                day: Weekday::Wed,
                start_time: hhmm::parse("13:00").unwrap(),
                end_time: hhmm::parse("14:00").unwrap(),
                semester: Semester::parse("Fall 2025").unwrap(),
            },
        )
        .unwrap();
    schedule
        .add_event(
            User::Reni,
            NewEvent {
                name: "Club fair".to_string(),
                date: wednesday.succ_opt().unwrap(),
                start_time: hhmm::parse("17:00").unwrap(),
                end_time: hhmm::parse("19:00").unwrap(),
            },
        )
        .unwrap();

    let summary = HomeService::new(store)
        .home_summary(User::Reni, wednesday)
        .unwrap();
    assert_eq!(summary.task_count, 2);
    assert_eq!(summary.open_task_count, 1);
    assert_eq!(summary.budget_percentage, 25);
    assert_eq!(summary.today_class_count, 1);
    assert_eq!(summary.upcoming.len(), 2);

    let other = HomeService::new(store)
        .home_summary(User::Luna, wednesday)
        .unwrap();
    assert_eq!(other.task_count, 0);
    assert!(other.upcoming.is_empty());
}
