use chrono::{Datelike, NaiveDate, NaiveTime, Weekday};
use uuid::Uuid;

use caption_forge::{
    monday_of, week_days, week_view, ItemStatus, NewItem, Platform, PlannerStore, QuotaConfig,
    Session, Tier,
};

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).unwrap()
}

fn time(hour: u32, minute: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(hour, minute, 0).unwrap()
}

fn new_item(item_date: NaiveDate, item_time: NaiveTime, title: &str) -> NewItem {
    NewItem {
        date: item_date,
        time: item_time,
        platform: Platform::Instagram,
        title: title.to_string(),
        caption: "caption".to_string(),
        hashtags: vec!["#launch".to_string()],
        score: 8.2,
    }
}

#[test]
fn added_item_starts_planned() {
    let mut store = PlannerStore::new();
    let item = store.add(new_item(date(2024, 3, 4), time(18, 0), "Launch Post"));

    assert_eq!(item.status, ItemStatus::Planned);
    assert_eq!(item.title, "Launch Post");
    assert!((item.score - 8.2).abs() < 1e-9);

    let fetched = store.get(item.id).unwrap();
    assert_eq!(fetched.id, item.id);
}

#[test]
fn add_normalizes_hashtags_and_clamps_score() {
    let mut store = PlannerStore::new();
    let mut item = new_item(date(2024, 3, 4), time(9, 0), "Promo");
    item.hashtags = vec![
        "launch".to_string(),
        "#growth".to_string(),
        " ##sale ".to_string(),
        "   ".to_string(),
    ];
    item.score = 14.0;

    let stored = store.add(item);

    assert_eq!(stored.hashtags, vec!["#launch", "#growth", "#sale"]);
    assert!((stored.score - 10.0).abs() < 1e-9);
}

#[test]
fn list_for_day_sorts_by_time() {
    let mut store = PlannerStore::new();
    let day = date(2024, 3, 4);
    store.add(new_item(day, time(18, 0), "evening"));
    store.add(new_item(day, time(9, 30), "morning"));
    store.add(new_item(day, time(12, 0), "noon"));
    store.add(new_item(date(2024, 3, 5), time(8, 0), "other day"));

    let items = store.list_for_day(day);
    let titles: Vec<&str> = items.iter().map(|item| item.title.as_str()).collect();
    assert_eq!(titles, vec!["morning", "noon", "evening"]);
}

#[test]
fn list_for_day_keeps_insertion_order_on_equal_times() {
    let mut store = PlannerStore::new();
    let day = date(2024, 3, 4);
    store.add(new_item(day, time(10, 0), "first"));
    store.add(new_item(day, time(10, 0), "second"));

    let items = store.list_for_day(day);
    assert_eq!(items[0].title, "first");
    assert_eq!(items[1].title, "second");
}

#[test]
fn mark_done_is_idempotent() {
    let mut store = PlannerStore::new();
    let item = store.add(new_item(date(2024, 3, 4), time(18, 0), "Launch Post"));

    assert!(store.mark_done(item.id));
    assert!(store.mark_done(item.id));
    assert_eq!(store.get(item.id).unwrap().status, ItemStatus::Done);
}

#[test]
fn missing_ids_are_silent_noops() {
    let mut store = PlannerStore::new();
    store.add(new_item(date(2024, 3, 4), time(18, 0), "Launch Post"));

    let missing = Uuid::new_v4();
    assert!(!store.mark_done(missing));
    assert!(!store.remove(missing));
    assert!(store.get(missing).is_none());
    assert_eq!(store.len(), 1);
}

#[test]
fn remove_deletes_item() {
    let mut store = PlannerStore::new();
    let item = store.add(new_item(date(2024, 3, 4), time(18, 0), "Launch Post"));

    assert!(store.remove(item.id));
    assert!(store.get(item.id).is_none());
    assert!(store.is_empty());
}

#[test]
fn items_keeps_insertion_order_across_days() {
    let mut store = PlannerStore::new();
    store.add(new_item(date(2024, 3, 5), time(18, 0), "first"));
    store.add(new_item(date(2024, 3, 4), time(9, 0), "second"));

    let titles: Vec<&str> = store
        .items()
        .iter()
        .map(|item| item.title.as_str())
        .collect();
    assert_eq!(titles, vec!["first", "second"]);
}

#[test]
fn monday_of_maps_every_weekday_to_monday() {
    let monday = date(2024, 3, 4);
    for offset in 0..7 {
        let anchor = date(2024, 3, 4 + offset);
        assert_eq!(monday_of(anchor), monday);
    }
    assert_eq!(monday_of(date(2024, 3, 10)), monday);
    assert_eq!(monday_of(date(2024, 3, 11)), date(2024, 3, 11));
}

#[test]
fn week_days_are_consecutive_from_monday() {
    let days = week_days(date(2024, 3, 6));

    assert_eq!(days[0], date(2024, 3, 4));
    assert_eq!(days[0].weekday(), Weekday::Mon);
    assert_eq!(days[6], date(2024, 3, 10));
    for pair in days.windows(2) {
        assert_eq!(pair[1], pair[0].succ_opt().unwrap());
    }
}

#[test]
fn week_view_groups_items_by_day() {
    let mut store = PlannerStore::new();
    let monday = date(2024, 3, 4);
    store.add(new_item(monday, time(19, 30), "second"));
    store.add(new_item(monday, time(18, 0), "Launch Post"));
    store.add(new_item(date(2024, 3, 8), time(11, 0), "friday"));
    store.add(new_item(date(2024, 3, 11), time(9, 0), "outside the window"));

    let view = week_view(&store, date(2024, 3, 6));

    assert_eq!(view.monday, monday);
    assert_eq!(view.days.len(), 7);
    assert_eq!(view.days[0].date, monday);
    assert_eq!(view.days[0].items.len(), 2);
    assert_eq!(view.days[0].items[0].title, "Launch Post");
    assert_eq!(view.days[4].items.len(), 1);
    assert!(view.days[1].items.is_empty());
    assert!(view
        .days
        .iter()
        .all(|day| day.items.iter().all(|item| item.date == day.date)));
}

#[test]
fn starter_quota_exhausts_after_five() {
    let today = date(2024, 3, 4);
    let mut session = Session::new(Tier::Starter, QuotaConfig::default(), today);

    for _ in 0..5 {
        session.ensure_quota(today).unwrap();
        session.record_generation(today);
    }

    let err = session.ensure_quota(today).unwrap_err();
    assert_eq!(
        err.to_string(),
        "daily generation quota reached (5/5)"
    );
    assert!(session.planner.is_empty());
}

#[test]
fn quota_is_only_consumed_on_record() {
    let today = date(2024, 3, 4);
    let mut session = Session::new(Tier::Starter, QuotaConfig::default(), today);

    for _ in 0..20 {
        session.ensure_quota(today).unwrap();
    }

    assert_eq!(session.quota_status(today).used, 0);
}

#[test]
fn quota_resets_on_new_day() {
    let monday = date(2024, 3, 4);
    let tuesday = date(2024, 3, 5);
    let mut session = Session::new(Tier::Starter, QuotaConfig::default(), monday);

    for _ in 0..5 {
        session.record_generation(monday);
    }
    assert!(session.ensure_quota(monday).is_err());

    session.ensure_quota(tuesday).unwrap();
    assert_eq!(session.quota_status(tuesday).used, 0);
}

#[test]
fn pro_tier_has_no_limit() {
    let today = date(2024, 3, 4);
    let mut session = Session::new(Tier::Pro, QuotaConfig::default(), today);

    for _ in 0..50 {
        session.ensure_quota(today).unwrap();
        session.record_generation(today);
    }

    let status = session.quota_status(today);
    assert_eq!(status.used, 50);
    assert_eq!(status.limit, None);
    assert_eq!(status.remaining(), None);
}

#[test]
fn tier_switch_keeps_daily_usage() {
    let today = date(2024, 3, 4);
    let mut session = Session::new(Tier::Starter, QuotaConfig::default(), today);

    for _ in 0..5 {
        session.record_generation(today);
    }
    assert!(session.ensure_quota(today).is_err());

    session.set_tier(Tier::Pro);
    session.ensure_quota(today).unwrap();
    assert_eq!(session.quota_status(today).used, 5);

    session.set_tier(Tier::Starter);
    assert!(session.ensure_quota(today).is_err());
}

#[test]
fn platform_and_tier_parsing() {
    assert_eq!(Platform::from_str("Instagram"), Some(Platform::Instagram));
    assert_eq!(Platform::from_str("tiktok"), Some(Platform::Tiktok));
    assert_eq!(Platform::from_str("twitter"), Some(Platform::X));
    assert_eq!(Platform::from_str("carrier-pigeon"), None);

    assert_eq!(Tier::from_str("starter"), Some(Tier::Starter));
    assert_eq!(Tier::from_str("PRO"), Some(Tier::Pro));
    assert_eq!(Tier::from_str("enterprise"), None);

    assert!(Tier::Pro.shows_details());
    assert!(!Tier::Starter.shows_details());
}
