use crate::error::WeekgridError;
use crate::model::*;

fn slot(h: u8, m: u8) -> SlotTime {
    SlotTime::new(h, m).unwrap()
}

#[test]
fn test_activity_serializes_with_underscore_id() {
    let activity = Activity::from_new(NewActivity::new("Yoga", Weekday::Monday, slot(9, 0), 60));
    let json = serde_json::to_value(&activity).unwrap();

    assert_eq!(json["_id"], activity.id.as_str());
    assert_eq!(json["name"], "Yoga");
    assert_eq!(json["day"], "понедельник");
    assert_eq!(json["time"], "09:00");
    assert_eq!(json["duration"], 60);
    assert!(json.get("id").is_none());
}

#[test]
fn test_activity_accepts_plain_id_alias() {
    let json = r#"{"id":"abc","name":"Run","day":"среда","time":"18:30","duration":30}"#;
    let activity: Activity = serde_json::from_str(json).unwrap();
    assert_eq!(activity.id, "abc");
    assert_eq!(activity.day, Weekday::Wednesday);
    assert_eq!(activity.time, slot(18, 30));
}

#[test]
fn test_fresh_ids_differ() {
    let input = NewActivity::new("A", Weekday::Friday, slot(10, 0), 15);
    let a = Activity::from_new(input.clone());
    let b = Activity::from_new(input);
    assert!(!a.id.is_empty());
    assert_ne!(a.id, b.id);
}

#[test]
fn test_weekday_parse_labels_and_english() {
    assert_eq!("понедельник".parse::<Weekday>().unwrap(), Weekday::Monday);
    assert_eq!("Воскресенье".parse::<Weekday>().unwrap(), Weekday::Sunday);
    assert_eq!("tuesday".parse::<Weekday>().unwrap(), Weekday::Tuesday);
    assert_eq!("THU".parse::<Weekday>().unwrap(), Weekday::Thursday);
    assert!("someday".parse::<Weekday>().is_err());
}

#[test]
fn test_weekday_order_starts_monday() {
    assert_eq!(Weekday::ALL[0], Weekday::Monday);
    assert_eq!(Weekday::ALL[6], Weekday::Sunday);
    assert!(Weekday::ALL.windows(2).all(|w| w[0] < w[1]));
}

#[test]
fn test_weekday_unknown_label_rejected_by_serde() {
    let result: Result<Weekday, _> = serde_json::from_str(r#""monday""#);
    assert!(result.is_err());
}

#[test]
fn test_slot_time_parse_and_display() {
    let t: SlotTime = "9:30".parse().unwrap();
    assert_eq!(t.to_string(), "09:30");
    assert!("24:00".parse::<SlotTime>().is_err());
    assert!("12:60".parse::<SlotTime>().is_err());
    assert!("1230".parse::<SlotTime>().is_err());
    assert!("12:3".parse::<SlotTime>().is_err());
    assert!("".parse::<SlotTime>().is_err());
}

#[test]
fn test_slot_time_rejects_signs_and_non_digits() {
    for input in ["09:+0", "+9:00", "-1:00", "09:-0", " 9: 0", "0x:00", "٠٩:٠٠"] {
        assert!(input.parse::<SlotTime>().is_err(), "accepted {input:?}");
    }
    assert_eq!("09:00".parse::<SlotTime>().unwrap(), slot(9, 0));
}

#[test]
fn test_slot_time_ordering() {
    assert!(slot(9, 0) < slot(9, 30));
    assert!(slot(9, 30) < slot(10, 0));
}

#[test]
fn test_validate_trims_name() {
    let input =
        validate_new_activity("  Yoga ", "понедельник", "09:00", 60, &ActivityRules::default())
            .unwrap();
    assert_eq!(input.name, "Yoga");
    assert_eq!(input.day, Weekday::Monday);
    assert_eq!(input.time, slot(9, 0));
    assert_eq!(input.duration, 60);
}

#[test]
fn test_validate_empty_name() {
    let err = validate_new_activity("   ", "среда", "10:00", 30, &ActivityRules::default())
        .unwrap_err();
    assert!(matches!(err, WeekgridError::InvalidInput(_)));
}

#[test]
fn test_validate_name_too_long_counts_chars() {
    let rules = ActivityRules {
        max_name_length: 5,
        allowed_times: None,
    };
    // five Cyrillic chars are ten bytes but still fit
    assert!(validate_new_activity("йогаа", "среда", "10:00", 30, &rules).is_ok());
    assert!(validate_new_activity("йогааа", "среда", "10:00", 30, &rules).is_err());
}

#[test]
fn test_validate_non_positive_duration() {
    let rules = ActivityRules::default();
    assert!(validate_new_activity("A", "среда", "10:00", 0, &rules).is_err());
    assert!(validate_new_activity("A", "среда", "10:00", -15, &rules).is_err());
    assert!(validate_new_activity("A", "среда", "10:00", i64::MAX, &rules).is_err());
}

#[test]
fn test_validate_unknown_day() {
    let err =
        validate_new_activity("A", "funday", "10:00", 30, &ActivityRules::default()).unwrap_err();
    assert_eq!(err.to_string(), "invalid input: unknown day: funday");
}

#[test]
fn test_validate_off_grid_time() {
    let grid = [slot(9, 0), slot(9, 30)];
    let rules = ActivityRules {
        max_name_length: 50,
        allowed_times: Some(&grid),
    };
    assert!(validate_new_activity("A", "среда", "09:30", 30, &rules).is_ok());
    assert!(validate_new_activity("A", "среда", "09:15", 30, &rules).is_err());
}
