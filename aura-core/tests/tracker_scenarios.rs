use aura_core::{
    Advance, AuraError, CollectionId, MemoryStore, Slot, TaskStore, Tracker, TrackerError,
    generate_aura_dates, is_due_on,
};
use chrono::{NaiveDate, TimeZone, Utc};

fn d(y: i32, m: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, day).unwrap()
}

fn tracker() -> Tracker<MemoryStore> {
    Tracker::new(MemoryStore::new())
}

#[test]
fn test_top_level_task_defers_through_its_sequence() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;
    let now = Utc.with_ymd_and_hms(2024, 1, 2, 8, 0, 0).unwrap();

    let task = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    assert_eq!(task.serial_number, 1);
    assert_eq!(task.current_date, d(2024, 1, 2));
    assert_eq!(task.current_aura_index, 1);
    assert!(task.last_updated.is_none());

    let mut visited = Vec::new();
    for _ in 0..3 {
        match tr.defer(&top, &task.id, now).unwrap() {
            Advance::Moved { to, index, .. } => visited.push((index, to)),
            Advance::Exhausted => panic!("ran out early"),
        }
    }
    assert_eq!(
        visited,
        vec![(2, d(2024, 1, 4)), (3, d(2024, 1, 7)), (4, d(2024, 1, 10))]
    );

    // past the last aura date: silent no-op
    assert_eq!(tr.defer(&top, &task.id, now).unwrap(), Advance::Exhausted);
    let stored = tr.task(&top, &task.id).unwrap();
    assert_eq!(stored.current_date, d(2024, 1, 10));
    assert_eq!(stored.last_updated, Some(now));
}

#[test]
fn test_defer_count_matches_sequence_length() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;
    let (start, end) = (d(2024, 2, 1), d(2024, 5, 15));
    let expected = generate_aura_dates(start, end).len() - 2;

    let task = tr.create_task(&top, start, end).unwrap();
    let mut moves = 0;
    while tr.defer(&top, &task.id, Utc::now()).unwrap().moved() {
        moves += 1;
    }
    assert_eq!(moves, expected);
    assert_eq!(tr.task(&top, &task.id).unwrap().current_date, end);
}

#[test]
fn test_folder_task_uses_first_date_after_start() {
    let mut tr = tracker();
    let folder = tr.create_folder("Garden").unwrap();
    let coll = CollectionId::Folder(folder.id.clone());

    let task = tr.create_task(&coll, d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    assert_eq!(task.current_date, d(2024, 1, 2));
    assert_eq!(task.current_aura_index, 1);
}

#[test]
fn test_degenerate_window_writes_nothing() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;

    let err = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 1)).unwrap_err();
    assert!(matches!(
        err,
        TrackerError::Aura(AuraError::InsufficientAuraDates { count: 1, .. })
    ));
    assert!(tr.tasks(&top).unwrap().is_empty());
}

#[test]
fn test_due_today_follows_current_date() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;
    let a = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    let b = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 10)).unwrap();

    let split = tr.due_on(&top, d(2024, 1, 2)).unwrap();
    assert_eq!(split.due.len(), 2);
    assert!(split.other.is_empty());

    tr.defer(&top, &a.id, Utc::now()).unwrap();
    let split = tr.due_on(&top, d(2024, 1, 2)).unwrap();
    assert_eq!(split.due.iter().map(|t| t.id.as_str()).collect::<Vec<_>>(), vec![b.id.as_str()]);
    assert_eq!(split.other.len(), 1);

    let moved = tr.task(&top, &a.id).unwrap();
    assert!(is_due_on(&moved, d(2024, 1, 4)));
}

#[test]
fn test_complete_removes_and_compacts_serials() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;
    let ids: Vec<_> = (0..4)
        .map(|_| tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 20)).unwrap().id)
        .collect();

    let done = tr.complete(&top, &ids[1]).unwrap();
    assert_eq!(done.serial_number, 2);

    let remaining: Vec<_> = tr
        .tasks(&top)
        .unwrap()
        .into_iter()
        .map(|t| (t.id, t.serial_number))
        .collect();
    assert_eq!(
        remaining,
        vec![(ids[0].clone(), 1), (ids[2].clone(), 2), (ids[3].clone(), 3)]
    );

    // next creation continues the dense numbering
    let next = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 20)).unwrap();
    assert_eq!(next.serial_number, 4);

    assert!(tr.complete(&top, &ids[1]).is_err());
}

#[test]
fn test_folders_keep_independent_serials() {
    let mut tr = tracker();
    let work = tr.create_folder("Work").unwrap();
    let home = tr.create_folder("Home").unwrap();
    let work_c = CollectionId::Folder(work.id.clone());
    let home_c = CollectionId::Folder(home.id.clone());

    tr.create_task(&work_c, d(2024, 1, 1), d(2024, 1, 5)).unwrap();
    tr.create_task(&work_c, d(2024, 1, 1), d(2024, 1, 5)).unwrap();
    let h = tr.create_task(&home_c, d(2024, 1, 1), d(2024, 1, 5)).unwrap();
    let t = tr
        .create_task(&CollectionId::TopLevel, d(2024, 1, 1), d(2024, 1, 5))
        .unwrap();

    assert_eq!(h.serial_number, 1);
    assert_eq!(t.serial_number, 1);
    assert_eq!(tr.task_by_serial(&work_c, 2).unwrap().serial_number, 2);
    assert!(matches!(
        tr.task_by_serial(&home_c, 2),
        Err(TrackerError::SerialNotFound { serial: 2, .. })
    ));
}

#[test]
fn test_folders_with_due_tasks_summary() {
    let mut tr = tracker();
    let work = tr.create_folder("Work").unwrap();
    let idle = tr.create_folder("Idle").unwrap();
    let work_c = CollectionId::Folder(work.id.clone());

    tr.create_task(&work_c, d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    tr.create_task(&work_c, d(2024, 1, 5), d(2024, 1, 10)).unwrap();
    tr.create_task(&work_c, d(2024, 1, 1), d(2024, 1, 10)).unwrap();
    tr.create_task(&CollectionId::Folder(idle.id.clone()), d(2024, 2, 1), d(2024, 2, 9))
        .unwrap();

    let summary = tr.folders_with_due_tasks(d(2024, 1, 2)).unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].folder.name, "Work");
    assert_eq!(summary[0].count, 2);
    assert_eq!(summary[0].serials, vec![1, 3]);
}

#[test]
fn test_search_spans_collections() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;
    let folder = tr.create_folder("Errands").unwrap();
    let coll = CollectionId::Folder(folder.id.clone());

    let a = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 9)).unwrap();
    tr.set_text(&top, &a.id, Slot::First, Some("Call the Dentist".into()))
        .unwrap();
    tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 9)).unwrap();
    let f = tr.create_task(&coll, d(2024, 1, 1), d(2024, 1, 9)).unwrap();
    tr.set_text(&coll, &f.id, Slot::Second, Some("dentist invoice".into()))
        .unwrap();

    let hits = tr.search("DENTIST").unwrap();
    assert_eq!(hits.top_level.len(), 1);
    assert_eq!(hits.folders.len(), 1);
    assert_eq!(hits.total(), 2);

    let by_serial = tr.search("#2").unwrap();
    assert_eq!(by_serial.top_level.len(), 1);
    assert_eq!(by_serial.top_level[0].serial_number, 2);
    assert!(by_serial.folders.is_empty());

    assert!(tr.search("  ").unwrap().is_empty());
}

#[test]
fn test_blank_text_clears_slot() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;
    let t = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 9)).unwrap();

    tr.set_text(&top, &t.id, Slot::First, Some("notes".into())).unwrap();
    tr.set_text(&top, &t.id, Slot::First, Some("   ".into())).unwrap();
    assert!(tr.task(&top, &t.id).unwrap().text1.is_none());
}

#[test]
fn test_folder_lifecycle() {
    let mut tr = tracker();
    assert!(matches!(tr.create_folder("  "), Err(TrackerError::EmptyFolderName)));

    let f = tr.create_folder("Reading").unwrap();
    tr.rename_folder(&f.id, "Books").unwrap();
    assert_eq!(tr.resolve_folder("books").unwrap().id, f.id);
    assert_eq!(tr.resolve_folder(&f.id).unwrap().name, "Books");

    let coll = CollectionId::Folder(f.id.clone());
    tr.create_task(&coll, d(2024, 1, 1), d(2024, 1, 9)).unwrap();
    tr.delete_folder(&f.id).unwrap();

    assert!(tr.folders().unwrap().is_empty());
    assert!(matches!(tr.resolve_folder("Books"), Err(TrackerError::UnknownFolder(_))));
    assert!(tr.store().data().collections.is_empty());
}

#[test]
fn test_subscription_sees_defer() {
    let mut tr = tracker();
    let top = CollectionId::TopLevel;
    let rx = tr.store_mut().subscribe(&top);
    assert!(rx.recv().unwrap().is_empty());

    let t = tr.create_task(&top, d(2024, 1, 1), d(2024, 1, 9)).unwrap();
    assert_eq!(rx.recv().unwrap()[0].current_date, d(2024, 1, 2));

    tr.defer(&top, &t.id, Utc::now()).unwrap();
    assert_eq!(rx.recv().unwrap()[0].current_date, d(2024, 1, 4));

    assert_eq!(tr.store().list_tasks(&top).unwrap().len(), 1);
}
