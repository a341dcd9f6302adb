mod common;

use std::sync::Arc;

use common::{draft, employee, gated, roster, settle, StubRemote};
use products_hr::{
    filter::apply, EmployeeId, EmployeeStore, FilterState, Gender, GenderFilter, LoadingPolicy,
    OperationKind, Outcome, RequestStatus, StatusFilter, StoreError, UsState,
};

#[tokio::test]
async fn create_assigns_id_and_appends_server_record() {
    let remote = StubRemote::empty();
    remote.reassign_ids_to("EMP1234");
    let store = EmployeeStore::new(remote.clone());

    let input = draft("Jane Doe", Gender::Female, true);
    let saved = store.create(input.clone()).await.unwrap();

    let employees = store.employees();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].id.as_str(), "EMP1234");
    assert_eq!(employees[0].to_draft(), input);
    assert_eq!(employees[0], saved);
    assert_eq!(employees[0].state, UsState::Texas);

    // the client generated its own id before the round trip
    let calls = remote.calls();
    assert_eq!(calls.len(), 1);
    assert!(calls[0].starts_with("create EMP-"));
    assert_eq!(
        store.status(OperationKind::Create),
        RequestStatus::Fulfilled(Outcome::Created(saved))
    );
}

#[tokio::test]
async fn create_echoing_an_existing_id_replaces_that_entry() {
    let remote = StubRemote::with_records(roster());
    remote.reassign_ids_to("EMP1");
    let store = EmployeeStore::builder(remote).employees(roster()).build();

    let input = draft("Gina Park", Gender::Female, false);
    let saved = store.create(input.clone()).await.unwrap();

    assert_eq!(saved.id.as_str(), "EMP1");
    let employees = store.employees();
    assert_eq!(employees.len(), 6);
    assert_eq!(employees[0].id.as_str(), "EMP1");
    assert_eq!(employees[0].to_draft(), input);
    assert_eq!(
        employees.iter().filter(|e| e.id.as_str() == "EMP1").count(),
        1
    );
}

#[tokio::test]
async fn injected_id_generator_is_used_for_creates() {
    let remote = StubRemote::empty();
    let store = EmployeeStore::builder(remote.clone())
        .id_generator(|| EmployeeId::from("EMP-FIXED"))
        .build();

    store.create(draft("Ann Lee", Gender::Other, false)).await.unwrap();

    assert_eq!(remote.calls(), vec!["create EMP-FIXED".to_string()]);
    assert!(store.find(&EmployeeId::from("EMP-FIXED")).is_some());
}

#[tokio::test]
async fn refresh_replaces_collection_wholesale() {
    let remote = StubRemote::with_records(vec![employee("EMP9999", "Bob Lee", Gender::Male, true)]);
    let store = EmployeeStore::builder(remote)
        .employees(roster())
        .build();

    let count = store.refresh().await.unwrap();

    assert_eq!(count, 1);
    let employees = store.employees();
    assert_eq!(employees.len(), 1);
    assert_eq!(employees[0].id.as_str(), "EMP9999");
    assert_eq!(employees[0].full_name, "Bob Lee");
    assert!(store.find(&EmployeeId::from("EMP1")).is_none());
    assert!(!store.loading());
    assert!(store.error().is_none());
}

#[tokio::test]
async fn refresh_keeps_server_order() {
    let mut reversed = roster();
    reversed.reverse();
    let store = EmployeeStore::new(StubRemote::with_records(reversed.clone()));

    store.refresh().await.unwrap();

    assert_eq!(*store.employees(), reversed);
}

#[tokio::test]
async fn failed_refresh_keeps_collection_and_reports() {
    let remote = StubRemote::empty();
    remote.fail("list", "Failed to fetch employees");
    let store = EmployeeStore::builder(remote).employees(roster()).build();

    let err = store.refresh().await.unwrap_err();

    assert_eq!(err.to_string(), "Failed to fetch employees");
    assert_eq!(store.employees().len(), 6);
    assert!(!store.loading());
    let failure = store.error().unwrap();
    assert_eq!(failure.kind, OperationKind::Refresh);
    assert_eq!(failure.message, "Failed to fetch employees");
}

#[tokio::test]
async fn successful_refresh_clears_previous_error() {
    let remote = StubRemote::with_records(roster());
    remote.fail("delete", "Failed to delete employee");
    let store = EmployeeStore::builder(remote).employees(roster()).build();

    store.remove(&EmployeeId::from("EMP1")).await.unwrap_err();
    assert!(store.error().is_some());

    store.refresh().await.unwrap();
    assert!(store.error().is_none());
}

#[tokio::test]
async fn only_refresh_drives_loading_by_default() {
    let (remote, mut calls) = gated();
    let store = EmployeeStore::new(remote);

    let driver = async {
        let call = calls.recv().await.unwrap();
        assert_eq!(call.op, "list");
        assert!(store.loading());
        assert_eq!(store.status(OperationKind::Refresh), RequestStatus::Pending);
        call.respond(roster());
    };
    let (refreshed, ()) = tokio::join!(store.refresh(), driver);
    assert_eq!(refreshed.unwrap(), 6);
    assert!(!store.loading());

    let driver = async {
        let call = calls.recv().await.unwrap();
        assert_eq!(call.op, "create");
        assert_eq!(store.status(OperationKind::Create), RequestStatus::Pending);
        assert!(!store.loading());
        call.echo();
    };
    let (created, ()) = tokio::join!(store.create(draft("Gus Grant", Gender::Male, true)), driver);
    assert!(created.is_ok());
    assert_eq!(store.employees().len(), 7);
}

#[tokio::test]
async fn all_operations_policy_reports_mutations_as_loading() {
    let (remote, mut calls) = gated();
    let store = EmployeeStore::builder(remote)
        .employees(roster())
        .loading_policy(LoadingPolicy::AllOperations)
        .build();

    let driver = async {
        let call = calls.recv().await.unwrap();
        assert!(store.loading());
        call.echo();
    };
    let bob = EmployeeId::from("EMP2");
    let (removed, ()) = tokio::join!(store.remove(&bob), driver);
    removed.unwrap();
    assert!(!store.loading());
    assert_eq!(store.employees().len(), 5);
}

#[tokio::test]
async fn toggling_twice_restores_the_record() {
    let remote = StubRemote::with_records(roster());
    let store = EmployeeStore::builder(remote).employees(roster()).build();
    let id = EmployeeId::from("EMP4");
    let original = store.find(&id).unwrap();

    let once = store.toggle_active(&id).await.unwrap();
    assert!(once.is_active);
    assert_eq!(store.find(&id).unwrap().is_active, !original.is_active);

    store.toggle_active(&id).await.unwrap();
    assert_eq!(store.find(&id).unwrap(), original);
    assert!(matches!(
        store.status(OperationKind::Toggle),
        RequestStatus::Fulfilled(Outcome::Toggled(_))
    ));
}

#[tokio::test]
async fn toggle_sends_the_full_record() {
    let (remote, mut calls) = gated();
    let store = EmployeeStore::builder(remote).employees(roster()).build();
    let id = EmployeeId::from("EMP1");

    let driver = async {
        let call = calls.recv().await.unwrap();
        let sent = call.record.clone().unwrap();
        let mut expected = roster()[0].clone();
        expected.is_active = false;
        assert_eq!(sent, expected);
        call.echo();
    };
    let (toggled, ()) = tokio::join!(store.toggle_active(&id), driver);
    assert!(!toggled.unwrap().is_active);
}

#[tokio::test]
async fn toggle_of_unknown_id_is_rejected_without_a_round_trip() {
    let remote = StubRemote::with_records(roster());
    let store = EmployeeStore::builder(remote.clone()).employees(roster()).build();
    let ghost = EmployeeId::from("EMP404");

    let err = store.toggle_active(&ghost).await.unwrap_err();

    assert_eq!(err, StoreError::UnknownEmployee(ghost));
    assert!(remote.calls().is_empty());
    assert_eq!(
        store.status(OperationKind::Toggle),
        RequestStatus::Rejected("employee EMP404 is not in the roster".into())
    );
    assert_eq!(store.error().unwrap().kind, OperationKind::Toggle);
    assert_eq!(store.in_flight(OperationKind::Toggle), 0);
}

#[tokio::test]
async fn update_of_id_missing_locally_leaves_collection_alone() {
    let remote = StubRemote::empty();
    let store = EmployeeStore::builder(remote.clone()).employees(roster()).build();
    let ghost = EmployeeId::from("EMP404");

    let saved = store
        .update(&ghost, draft("Nobody Here", Gender::Other, true))
        .await
        .unwrap();

    assert_eq!(saved.id, ghost);
    assert_eq!(*store.employees(), roster());
    assert_eq!(remote.calls(), vec!["replace EMP404".to_string()]);
    assert!(store.error().is_none());
}

#[tokio::test]
async fn update_replaces_in_place() {
    let remote = StubRemote::with_records(roster());
    let store = EmployeeStore::builder(remote).employees(roster()).build();
    let id = EmployeeId::from("EMP3");
    let mut changes = draft("Casey Jordan-Smith", Gender::Other, true);
    changes.state = UsState::RhodeIsland;

    store.update(&id, changes.clone()).await.unwrap();

    let employees = store.employees();
    assert_eq!(employees.len(), 6);
    assert_eq!(employees[2].id, id);
    assert_eq!(employees[2].to_draft(), changes);
}

#[tokio::test]
async fn last_resolved_update_wins_over_last_sent() {
    let (remote, mut calls) = gated();
    let store = EmployeeStore::builder(remote).employees(roster()).build();
    let id = EmployeeId::from("EMP2");
    let payload_a = draft("Version A", Gender::Male, true);
    let payload_b = draft("Version B", Gender::Male, false);

    let driver = async {
        let sent_a = calls.recv().await.unwrap();
        let sent_b = calls.recv().await.unwrap();
        assert_eq!(sent_a.record.as_ref().unwrap().full_name, "Version A");

        sent_b.echo();
        settle(|| store.in_flight(OperationKind::Update) == 1).await;
        assert_eq!(store.find(&id).unwrap().full_name, "Version B");

        sent_a.echo();
    };
    let (a, b, ()) = tokio::join!(
        store.update(&id, payload_a.clone()),
        store.update(&id, payload_b),
        driver
    );
    a.unwrap();
    b.unwrap();

    // A was sent first but resolved last, so A is what remains
    assert_eq!(store.find(&id).unwrap().to_draft(), payload_a);
}

#[tokio::test]
async fn stale_refresh_resolving_last_overwrites_newer_data() {
    let (remote, mut calls) = gated();
    let store = EmployeeStore::new(remote);
    let stale = vec![employee("EMP1", "Old Name", Gender::Female, true)];
    let fresh = vec![employee("EMP1", "New Name", Gender::Female, true)];

    let driver = async {
        let older = calls.recv().await.unwrap();
        let newer = calls.recv().await.unwrap();
        newer.respond(fresh.clone());
        settle(|| store.in_flight(OperationKind::Refresh) == 1).await;
        assert_eq!(*store.employees(), fresh);
        older.respond(stale.clone());
    };
    let (first, second, ()) = tokio::join!(store.refresh(), store.refresh(), driver);
    first.unwrap();
    second.unwrap();

    assert_eq!(*store.employees(), stale);
}

#[tokio::test]
async fn failed_delete_is_isolated_from_later_creates() {
    let remote = StubRemote::with_records(roster());
    remote.fail("delete", "Failed to delete employee");
    let store = EmployeeStore::builder(remote.clone()).employees(roster()).build();

    let err = store.remove(&EmployeeId::from("EMP5")).await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to delete employee");
    assert_eq!(*store.employees(), roster());
    assert_eq!(store.error().unwrap().message, "Failed to delete employee");

    let created = store.create(draft("Hana Ito", Gender::Female, true)).await.unwrap();
    assert_eq!(store.employees().len(), 7);
    assert_eq!(store.employees()[6], created);
    // success elsewhere does not dismiss the earlier failure
    assert_eq!(store.error().unwrap().kind, OperationKind::Delete);
}

#[tokio::test]
async fn newer_failures_overwrite_older_ones() {
    let remote = StubRemote::with_records(roster());
    remote.fail("delete", "Failed to delete employee");
    remote.fail("create", "Failed to add employee");
    let store = EmployeeStore::builder(remote).employees(roster()).build();

    store.remove(&EmployeeId::from("EMP1")).await.unwrap_err();
    store.create(draft("Ivy Stone", Gender::Female, true)).await.unwrap_err();

    let failure = store.error().unwrap();
    assert_eq!(failure.kind, OperationKind::Create);
    assert_eq!(failure.message, "Failed to add employee");
    assert_eq!(store.employees().len(), 6);

    store.clear_error();
    assert!(store.error().is_none());
}

#[tokio::test]
async fn remove_drops_only_the_target() {
    let remote = StubRemote::with_records(roster());
    let store = EmployeeStore::builder(remote).employees(roster()).build();

    store.remove(&EmployeeId::from("EMP3")).await.unwrap();

    let ids: Vec<_> = store.employees().iter().map(|e| e.id.to_string()).collect();
    assert_eq!(ids, vec!["EMP1", "EMP2", "EMP4", "EMP5", "EMP6"]);
    assert_eq!(
        store.status(OperationKind::Delete),
        RequestStatus::Fulfilled(Outcome::Deleted(EmployeeId::from("EMP3")))
    );
}

#[tokio::test]
async fn filtered_view_follows_filters_and_collection() {
    let remote = StubRemote::with_records(roster());
    let store = EmployeeStore::builder(remote).employees(roster()).build();

    let everything = store.filtered();
    assert_eq!(everything.len(), 6);
    assert!(Arc::ptr_eq(&everything, &store.filtered()));
    assert_eq!(store.view_recomputations(), 1);

    store.set_search_query("mar");
    store.set_gender_filter(GenderFilter::Only(Gender::Male));
    store.set_status_filter(StatusFilter::Active);
    let narrowed = store.filtered();
    let names: Vec<_> = narrowed.iter().map(|e| e.full_name.as_str()).collect();
    assert_eq!(names, vec!["Bob Martinez"]);
    assert_eq!(&*narrowed, apply(&store.employees(), &store.filters()).as_slice());

    store.toggle_active(&EmployeeId::from("EMP2")).await.unwrap();
    assert!(store.filtered().is_empty());

    store.clear_filters();
    assert_eq!(store.filters(), FilterState::default());
    assert_eq!(store.filtered().len(), 6);
}

#[tokio::test]
async fn summary_counts_whole_roster_not_the_view() {
    let remote = StubRemote::with_records(roster());
    let store = EmployeeStore::builder(remote).employees(roster()).build();
    store.set_status_filter(StatusFilter::Inactive);

    let summary = store.summary();

    assert_eq!(summary.total, 6);
    assert_eq!(summary.active, 3);
    assert_eq!(summary.male, 2);
    assert_eq!(summary.female, 2);
    assert_eq!(summary.active_percent(), 50);
    assert_eq!(store.filtered().len(), 3);
}
