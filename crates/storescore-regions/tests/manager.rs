//! End-to-end tests for `RegionManager` against a wiremock backend.

use std::str::FromStr;

use rust_decimal::Decimal;
use serde_json::json;
use storescore_client::StoreScoreClient;
use storescore_core::{
    CoreError, DepartmentId, DragState, DropTarget, OrgId, RegionId, StoreForm, StoreId, UserId, ValidationError,
};
use storescore_regions::{ManagerError, MoveOutcome, NoticeLevel, RegionManager, Settled};
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn stores_json() -> serde_json::Value {
    json!([
        {"id": 1, "name": "Downtown", "region": 10, "qr_verification_token": "old"},
        {"id": 2, "name": "Airport", "region": null}
    ])
}

fn regions_json() -> serde_json::Value {
    json!([
        {
            "id": 10, "name": "East", "color": "#3B82F6", "store_count": 1,
            "children": [{"id": 30, "name": "Metro", "parent": 10, "store_count": 0}]
        },
        {"id": 20, "name": "West", "color": "#10B981", "store_count": 0}
    ])
}

/// Serve the fixture lists for the first load only; later loads fall through
/// to whatever each test mounts next.
async fn mount_initial_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/stores/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stores_json()))
        .up_to_n_times(1)
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/regions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(regions_json()))
        .up_to_n_times(1)
        .mount(server)
        .await;
}

async fn mount_lists(server: &MockServer, stores: serde_json::Value, regions: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/stores/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(stores))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/regions/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(regions))
        .mount(server)
        .await;
}

async fn loaded_manager(server: &MockServer) -> RegionManager {
    mount_initial_lists(server).await;
    let client = StoreScoreClient::with_base_url(&server.uri(), OrgId(7), Some("test-token"), 5)
        .expect("client construction should not fail");
    let mut manager = RegionManager::new(client);
    assert_eq!(
        manager.refresh().await.expect("initial load"),
        Settled::Applied
    );
    manager
}

#[tokio::test]
async fn refresh_builds_tree_from_nested_regions() {
    let server = MockServer::start().await;
    let manager = loaded_manager(&server).await;

    let tree = manager.tree();
    let top: Vec<_> = tree.top_level_regions().iter().map(|r| r.id).collect();
    assert_eq!(top, vec![RegionId(10), RegionId(20)]);
    assert_eq!(tree.children_of(RegionId(10))[0].name, "Metro");
    assert_eq!(tree.unassigned_stores()[0].id, StoreId(2));
}

#[tokio::test]
async fn refresh_failure_raises_error_notice() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let client = StoreScoreClient::with_base_url(&server.uri(), OrgId(7), None, 5).unwrap();
    let mut manager = RegionManager::new(client);

    let err = manager.refresh().await.unwrap_err();
    assert_eq!(err.to_string(), "Failed to load regions");
    assert_eq!(manager.notices().last().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn drop_on_current_region_sends_nothing() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    manager.start_drag(StoreId(1)).unwrap();
    manager.drag_enter(DropTarget::Region(RegionId(10))).unwrap();
    let outcome = manager.drop_store().await.unwrap();

    assert_eq!(outcome, MoveOutcome::Unchanged);
    assert_eq!(manager.drag_state(), DragState::Idle);
    assert!(manager.notices().entries().is_empty());
}

#[tokio::test]
async fn cancelled_drag_sends_nothing() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    manager.start_drag(StoreId(2)).unwrap();
    manager.drag_enter(DropTarget::Region(RegionId(20))).unwrap();
    manager.cancel_drag();

    assert_eq!(manager.drop_store().await.unwrap(), MoveOutcome::Ignored);
}

#[tokio::test]
async fn successful_drop_patches_once_and_reconciles() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/stores/2/"))
        .and(body_json(json!({"region": 20})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 2, "name": "Airport", "region": 20})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_lists(
        &server,
        json!([
            {"id": 1, "name": "Downtown", "region": 10},
            {"id": 2, "name": "Airport", "region": 20}
        ]),
        json!([
            {"id": 10, "name": "East", "store_count": 1},
            {"id": 20, "name": "West", "store_count": 1}
        ]),
    )
    .await;

    manager.start_drag(StoreId(2)).unwrap();
    manager.drag_enter(DropTarget::Region(RegionId(20))).unwrap();
    let outcome = manager.drop_store().await.unwrap();

    assert!(matches!(outcome, MoveOutcome::Moved(r) if r.to == Some(RegionId(20))));
    assert_eq!(manager.drag_state(), DragState::Idle);
    let tree = manager.tree();
    assert_eq!(tree.stores_for_region(RegionId(20))[0].id, StoreId(2));
    assert!(tree.unassigned_stores().is_empty());
    assert_eq!(tree.region(RegionId(20)).unwrap().store_count, 1);
    let notice = manager.notices().last().unwrap();
    assert_eq!(notice.level, NoticeLevel::Success);
    assert_eq!(notice.message, "Moved \"Airport\" to West");
}

#[tokio::test]
async fn failed_drop_names_store_and_keeps_tree() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;

    Mock::given(method("PATCH"))
        .and(path("/stores/1/"))
        .respond_with(
            ResponseTemplate::new(403)
                .set_body_json(json!({"detail": "You do not have permission to perform this action."})),
        )
        .expect(1)
        .mount(&server)
        .await;

    manager.start_drag(StoreId(1)).unwrap();
    manager.drag_enter(DropTarget::Unassigned).unwrap();
    let err = manager.drop_store().await.unwrap_err();

    assert_eq!(
        err.to_string(),
        "Failed to move \"Downtown\": You do not have permission to perform this action."
    );
    assert_eq!(manager.drag_state(), DragState::Idle);
    assert_eq!(
        manager.tree().stores_for_region(RegionId(10))[0].id,
        StoreId(1)
    );
    assert_eq!(manager.notices().last().unwrap().level, NoticeLevel::Error);
}

#[tokio::test]
async fn second_drag_while_dragging_is_rejected() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;

    manager.start_drag(StoreId(1)).unwrap();
    let err = manager.start_drag(StoreId(2)).unwrap_err();
    assert!(matches!(err, ManagerError::Drag(_)));
}

#[tokio::test]
async fn move_to_unknown_region_sends_nothing() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("PATCH"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 1, "name": "Downtown", "region": 999})),
        )
        .expect(0)
        .mount(&server)
        .await;

    manager.start_drag(StoreId(1)).unwrap();
    let err = manager
        .drag_enter(DropTarget::Region(RegionId(999)))
        .unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Core(CoreError::UnknownRegion(RegionId(999)))
    ));
    assert_eq!(manager.drag_state(), DragState::Idle);
    assert_eq!(manager.drop_store().await.unwrap(), MoveOutcome::Ignored);
    assert_eq!(
        manager.tree().stores_for_region(RegionId(10))[0].id,
        StoreId(1)
    );
}

#[tokio::test]
async fn delete_refused_locally_sends_no_delete() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;

    let err = manager.delete_region(RegionId(10)).await.unwrap_err();

    assert!(matches!(err, ManagerError::Refused(_)));
    assert_eq!(
        err.to_string(),
        "Cannot delete \"East\" \u{2014} it has 1 store(s) assigned"
    );
}

#[tokio::test]
async fn delete_refused_when_child_has_stores() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .respond_with(ResponseTemplate::new(204))
        .expect(0)
        .mount(&server)
        .await;
    mount_lists(
        &server,
        json!([]),
        json!([
            {"id": 10, "name": "East", "store_count": 0},
            {"id": 30, "name": "Metro", "parent": 10, "store_count": 4}
        ]),
    )
    .await;
    let client = StoreScoreClient::with_base_url(&server.uri(), OrgId(7), None, 5).unwrap();
    let mut manager = RegionManager::new(client);
    manager.refresh().await.unwrap();

    let err = manager.delete_region(RegionId(10)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Cannot delete \"East\" \u{2014} child region \"Metro\" has 4 store(s)"
    );
}

#[tokio::test]
async fn backend_delete_refusal_gets_generic_message() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/regions/20/"))
        .respond_with(ResponseTemplate::new(409).set_body_json(json!({"detail": "Region is in use"})))
        .expect(1)
        .mount(&server)
        .await;

    let err = manager.delete_region(RegionId(20)).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to delete region \"West\": Region is in use"
    );
    assert!(manager.tree().region(RegionId(20)).is_some());
}

#[tokio::test]
async fn delete_success_removes_region_after_refresh() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("DELETE"))
        .and(path("/regions/20/"))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;
    mount_lists(
        &server,
        stores_json(),
        json!([{"id": 10, "name": "East", "store_count": 1}]),
    )
    .await;

    manager.delete_region(RegionId(20)).await.unwrap();
    assert!(manager.tree().region(RegionId(20)).is_none());
}

#[tokio::test]
async fn create_child_region_posts_parent_and_refreshes() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;

    Mock::given(method("POST"))
        .and(path("/regions/"))
        .and(body_json(json!({"name": "Harbor", "parent": 20})))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 40, "name": "Harbor", "parent": 20})),
        )
        .expect(1)
        .mount(&server)
        .await;
    mount_lists(
        &server,
        stores_json(),
        json!([
            {"id": 10, "name": "East", "store_count": 1},
            {"id": 20, "name": "West", "children": [{"id": 40, "name": "Harbor", "parent": 20}]}
        ]),
    )
    .await;

    let created = manager
        .create_region("  Harbor ", Some(RegionId(20)), None)
        .await
        .unwrap();

    assert_eq!(created.id, RegionId(40));
    let children = manager.tree().children_of(RegionId(20));
    assert_eq!(children.len(), 1);
    assert_eq!(children[0].name, "Harbor");
}

#[tokio::test]
async fn create_with_blank_name_sends_nothing() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(201))
        .expect(0)
        .mount(&server)
        .await;

    let err = manager.create_region("   ", None, None).await.unwrap_err();
    assert!(matches!(
        err,
        ManagerError::Validation(ValidationError::Required("name"))
    ));
    assert!(manager.notices().entries().is_empty());
}

#[tokio::test]
async fn duplicate_region_name_surfaces_backend_detail() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("POST"))
        .and(path("/regions/"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "name": ["A region with this name already exists."]
        })))
        .mount(&server)
        .await;

    let err = manager.create_region("East", None, None).await.unwrap_err();
    assert_eq!(
        err.to_string(),
        "Failed to create region: name: A region with this name already exists."
    );
    assert_eq!(manager.notices().last().unwrap().message, err.to_string());
}

#[tokio::test]
async fn recolor_failure_rolls_back() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/regions/10/"))
        .and(body_json(json!({"color": "#EF4444"})))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = manager
        .recolor_region(RegionId(10), "#ef4444")
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "Failed to update colour of \"East\"");
    assert_eq!(manager.tree().region(RegionId(10)).unwrap().color, "#3B82F6");
}

#[tokio::test]
async fn rename_applies_saved_name() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("PATCH"))
        .and(path("/regions/20/"))
        .and(body_json(json!({"name": "Pacific"})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 20, "name": "Pacific"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let settled = manager.rename_region(RegionId(20), " Pacific ").await.unwrap();

    assert_eq!(settled, Settled::Applied);
    assert_eq!(manager.tree().region(RegionId(20)).unwrap().name, "Pacific");
}

fn members_json() -> serde_json::Value {
    json!([
        {"id": 1, "role": "regional_manager",
         "user": {"id": 5, "email": "ana@example.com", "first_name": "Ana", "last_name": "Ruiz"}},
        {"id": 2, "role": "evaluator",
         "user": {"id": 6, "email": "eve@example.com", "first_name": "", "last_name": ""}}
    ])
}

async fn mount_directory(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/members/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(members_json()))
        .mount(server)
        .await;
    Mock::given(method("GET"))
        .and(path("/departments/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "name": "Produce"},
            {"id": 2, "name": "Deli", "is_active": false}
        ])))
        .mount(server)
        .await;
}

#[tokio::test]
async fn assign_manager_rejects_ineligible_member() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    mount_directory(&server).await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let err = manager
        .assign_manager(RegionId(10), Some(UserId(6)))
        .await
        .unwrap_err();

    assert!(matches!(err, ManagerError::Validation(_)));
    assert_eq!(manager.eligible_managers().len(), 1);
    assert_eq!(manager.active_departments().len(), 1);
    assert!(manager.tree().region(RegionId(10)).unwrap().manager.is_none());
}

#[tokio::test]
async fn assign_manager_sets_name_from_member() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    mount_directory(&server).await;
    Mock::given(method("POST"))
        .and(path("/regions/10/assign-manager/"))
        .and(body_json(json!({"manager": 5})))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"id": 10, "name": "East", "manager": 5})),
        )
        .expect(1)
        .mount(&server)
        .await;

    manager
        .assign_manager(RegionId(10), Some(UserId(5)))
        .await
        .unwrap();

    let region = manager.tree().region(RegionId(10)).unwrap();
    assert_eq!(region.manager, Some(UserId(5)));
    assert_eq!(region.manager_name.as_deref(), Some("Ana Ruiz"));
    assert_eq!(
        manager.notices().last().unwrap().message,
        "Ana Ruiz now manages \"East\""
    );
}

#[tokio::test]
async fn save_new_store_sends_department_set() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("POST"))
        .and(path("/stores/"))
        .and(body_json(json!({
            "name": "Harbor",
            "store_number": "",
            "address": "",
            "city": "",
            "state": "",
            "zip_code": "",
            "latitude": null,
            "longitude": null,
            "is_active": true,
            "verification_method": "either",
            "region": 20,
            "departments": [1, 3]
        })))
        .respond_with(
            ResponseTemplate::new(201).set_body_json(json!({"id": 9, "name": "Harbor", "region": 20})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let mut form = StoreForm::new();
    form.name = "Harbor".into();
    form.region = Some(RegionId(20));
    form.toggle_department(DepartmentId(3));
    form.toggle_department(DepartmentId(1));

    let saved = manager.save_store(&form).await.unwrap();
    assert_eq!(saved.id, StoreId(9));
    assert!(manager.tree().store(StoreId(9)).is_some());
}

#[tokio::test]
async fn geocode_fills_form_without_saving() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("POST"))
        .and(path("/stores/1/geocode/"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"latitude": "39.781721", "longitude": "-89.5"})),
        )
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("PATCH"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let mut form = StoreForm::from_store(manager.tree().store(StoreId(1)).unwrap());
    manager.geocode(&mut form).await.unwrap();

    assert_eq!(form.latitude, Some(Decimal::from_str("39.781721").unwrap()));
    assert_eq!(form.longitude, Some(Decimal::from_str("-89.5").unwrap()));
    assert!(!manager.tree().store(StoreId(1)).unwrap().has_coordinates());
}

#[tokio::test]
async fn confirmed_qr_regeneration_replaces_token_locally() {
    let server = MockServer::start().await;
    let mut manager = loaded_manager(&server).await;
    Mock::given(method("POST"))
        .and(path("/stores/1/regenerate-qr/"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({"qr_verification_token": "fresh"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let token = manager.regenerate_qr(StoreId(1), true).await.unwrap();

    assert_eq!(token, "fresh");
    assert_eq!(
        manager.tree().store(StoreId(1)).unwrap().qr_verification_token,
        "fresh"
    );
}

#[tokio::test]
async fn walk_counts_group_by_store() {
    let server = MockServer::start().await;
    let manager = loaded_manager(&server).await;
    Mock::given(method("GET"))
        .and(path("/walks/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"id": 1, "store": 1, "template": 1, "status": "completed"},
            {"id": 2, "store": 1, "template": 1, "status": "in_progress"},
            {"id": 3, "store": 2, "template": 1, "status": "scheduled"}
        ])))
        .mount(&server)
        .await;

    let counts = manager.walk_counts().await.unwrap();
    assert_eq!(counts[&StoreId(1)].total, 2);
    assert_eq!(counts[&StoreId(1)].completed, 1);
    assert_eq!(counts[&StoreId(2)].completed, 0);
}
