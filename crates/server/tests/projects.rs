//! Projects, memberships and milestones over HTTP.

mod common;

use axum::http::StatusCode;
use common::{error_code, id_of, TestApp};
use entity::{attachments, comments, project_members, sea_orm_active_enums::GlobalRole, tasks, time_logs};
use sea_orm::{ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter};
use serde_json::json;
use uuid::Uuid;

async fn member_count(app: &TestApp, project_id: Uuid) -> u64 {
    project_members::Entity::find()
        .filter(project_members::Column::ProjectId.eq(project_id))
        .count(&app.db)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_creator_is_single_project_manager() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    let dev = app.create_user("dev@example.com", GlobalRole::Developer).await;

    let project_id = app
        .create_project(
            &pm,
            "Apollo",
            json!([
                { "user_id": pm.id, "role": "DEVELOPER" },
                { "user_id": dev.id, "role": "DEVELOPER" },
            ]),
        )
        .await;

    let (status, body) = app
        .get(&format!("/api/v1/projects/{project_id}/members"), &pm.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    let members = body["data"].as_array().unwrap();
    assert_eq!(members.len(), 2);
    let creator = members
        .iter()
        .find(|m| m["user_id"] == pm.id.to_string())
        .unwrap();
    assert_eq!(creator["role"], "PROJECT_MANAGER");
}

#[tokio::test]
async fn test_create_project_requires_pm_tier() {
    let app = TestApp::new().await;
    let dev = app.create_user("dev@example.com", GlobalRole::Developer).await;

    let (status, body) = app
        .post("/api/v1/projects", &dev.token, json!({ "name": "Nope" }))
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), "FORBIDDEN");
}

#[tokio::test]
async fn test_create_project_validation() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;

    let (status, _) = app.post("/api/v1/projects", &pm.token, json!({ "name": "" })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/projects",
            &pm.token,
            json!({ "name": "Dates", "start_date": "2026-05-01", "end_date": "2026-04-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(
            "/api/v1/projects",
            &pm.token,
            json!({ "name": "Ghost", "members": [{ "user_id": Uuid::new_v4(), "role": "QA" }] }),
        )
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = app.post("/api/v1/projects", &pm.token, json!({ "name": 42 })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    app.create_project(&pm, "Taken", json!([])).await;
    let (status, _) = app.post("/api/v1/projects", &pm.token, json!({ "name": "Taken" })).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_non_member_cannot_view() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    let outsider = app.create_user("out@example.com", GlobalRole::TeamLead).await;
    let admin = app.create_user("admin@example.com", GlobalRole::Administrator).await;
    let project_id = app.create_project(&pm, "Secret", json!([])).await;

    let (status, _) = app
        .get(&format!("/api/v1/projects/{project_id}"), &outsider.token)
        .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = app
        .get(&format!("/api/v1/projects/{project_id}"), &admin.token)
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get("/api/v1/projects", &outsider.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["pagination"]["total_items"], 0);
    let (_, body) = app.get("/api/v1/projects", &admin.token).await;
    assert_eq!(body["data"]["pagination"]["total_items"], 1);

    let (status, _) = app
        .get(&format!("/api/v1/projects/{}", Uuid::new_v4()), &admin.token)
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = app.get("/api/v1/projects/not-a-uuid", &admin.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_pagination_is_validated() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    for name in ["A", "B", "C"] {
        app.create_project(&pm, name, json!([])).await;
    }

    let (status, body) = app.get("/api/v1/projects?page=2&per_page=2", &pm.token).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["items"].as_array().unwrap().len(), 1);
    assert_eq!(body["data"]["items"][0]["name"], "C");
    assert_eq!(body["data"]["pagination"]["total_pages"], 2);

    let (status, _) = app.get("/api/v1/projects?page=0", &pm.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/v1/projects?per_page=101", &pm.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let (status, _) = app.get("/api/v1/projects?status=sleeping", &pm.token).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_team_lead_membership_grants_edit() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    let dev = app.create_user("dev@example.com", GlobalRole::Developer).await;
    let project_id = app
        .create_project(&pm, "Apollo", json!([{ "user_id": dev.id, "role": "DEVELOPER" }]))
        .await;
    let uri = format!("/api/v1/projects/{project_id}");

    let (status, _) = app.put(&uri, &dev.token, json!({ "description": "mine now" })).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, body) = app
        .put(
            &format!("/api/v1/projects/{project_id}/members/{}", dev.id),
            &pm.token,
            json!({ "role": "TEAM_LEAD" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["role"], "TEAM_LEAD");
    assert_eq!(body["data"]["email"], "dev@example.com");

    let (status, body) = app
        .put(&uri, &dev.token, json!({ "description": "led by dev", "status": "active" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["project"]["description"], "led by dev");
    assert_eq!(body["data"]["project"]["status"], "active");
    assert!(body["data"].get("membership_changes").is_none());

    // Team leads can not delete the project.
    let (status, _) = app.delete(&uri, &dev.token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn test_member_management() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    let dev = app.create_user("dev@example.com", GlobalRole::Developer).await;
    let project_id = app.create_project(&pm, "Apollo", json!([])).await;
    let members_uri = format!("/api/v1/projects/{project_id}/members");

    let (status, body) = app
        .post(&members_uri, &pm.token, json!({ "user_id": dev.id, "role": "qa" }))
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["email"], "dev@example.com");

    let (status, body) = app
        .post(&members_uri, &pm.token, json!({ "user_id": dev.id, "role": "TEAM_LEAD" }))
        .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(error_code(&body), "CONFLICT");
    assert_eq!(member_count(&app, project_id).await, 2);

    let (status, _) = app
        .post(&members_uri, &pm.token, json!({ "user_id": dev.id, "role": "JANITOR" }))
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .post(&members_uri, &pm.token, json!({ "user_id": Uuid::new_v4(), "role": "QA" }))
        .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let member_uri = format!("{members_uri}/{}", dev.id);
    let (status, _) = app.delete(&member_uri, &pm.token).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = app.delete(&member_uri, &pm.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(member_count(&app, project_id).await, 1);
}

#[tokio::test]
async fn test_member_list_reconciliation() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    let dev = app.create_user("dev@example.com", GlobalRole::Developer).await;
    let qa = app.create_user("qa@example.com", GlobalRole::Qa).await;
    let project_id = app
        .create_project(&pm, "Apollo", json!([{ "user_id": dev.id, "role": "DEVELOPER" }]))
        .await;
    let uri = format!("/api/v1/projects/{project_id}");

    let members = json!([
        { "user_id": pm.id, "role": "PROJECT_MANAGER" },
        { "user_id": qa.id, "role": "QA" },
    ]);
    let (status, body) = app.put(&uri, &pm.token, json!({ "members": members })).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(
        body["data"]["membership_changes"],
        json!({ "created": 1, "updated": 0, "removed": 1 })
    );

    let (_, body) = app.put(&uri, &pm.token, json!({ "members": members })).await;
    assert_eq!(
        body["data"]["membership_changes"],
        json!({ "created": 0, "updated": 0, "removed": 0 })
    );

    let duplicated = json!([
        { "user_id": qa.id, "role": "QA" },
        { "user_id": qa.id, "role": "DEVELOPER" },
    ]);
    let (status, _) = app.put(&uri, &pm.token, json!({ "members": duplicated })).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(member_count(&app, project_id).await, 2);
}

#[tokio::test]
async fn test_delete_project_cascades() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    let project_id = app.create_project(&pm, "Doomed", json!([])).await;
    let task_id = app.create_task(&pm, project_id, "Last task").await;

    let (status, _) = app
        .post(
            &format!("/api/v1/tasks/{task_id}/comments"),
            &pm.token,
            json!({ "body": "bye" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
    let (status, _) = app
        .post(
            &format!("/api/v1/tasks/{task_id}/time-logs"),
            &pm.token,
            json!({ "minutes": 30, "log_date": "2026-01-05" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);

    let (status, _) = app.delete(&format!("/api/v1/projects/{project_id}"), &pm.token).await;
    assert_eq!(status, StatusCode::OK);

    assert_eq!(member_count(&app, project_id).await, 0);
    assert_eq!(tasks::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(comments::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(time_logs::Entity::find().count(&app.db).await.unwrap(), 0);
    assert_eq!(attachments::Entity::find().count(&app.db).await.unwrap(), 0);
    let (status, _) = app.get(&format!("/api/v1/projects/{project_id}"), &pm.token).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_milestone_lifecycle() {
    let app = TestApp::new().await;
    let pm = app.create_user("pm@example.com", GlobalRole::ProjectManager).await;
    let dev = app.create_user("dev@example.com", GlobalRole::Developer).await;
    let project_id = app
        .create_project(&pm, "Apollo", json!([{ "user_id": dev.id, "role": "DEVELOPER" }]))
        .await;

    let (status, body) = app
        .post(
            &format!("/api/v1/projects/{project_id}/milestones"),
            &pm.token,
            json!({ "name": "Beta", "due_date": "2026-12-01" }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["status"], "open");
    let milestone_id = id_of(&body);

    let (status, body) = app
        .post(
            &format!("/api/v1/projects/{project_id}/tasks"),
            &dev.token,
            json!({ "title": "Ship it", "milestone_id": milestone_id }),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    let task_id = id_of(&body);

    let (status, body) = app
        .put(
            &format!("/api/v1/milestones/{milestone_id}"),
            &pm.token,
            json!({ "status": "completed" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["status"], "completed");

    let (status, body) = app
        .get(&format!("/api/v1/projects/{project_id}/milestones"), &dev.token)
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);

    let (status, _) = app.delete(&format!("/api/v1/milestones/{milestone_id}"), &pm.token).await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app.get(&format!("/api/v1/tasks/{task_id}"), &dev.token).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body["data"]["milestone_id"].is_null());
}
