//! 班级课时列表与课时表单

mod common;

use actix_web::{App, http::StatusCode, test};
use serde_json::{Value, json};

use common::{bearer, fixture, peer};

#[actix_web::test]
async fn test_lesson_list_access() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;
    let uri = format!("/schedule/classes/{}/lessons/", f.class.id);

    let req = test::TestRequest::get()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(&f.student))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["can_manage"], false);
    assert_eq!(body["data"]["lessons"][0]["lesson_number"], 1);
    assert_eq!(body["data"]["lessons"][0]["total_lessons"], 1);

    let req = test::TestRequest::get()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["can_manage"], true);

    let req = test::TestRequest::get()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(&f.other_student))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_create_lesson_and_validation() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;
    let uri = format!("/schedule/classes/{}/lessons/create/", f.class.id);

    let req = test::TestRequest::post()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "title": "Grammar",
            "start_time": "2024-03-08 10:00",
            "end_time": "2024-03-08 12:00",
            "location": "on-line",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["meeting_link"][0],
        "Meeting link is required for online lessons."
    );

    let req = test::TestRequest::post()
        .uri(&uri)
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "title": "Grammar",
            "start_time": "2024-03-08T10:00:00Z",
            "end_time": "2024-03-08T12:00:00Z",
            "location": "on-site",
            "meeting_link": "https://zoom.us/j/1",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let lessons = f.storage.list_lessons_for_class(f.class.id).await.unwrap();
    assert_eq!(lessons.len(), 2);
    let created = lessons.iter().find(|l| l.title == "Grammar").unwrap();
    // 线下课不保留会议链接
    assert_eq!(created.meeting_link, None);
}

#[actix_web::test]
async fn test_student_edit_form_is_read_only() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/schedule/update-lesson/{}/", f.lesson.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.student))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(
        body["data"]["disabled_fields"].as_array().map(Vec::len),
        Some(8)
    );

    let req = test::TestRequest::post()
        .uri(&format!("/schedule/update-lesson/{}/", f.lesson.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.student))
        .set_json(json!({
            "title": "Hijacked",
            "start_time": "2024-03-05T10:00:00Z",
            "end_time": "2024-03-05T12:00:00Z",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_delete_lesson() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/schedule/lessons/{}/delete/", f.lesson.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["message"], "Lesson deleted successfully.");
    assert_eq!(body["data"]["class_id"], f.class.id);

    assert!(f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().is_none());
    assert!(f.storage.get_class_by_id(f.class.id).await.unwrap().is_some());
}
