//! 日历详情与日历内更新接口

mod common;

use actix_web::{App, http::StatusCode, test};
use serde_json::{Value, json};

use common::{PASSWORD, bearer, fixture, peer};
use heso_schedule::middlewares::LOGIN_REQUIRED_MESSAGE;

#[actix_web::test]
async fn test_lesson_details_requires_login() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/lesson_details/")
        .peer_addr(peer())
        .set_json(json!({ "lessonId": f.lesson.id }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], LOGIN_REQUIRED_MESSAGE);
}

#[actix_web::test]
async fn test_lesson_details_visibility() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    for (user, expected) in [
        (&f.teacher, StatusCode::OK),
        (&f.student, StatusCode::OK),
        (&f.superuser, StatusCode::OK),
        (&f.other_student, StatusCode::FORBIDDEN),
        (&f.other_teacher, StatusCode::FORBIDDEN),
    ] {
        let req = test::TestRequest::post()
            .uri("/schedule/lesson_details/")
            .peer_addr(peer())
            .insert_header(bearer(user))
            .set_json(json!({ "lessonId": f.lesson.id.to_string() }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), expected, "user {}", user.username);
    }

    let req = test::TestRequest::post()
        .uri("/schedule/lesson_details/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({ "lessonId": f.lesson.id }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    let lesson = &body["lesson"];
    assert_eq!(lesson["title"], "English 101 (1/1) | teacher1");
    assert_eq!(lesson["backgroundColor"], f.class.color);
    assert_eq!(lesson["extendedProps"]["class_topic"], "Introduction");
    assert_eq!(lesson["extendedProps"]["meeting_link"], "https://zoom.us/j/123456");
    assert_eq!(lesson["extendedProps"]["teacher_id"], f.teacher.id);
    assert_eq!(
        lesson["extendedProps"]["students"][0]["username"],
        f.student.username
    );
}

#[actix_web::test]
async fn test_lesson_details_missing_lesson() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/lesson_details/")
        .peer_addr(peer())
        .insert_header(bearer(&f.superuser))
        .set_json(json!({ "lessonId": 9999 }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
}

#[actix_web::test]
async fn test_update_lesson_requires_login() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .set_json(json!({ "id": f.lesson.id, "description": "changed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let lesson = f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().unwrap();
    assert_eq!(lesson.description.as_deref(), Some("First lesson"));
}

#[actix_web::test]
async fn test_update_lesson_forbidden_for_student() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .insert_header(bearer(&f.student))
        .set_json(json!({ "id": f.lesson.id, "description": "changed" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["message"],
        "You do not have permission to update this lesson."
    );
}

#[actix_web::test]
async fn test_update_lesson_partial_fields() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "id": f.lesson.id,
            "start": "2024-03-06T09:00:00Z",
            "end": "2024-03-06T11:00:00Z",
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    assert_eq!(body["message"], "Lesson updated successfully.");

    let lesson = f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().unwrap();
    assert_eq!(lesson.start_time.to_rfc3339(), "2024-03-06T09:00:00+00:00");
    assert_eq!(lesson.end_time.to_rfc3339(), "2024-03-06T11:00:00+00:00");
    // 未提交的字段保持不变
    assert_eq!(lesson.description.as_deref(), Some("First lesson"));
    assert_eq!(lesson.meeting_link.as_deref(), Some("https://zoom.us/j/123456"));
}

#[actix_web::test]
async fn test_update_lesson_switch_to_on_site_clears_link() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({ "id": f.lesson.id, "location": "on-site" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let lesson = f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().unwrap();
    assert!(!lesson.location.is_online());
    assert_eq!(lesson.meeting_link, None);
}

#[actix_web::test]
async fn test_update_lesson_online_requires_link() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({ "id": f.lesson.id, "meeting_link": null }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Meeting link is required for online lessons.");

    let lesson = f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().unwrap();
    assert_eq!(lesson.meeting_link.as_deref(), Some("https://zoom.us/j/123456"));
}

#[actix_web::test]
async fn test_update_lesson_reassign_teacher_and_students() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .insert_header(bearer(&f.superuser))
        .set_json(json!({
            "id": f.lesson.id,
            "teacher": f.other_teacher.id.to_string(),
            "students": [f.other_student.id, f.third_student.id.to_string()],
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["lesson"]["extendedProps"]["teacher_id"],
        f.other_teacher.id
    );

    let lesson = f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().unwrap();
    assert_eq!(lesson.title, "English 101 (1/1) | teacher2");

    let class = f.storage.get_class_by_id(f.class.id).await.unwrap().unwrap();
    assert_eq!(class.teacher_id, f.other_teacher.id);
    let mut students = class.student_ids.clone();
    students.sort_unstable();
    assert_eq!(students, vec![f.other_student.id, f.third_student.id]);
}

#[actix_web::test]
async fn test_update_lesson_unknown_teacher_changes_nothing() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({
            "id": f.lesson.id,
            "description": "changed",
            "teacher": 9999,
            "students": [f.other_student.id],
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let lesson = f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().unwrap();
    assert_eq!(lesson.description.as_deref(), Some("First lesson"));
    let class = f.storage.get_class_by_id(f.class.id).await.unwrap().unwrap();
    assert_eq!(class.teacher_id, f.teacher.id);
    assert_eq!(class.student_ids, vec![f.student.id]);
}

#[actix_web::test]
async fn test_update_lesson_multipart_with_upload() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let boundary = "----hesoboundary";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"lessonId\"\r\n\r\n{id}\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"description\"\r\n\r\nBring your notebook\r\n\
         --{b}\r\nContent-Disposition: form-data; name=\"new_materials\"; filename=\"slides.txt\"\r\n\
         Content-Type: text/plain\r\n\r\nslide content\r\n\
         --{b}--\r\n",
        b = boundary,
        id = f.lesson.id
    );

    let req = test::TestRequest::post()
        .uri("/schedule/update-lesson/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .insert_header((
            "Content-Type",
            format!("multipart/form-data; boundary={boundary}"),
        ))
        .set_payload(body)
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["status"], "success");
    assert_eq!(
        body["lesson"]["extendedProps"]["description"],
        "Bring your notebook"
    );
    assert_eq!(
        body["lesson"]["extendedProps"]["materials"][0]["title"],
        "slides.txt"
    );

    let materials = f.storage.list_materials().await.unwrap();
    assert_eq!(materials.len(), 1);
}

#[actix_web::test]
async fn test_calendar_lists_events() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::get()
        .uri("/schedule/")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let events = body["data"].as_array().cloned().unwrap_or_default();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["id"], f.lesson.id);
}

#[actix_web::test]
async fn test_anonymous_details_ignores_body() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let empty = test::TestRequest::post()
        .uri("/schedule/lesson_details/")
        .peer_addr(peer())
        .to_request();
    let bad_id = test::TestRequest::post()
        .uri("/schedule/lesson_details/")
        .peer_addr(peer())
        .set_json(json!({ "lessonId": "abc" }))
        .to_request();

    for req in [empty, bad_id] {
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["status"], "error");
        assert_eq!(body["message"], LOGIN_REQUIRED_MESSAGE);
    }
}

#[actix_web::test]
async fn test_bad_details_body_after_login() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/lesson_details/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(json!({ "lessonId": "abc" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["status"], "error");
    assert_eq!(body["message"], "Invalid lesson request.");
}

#[actix_web::test]
async fn test_teacher_flow_from_login_to_calendar() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/users/login/")
        .peer_addr(peer())
        .set_json(json!({ "username": f.teacher.username, "password": PASSWORD }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let token = body["data"]["access_token"]
        .as_str()
        .expect("access token")
        .to_string();
    let auth = ("Authorization", format!("Bearer {token}"));

    let req = test::TestRequest::post()
        .uri("/schedule/classes/create/")
        .peer_addr(peer())
        .insert_header(auth.clone())
        .set_json(json!({
            "title": "Conversation 201",
            "description": "Speaking practice",
            "students": [f.student.id],
            "term": "Spring 2024",
            "start_date": "2024-03-01",
            "end_date": "2024-06-30",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);
    let body: Value = test::read_body_json(resp).await;
    let class_id = body["data"]["id"].as_i64().expect("class id");

    let uri = format!("/schedule/classes/{class_id}/lessons/create/");
    for (title, start, end) in [
        ("Small talk", "2024-03-11T09:00:00Z", "2024-03-11T10:00:00Z"),
        ("Debate", "2024-03-18T09:00:00Z", "2024-03-18T10:00:00Z"),
    ] {
        let req = test::TestRequest::post()
            .uri(&uri)
            .peer_addr(peer())
            .insert_header(auth.clone())
            .set_json(json!({
                "title": title,
                "start_time": start,
                "end_time": end,
                "location": "on-site",
            }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);
    }

    let req = test::TestRequest::get()
        .uri("/schedule/")
        .peer_addr(peer())
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    let titles: Vec<(String, String)> = body["data"]
        .as_array()
        .cloned()
        .unwrap_or_default()
        .iter()
        .map(|event| {
            (
                event["extendedProps"]["class_topic"]
                    .as_str()
                    .unwrap_or_default()
                    .to_string(),
                event["title"].as_str().unwrap_or_default().to_string(),
            )
        })
        .collect();

    assert!(titles.contains(&(
        "Small talk".to_string(),
        "Conversation 201 (1/2) | teacher1".to_string()
    )));
    assert!(titles.contains(&(
        "Debate".to_string(),
        "Conversation 201 (2/2) | teacher1".to_string()
    )));
}
