//! 班级的创建、更新与删除

mod common;

use actix_web::{App, http::StatusCode, test};
use serde_json::{Value, json};

use common::{bearer, fixture, peer};
use heso_schedule::utils::color::hsl_color_with;

fn class_form(title: &str, teacher: Option<i64>, students: &[i64]) -> Value {
    json!({
        "title": title,
        "description": format!("{title} Description"),
        "teacher": teacher,
        "students": students,
        "term": "Autumn 2024",
        "start_date": "2024-09-02",
        "end_date": "2024-12-20",
    })
}

#[actix_web::test]
async fn test_teacher_creates_class_with_generated_color() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/classes/create/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(class_form("English 102", None, &[f.student.id, f.other_student.id]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Class created successfully.");
    assert_eq!(body["data"]["teacher_id"], f.teacher.id);
    assert_eq!(body["data"]["color"], hsl_color_with("English 102", 100, 30));
    assert_eq!(body["data"]["schedule"]["term"], "Autumn 2024");
    assert_eq!(body["data"]["students"].as_array().map(Vec::len), Some(2));
}

#[actix_web::test]
async fn test_duplicate_color_rejected() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let mut form = class_form("English 103", Some(f.teacher.id), &[f.student.id]);
    form["color"] = json!(f.class.color);

    let req = test::TestRequest::post()
        .uri("/schedule/classes/create/")
        .peer_addr(peer())
        .insert_header(bearer(&f.superuser))
        .set_json(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["color"][0],
        "This color is already used by another class."
    );
}

#[actix_web::test]
async fn test_class_form_field_errors() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/classes/create/")
        .peer_addr(peer())
        .insert_header(bearer(&f.superuser))
        .set_json(json!({
            "title": "",
            "teacher": f.student.id,
            "students": [f.teacher.id],
            "term": "Autumn 2024",
            "start_date": "not-a-date",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    let errors = &body["data"];
    assert!(errors["title"].is_array());
    assert!(errors["teacher"].is_array());
    assert!(errors["students"].is_array());
    assert_eq!(errors["start_date"][0], "Enter a valid date.");
    assert_eq!(errors["end_date"][0], "This field is required.");
}

#[actix_web::test]
async fn test_student_cannot_create_class() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/classes/create/")
        .peer_addr(peer())
        .insert_header(bearer(&f.student))
        .set_json(class_form("English 104", None, &[f.student.id]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_teacher_cannot_create_for_another_teacher() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/schedule/classes/create/")
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(class_form("English 105", Some(f.other_teacher.id), &[f.student.id]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_update_class_replaces_students() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let mut form = class_form("English 101", Some(f.teacher.id), &[f.other_student.id]);
    form["color"] = json!(f.class.color);

    let req = test::TestRequest::post()
        .uri(&format!("/schedule/classes/{}/update/", f.class.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(form)
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let class = f.storage.get_class_by_id(f.class.id).await.unwrap().unwrap();
    assert_eq!(class.student_ids, vec![f.other_student.id]);
    assert_eq!(class.color, f.class.color);

    let schedule = f
        .storage
        .get_canonical_schedule(f.class.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(schedule.term, "Autumn 2024");
}

#[actix_web::test]
async fn test_only_superuser_reassigns_class_teacher() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri(&format!("/schedule/classes/{}/update/", f.class.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .set_json(class_form("English 101", Some(f.other_teacher.id), &[f.student.id]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::post()
        .uri(&format!("/schedule/classes/{}/update/", f.class.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.other_teacher))
        .set_json(class_form("English 101", Some(f.other_teacher.id), &[f.student.id]))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[actix_web::test]
async fn test_delete_class_cascades() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::get()
        .uri(&format!("/schedule/classes/{}/delete/", f.class.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["lesson_count"], 1);

    let req = test::TestRequest::post()
        .uri(&format!("/schedule/classes/{}/delete/", f.class.id))
        .peer_addr(peer())
        .insert_header(bearer(&f.teacher))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    assert!(f.storage.get_class_by_id(f.class.id).await.unwrap().is_none());
    assert!(f.storage.get_lesson_by_id(f.lesson.id).await.unwrap().is_none());
    assert!(
        f.storage
            .get_canonical_schedule(f.class.id)
            .await
            .unwrap()
            .is_none()
    );
    // 用户不受影响
    assert!(f.storage.get_user_by_id(f.student.id).await.unwrap().is_some());
}

#[actix_web::test]
async fn test_class_list_is_public() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::get()
        .uri("/schedule/classes/?search=English")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["data"]["items"][0]["title"], "English 101");
}

#[actix_web::test]
async fn test_back_to_back_classes_get_distinct_colors() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let mut colors = Vec::new();
    for _ in 0..2 {
        let req = test::TestRequest::post()
            .uri("/schedule/classes/create/")
            .peer_addr(peer())
            .insert_header(bearer(&f.teacher))
            .set_json(class_form("Phonics", None, &[f.student.id]))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        colors.push(body["data"]["color"].as_str().unwrap_or_default().to_string());
    }

    assert!(colors.iter().all(|c| c.starts_with("hsl(") && c.ends_with(", 100%, 30%)")));
    assert_ne!(colors[0], colors[1]);
    assert_ne!(colors[1], f.class.color);
}
