//! 注册、登录与当前用户

mod common;

use actix_web::{App, http::StatusCode, test};
use serde_json::{Value, json};

use common::{PASSWORD, bearer, fixture, peer};
use heso_schedule::models::users::UserRole;

#[actix_web::test]
async fn test_register_creates_student_and_sends_welcome_mail() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::post()
        .uri("/users/register/")
        .peer_addr(peer())
        .set_json(json!({
            "username": "newstudent",
            "email": "newstudent@example.com",
            "password1": "Str0ngPassw0rd!",
            "password2": "Str0ngPassw0rd!",
            "phone_number": "+1234567890",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::CREATED);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "Account created for newstudent!");

    let user = f
        .storage
        .get_user_by_username("newstudent")
        .await
        .unwrap()
        .unwrap();
    assert_eq!(user.role, UserRole::Student);

    let sent = f.mailer.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].to, vec!["newstudent@example.com".to_string()]);
    assert_eq!(sent[0].subject, "Welcome to HESO!");
}

#[actix_web::test]
async fn test_register_rejects_duplicates_and_mismatch() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;
    let users_before = f.storage.count_users().await.unwrap();

    let req = test::TestRequest::post()
        .uri("/users/register/")
        .peer_addr(peer())
        .set_json(json!({
            "username": f.student.username,
            "email": f.student.email,
            "password1": "Str0ngPassw0rd!",
            "password2": "Different0ne!",
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(
        body["data"]["username"][0],
        "A user with that username already exists."
    );
    assert_eq!(
        body["data"]["email"][0],
        "This email address is already in use."
    );
    assert_eq!(
        body["data"]["password2"][0],
        "The two password fields didn't match."
    );

    assert_eq!(f.storage.count_users().await.unwrap(), users_before);
    assert!(f.mailer.sent().is_empty());
}

#[actix_web::test]
async fn test_login_with_username_or_email() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    for identifier in [f.teacher.username.clone(), f.teacher.email.clone()] {
        let req = test::TestRequest::post()
            .uri("/users/login/")
            .peer_addr(peer())
            .set_json(json!({ "username": identifier, "password": PASSWORD }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        assert!(resp.response().cookies().any(|c| c.name() == "access_token"));

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["message"], "You have successfully logged in.");
        assert_eq!(body["data"]["user"]["username"], f.teacher.username);
        assert!(body["data"]["access_token"].as_str().is_some());
    }

    let req = test::TestRequest::post()
        .uri("/users/login/")
        .peer_addr(peer())
        .set_json(json!({ "username": f.teacher.username, "password": "wrong" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_me_requires_login() {
    let f = fixture().await;
    let app = test::init_service(App::new().configure(f.configure())).await;

    let req = test::TestRequest::get()
        .uri("/users/me/")
        .peer_addr(peer())
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);

    let req = test::TestRequest::get()
        .uri("/users/me/")
        .peer_addr(peer())
        .insert_header(bearer(&f.student))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(body["data"]["user"]["username"], f.student.username);
    assert_eq!(body["data"]["user"]["role"], "student");
}
