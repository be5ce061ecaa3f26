//! 集成测试共用的应用环境与数据

#![allow(dead_code)]

use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

use actix_web::web;
use chrono::{NaiveDate, TimeZone, Utc};

use heso_schedule::cache::ObjectCache;
use heso_schedule::cache::object_cache::moka::MokaCacheWrapper;
use heso_schedule::mail::{Mailer, MemoryMailer};
use heso_schedule::models::classes::{EnglishClass, NewClass};
use heso_schedule::models::lessons::{Lesson, LessonInput, LessonLocation, LessonStatus};
use heso_schedule::models::schedules::ScheduleInput;
use heso_schedule::models::users::{CreateUserRequest, User, UserRole};
use heso_schedule::routes;
use heso_schedule::storage::Storage;
use heso_schedule::storage::sea_orm_storage::SeaOrmStorage;
use heso_schedule::utils::jwt::JwtUtils;
use heso_schedule::utils::password::hash_password;

pub const PASSWORD: &str = "password123";

/// 测试数据：一名超级管理员、两名教师、三名学生，一个班级和一个课时
pub struct Fixture {
    pub storage: Arc<dyn Storage>,
    pub cache: Arc<dyn ObjectCache>,
    pub mailer: MemoryMailer,
    pub superuser: User,
    pub teacher: User,
    pub other_teacher: User,
    pub student: User,
    pub other_student: User,
    pub third_student: User,
    pub class: EnglishClass,
    pub lesson: Lesson,
}

pub async fn empty_storage() -> Arc<dyn Storage> {
    Arc::new(
        SeaOrmStorage::from_url("sqlite::memory:")
            .await
            .expect("in-memory storage"),
    )
}

pub async fn create_user(storage: &Arc<dyn Storage>, username: &str, role: UserRole) -> User {
    storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password: hash_password(PASSWORD).expect("hash"),
            role,
            phone_number: None,
            enrollment_date: None,
        })
        .await
        .expect("create user")
}

pub async fn fixture() -> Fixture {
    let storage = empty_storage().await;
    let cache: Arc<dyn ObjectCache> = Arc::new(MokaCacheWrapper::new().expect("moka cache"));

    let superuser = create_user(&storage, "root", UserRole::Superuser).await;
    let teacher = create_user(&storage, "teacher1", UserRole::Teacher).await;
    let other_teacher = create_user(&storage, "teacher2", UserRole::Teacher).await;
    let student = create_user(&storage, "student1", UserRole::Student).await;
    let other_student = create_user(&storage, "student2", UserRole::Student).await;
    let third_student = create_user(&storage, "student3", UserRole::Student).await;

    let class = storage
        .create_class_with_schedule(
            NewClass {
                title: "English 101".to_string(),
                description: "English 101 Description".to_string(),
                color: "hsl(10, 100%, 30%)".to_string(),
                teacher_id: teacher.id,
                student_ids: vec![student.id],
            },
            ScheduleInput {
                term: "Spring 2024".to_string(),
                start_date: NaiveDate::from_ymd_opt(2024, 3, 4).expect("date"),
                end_date: NaiveDate::from_ymd_opt(2024, 5, 31).expect("date"),
            },
        )
        .await
        .expect("create class");

    let lesson = storage
        .create_lesson(
            class.id,
            LessonInput {
                title: "Introduction".to_string(),
                description: Some("First lesson".to_string()),
                start_time: Utc.with_ymd_and_hms(2024, 3, 5, 10, 0, 0).unwrap(),
                end_time: Utc.with_ymd_and_hms(2024, 3, 5, 12, 0, 0).unwrap(),
                meeting_link: Some("https://zoom.us/j/123456".to_string()),
                location: LessonLocation::Online,
                status: LessonStatus::Planned,
                material_ids: Vec::new(),
            },
        )
        .await
        .expect("create lesson");

    Fixture {
        storage,
        cache,
        mailer: MemoryMailer::new(),
        superuser,
        teacher,
        other_teacher,
        student,
        other_student,
        third_student,
        class,
        lesson,
    }
}

impl Fixture {
    /// 与服务器相同的路由和 app_data
    pub fn configure(&self) -> impl FnOnce(&mut web::ServiceConfig) + use<> {
        let storage = self.storage.clone();
        let cache = self.cache.clone();
        let mailer: Arc<dyn Mailer> = Arc::new(self.mailer.clone());
        move |cfg: &mut web::ServiceConfig| {
            cfg.app_data(web::Data::new(storage))
                .app_data(web::Data::new(cache))
                .app_data(web::Data::new(mailer))
                .configure(routes::configure_routes);
        }
    }
}

pub fn bearer(user: &User) -> (&'static str, String) {
    let token = JwtUtils::generate_access_token(user.id, user.role.as_str()).expect("token");
    ("Authorization", format!("Bearer {token}"))
}

static NEXT_PEER: AtomicU32 = AtomicU32::new(1);

/// 每次返回不同的客户端地址，避免触发按 IP 的限流
pub fn peer() -> SocketAddr {
    let n = NEXT_PEER.fetch_add(1, Ordering::Relaxed);
    let [_, b, c, d] = n.to_be_bytes();
    SocketAddr::from(([10, b, c, d], 40000))
}
