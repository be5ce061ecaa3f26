//! 演示数据
//!
//! 规划函数都是纯函数，随机性由调用方传入的 `Rng` 提供，
//! 上一个学期的开始日期作为参数显式传递。重复运行会重复创建班级和课时，用户会复用。

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, Weekday};
use rand::Rng;
use rand::seq::IndexedRandom;
use std::collections::HashSet;
use std::sync::Arc;
use tracing::info;

use crate::config::AppConfig;
use crate::errors::{HesoError, Result};
use crate::models::classes::NewClass;
use crate::models::lessons::{LessonInput, LessonLocation, LessonStatus};
use crate::models::materials::{MaterialType, NewMaterial};
use crate::models::schedules::ScheduleInput;
use crate::models::users::{CreateUserRequest, User, UserRole};
use crate::storage::Storage;
use crate::utils::color::assign_color;
use crate::utils::password::hash_password;

pub const SEED_PASSWORD: &str = "password123";
pub const SUPERUSER_NAME: &str = "SuperAdmin";
pub const SUPERUSER_EMAIL: &str = "super@admin.email";
pub const SUPERUSER_PASSWORD: &str = "heso_password";
pub const SEED_TERM: &str = "Spring 2024";
pub const SEED_YEAR: i32 = 2024;
pub const SEED_MONTH: u32 = 3;
pub const STUDENT_COUNT: usize = 9;

const MEETING_LINK_ALPHABET: &[u8] =
    b"abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";
const LESSON_HOURS: std::ops::RangeInclusive<u32> = 9..=16;
const LESSON_LENGTH_HOURS: i64 = 2;

/// 演示班级
#[derive(Debug, Clone, Copy)]
pub struct ClassPlan {
    pub title: &'static str,
    pub teacher: &'static str,
    pub lesson_titles: &'static [&'static str],
}

pub const CLASS_PLANS: &[ClassPlan] = &[
    ClassPlan {
        title: "English 101",
        teacher: "teacher1",
        lesson_titles: &["Alphabet and Phonics", "Basic Grammar", "Simple Conversations"],
    },
    ClassPlan {
        title: "English 102",
        teacher: "teacher2",
        lesson_titles: &["Intermediate Grammar", "Writing Skills", "Speaking and Listening"],
    },
    ClassPlan {
        title: "Advanced English",
        teacher: "teacher1",
        lesson_titles: &["Advanced Grammar", "Business English", "Literature"],
    },
];

/// 规划出的一节课
#[derive(Debug, Clone, PartialEq)]
pub struct LessonSlot {
    pub title: String,
    pub description: String,
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,
    pub location: LessonLocation,
    pub meeting_link: Option<String>,
}

/// 运行结果统计
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PopulateSummary {
    pub users_created: usize,
    pub classes: usize,
    pub lessons: usize,
    pub materials: usize,
}

/// 学期起止日期
///
/// 第一个学期在当月 1–3 日开始，之后每个比上一个晚 1–3 天；持续 28–30 天。
pub fn schedule_dates<R: Rng + ?Sized>(
    rng: &mut R,
    year: i32,
    month: u32,
    last_start: Option<NaiveDate>,
) -> Result<(NaiveDate, NaiveDate)> {
    let start = match last_start {
        Some(last) => last + Duration::days(rng.random_range(1..=3)),
        None => NaiveDate::from_ymd_opt(year, month, rng.random_range(1..=3)).ok_or_else(
            || HesoError::validation(format!("Invalid seed month: {year}-{month}")),
        )?,
    };
    let end = start + Duration::days(rng.random_range(28..=30));
    Ok((start, end))
}

/// 把学期展开为课时：跳过周日，整点开始，每节 2 小时，间隔 2–4 天
pub fn lesson_slots<R: Rng + ?Sized>(
    rng: &mut R,
    start_date: NaiveDate,
    end_date: NaiveDate,
    titles: &[&str],
) -> Vec<LessonSlot> {
    let mut slots = Vec::new();
    if titles.is_empty() {
        return slots;
    }

    let mut current = start_date;
    while current <= end_date {
        if current.weekday() == Weekday::Sun {
            current += Duration::days(1);
            continue;
        }

        let hour = rng.random_range(LESSON_HOURS);
        let Some(start_time) = current.and_hms_opt(hour, 0, 0) else {
            current += Duration::days(1);
            continue;
        };
        let title = titles[rng.random_range(0..titles.len())].to_string();
        let location = if rng.random_bool(0.5) {
            LessonLocation::Online
        } else {
            LessonLocation::OnSite
        };
        let meeting_link = location.is_online().then(|| meeting_link(rng));

        slots.push(LessonSlot {
            description: format!("Description for {title}"),
            title,
            start_time,
            end_time: start_time + Duration::hours(LESSON_LENGTH_HOURS),
            location,
            meeting_link,
        });

        current += Duration::days(rng.random_range(2..=4));
    }
    slots
}

/// `https://meet.google.com/` 加 10 个随机字母数字
pub fn meeting_link<R: Rng + ?Sized>(rng: &mut R) -> String {
    let code: String = (0..10)
        .map(|_| MEETING_LINK_ALPHABET[rng.random_range(0..MEETING_LINK_ALPHABET.len())] as char)
        .collect();
    format!("https://meet.google.com/{code}")
}

/// 每节课 1–3 份资料，标题在整个运行中唯一
pub fn material_titles<R: Rng + ?Sized>(
    rng: &mut R,
    lesson_title: &str,
    used: &mut HashSet<String>,
) -> Vec<(String, MaterialType)> {
    let count = rng.random_range(1..=3);
    let mut result = Vec::with_capacity(count);

    for _ in 0..count {
        let material_type = MaterialType::seed_types()
            .choose(rng)
            .copied()
            .unwrap_or(MaterialType::Book);

        let mut title = String::new();
        for _ in 0..100 {
            title = format!(
                "Material for {lesson_title} N{} : {material_type}",
                rng.random_range(1..=100)
            );
            if !used.contains(&title) {
                break;
            }
        }
        // 随机编号耗尽时追加序号
        if used.contains(&title) {
            title = format!("{title} #{}", used.len() + 1);
        }

        used.insert(title.clone());
        result.push((title, material_type));
    }
    result
}

async fn ensure_user(
    storage: &Arc<dyn Storage>,
    username: &str,
    email: &str,
    password: &str,
    role: UserRole,
    enrollment_date: Option<NaiveDate>,
    summary: &mut PopulateSummary,
) -> Result<User> {
    if let Some(user) = storage.get_user_by_username(username).await? {
        return Ok(user);
    }

    let user = storage
        .create_user(CreateUserRequest {
            username: username.to_string(),
            email: email.to_string(),
            password: hash_password(password)?,
            role,
            phone_number: None,
            enrollment_date,
        })
        .await?;
    summary.users_created += 1;
    Ok(user)
}

/// 写入演示数据
pub async fn populate<R: Rng + ?Sized>(
    storage: &Arc<dyn Storage>,
    rng: &mut R,
) -> Result<PopulateSummary> {
    let mut summary = PopulateSummary::default();
    let today = chrono::Utc::now().date_naive();

    ensure_user(
        storage,
        SUPERUSER_NAME,
        SUPERUSER_EMAIL,
        SUPERUSER_PASSWORD,
        UserRole::Superuser,
        None,
        &mut summary,
    )
    .await?;

    let mut teachers = Vec::new();
    for name in ["teacher1", "teacher2"] {
        let email = format!("{name}@example.com");
        let teacher = ensure_user(
            storage,
            name,
            &email,
            SEED_PASSWORD,
            UserRole::Teacher,
            None,
            &mut summary,
        )
        .await?;
        teachers.push(teacher);
    }

    let mut students = Vec::with_capacity(STUDENT_COUNT);
    for i in 1..=STUDENT_COUNT {
        let name = format!("student{i}");
        let email = format!("{name}@example.com");
        let student = ensure_user(
            storage,
            &name,
            &email,
            SEED_PASSWORD,
            UserRole::Student,
            Some(today),
            &mut summary,
        )
        .await?;
        students.push(student);
    }

    let color = &AppConfig::get().color;
    let mut used_materials = HashSet::new();
    let mut last_start = None;

    for plan in CLASS_PLANS {
        let teacher = teachers
            .iter()
            .find(|t| t.username == plan.teacher)
            .ok_or_else(|| HesoError::not_found(format!("Teacher {} not found", plan.teacher)))?;

        let student_count = rng.random_range(3..=5).min(students.len());
        let student_ids = students
            .choose_multiple(rng, student_count)
            .map(|s| s.id)
            .collect();

        let used_colors = storage.list_used_colors(None).await?;
        let class_color = assign_color(
            rng,
            plan.title,
            &used_colors,
            color.saturation,
            color.lightness,
        );

        let (start_date, end_date) = schedule_dates(rng, SEED_YEAR, SEED_MONTH, last_start)?;
        last_start = Some(start_date);

        let class = storage
            .create_class_with_schedule(
                NewClass {
                    title: plan.title.to_string(),
                    description: format!("{} Description", plan.title),
                    color: class_color,
                    teacher_id: teacher.id,
                    student_ids,
                },
                ScheduleInput {
                    term: SEED_TERM.to_string(),
                    start_date,
                    end_date,
                },
            )
            .await?;
        summary.classes += 1;

        for slot in lesson_slots(rng, start_date, end_date, plan.lesson_titles) {
            let lesson = storage
                .create_lesson(
                    class.id,
                    LessonInput {
                        description: Some(slot.description),
                        start_time: slot.start_time.and_utc(),
                        end_time: slot.end_time.and_utc(),
                        meeting_link: slot.meeting_link,
                        location: slot.location,
                        status: LessonStatus::Planned,
                        material_ids: Vec::new(),
                        title: slot.title,
                    },
                )
                .await?;
            summary.lessons += 1;

            for (title, material_type) in material_titles(rng, &lesson.title, &mut used_materials) {
                let material = storage
                    .create_material(NewMaterial {
                        title,
                        material_type,
                        content: None,
                    })
                    .await?;
                storage.link_material(lesson.id, material.id).await?;
                summary.materials += 1;
            }
        }

        info!("Seeded class {} ({})", class.title, class.id);
    }

    Ok(summary)
}
