//! Courses, their embedded lessons, and standalone learning objects.
//!
//! # Invariants
//! - `progress` values are percentages in `0..=100`.
//! - A course counts as completed for a user once progress reaches 100.

use super::{impl_entity, Entity, EntityId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const COMPLETE_PERCENT: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CourseStatus {
    #[default]
    Draft,
    Published,
    Archived,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LessonKind {
    Video,
    #[default]
    Reading,
    Quiz,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub kind: LessonKind,
    #[serde(default)]
    pub duration_minutes: u32,
    #[serde(default)]
    pub video_url: Option<String>,
    #[serde(default)]
    pub completed_by: Vec<EntityId>,
}

impl Lesson {
    pub fn is_completed_by(&self, user_id: &str) -> bool {
        self.completed_by.iter().any(|id| id == user_id)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Course {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub instructor: String,
    #[serde(default)]
    pub thumbnail_url: Option<String>,
    #[serde(default)]
    pub status: CourseStatus,
    #[serde(default)]
    pub lessons: Vec<Lesson>,
    /// User ids this course is assigned to.
    #[serde(default)]
    pub assigned_to: Vec<EntityId>,
    /// Completion percentage keyed by user id.
    #[serde(default)]
    pub progress: BTreeMap<EntityId, u8>,
    pub created_at: i64,
}

impl Entity for Course {
    const KEY: &'static str = "lms_courses";

    fn id(&self) -> &str {
        &self.id
    }

    /// Also numbers embedded lessons `<courseId>-<n>` from 1, so a new course
    /// is complete before its first write.
    fn assign_identity(&mut self, id: EntityId, created_at: i64) {
        for (index, lesson) in self.lessons.iter_mut().enumerate() {
            lesson.id = format!("{id}-{}", index + 1);
        }
        self.id = id;
        self.created_at = created_at;
    }
}

impl Course {
    pub fn is_assigned_to(&self, user_id: &str) -> bool {
        self.assigned_to.iter().any(|id| id == user_id)
    }

    pub fn progress_for(&self, user_id: &str) -> u8 {
        self.progress.get(user_id).copied().unwrap_or(0)
    }

    pub fn is_completed_by(&self, user_id: &str) -> bool {
        self.progress_for(user_id) >= COMPLETE_PERCENT
    }

    pub fn total_duration_minutes(&self) -> u32 {
        self.lessons.iter().map(|lesson| lesson.duration_minutes).sum()
    }

    /// Recomputes one user's progress from lesson completions and stores it.
    ///
    /// A course without lessons leaves the stored value untouched.
    pub fn recompute_progress(&mut self, user_id: &str) -> u8 {
        if self.lessons.is_empty() {
            return self.progress_for(user_id);
        }
        let done = self
            .lessons
            .iter()
            .filter(|lesson| lesson.is_completed_by(user_id))
            .count();
        let percent = lesson_percent(done, self.lessons.len());
        self.progress.insert(user_id.to_string(), percent);
        percent
    }
}

fn lesson_percent(done: usize, total: usize) -> u8 {
    let ratio = done as f64 / total as f64;
    (ratio * 100.0).round().clamp(0.0, 100.0) as u8
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewLesson {
    pub title: String,
    pub content: String,
    pub kind: LessonKind,
    pub duration_minutes: u32,
    pub video_url: Option<String>,
}

impl NewLesson {
    pub fn new(title: impl Into<String>, kind: LessonKind, duration_minutes: u32) -> Self {
        Self {
            title: title.into(),
            content: String::new(),
            kind,
            duration_minutes,
            video_url: None,
        }
    }
}

/// Input for creating a course.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct NewCourse {
    pub title: String,
    pub description: String,
    pub category: String,
    pub instructor: String,
    pub status: CourseStatus,
    pub lessons: Vec<NewLesson>,
}

impl NewCourse {
    pub fn new(title: impl Into<String>, category: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            category: category.into(),
            ..Self::default()
        }
    }

    pub fn into_course(self) -> Course {
        Course {
            id: EntityId::new(),
            title: self.title,
            description: self.description,
            category: self.category,
            instructor: self.instructor,
            thumbnail_url: None,
            status: self.status,
            lessons: self
                .lessons
                .into_iter()
                .map(|lesson| Lesson {
                    id: EntityId::new(),
                    title: lesson.title,
                    content: lesson.content,
                    kind: lesson.kind,
                    duration_minutes: lesson.duration_minutes,
                    video_url: lesson.video_url,
                    completed_by: Vec::new(),
                })
                .collect(),
            assigned_to: Vec::new(),
            progress: BTreeMap::new(),
            created_at: 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LearningObjectKind {
    #[default]
    Document,
    Video,
    Link,
    Scorm,
}

/// Reusable material that may or may not belong to a course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LearningObject {
    pub id: EntityId,
    pub title: String,
    #[serde(default)]
    pub kind: LearningObjectKind,
    pub url: String,
    #[serde(default)]
    pub course_id: Option<EntityId>,
    pub created_at: i64,
}

impl_entity!(LearningObject, "lms_learning_objects");

impl LearningObject {
    pub fn new(
        title: impl Into<String>,
        kind: LearningObjectKind,
        url: impl Into<String>,
        course_id: Option<EntityId>,
    ) -> Self {
        Self {
            id: EntityId::new(),
            title: title.into(),
            kind,
            url: url.into(),
            course_id,
            created_at: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{Course, LessonKind, NewCourse, NewLesson};
    use crate::model::Entity;

    fn three_lesson_course() -> Course {
        let mut new_course = NewCourse::new("Onboarding", "hr");
        new_course.lessons = vec![
            NewLesson::new("Welcome", LessonKind::Video, 5),
            NewLesson::new("Policies", LessonKind::Reading, 20),
            NewLesson::new("Check", LessonKind::Quiz, 10),
        ];
        let mut course = new_course.into_course();
        for (index, lesson) in course.lessons.iter_mut().enumerate() {
            lesson.id = format!("l{index}");
        }
        course
    }

    #[test]
    fn recompute_progress_rounds_lesson_ratio() {
        let mut course = three_lesson_course();
        course.lessons[0].completed_by.push("u1".to_string());

        assert_eq!(course.recompute_progress("u1"), 33);
        course.lessons[1].completed_by.push("u1".to_string());
        assert_eq!(course.recompute_progress("u1"), 67);
        assert!(!course.is_completed_by("u1"));

        course.lessons[2].completed_by.push("u1".to_string());
        assert_eq!(course.recompute_progress("u1"), 100);
        assert!(course.is_completed_by("u1"));
        assert_eq!(course.progress_for("u2"), 0);
    }

    #[test]
    fn total_duration_sums_lessons() {
        assert_eq!(three_lesson_course().total_duration_minutes(), 35);
    }

    #[test]
    fn course_json_uses_camel_case_keys() {
        let mut course = three_lesson_course();
        course.assigned_to.push("u1".to_string());
        let value = serde_json::to_value(&course).unwrap();
        assert!(value.get("assignedTo").is_some());
        assert!(value.get("createdAt").is_some());
        assert!(value["lessons"][0].get("durationMinutes").is_some());
    }

    #[test]
    fn assign_identity_numbers_lessons_from_course_id() {
        let mut course = three_lesson_course();
        course.assign_identity("1700000000000".to_string(), 42);

        let ids = course
            .lessons
            .iter()
            .map(|lesson| lesson.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(
            ids,
            vec!["1700000000000-1", "1700000000000-2", "1700000000000-3"]
        );
        assert_eq!(course.created_at, 42);
    }
}
