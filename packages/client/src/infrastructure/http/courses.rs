//! Course endpoints: catalogue, enrollment, progress and certificates.
//!
//! Chapter completion for non-quiz content is client-reported; the
//! backend records it without proof of engagement.

use crate::infrastructure::dto::http::{
    CertificateDto, CourseDto, ProgressDto, QuizResultDto, QuizSubmissionRequest,
};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /api/courses`
    pub async fn courses(&self) -> Result<Vec<CourseDto>, ApiError> {
        self.get_json("/api/courses").await
    }

    /// `GET /api/courses/:id`
    pub async fn course(&self, course_id: &str) -> Result<CourseDto, ApiError> {
        self.get_json(&format!("/api/courses/{}", course_id)).await
    }

    /// `POST /api/courses/:id/enroll`
    pub async fn enroll(&self, course_id: &str) -> Result<(), ApiError> {
        self.post_unit(&format!("/api/courses/{}/enroll", course_id))
            .await
    }

    /// `GET /api/courses/:id/progress`
    pub async fn course_progress(&self, course_id: &str) -> Result<ProgressDto, ApiError> {
        self.get_json(&format!("/api/courses/{}/progress", course_id))
            .await
    }

    /// `POST /api/courses/:id/chapters/:chapterId/complete`
    pub async fn complete_chapter(
        &self,
        course_id: &str,
        chapter_id: &str,
    ) -> Result<(), ApiError> {
        self.post_unit(&format!(
            "/api/courses/{}/chapters/{}/complete",
            course_id, chapter_id
        ))
        .await
    }

    /// `POST /api/courses/:id/quizzes/:quizId/submit`
    pub async fn submit_quiz(
        &self,
        course_id: &str,
        quiz_id: &str,
        submission: &QuizSubmissionRequest,
    ) -> Result<QuizResultDto, ApiError> {
        self.post_json(
            &format!("/api/courses/{}/quizzes/{}/submit", course_id, quiz_id),
            submission,
        )
        .await
    }

    /// `GET /api/courses/:id/certificate`
    pub async fn certificate(&self, course_id: &str) -> Result<CertificateDto, ApiError> {
        self.get_json(&format!("/api/courses/{}/certificate", course_id))
            .await
    }
}
