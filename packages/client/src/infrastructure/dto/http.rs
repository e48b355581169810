//! REST request/response DTOs.
//!
//! Field names follow the backend's camelCase JSON. Response DTOs default
//! optional collections so older backend versions that omit them still
//! deserialize.

use serde::{Deserialize, Serialize};

pub use super::websocket::{ChatMessageDto, ParticipantDto, RoomDto};

// ========================================
// Auth
// ========================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub username: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub username: String,
    pub email: String,
    pub password: String,
    pub role: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    pub token: String,
    pub user: UserDto,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub id: String,
    pub username: String,
    #[serde(default)]
    pub role: Option<String>,
    #[serde(default)]
    pub coins: Option<i64>,
}

// ========================================
// Problems / submissions
// ========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDto {
    pub id: String,
    pub title: String,
    pub difficulty: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeRequest {
    pub code: String,
    pub language: String,
}

/// Per-test-case grading result: the submission flow shows pass/fail per
/// case rather than one opaque error when the grader returns partial
/// results
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TestCaseResultDto {
    pub passed: bool,
    #[serde(default)]
    pub input: String,
    #[serde(default)]
    pub expected: String,
    #[serde(default)]
    pub actual: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunResultDto {
    #[serde(default)]
    pub results: Vec<TestCaseResultDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitResultDto {
    pub status: String,
    #[serde(default)]
    pub passed_cases: u32,
    #[serde(default)]
    pub total_cases: u32,
    #[serde(default)]
    pub results: Vec<TestCaseResultDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorialDto {
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionDto {
    pub id: String,
    pub language: String,
    pub status: String,
    /// Unix milliseconds
    pub submitted_at: i64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SolutionDto {
    pub id: String,
    pub author: String,
    pub content: String,
    #[serde(default)]
    pub votes: i64,
}

// ========================================
// Contests
// ========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestDto {
    pub id: String,
    pub title: String,
    /// Unix milliseconds
    pub start_time: i64,
    /// Unix milliseconds
    pub end_time: i64,
    #[serde(default)]
    pub participants: Vec<ContestParticipantDto>,
    #[serde(default)]
    pub rankings: Vec<ContestRankingDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestParticipantDto {
    pub user_id: String,
    pub username: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContestRankingDto {
    pub user_id: String,
    pub username: String,
    pub score: i64,
    pub rank: u32,
}

// ========================================
// Discussions
// ========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiscussionDto {
    pub id: String,
    pub title: String,
    pub content: String,
    pub author: String,
    #[serde(default)]
    pub votes: i64,
    #[serde(default)]
    pub comments: Vec<CommentDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentDto {
    pub id: String,
    pub author: String,
    pub content: String,
    /// Unix milliseconds
    pub created_at: i64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDiscussionRequest {
    pub title: String,
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CommentRequest {
    pub content: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct VoteRequest {
    /// +1 upvote, -1 downvote
    pub direction: i8,
}

// ========================================
// Chat (REST side)
// ========================================

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateRoomRequest {
    pub name: String,
    #[serde(rename = "type")]
    pub room_type: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostMessageRequest {
    pub content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserSearchResultDto {
    pub user_id: String,
    pub username: String,
}

// ========================================
// Courses
// ========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub modules: Vec<CourseModuleDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CourseModuleDto {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub chapters: Vec<ChapterDto>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChapterDto {
    pub id: String,
    pub title: String,
    /// "video" | "article" | "quiz"
    #[serde(default)]
    pub content_type: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressDto {
    #[serde(default)]
    pub completed_chapters: Vec<String>,
    #[serde(default)]
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizSubmissionRequest {
    pub answers: Vec<QuizAnswerDto>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswerDto {
    pub question_id: String,
    pub answer: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuizResultDto {
    pub score: f64,
    pub passed: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CertificateDto {
    pub url: String,
}

// ========================================
// Documents (articles)
// ========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubjectDto {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDto {
    pub id: String,
    pub subject_id: String,
    pub title: String,
    /// Article body in the block storage format
    #[serde(default)]
    pub content: Vec<codethrone_editor::BlockNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateSubjectRequest {
    pub name: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateDocumentRequest {
    pub subject_id: String,
    pub title: String,
    pub content: Vec<codethrone_editor::BlockNode>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateDocumentRequest {
    pub title: String,
    pub content: Vec<codethrone_editor::BlockNode>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadImageResponse {
    pub url: String,
    pub public_id: String,
}

// ========================================
// Redeem store
// ========================================

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RedeemItemDto {
    pub id: String,
    pub name: String,
    /// Price in platform coins
    pub cost: i64,
    #[serde(default)]
    pub stock: Option<i64>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderRequest {
    pub item_id: String,
    pub quantity: u32,
    pub delivery_address: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderResponse {
    pub order_id: String,
    pub status: String,
}
