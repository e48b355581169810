//! Problem and submission endpoints.

use crate::infrastructure::dto::http::{
    CodeRequest, EditorialDto, ProblemDto, RunResultDto, SolutionDto, SubmissionDto,
    SubmitResultDto,
};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /problems/:id`
    pub async fn problem(&self, problem_id: &str) -> Result<ProblemDto, ApiError> {
        self.get_json(&format!("/problems/{}", problem_id)).await
    }

    /// `POST /problems/:id/run` — run against the visible test cases
    pub async fn run_code(
        &self,
        problem_id: &str,
        code: &str,
        language: &str,
    ) -> Result<RunResultDto, ApiError> {
        self.post_json(
            &format!("/problems/{}/run", problem_id),
            &CodeRequest {
                code: code.to_string(),
                language: language.to_string(),
            },
        )
        .await
    }

    /// `POST /problems/:id/submit` — full grading, pass/fail per case
    pub async fn submit_code(
        &self,
        problem_id: &str,
        code: &str,
        language: &str,
    ) -> Result<SubmitResultDto, ApiError> {
        self.post_json(
            &format!("/problems/{}/submit", problem_id),
            &CodeRequest {
                code: code.to_string(),
                language: language.to_string(),
            },
        )
        .await
    }

    /// `GET /problems/:id/editorial`
    pub async fn editorial(&self, problem_id: &str) -> Result<EditorialDto, ApiError> {
        self.get_json(&format!("/problems/{}/editorial", problem_id))
            .await
    }

    /// `GET /problems/:id/submissions` — the caller's own submissions
    pub async fn submissions(&self, problem_id: &str) -> Result<Vec<SubmissionDto>, ApiError> {
        self.get_json(&format!("/problems/{}/submissions", problem_id))
            .await
    }

    /// `GET /problems/:id/solutions` — community solutions
    pub async fn solutions(&self, problem_id: &str) -> Result<Vec<SolutionDto>, ApiError> {
        self.get_json(&format!("/problems/{}/solutions", problem_id))
            .await
    }
}
