//! Contest endpoints. Participant, submission and ranking data come
//! embedded in the contest payload.

use crate::infrastructure::dto::http::{ContestDto, ProblemDto};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /contests/:id`
    pub async fn contest(&self, contest_id: &str) -> Result<ContestDto, ApiError> {
        self.get_json(&format!("/contests/{}", contest_id)).await
    }

    /// `GET /contests/:id/problems`
    pub async fn contest_problems(&self, contest_id: &str) -> Result<Vec<ProblemDto>, ApiError> {
        self.get_json(&format!("/contests/{}/problems", contest_id))
            .await
    }
}
