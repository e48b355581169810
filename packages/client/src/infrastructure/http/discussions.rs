//! Discussion forum endpoints. Mutations are Bearer-authenticated.

use crate::infrastructure::dto::http::{
    CommentDto, CommentRequest, CreateDiscussionRequest, DiscussionDto, VoteRequest,
};

use super::client::{ApiClient, ApiError};

impl ApiClient {
    /// `GET /discussion/:id`
    pub async fn discussion(&self, discussion_id: &str) -> Result<DiscussionDto, ApiError> {
        self.get_json(&format!("/discussion/{}", discussion_id))
            .await
    }

    /// `POST /discussion/:id` — create under the given board/topic id
    pub async fn create_discussion(
        &self,
        board_id: &str,
        request: &CreateDiscussionRequest,
    ) -> Result<DiscussionDto, ApiError> {
        self.post_json(&format!("/discussion/{}", board_id), request)
            .await
    }

    /// `POST /discussion/:id/comments`
    pub async fn add_comment(
        &self,
        discussion_id: &str,
        content: &str,
    ) -> Result<CommentDto, ApiError> {
        self.post_json(
            &format!("/discussion/{}/comments", discussion_id),
            &CommentRequest {
                content: content.to_string(),
            },
        )
        .await
    }

    /// `POST /discussion/:id/vote` — +1 or -1
    pub async fn vote_discussion(
        &self,
        discussion_id: &str,
        direction: i8,
    ) -> Result<(), ApiError> {
        self.post_json_unit(
            &format!("/discussion/{}/vote", discussion_id),
            &VoteRequest { direction },
        )
        .await
    }
}
