use reqwest::Method;

use super::{AdminClient, ClientError};
use crate::models::*;

impl AdminClient {
    // ============================================================
    // Article Operations
    // ============================================================

    pub async fn list_articles(&self) -> Result<Vec<Article>, ClientError> {
        self.fetch(self.request(Method::GET, "/articles")).await
    }

    pub async fn get_article(&self, id: &str) -> Result<Article, ClientError> {
        self.fetch(self.request(Method::GET, &format!("/articles/{}", id)))
            .await
    }

    pub async fn create_article(
        &self,
        input: &CreateArticleRequest,
    ) -> Result<Article, ClientError> {
        self.fetch(self.request(Method::POST, "/articles").json(input))
            .await
    }

    pub async fn update_article(
        &self,
        id: &str,
        input: &CreateArticleRequest,
    ) -> Result<Article, ClientError> {
        self.fetch(
            self.request(Method::PUT, &format!("/articles/{}", id))
                .json(input),
        )
        .await
    }

    pub async fn delete_article(&self, id: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, &format!("/articles/{}", id)))
            .await
    }

    // ============================================================
    // Category Operations
    // ============================================================

    pub async fn list_categories(&self) -> Result<Vec<Category>, ClientError> {
        self.fetch(self.request(Method::GET, "/categories")).await
    }

    pub async fn get_category(&self, id: i64) -> Result<Category, ClientError> {
        self.fetch(self.request(Method::GET, &format!("/categories/{}", id)))
            .await
    }

    pub async fn create_category(
        &self,
        input: &CreateCategoryRequest,
    ) -> Result<Category, ClientError> {
        self.fetch(self.request(Method::POST, "/categories").json(input))
            .await
    }

    pub async fn update_category(
        &self,
        id: i64,
        input: &CreateCategoryRequest,
    ) -> Result<Category, ClientError> {
        self.fetch(
            self.request(Method::PUT, &format!("/categories/{}", id))
                .json(input),
        )
        .await
    }

    pub async fn delete_category(&self, id: i64) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, &format!("/categories/{}", id)))
            .await
    }

    // ============================================================
    // User Operations
    // ============================================================

    /// One page of users. The backend reports no total, so `total` is the
    /// length of the page.
    pub async fn list_users(&self, page: u32, limit: u32) -> Result<UserPage, ClientError> {
        let envelope: UserListEnvelope = self
            .fetch(
                self.request(Method::GET, "/users")
                    .query(&[("page", page), ("limit", limit)]),
            )
            .await?;

        let users = envelope.data.users.unwrap_or_default();
        Ok(UserPage {
            total: users.len(),
            data: users,
            page,
            limit,
        })
    }

    pub async fn get_user(&self, id: &str) -> Result<User, ClientError> {
        let envelope: DataEnvelope<User> = self
            .fetch(self.request(Method::GET, &format!("/users/{}", id)))
            .await?;
        Ok(envelope.data)
    }

    pub async fn create_user(&self, input: &UserInput) -> Result<User, ClientError> {
        let envelope: DataEnvelope<User> = self
            .fetch(self.request(Method::POST, "/users").json(input))
            .await?;
        Ok(envelope.data)
    }

    pub async fn update_user(&self, id: &str, input: &UserInput) -> Result<User, ClientError> {
        let envelope: DataEnvelope<User> = self
            .fetch(
                self.request(Method::PATCH, &format!("/users/{}", id))
                    .json(input),
            )
            .await?;
        Ok(envelope.data)
    }

    pub async fn delete_user(&self, id: &str) -> Result<(), ClientError> {
        self.execute(self.request(Method::DELETE, &format!("/users/{}", id)))
            .await
    }
}
