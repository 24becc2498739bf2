use eyre::Result;
use log::debug;
use sqlx::types::Uuid;
use validator::Validate;

use crate::domain::project::{
    CreateProjectRequest, NewProject, Project, ProjectQuery, PROJECT_CATEGORIES, PROJECT_STATUSES,
};
use crate::error::Error;
use crate::repository::projects::ProjectRepository;
use crate::service::users::ensure_link;

#[derive(Clone)]
pub struct ProjectService {
    pub project_repository: ProjectRepository,
}

impl ProjectService {
    pub async fn list(&self, user_id: Uuid, query: ProjectQuery) -> Result<Vec<Project>> {
        let limit = query.limit();
        self.project_repository
            .list(user_id, query.status, limit)
            .await
    }

    pub async fn create(&self, user_id: Uuid, request: CreateProjectRequest) -> Result<Project> {
        let project = validate_new_project(request)?;
        let project = self.project_repository.create(user_id, project).await?;
        debug!("User {} added project {}", user_id, project.id);
        Ok(project)
    }

    pub async fn get(&self, user_id: Uuid, id: i64) -> Result<Project> {
        self.project_repository
            .get(user_id, id)
            .await?
            .ok_or_else(|| Error::ProjectNotFound.into())
    }

    pub async fn delete(&self, user_id: Uuid, id: i64) -> Result<Project> {
        self.project_repository
            .delete(user_id, id)
            .await?
            .ok_or_else(|| Error::ProjectNotFound.into())
    }
}

pub fn validate_new_project(request: CreateProjectRequest) -> Result<NewProject, Error> {
    let request = CreateProjectRequest {
        name: request.name.trim().to_string(),
        role: request.role.trim().to_string(),
        description: request.description.trim().to_string(),
        ..request
    };
    request.validate()?;

    if !PROJECT_CATEGORIES.contains(&request.category.as_str()) {
        return Err(Error::Validation(format!(
            "Category must be one of: {}",
            PROJECT_CATEGORIES.join(", ")
        )));
    }
    let status = request.status.unwrap_or_else(|| "active".to_string());
    if !PROJECT_STATUSES.contains(&status.as_str()) {
        return Err(Error::Validation(format!(
            "Status must be one of: {}",
            PROJECT_STATUSES.join(", ")
        )));
    }
    ensure_link("link", request.link.as_deref())?;
    let link = request
        .link
        .map(|link| link.trim().to_string())
        .filter(|link| !link.is_empty());

    Ok(NewProject {
        name: request.name,
        role: request.role,
        description: request.description,
        link,
        category: request.category,
        status,
    })
}
