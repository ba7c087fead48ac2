use axum::{
    extract::{Extension, Path},
    Json,
};
use std::sync::Arc;
use tracing::info;

use super::authorization::require_access;
use super::models::{
    AccessLevel, AddMemberRequest, ChangeAccessRequest, Company, CompanyCreated,
    CreateCompanyRequest, Member,
};
use super::services::CompaniesService;
use crate::auth::AuthedUser;
use crate::common::{ApiError, AppJson, AppState, MessageResponse};

/// POST /v0/company/create - Create a company with the caller as Admin
pub async fn create_company(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    AppJson(request): AppJson<CreateCompanyRequest>,
) -> Result<Json<CompanyCreated>, ApiError> {
    let companies_service = CompaniesService::new(state.db.clone());
    let company_id = companies_service
        .create_company_and_add_user(request, &user.id)
        .await?;

    Ok(Json(CompanyCreated {
        message: "created company".to_string(),
        company_id,
    }))
}

/// GET /v0/company/search/:query - Companies whose name contains the query
pub async fn search_companies(
    Extension(state): Extension<Arc<AppState>>,
    _user: AuthedUser,
    Path(query): Path<String>,
) -> Result<Json<Vec<Company>>, ApiError> {
    let companies_service = CompaniesService::new(state.db.clone());
    Ok(Json(companies_service.search(&query).await?))
}

/// POST /v0/company/:company/adduser - Invite a user by email or username (Admin)
pub async fn add_member(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
    AppJson(request): AppJson<AddMemberRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_access(&state.db, &user.id, &company_id, AccessLevel::Admin).await?;

    let identifier = request.identifier()?;
    let companies_service = CompaniesService::new(state.db.clone());
    companies_service
        .add_member(&company_id, &identifier, request.access_level)
        .await?;

    Ok(Json(MessageResponse::new("user added to company")))
}

/// POST /v0/company/:company/permission - Change a member's access level (Admin)
pub async fn change_permission(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
    AppJson(request): AppJson<ChangeAccessRequest>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_access(&state.db, &user.id, &company_id, AccessLevel::Admin).await?;

    let companies_service = CompaniesService::new(state.db.clone());
    companies_service
        .change_member_access(&company_id, &request.user_id, request.access_level)
        .await?;

    info!(
        admin_id = %user.id,
        company_id = %company_id,
        user_id = %request.user_id,
        "Permission changed"
    );
    Ok(Json(MessageResponse::new("permission changed")))
}

/// GET /v0/company/:company/users - Member list (Admin)
pub async fn list_members(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path(company_id): Path<String>,
) -> Result<Json<Vec<Member>>, ApiError> {
    require_access(&state.db, &user.id, &company_id, AccessLevel::Admin).await?;

    let companies_service = CompaniesService::new(state.db.clone());
    Ok(Json(companies_service.list_members(&company_id).await?))
}

/// DELETE /v0/company/:company/user/:userid - Remove a member (Admin)
pub async fn remove_member(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
    Path((company_id, member_id)): Path<(String, String)>,
) -> Result<Json<MessageResponse>, ApiError> {
    require_access(&state.db, &user.id, &company_id, AccessLevel::Admin).await?;

    let companies_service = CompaniesService::new(state.db.clone());
    companies_service.remove_member(&company_id, &member_id).await?;

    Ok(Json(MessageResponse::new("user removed from company")))
}

/// GET /v0/user/companies - Companies the caller belongs to
pub async fn my_companies(
    Extension(state): Extension<Arc<AppState>>,
    user: AuthedUser,
) -> Result<Json<Vec<Company>>, ApiError> {
    let companies_service = CompaniesService::new(state.db.clone());
    Ok(Json(companies_service.companies_for_user(&user.id).await?))
}
