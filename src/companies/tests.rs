//! Tests for companies module
//!
//! These tests verify:
//! - Access level ordering and wire format
//! - Company creation, search and membership management
//! - The authorization check and its HTTP mapping

#[cfg(test)]
mod tests {
    use super::super::*;
    use crate::app::build_router;
    use crate::common::test_support::{
        auth_cookie, empty_request, insert_user, json_request, send, test_pool, test_state,
    };
    use crate::common::{ApiError, Validator};
    use axum::http::StatusCode;
    use models::{AddMemberRequest, CreateCompanyRequest};
    use serde_json::json;
    use services::{CompaniesService, MemberIdentifier};
    use std::sync::Arc;

    #[test]
    fn test_access_level_ordering_is_monotonic() {
        for held in AccessLevel::ALL {
            for required in AccessLevel::ALL {
                if held.permits(required) {
                    for higher in AccessLevel::ALL.iter().filter(|l| l.id() < held.id()) {
                        assert!(higher.permits(required), "{} should permit {}", higher, required);
                    }
                }
            }
        }
        assert!(AccessLevel::Admin.permits(AccessLevel::Read));
        assert!(!AccessLevel::Read.permits(AccessLevel::Write));
    }

    #[test]
    fn test_access_level_serde() {
        assert_eq!(serde_json::to_value(AccessLevel::Write).unwrap(), json!("write"));

        let by_name: AccessLevel = serde_json::from_value(json!("Admin")).unwrap();
        let by_id: AccessLevel = serde_json::from_value(json!(3)).unwrap();
        assert_eq!(by_name, AccessLevel::Admin);
        assert_eq!(by_id, AccessLevel::Read);

        assert!(serde_json::from_value::<AccessLevel>(json!(7)).is_err());
        assert!(serde_json::from_value::<AccessLevel>(json!("owner")).is_err());
        assert_eq!(AccessLevel::from_id(2), Some(AccessLevel::Write));
    }

    #[test]
    fn test_company_name_validation() {
        let empty = CreateCompanyRequest { name: "  ".to_string() };
        assert!(!empty.validate(&empty).is_valid());

        let long = CreateCompanyRequest { name: "x".repeat(256) };
        assert!(long.validate(&long).has_error("name"));

        let ok = CreateCompanyRequest { name: "coolio".to_string() };
        assert!(ok.validate(&ok).is_valid());
    }

    #[test]
    fn test_add_member_needs_exactly_one_identifier() {
        let request = |email: Option<&str>, username: Option<&str>| AddMemberRequest {
            email: email.map(str::to_string),
            username: username.map(str::to_string),
            access_level: AccessLevel::Read,
        };

        assert!(request(None, None).identifier().is_err());
        assert!(request(Some("a@b.no"), Some("ab")).identifier().is_err());
        assert!(request(Some("not-an-email"), None).identifier().is_err());
        assert_eq!(
            request(Some(" john@doe.no "), None).identifier().unwrap(),
            MemberIdentifier::Email("john@doe.no".to_string())
        );
        assert_eq!(
            request(None, Some("john")).identifier().unwrap(),
            MemberIdentifier::Username("john".to_string())
        );
    }

    #[tokio::test]
    async fn test_create_company_and_membership_lifecycle() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "Kris", "ok@ok.com").await;
        let john = insert_user(&pool, "John", "john@doe.no").await;
        let service = CompaniesService::new(pool.clone());

        let company = service
            .create_company_and_add_user(CreateCompanyRequest { name: "coolio".to_string() }, &owner)
            .await
            .unwrap();
        assert!(company.starts_with("C_"));

        let added = service
            .add_member(&company, &MemberIdentifier::Email("john@doe.no".to_string()), AccessLevel::Write)
            .await
            .unwrap();
        assert_eq!(added, john);

        let again = service
            .add_member(&company, &MemberIdentifier::Username("john".to_string()), AccessLevel::Read)
            .await;
        assert!(matches!(again, Err(ApiError::Conflict(_))));

        let members = service.list_members(&company).await.unwrap();
        assert_eq!(members.len(), 2);
        assert_eq!(members[0].user_id, owner);
        assert_eq!(members[0].access_level, AccessLevel::Admin);
        assert_eq!(members[1].access_level, AccessLevel::Write);

        service
            .change_member_access(&company, &john, AccessLevel::Read)
            .await
            .unwrap();
        assert!(!is_authorized(&pool, &john, &company, AccessLevel::Write).await.unwrap());
        assert!(is_authorized(&pool, &john, &company, AccessLevel::Read).await.unwrap());

        service.remove_member(&company, &john).await.unwrap();
        assert!(!is_authorized(&pool, &john, &company, AccessLevel::Read).await.unwrap());
        assert!(matches!(
            service.remove_member(&company, &john).await,
            Err(ApiError::NotFound(_))
        ));
        assert!(matches!(
            service.change_member_access(&company, &john, AccessLevel::Admin).await,
            Err(ApiError::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn test_add_unknown_user_is_not_found() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "Kris", "ok@ok.com").await;
        let service = CompaniesService::new(pool.clone());
        let company = service
            .create_company_and_add_user(CreateCompanyRequest { name: "coolio".to_string() }, &owner)
            .await
            .unwrap();

        let result = service
            .add_member(&company, &MemberIdentifier::Email("ghost@doe.no".to_string()), AccessLevel::Read)
            .await;
        assert!(matches!(result, Err(ApiError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_search_and_companies_for_user() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "Kris", "ok@ok.com").await;
        let other = insert_user(&pool, "John", "john@doe.no").await;
        let service = CompaniesService::new(pool.clone());

        for name in ["coolio", "Cool Beans", "100% juice"] {
            service
                .create_company_and_add_user(CreateCompanyRequest { name: name.to_string() }, &owner)
                .await
                .unwrap();
        }

        let found: Vec<String> = service
            .search("cool")
            .await
            .unwrap()
            .into_iter()
            .map(|c| c.name)
            .collect();
        assert_eq!(found, vec!["Cool Beans".to_string(), "coolio".to_string()]);

        let percent = service.search("%").await.unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].name, "100% juice");

        assert_eq!(service.companies_for_user(&owner).await.unwrap().len(), 3);
        assert!(service.companies_for_user(&other).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_non_member_is_denied_every_level() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "Kris", "ok@ok.com").await;
        let stranger = insert_user(&pool, "John", "john@doe.no").await;
        let company = CompaniesService::new(pool.clone())
            .create_company_and_add_user(CreateCompanyRequest { name: "coolio".to_string() }, &owner)
            .await
            .unwrap();

        for level in AccessLevel::ALL {
            assert!(is_authorized(&pool, &owner, &company, level).await.unwrap());
            assert!(!is_authorized(&pool, &stranger, &company, level).await.unwrap());
        }
        assert!(matches!(
            require_access(&pool, &stranger, &company, AccessLevel::Read).await,
            Err(ApiError::Unauthorized(_))
        ));
    }

    #[tokio::test]
    async fn test_lookup_failure_is_an_error_not_a_denial() {
        let pool = test_pool().await;
        pool.close().await;

        assert!(is_authorized(&pool, "U_1", "C_1", AccessLevel::Read).await.is_err());
        assert!(matches!(
            require_access(&pool, "U_1", "C_1", AccessLevel::Read).await,
            Err(ApiError::DatabaseError(_))
        ));
    }

    #[tokio::test]
    async fn test_company_endpoints() {
        let state = test_state().await;
        let owner = insert_user(&state.db, "Kris", "ok@ok.com").await;
        let john = insert_user(&state.db, "John", "john@doe.no").await;
        let app = build_router(Arc::new(state));
        let owner_cookie = auth_cookie(&owner);
        let john_cookie = auth_cookie(&john);

        let (status, headers, body) = send(
            &app,
            json_request("POST", "/v0/company/create", Some(&owner_cookie), json!({ "name": "coolio" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["message"], "created company");
        assert!(headers.get("set-cookie").is_some());
        let company = body["companyId"].as_str().unwrap().to_string();

        let add_uri = format!("/v0/company/{}/adduser", company);
        let (status, _, _) = send(
            &app,
            json_request(
                "POST",
                &add_uri,
                Some(&owner_cookie),
                json!({ "email": "john@doe.no", "accessLevel": "write" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, _) = send(
            &app,
            json_request(
                "POST",
                &add_uri,
                Some(&owner_cookie),
                json!({ "email": "john@doe.no", "accessLevel": 2 }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        // Write is not enough to manage members
        let users_uri = format!("/v0/company/{}/users", company);
        let (status, _, _) = send(&app, empty_request("GET", &users_uri, Some(&john_cookie))).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);

        let (status, _, members) =
            send(&app, empty_request("GET", &users_uri, Some(&owner_cookie))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(members[1]["userId"], john.as_str());
        assert_eq!(members[1]["accessLevel"], "write");

        let (status, _, _) = send(
            &app,
            json_request(
                "POST",
                &format!("/v0/company/{}/permission", company),
                Some(&owner_cookie),
                json!({ "userId": john, "accessLevel": "read" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _, found) = send(
            &app,
            empty_request("GET", "/v0/company/search/cool", Some(&john_cookie)),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(found[0]["name"], "coolio");

        let (_, _, mine) =
            send(&app, empty_request("GET", "/v0/user/companies", Some(&john_cookie))).await;
        assert_eq!(mine.as_array().unwrap().len(), 1);

        let (status, _, _) = send(
            &app,
            empty_request(
                "DELETE",
                &format!("/v0/company/{}/user/{}", company, john),
                Some(&owner_cookie),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (_, _, mine) =
            send(&app, empty_request("GET", "/v0/user/companies", Some(&john_cookie))).await;
        assert!(mine.as_array().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_add_member_with_bad_access_level_is_json_400() {
        let state = test_state().await;
        let owner = insert_user(&state.db, "Kris", "ok@ok.com").await;
        insert_user(&state.db, "John", "john@doe.no").await;
        let company = CompaniesService::new(state.db.clone())
            .create_company_and_add_user(CreateCompanyRequest { name: "coolio".to_string() }, &owner)
            .await
            .unwrap();
        let pool = state.db.clone();
        let app = build_router(Arc::new(state));
        let owner_cookie = auth_cookie(&owner);
        let add_uri = format!("/v0/company/{}/adduser", company);

        for body in [
            json!({ "email": "john@doe.no" }),
            json!({ "email": "john@doe.no", "accessLevel": "owner" }),
            json!({ "email": "john@doe.no", "accessLevel": 9 }),
        ] {
            let (status, _, response) =
                send(&app, json_request("POST", &add_uri, Some(&owner_cookie), body.clone())).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "body {}", body);
            assert_eq!(response["code"], "BAD_REQUEST");
            assert_eq!(response["message"], "request body has missing or invalid fields");
        }

        let (status, _, response) = send(
            &app,
            json_request(
                "POST",
                &format!("/v0/company/{}/permission", company),
                Some(&owner_cookie),
                json!({ "accessLevel": "read" }),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert!(response["message"].is_string());

        let members = CompaniesService::new(pool).list_members(&company).await.unwrap();
        assert_eq!(members.len(), 1);
    }

    #[tokio::test]
    async fn test_is_authorized_agrees_with_permits() {
        let pool = test_pool().await;
        let owner = insert_user(&pool, "Kris", "ok@ok.com").await;
        let john = insert_user(&pool, "John", "john@doe.no").await;
        let service = CompaniesService::new(pool.clone());
        let company = service
            .create_company_and_add_user(CreateCompanyRequest { name: "coolio".to_string() }, &owner)
            .await
            .unwrap();
        service
            .add_member(&company, &MemberIdentifier::Username("john".to_string()), AccessLevel::Read)
            .await
            .unwrap();

        for held in AccessLevel::ALL {
            service.change_member_access(&company, &john, held).await.unwrap();
            for required in AccessLevel::ALL {
                assert_eq!(
                    is_authorized(&pool, &john, &company, required).await.unwrap(),
                    held.permits(required),
                    "held {} required {}",
                    held,
                    required
                );
            }
        }
    }

    #[tokio::test]
    async fn test_failed_membership_insert_rolls_back_company() {
        let pool = test_pool().await;
        let service = CompaniesService::new(pool.clone());

        // No such user: the membership row violates its foreign key.
        let result = service
            .create_company_and_add_user(CreateCompanyRequest { name: "orphan".to_string() }, "U_GHOST")
            .await;
        assert!(result.is_err());

        let (companies,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM companies")
            .fetch_one(&pool)
            .await
            .unwrap();
        let (memberships,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM user_companies")
            .fetch_one(&pool)
            .await
            .unwrap();
        assert_eq!(companies, 0);
        assert_eq!(memberships, 0);
        assert!(service.search("orphan").await.unwrap().is_empty());
    }
}
