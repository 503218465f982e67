use sea_orm::{EntityTrait, PaginatorTrait};
use uuid::Uuid;

use filehub::entity::file_record;

use crate::common::{FileForm, MAX_BLOB_SIZE, TestApp, routes, token_for};

mod upload {
    use super::*;

    #[tokio::test]
    async fn upload_returns_created_file() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();

        let res = app
            .post_form(routes::FILES, FileForm::file("a.png", b"12345"), &token)
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"].as_str().unwrap(), "a.png");
        assert_eq!(res.body["size"].as_i64().unwrap(), 5);
        assert_eq!(res.body["content_type"].as_str().unwrap(), "image/png");
        assert!(res.body["id"].as_str().is_some());
        assert!(!res.body["location"].as_str().unwrap().is_empty());
        assert_eq!(app.blob_count(), 1);
    }

    #[tokio::test]
    async fn explicit_name_overrides_filename() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();

        let res = app
            .post_form(
                routes::FILES,
                FileForm::file("upload.bin", b"data").name("Quarterly report.pdf"),
                &token,
            )
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["name"].as_str().unwrap(), "Quarterly report.pdf");
        assert_eq!(res.body["content_type"].as_str().unwrap(), "application/pdf");
    }

    #[tokio::test]
    async fn missing_file_field_rejected() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();

        let res = app
            .post_form(routes::FILES, FileForm::default().name("a.txt"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn empty_file_rejected() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();

        let res = app
            .post_form(routes::FILES, FileForm::file("a.txt", b""), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.blob_count(), 0);
    }

    #[tokio::test]
    async fn oversized_file_rejected() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();
        let big = vec![7u8; MAX_BLOB_SIZE as usize + 1];

        let res = app
            .post_form(routes::FILES, FileForm::file("big.bin", &big), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
        assert_eq!(app.blob_count(), 0);
    }
}

mod auth {
    use super::*;

    #[tokio::test]
    async fn missing_token_rejected() {
        let app = TestApp::spawn().await;

        let res = app.get_without_token(routes::FILES).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_MISSING");
    }

    #[tokio::test]
    async fn forged_token_rejected() {
        let app = TestApp::spawn().await;
        let forged =
            filehub::utils::jwt::sign("wrong-secret", Uuid::new_v4(), Uuid::new_v4(), chrono::Duration::hours(1))
                .unwrap();

        let res = app.get_with_token(routes::FILES, &forged).await;

        assert_eq!(res.status, 401);
        assert_eq!(res.body["code"], "TOKEN_INVALID");
    }
}

mod list {
    use super::*;

    #[tokio::test]
    async fn lists_only_own_files_oldest_first() {
        let app = TestApp::spawn().await;
        let tenant = Uuid::new_v4();
        let alice = token_for(Uuid::new_v4(), tenant);
        let bob = token_for(Uuid::new_v4(), tenant);

        let first = app.upload("one.txt", b"1", &alice).await;
        let second = app.upload("two.txt", b"2", &alice).await;
        app.upload("bob.txt", b"3", &bob).await;

        let res = app.get_with_token(routes::FILES, &alice).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"].as_u64().unwrap(), 2);
        let ids: Vec<&str> = res.body["files"]
            .as_array()
            .unwrap()
            .iter()
            .map(|f| f["id"].as_str().unwrap())
            .collect();
        assert_eq!(ids, vec![first.as_str(), second.as_str()]);
    }

    #[tokio::test]
    async fn empty_list() {
        let app = TestApp::spawn().await;
        let res = app
            .get_with_token(routes::FILES, &app.new_user_token())
            .await;

        assert_eq!(res.status, 200);
        assert_eq!(res.body["total"].as_u64().unwrap(), 0);
        assert!(res.body["files"].as_array().unwrap().is_empty());
    }
}

mod replace {
    use super::*;

    #[tokio::test]
    async fn replace_content_swaps_blob() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();
        let id = app.upload("a.png", b"12345", &token).await;

        let res = app
            .put_form(
                &routes::file(&id),
                FileForm::file("ignored.png", b"0123456789"),
                &token,
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["id"].as_str().unwrap(), id);
        assert_eq!(res.body["size"].as_i64().unwrap(), 10);
        assert_eq!(res.body["name"].as_str().unwrap(), "a.png");
        assert_eq!(app.blob_count(), 1);
    }

    #[tokio::test]
    async fn rename_only() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();
        let id = app.upload("a.png", b"12345", &token).await;

        let res = app
            .put_form(&routes::file(&id), FileForm::default().name("b.png"), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"].as_str().unwrap(), "b.png");
        assert_eq!(res.body["size"].as_i64().unwrap(), 5);
    }

    #[tokio::test]
    async fn blank_name_keeps_existing_name() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();
        let id = app.upload("a.png", b"12345", &token).await;

        let res = app
            .put_form(&routes::file(&id), FileForm::default().name("   "), &token)
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["name"].as_str().unwrap(), "a.png");
    }

    #[tokio::test]
    async fn other_owner_gets_not_found() {
        let app = TestApp::spawn().await;
        let owner = app.new_user_token();
        let stranger = app.new_user_token();
        let id = app.upload("a.png", b"12345", &owner).await;

        let res = app
            .put_form(&routes::file(&id), FileForm::default().name("mine.png"), &stranger)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn invalid_id_rejected() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();

        let res = app
            .put_form(&routes::file("nope"), FileForm::default().name("x"), &token)
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["code"], "VALIDATION_ERROR");
    }
}

mod delete {
    use super::*;

    #[tokio::test]
    async fn delete_removes_blob_and_record() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();
        let id = app.upload("a.png", b"12345", &token).await;

        let res = app.delete_with_token(&routes::file(&id), &token).await;

        assert_eq!(res.status, 204);
        assert_eq!(app.blob_count(), 0);
        let remaining = file_record::Entity::find().count(&app.db).await.unwrap();
        assert_eq!(remaining, 0);
    }

    #[tokio::test]
    async fn second_delete_is_not_found() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();
        let id = app.upload("a.png", b"12345", &token).await;

        let first = app.delete_with_token(&routes::file(&id), &token).await;
        let second = app.delete_with_token(&routes::file(&id), &token).await;

        assert_eq!(first.status, 204);
        assert_eq!(second.status, 404);
        assert_eq!(second.body["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn other_tenant_cannot_delete() {
        let app = TestApp::spawn().await;
        let owner_id = Uuid::new_v4();
        let owner = token_for(owner_id, Uuid::new_v4());
        let same_owner_other_tenant = token_for(owner_id, Uuid::new_v4());
        let id = app.upload("a.png", b"12345", &owner).await;

        let res = app
            .delete_with_token(&routes::file(&id), &same_owner_other_tenant)
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(app.blob_count(), 1);
    }
}

mod stats {
    use chrono::{Datelike, Utc};
    use serde_json::json;

    use super::*;

    #[tokio::test]
    async fn counts_uploads_for_current_month() {
        let app = TestApp::spawn().await;
        let token = app.new_user_token();
        app.upload("one.txt", b"1", &token).await;
        app.upload("two.txt", b"2", &token).await;
        let now = Utc::now();

        let res = app.get_with_token(routes::STATS, &token).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(
            res.body["stats"],
            json!([{ "year": now.year(), "month": now.month(), "count": 2 }])
        );
    }

    #[tokio::test]
    async fn empty_stats() {
        let app = TestApp::spawn().await;
        let res = app
            .get_with_token(routes::STATS, &app.new_user_token())
            .await;

        assert_eq!(res.status, 200);
        assert!(res.body["stats"].as_array().unwrap().is_empty());
    }
}

#[tokio::test]
async fn openapi_document_served() {
    let app = TestApp::spawn().await;
    let res = app.get_without_token("/api-docs/openapi.json").await;

    assert_eq!(res.status, 200);
    assert!(res.body["paths"]["/api/v1/files"]["post"].is_object(), "{}", res.text);
    assert!(res.body["paths"]["/api/v1/files/stats"].is_object());
}
