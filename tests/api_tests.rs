use axum::http::StatusCode;
use axum_test::TestServer;
use colortag::{create_router, test_utils};
use serde_json::{json, Value};

async fn setup_server() -> TestServer {
    let state = test_utils::create_test_state().await;
    let app = create_router(state);
    TestServer::new(app).unwrap()
}

async fn create_tag(server: &TestServer, body: Value) -> Value {
    let response = server.post("/api/tags").json(&body).await;
    response.assert_status_ok();
    response.json()
}

fn id_of(value: &Value) -> String {
    value["id"].as_str().unwrap().to_string()
}

// ============================================================================
// Tag Tests
// ============================================================================

mod tag_tests {
    use super::*;

    #[tokio::test]
    async fn test_create_tag_derives_slug() {
        let server = setup_server().await;

        let body = create_tag(&server, json!({"name": "Red Alert"})).await;

        assert_eq!(body["name"], "Red Alert");
        assert_eq!(body["slug"], "red-alert");
        assert_eq!(body["description"], "");
        assert_eq!(body["color"], "#CD0000");
        assert_eq!(body["font_white"], true);
        assert_eq!(body["font_color"], "#FFF");
    }

    #[tokio::test]
    async fn test_create_tag_light_color_uses_black_font() {
        let server = setup_server().await;

        let body = create_tag(&server, json!({"name": "Sun", "color": "#ffff00"})).await;

        assert_eq!(body["font_white"], false);
        assert_eq!(body["font_color"], "#000");
    }

    #[tokio::test]
    async fn test_taken_slug_gets_one_random_char() {
        let server = setup_server().await;

        create_tag(&server, json!({"name": "Red Alert"})).await;
        let second = create_tag(&server, json!({"name": "Red Alert"})).await;

        let slug = second["slug"].as_str().unwrap();
        assert_eq!(slug.len(), "red-alert".len() + 1);
        assert!(slug.starts_with("red-alert"));
        let suffix = slug.chars().last().unwrap();
        assert!(suffix.is_ascii_lowercase() || suffix.is_ascii_digit());
    }

    #[tokio::test]
    async fn test_explicit_slug_is_kept() {
        let server = setup_server().await;

        let body = create_tag(
            &server,
            json!({"name": "Bug", "slug": "defect", "description": "Broken things"}),
        )
        .await;

        assert_eq!(body["slug"], "defect");
        assert_eq!(body["description"], "Broken things");
    }

    #[tokio::test]
    async fn test_slug_space_exhausted() {
        let server = setup_server().await;
        let name = "a".repeat(20);

        create_tag(&server, json!({"name": name})).await;
        let response = server.post("/api/tags").json(&json!({"name": name})).await;

        response.assert_status(StatusCode::CONFLICT);
        let body: Value = response.json();
        assert_eq!(body["error"], "Unable to find an unique slug");
    }

    #[tokio::test]
    async fn test_create_tag_empty_name() {
        let server = setup_server().await;

        let response = server.post("/api/tags").json(&json!({"name": ""})).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_tag_blank_name() {
        let server = setup_server().await;

        let response = server.post("/api/tags").json(&json!({"name": "   "})).await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_tag_rejects_unsafe_slug() {
        let server = setup_server().await;

        let response = server
            .post("/api/tags")
            .json(&json!({"name": "x", "slug": "not a slug/?!"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
        let body: Value = response.json();
        assert_eq!(
            body["error"],
            "Tag slug may only contain letters, numbers, underscores or hyphens"
        );

        let tags: Vec<Value> = server.get("/api/tags").await.json();
        assert!(tags.is_empty());
    }

    #[tokio::test]
    async fn test_update_tag_rejects_unsafe_slug() {
        let server = setup_server().await;
        let tag = create_tag(&server, json!({"name": "Safe"})).await;

        let response = server
            .put(&format!("/api/tags/{}", id_of(&tag)))
            .json(&json!({"slug": "with space"}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_create_tag_transliterates_slug() {
        let server = setup_server().await;

        let body = create_tag(&server, json!({"name": "Café Größe"})).await;

        assert_eq!(body["slug"], "cafe-groe");
    }

    #[tokio::test]
    async fn test_create_tag_name_too_long() {
        let server = setup_server().await;

        let response = server
            .post("/api/tags")
            .json(&json!({"name": "x".repeat(21)}))
            .await;

        response.assert_status(StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn test_list_tags_ordered_by_slug() {
        let server = setup_server().await;

        create_tag(&server, json!({"name": "Zebra"})).await;
        create_tag(&server, json!({"name": "Apple"})).await;
        create_tag(&server, json!({"name": "Mango"})).await;

        let response = server.get("/api/tags").await;
        response.assert_status_ok();
        let slugs: Vec<String> = response
            .json::<Vec<Value>>()
            .iter()
            .map(|t| t["slug"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(slugs, vec!["apple", "mango", "zebra"]);
    }

    #[tokio::test]
    async fn test_update_name_keeps_slug() {
        let server = setup_server().await;
        let tag = create_tag(&server, json!({"name": "Old Name"})).await;

        let response = server
            .put(&format!("/api/tags/{}", id_of(&tag)))
            .json(&json!({"name": "New Name"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["name"], "New Name");
        assert_eq!(body["slug"], "old-name");
    }

    #[tokio::test]
    async fn test_update_cleared_slug_is_rederived() {
        let server = setup_server().await;
        let tag = create_tag(&server, json!({"name": "Old Name"})).await;

        let response = server
            .put(&format!("/api/tags/{}", id_of(&tag)))
            .json(&json!({"name": "New Name", "slug": ""}))
            .await;

        response.assert_status_ok();
        assert_eq!(response.json::<Value>()["slug"], "new-name");
    }

    #[tokio::test]
    async fn test_update_color_recomputes_font() {
        let server = setup_server().await;
        let tag = create_tag(&server, json!({"name": "Shade"})).await;
        assert_eq!(tag["font_white"], true);

        let response = server
            .put(&format!("/api/tags/{}", id_of(&tag)))
            .json(&json!({"color": "#FFFFFF"}))
            .await;

        response.assert_status_ok();
        let body: Value = response.json();
        assert_eq!(body["color"], "#FFFFFF");
        assert_eq!(body["font_white"], false);
    }

    #[tokio::test]
    async fn test_delete_tag() {
        let server = setup_server().await;
        let tag = create_tag(&server, json!({"name": "Temporary"})).await;
        let path = format!("/api/tags/{}", id_of(&tag));

        server.delete(&path).await.assert_status_ok();
        server.get(&path).await.assert_status_not_found();
    }

    #[tokio::test]
    async fn test_tag_control_values() {
        let server = setup_server().await;
        let tag = create_tag(
            &server,
            json!({"name": "Bug", "description": "Broken things"}),
        )
        .await;
        let id = id_of(&tag);

        let response = server.get(&format!("/api/tags/{}/control", id)).await;
        response.assert_status_ok();
        let control: Value = response.json();

        assert_eq!(control["name"], "tags_bug");
        assert_eq!(control["class"], "colortag-inc-exc");
        assert_eq!(control["attrs"]["title"], "Broken things");
        let values: Vec<&str> = control["options"]
            .as_array()
            .unwrap()
            .iter()
            .map(|o| o["value"].as_str().unwrap())
            .collect();
        assert_eq!(values, vec![String::new(), format!("I{}", id), format!("E{}", id)]);
        assert_eq!(control["options"][0]["selected"], true);
    }
}

// ============================================================================
// Record Filter Tests
// ============================================================================

mod record_filter_tests {
    use super::*;

    struct Fixture {
        server: TestServer,
        one: String,
        two: String,
        five: String,
    }

    async fn create_record(server: &TestServer, title: &str, tags: &[&str]) {
        let response = server
            .post("/api/records")
            .json(&json!({"title": title}))
            .await;
        response.assert_status_ok();
        let record_id = id_of(&response.json::<Value>());

        for tag_id in tags {
            server
                .post(&format!("/api/records/{}/tags/{}", record_id, tag_id))
                .await
                .assert_status_ok();
        }
    }

    async fn fixture() -> Fixture {
        let server = setup_server().await;
        let one = id_of(&create_tag(&server, json!({"name": "One"})).await);
        let two = id_of(&create_tag(&server, json!({"name": "Two"})).await);
        let five = id_of(&create_tag(&server, json!({"name": "Five"})).await);

        create_record(&server, "a-none", &[]).await;
        create_record(&server, "b-one", &[&one]).await;
        create_record(&server, "c-two", &[&two]).await;
        create_record(&server, "d-both", &[&one, &two]).await;
        create_record(&server, "e-five", &[&five]).await;
        create_record(&server, "f-one-five", &[&one, &five]).await;

        Fixture {
            server,
            one,
            two,
            five,
        }
    }

    fn titles(response: axum_test::TestResponse) -> Vec<String> {
        response.assert_status_ok();
        response
            .json::<Vec<Value>>()
            .iter()
            .map(|r| r["title"].as_str().unwrap().to_string())
            .collect()
    }

    #[tokio::test]
    async fn test_no_selection_returns_everything() {
        let f = fixture().await;

        let all = titles(f.server.get("/api/records").await);
        assert_eq!(all.len(), 6);

        let blank = titles(
            f.server
                .get("/api/records")
                .add_query_param("tags", "")
                .add_query_param("tags_use_and", "on")
                .await,
        );
        assert_eq!(blank, all);
    }

    #[tokio::test]
    async fn test_or_matches_any_tag_without_duplicates() {
        let f = fixture().await;

        let result = titles(
            f.server
                .get("/api/records")
                .add_query_param("tags", format!("I{}", f.one))
                .add_query_param("tags", format!("I{}", f.two))
                .await,
        );

        assert_eq!(result, vec!["b-one", "c-two", "d-both", "f-one-five"]);
    }

    #[tokio::test]
    async fn test_and_requires_all_tags() {
        let f = fixture().await;

        let result = titles(
            f.server
                .get("/api/records")
                .add_query_param("tags_use_and", "on")
                .add_query_param("tags_one", format!("I{}", f.one))
                .add_query_param("tags_two", format!("I{}", f.two))
                .await,
        );

        assert_eq!(result, vec!["d-both"]);
    }

    #[tokio::test]
    async fn test_false_flag_means_or() {
        let f = fixture().await;

        let result = titles(
            f.server
                .get("/api/records")
                .add_query_param("tags_use_and", "false")
                .add_query_param("tags_one", format!("I{}", f.one))
                .add_query_param("tags_two", format!("I{}", f.two))
                .await,
        );

        assert_eq!(result.len(), 4);
    }

    #[tokio::test]
    async fn test_exclusion_without_inclusion() {
        let f = fixture().await;

        let result = titles(
            f.server
                .get("/api/records")
                .add_query_param("tags_five", format!("E{}", f.five))
                .await,
        );

        assert_eq!(result, vec!["a-none", "b-one", "c-two", "d-both"]);
    }

    #[tokio::test]
    async fn test_exclusion_wins_over_inclusion() {
        let f = fixture().await;

        for use_and in ["", "on"] {
            let result = titles(
                f.server
                    .get("/api/records")
                    .add_query_param("tags_use_and", use_and)
                    .add_query_param("tags", format!("I{}", f.five))
                    .add_query_param("tags", format!("E{}", f.five))
                    .await,
            );
            assert!(result.is_empty(), "combinator {:?} kept {:?}", use_and, result);
        }
    }

    #[tokio::test]
    async fn test_inclusion_then_exclusion() {
        let f = fixture().await;

        let result = titles(
            f.server
                .get("/api/records")
                .add_query_param("tags_one", format!("I{}", f.one))
                .add_query_param("tags_five", format!("E{}", f.five))
                .await,
        );

        assert_eq!(result, vec!["b-one", "d-both"]);
    }

    #[tokio::test]
    async fn test_malformed_tokens_are_ignored() {
        let f = fixture().await;

        let result = titles(
            f.server
                .get("/api/records")
                .add_query_param("tags", "I")
                .add_query_param("tags", format!("X{}", f.one))
                .add_query_param("tags", "Inot-a-uuid")
                .await,
        );

        assert_eq!(result.len(), 6);
    }

    #[tokio::test]
    async fn test_plain_choice_filter_is_or() {
        let f = fixture().await;

        let result = titles(
            f.server
                .get("/api/records")
                .add_query_param("choice", &f.two)
                .add_query_param("choice", &f.five)
                .await,
        );

        assert_eq!(result, vec!["c-two", "d-both", "e-five", "f-one-five"]);
    }

    #[tokio::test]
    async fn test_record_lists_its_tags() {
        let f = fixture().await;

        let records = f
            .server
            .get("/api/records")
            .add_query_param("tags_use_and", "on")
            .add_query_param("tags", format!("I{}", f.one))
            .add_query_param("tags", format!("I{}", f.five))
            .await
            .json::<Vec<Value>>();

        assert_eq!(records.len(), 1);
        let slugs: Vec<&str> = records[0]["tags"]
            .as_array()
            .unwrap()
            .iter()
            .map(|t| t["slug"].as_str().unwrap())
            .collect();
        assert_eq!(slugs, vec!["five", "one"]);
    }

    #[tokio::test]
    async fn test_remove_tag_from_record() {
        let f = fixture().await;
        let records = f.server.get("/api/records").await.json::<Vec<Value>>();
        let d_both = records.iter().find(|r| r["title"] == "d-both").unwrap();
        let record_id = id_of(d_both);

        f.server
            .delete(&format!("/api/records/{}/tags/{}", record_id, f.two))
            .await
            .assert_status_ok();

        let record = f.server.get(&format!("/api/records/{}", record_id)).await;
        record.assert_status_ok();
        assert_eq!(record.json::<Value>()["tags"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_tagging_unknown_record_is_not_found() {
        let f = fixture().await;

        f.server
            .post(&format!("/api/records/{}/tags/{}", uuid::Uuid::new_v4(), f.one))
            .await
            .assert_status_not_found();
    }

    #[tokio::test]
    async fn test_use_and_slug_still_filters() {
        let server = setup_server().await;
        let tag = create_tag(&server, json!({"name": "Use_And"})).await;
        assert_eq!(tag["slug"], "use_and");
        let tag_id = id_of(&tag);

        create_record(&server, "tagged", &[&tag_id]).await;
        create_record(&server, "untagged", &[]).await;

        let result = titles(
            server
                .get("/api/records")
                .add_query_param("tags_use_and", format!("I{}", tag_id))
                .await,
        );
        assert_eq!(result, vec!["tagged"]);
    }

    #[tokio::test]
    async fn test_filter_page_shows_both_tooltips() {
        let f = fixture().await;

        let html = f.server.get("/").await.text();

        assert!(html.contains("data-or-tooltip=\"Show a result if it has ANY"));
        assert!(html.contains("data-and-tooltip=\"Show a result only if it has ALL"));
        assert!(html.contains("title=\"Show a result if it has ANY"));
    }

    #[tokio::test]
    async fn test_filter_page_reflects_selection() {
        let f = fixture().await;

        let response = f
            .server
            .get("/")
            .add_query_param("tags_use_and", "on")
            .add_query_param("tags_one", format!("I{}", f.one))
            .await;

        response.assert_status_ok();
        let html = response.text();
        assert!(html.contains("name=\"tags_use_and\" checked"));
        assert!(html.contains(&format!("value=\"I{}\" checked", f.one)));
        assert!(html.contains("d-both"));
        assert!(!html.contains("c-two"));
    }
}
