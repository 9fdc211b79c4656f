use chrono::Duration;
use serde_json::json;

use crate::common::{TestApp, customer_json, image_json, routes, t0};

mod customer_crud {
    use super::*;

    #[tokio::test]
    async fn create_returns_201_with_computed_fields() {
        let app = TestApp::spawn().await;

        let res = app
            .post(routes::CUSTOMERS, &customer_json("John", "Doe"))
            .await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["success"], true);
        assert_eq!(res.message(), "Customer created successfully.");
        let data = &res.body["data"];
        assert_eq!(data["full_name"], "John Doe");
        assert_eq!(data["image_count"], 0);
        assert_eq!(data["can_add_more_images"], true);
        assert_eq!(data["images"], json!([]));
        assert_eq!(
            data["created_at"].as_str().unwrap(),
            data["updated_at"].as_str().unwrap()
        );
        assert!(res.errors().is_empty());
    }

    #[tokio::test]
    async fn create_with_embedded_images() {
        let app = TestApp::spawn().await;
        let mut body = customer_json("John", "Doe");
        body["images"] = json!([
            image_json("a.png", 150),
            {"image_data": "", "file_name": "skipped.png", "content_type": "image/png"},
        ]);

        let res = app.post(routes::CUSTOMERS, &body).await;

        assert_eq!(res.status, 201, "{}", res.text);
        assert_eq!(res.body["data"]["image_count"], 1);
        assert_eq!(res.body["data"]["images"][0]["file_name"], "a.png");
        assert_eq!(res.body["data"]["images"][0]["file_size_bytes"], 150);
        assert_eq!(res.body["data"]["images"][0]["description"], "");
    }

    #[tokio::test]
    async fn create_with_bad_base64_is_rejected() {
        let app = TestApp::spawn().await;
        let mut body = customer_json("John", "Doe");
        body["images"] = json!([
            {"image_data": "%%%", "file_name": "bad.png", "content_type": "image/png"},
        ]);

        let res = app.post(routes::CUSTOMERS, &body).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.message(), "An error occurred while creating the customer.");
        assert_eq!(res.errors(), vec!["Invalid Base64 string in image: bad.png"]);

        let list = app.get(routes::CUSTOMERS).await;
        assert_eq!(list.body["data"], json!([]));
    }

    #[tokio::test]
    async fn create_validates_fields() {
        let app = TestApp::spawn().await;

        let res = app
            .post(
                routes::CUSTOMERS,
                &json!({"first_name": "", "last_name": "Doe", "email": "nope"}),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.message(), "Validation failed.");
        assert_eq!(
            res.errors(),
            vec![
                "First name is required.",
                "Email is not a valid email address."
            ]
        );
        assert!(res.body["data"].is_null());
    }

    #[tokio::test]
    async fn malformed_json_is_a_validation_failure() {
        let app = TestApp::spawn().await;

        let res = app.post_raw(routes::CUSTOMERS, "{not json").await;

        assert_eq!(res.status, 400);
        assert_eq!(res.message(), "Validation failed.");
        assert_eq!(res.errors().len(), 1);
    }

    #[tokio::test]
    async fn list_is_sorted_by_last_then_first_name() {
        let app = TestApp::spawn().await;
        app.create_customer("Jane", "Smith").await;
        app.create_customer("John", "Doe").await;
        app.create_customer("Adam", "Smith").await;

        let res = app.get(routes::CUSTOMERS).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.message(), "Success");
        let names: Vec<_> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["full_name"].as_str().unwrap().to_string())
            .collect();
        assert_eq!(names, ["John Doe", "Adam Smith", "Jane Smith"]);
    }

    #[tokio::test]
    async fn get_unknown_customer_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::customer(42)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Customer not found.");
    }

    #[tokio::test]
    async fn update_overwrites_fields_and_bumps_timestamp() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        app.upload_images(id, 2).await;
        app.clock.advance(Duration::hours(1));

        let res = app
            .put(&routes::customer(id), &customer_json("Johnny", "Doe"))
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.message(), "Customer updated successfully.");
        let data = &res.body["data"];
        assert_eq!(data["full_name"], "Johnny Doe");
        assert_eq!(data["image_count"], 2);
        let updated_at: chrono::DateTime<chrono::Utc> =
            data["updated_at"].as_str().unwrap().parse().unwrap();
        let created_at: chrono::DateTime<chrono::Utc> =
            data["created_at"].as_str().unwrap().parse().unwrap();
        assert_eq!(created_at, t0());
        assert_eq!(updated_at, t0() + Duration::hours(1));
    }

    #[tokio::test]
    async fn update_with_images_replaces_them() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let old = app.upload_images(id, 3).await;
        let mut body = customer_json("John", "Doe");
        body["images"] = json!([image_json("fresh.png", 300)]);

        let res = app.put(&routes::customer(id), &body).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"]["image_count"], 1);
        assert_eq!(res.body["data"]["images"][0]["file_name"], "fresh.png");
        for image_id in old {
            assert_eq!(app.get(&routes::image(id, image_id)).await.status, 404);
        }
    }

    #[tokio::test]
    async fn non_numeric_id_keeps_the_envelope() {
        let app = TestApp::spawn().await;

        let res = app.get(&format!("{}/abc", routes::CUSTOMERS)).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.message(), "Validation failed.");
        assert!(res.body["data"].is_null());
        assert_eq!(res.errors().len(), 1);
        assert!(res.errors()[0].contains("abc"), "{}", res.text);
    }

    #[tokio::test]
    async fn update_with_eleven_images_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let kept = app.upload_images(id, 2).await;
        let mut body = customer_json("Changed", "Name");
        body["images"] = json!(
            (0..11)
                .map(|i| image_json(&format!("{i}.png"), 150))
                .collect::<Vec<_>>()
        );

        let res = app.put(&routes::customer(id), &body).await;

        assert_eq!(res.status, 400);
        assert!(res.message().starts_with("Cannot upload 11 images."), "{}", res.text);
        let customer = app.get(&routes::customer(id)).await;
        assert_eq!(customer.body["data"]["full_name"], "John Doe");
        assert_eq!(customer.body["data"]["image_count"], 2);
        for image_id in kept {
            assert_eq!(app.get(&routes::image(id, image_id)).await.status, 200);
        }
    }

    #[tokio::test]
    async fn update_unknown_customer_is_404() {
        let app = TestApp::spawn().await;

        let res = app
            .put(&routes::customer(9), &customer_json("John", "Doe"))
            .await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Customer not found.");
    }

    #[tokio::test]
    async fn delete_removes_customer_and_images() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let images = app.upload_images(id, 2).await;

        let res = app.delete(&routes::customer(id)).await;

        assert_eq!(res.status, 200);
        assert_eq!(res.message(), "Customer deleted successfully.");
        assert_eq!(res.body["data"], true);
        assert_eq!(app.get(&routes::customer(id)).await.status, 404);
        for image_id in images {
            assert_eq!(app.get(&routes::image_data(image_id)).await.status, 404);
        }
        assert_eq!(app.delete(&routes::customer(id)).await.status, 404);
    }
}

mod docs {
    use super::*;

    #[tokio::test]
    async fn openapi_document_lists_routes() {
        let app = TestApp::spawn().await;

        let res = app.get("/api-docs/openapi.json").await;

        assert_eq!(res.status, 200);
        let paths = &res.body["paths"];
        assert!(paths["/api/customers"].is_object());
        assert!(paths["/api/customers/{id}"].is_object());
        assert!(paths["/api/customers/{customer_id}/images/{image_id}"].is_object());
        assert!(paths["/api/images/{image_id}/data"].is_object());
    }
}
