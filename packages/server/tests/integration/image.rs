use chrono::Duration;
use sea_orm::{EntityTrait, PaginatorTrait};
use serde_json::{Value, json};
use server::entity::customer_image;

use crate::common::{TestApp, image_json, payload, routes};

mod image_upload {
    use super::*;

    #[tokio::test]
    async fn upload_stores_batch_and_reports_count() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;

        let res = app
            .post(
                &routes::images(id),
                &json!([image_json("a.png", 100), image_json("b.png", 2048)]),
            )
            .await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.message(), "Successfully uploaded 2 image(s).");
        let data = res.body["data"].as_array().unwrap();
        assert_eq!(data[0]["file_size_bytes"], 100);
        assert_eq!(data[1]["file_size_bytes"], 2048);
        assert_eq!(data[0]["customer_id"], id);
    }

    #[tokio::test]
    async fn accepts_data_uri_payloads() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let image = json!({
            "image_data": format!("data:image/png;base64,{}", payload(500)),
            "file_name": "uri.png",
            "content_type": "IMAGE/PNG",
            "description": "From a data URI",
        });

        let res = app.post(&routes::images(id), &json!([image])).await;

        assert_eq!(res.status, 200, "{}", res.text);
        assert_eq!(res.body["data"][0]["file_size_bytes"], 500);
        assert_eq!(res.body["data"][0]["description"], "From a data URI");
    }

    #[tokio::test]
    async fn one_bad_image_rejects_the_whole_batch() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let mut bmp = image_json("c.bmp", 200);
        bmp["content_type"] = json!("image/bmp");

        let res = app
            .post(
                &routes::images(id),
                &json!([image_json("a.png", 200), image_json("b.png", 99), bmp]),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.message(), "Image validation failed.");
        let errors = res.errors();
        assert_eq!(errors.len(), 2);
        assert_eq!(
            errors[0],
            "File 'b.png': File appears to be too small to be a valid image."
        );
        assert!(errors[1].starts_with("File 'c.bmp': Invalid content type"));
        assert_eq!(customer_image::Entity::find().count(&app.db).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn missing_image_data_fails_field_validation() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;

        let res = app
            .post(
                &routes::images(id),
                &json!([{"file_name": "a.png", "content_type": "image/png"}]),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.message(), "Validation failed.");
        assert_eq!(res.errors(), vec!["Image 1: Image data is required."]);
    }

    #[tokio::test]
    async fn upload_to_unknown_customer_is_a_bad_request() {
        let app = TestApp::spawn().await;

        let res = app
            .post(&routes::images(77), &json!([image_json("a.png", 200)]))
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(res.message(), "Customer not found.");
    }

    #[tokio::test]
    async fn quota_of_ten_is_enforced() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        app.upload_images(id, 9).await;

        let res = app
            .post(
                &routes::images(id),
                &json!([image_json("x.png", 200), image_json("y.png", 200)]),
            )
            .await;
        assert_eq!(res.status, 400);
        assert_eq!(
            res.message(),
            "Cannot upload 2 images. Customer already has 9 images. \
             Maximum allowed is 10. You can upload 1 more image(s)."
        );

        app.upload_images(id, 1).await;
        let customer = app.get(&routes::customer(id)).await;
        assert_eq!(customer.body["data"]["image_count"], 10);
        assert_eq!(customer.body["data"]["can_add_more_images"], false);

        let res = app
            .post(&routes::images(id), &json!([image_json("z.png", 200)]))
            .await;
        assert_eq!(res.status, 400);
        assert!(res.message().ends_with("You can upload 0 more image(s)."));
    }

    #[tokio::test]
    async fn full_batch_of_largest_images_fits_the_body_limit() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let batch: Vec<Value> = (0..10)
            .map(|i| image_json(&format!("max{i}.png"), 5 * 1024 * 1024))
            .collect();

        let res = app.post(&routes::images(id), &json!(batch)).await;

        assert_eq!(res.status, 200, "{}", res.message());
        assert_eq!(res.message(), "Successfully uploaded 10 image(s).");
        assert_eq!(
            customer_image::Entity::find().count(&app.db).await.unwrap(),
            10
        );
    }

    #[tokio::test]
    async fn image_over_five_mib_is_rejected() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let res = app
            .post(
                &routes::images(id),
                &json!([image_json("big.png", 5 * 1024 * 1024 + 1)]),
            )
            .await;

        assert_eq!(res.status, 400);
        assert_eq!(
            res.errors(),
            vec![
                "File 'big.png': File size (5,242,881 bytes) exceeds maximum allowed size (5,242,880 bytes)."
            ]
        );
    }
}

mod image_read {
    use super::*;

    #[tokio::test]
    async fn list_is_oldest_first() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let first = app.upload_images(id, 2).await;
        app.clock.advance(Duration::minutes(5));
        let second = app.upload_images(id, 1).await;

        let res = app.get(&routes::images(id)).await;

        assert_eq!(res.status, 200);
        let ids: Vec<i32> = res.body["data"]
            .as_array()
            .unwrap()
            .iter()
            .map(|i| i["id"].as_i64().unwrap() as i32)
            .collect();
        let expected: Vec<i32> = first.into_iter().chain(second).collect();
        assert_eq!(ids, expected);
        assert_eq!(app.get(&routes::images(id)).await.body, res.body);
    }

    #[tokio::test]
    async fn list_for_unknown_customer_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::images(3)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Customer not found.");
    }

    #[tokio::test]
    async fn scoped_get_checks_the_owner() {
        let app = TestApp::spawn().await;
        let owner = app.create_customer("John", "Doe").await;
        let other = app.create_customer("Jane", "Smith").await;
        let image = app.upload_images(owner, 1).await[0];

        let res = app.get(&routes::image(owner, image)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.body["data"]["id"], image);

        let res = app.get(&routes::image(other, image)).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Image not found for this customer.");

        let res = app.get(&routes::image(owner, image + 100)).await;
        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Image not found.");
    }

    #[tokio::test]
    async fn download_returns_decoded_bytes() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;
        let image = app.upload_images(id, 1).await[0];

        let res = app.get_raw(&routes::image_data(image)).await;

        assert_eq!(res.status(), 200);
        assert_eq!(res.headers()["content-type"], "image/png");
        assert_eq!(
            res.headers()["content-disposition"],
            "attachment; filename=\"img0.png\""
        );
        let bytes = res.bytes().await.unwrap();
        assert_eq!(bytes.len(), 128);
        assert!(bytes.iter().all(|&b| b == 0x42));
    }

    #[tokio::test]
    async fn non_numeric_image_id_keeps_the_envelope() {
        let app = TestApp::spawn().await;
        let id = app.create_customer("John", "Doe").await;

        let res = app.get(&format!("{}/abc", routes::images(id))).await;

        assert_eq!(res.status, 400);
        assert_eq!(res.body["success"], false);
        assert_eq!(res.message(), "Validation failed.");
        assert!(res.body["data"].is_null());
        assert_eq!(res.errors().len(), 1);
    }

    #[tokio::test]
    async fn download_unknown_image_is_404() {
        let app = TestApp::spawn().await;

        let res = app.get(&routes::image_data(1)).await;

        assert_eq!(res.status, 404);
        assert_eq!(res.message(), "Image not found.");
    }
}

mod image_delete {
    use super::*;

    #[tokio::test]
    async fn delete_requires_matching_owner() {
        let app = TestApp::spawn().await;
        let owner = app.create_customer("John", "Doe").await;
        let other = app.create_customer("Jane", "Smith").await;
        let image = app.upload_images(owner, 1).await[0];

        let res = app.delete(&routes::image(other, image)).await;
        assert_eq!(res.status, 404);
        assert_eq!(
            res.message(),
            "Image not found or doesn't belong to this customer."
        );
        assert_eq!(app.get(&routes::image(owner, image)).await.status, 200);

        app.clock.advance(Duration::minutes(1));
        let res = app.delete(&routes::image(owner, image)).await;
        assert_eq!(res.status, 200);
        assert_eq!(res.message(), "Image deleted successfully.");
        assert_eq!(res.body["data"], Value::Bool(true));

        let customer = app.get(&routes::customer(owner)).await;
        assert_eq!(customer.body["data"]["image_count"], 0);
        assert_ne!(
            customer.body["data"]["updated_at"],
            customer.body["data"]["created_at"]
        );
    }
}
