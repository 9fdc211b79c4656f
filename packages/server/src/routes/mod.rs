use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers::{customer, image};
use crate::state::AppState;

pub fn api_routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(customer::list_customers, customer::create_customer))
        .routes(routes!(
            customer::get_customer,
            customer::update_customer,
            customer::delete_customer
        ))
        .routes(routes!(image::list_images, image::upload_images))
        .routes(routes!(image::get_image, image::delete_image))
        .routes(routes!(image::download_image))
}
