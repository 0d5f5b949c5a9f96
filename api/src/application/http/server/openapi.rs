use utoipa::OpenApi;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "NutriLens API",
        description = "Image nutrition analysis and meal coaching API"
    ),
    tags(
        (name = "image-nutrition", description = "Food photo analysis")
    )
)]
pub struct ApiDoc;
