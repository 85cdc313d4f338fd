use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::features::articles::{dtos as articles_dtos, handlers as articles_handlers};
use crate::features::categories::{dtos as categories_dtos, handlers as categories_handlers};
use crate::features::files::{dtos as files_dtos, handlers as files_handlers};
use crate::shared::types::{ApiResponse, Meta};

#[derive(OpenApi)]
#[openapi(
    paths(
        // Articles (public)
        articles_handlers::list_articles,
        articles_handlers::get_article_by_slug,
        // Categories (public)
        categories_handlers::list_categories,
        // Admin
        articles_handlers::admin_list_articles,
        articles_handlers::admin_get_article,
        articles_handlers::create_article,
        articles_handlers::update_article,
        articles_handlers::delete_article,
        categories_handlers::admin_list_categories,
        categories_handlers::create_category,
        categories_handlers::delete_category,
        files_handlers::upload_file,
    ),
    components(
        schemas(
            // Shared
            Meta,
            // Articles
            articles_dtos::ArticleDto,
            articles_dtos::ArticleSummaryDto,
            articles_dtos::ArticleDetailDto,
            ApiResponse<Vec<articles_dtos::ArticleSummaryDto>>,
            ApiResponse<articles_dtos::ArticleDetailDto>,
            // Categories
            categories_dtos::CategoryResponseDto,
            categories_dtos::CreateCategoryDto,
            ApiResponse<Vec<categories_dtos::CategoryResponseDto>>,
            ApiResponse<categories_dtos::CategoryResponseDto>,
            // Files
            files_dtos::UploadFileDto,
            files_dtos::FileResponseDto,
            ApiResponse<files_dtos::FileResponseDto>,
        )
    ),
    tags(
        (name = "articles", description = "Published blog articles (public)"),
        (name = "categories", description = "Article categories (public)"),
        (name = "admin", description = "Article, category and file management (authenticated)"),
    ),
    modifiers(&SecurityAddon),
    info(
        title = "Blog CMS API",
        version = "0.1.0",
        description = "API documentation for the blog CMS",
    )
)]
pub struct ApiDoc;

/// Adds Bearer JWT security scheme to OpenAPI spec
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

/// Modifier to override OpenAPI info from config
pub struct SwaggerInfoModifier {
    pub title: String,
    pub version: String,
    pub description: String,
}

impl Modify for SwaggerInfoModifier {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        openapi.info.title = self.title.clone();
        openapi.info.version = self.version.clone();
        openapi.info.description = Some(self.description.clone());
    }
}
