use std::sync::Arc;

use axum::{
    Json,
    extract::{Extension, Multipart, Path, Query},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::Utc;

use tradepost_catalog::{CatalogQuery, Listing, ListingUpdate, NewListing};
use tradepost_core::ProductId;

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::context::CurrentUser;

const NOT_OWNED: &str = "Product not found or unauthorized";

/// Listing form fields as they arrive over multipart. Everything is
/// optional here; create/update decide what is required.
#[derive(Default)]
struct ListingForm {
    title: Option<String>,
    price: Option<String>,
    description: Option<String>,
    image: Option<(String, axum::body::Bytes)>,
}

async fn read_listing_form(mut multipart: Multipart) -> Result<ListingForm, Response> {
    let malformed =
        |_| errors::json_error(StatusCode::BAD_REQUEST, "malformed multipart body");

    let mut form = ListingForm::default();
    while let Some(field) = multipart.next_field().await.map_err(malformed)? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("title") => form.title = Some(field.text().await.map_err(malformed)?),
            Some("price") => form.price = Some(field.text().await.map_err(malformed)?),
            Some("description") => {
                form.description = Some(field.text().await.map_err(malformed)?)
            }
            Some("image") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let bytes = field.bytes().await.map_err(malformed)?;
                form.image = Some((file_name, bytes));
            }
            _ => {}
        }
    }
    Ok(form)
}

fn parse_price(raw: Option<&str>) -> Result<Option<i64>, Response> {
    match raw {
        None => Ok(None),
        Some(raw) => raw.trim().parse::<i64>().map(Some).map_err(|_| {
            errors::json_error(StatusCode::BAD_REQUEST, "price must be an integer")
        }),
    }
}

fn parse_product_id(raw: &str) -> Result<ProductId, Response> {
    raw.parse()
        .map_err(|e| errors::domain_error_to_response(&e))
}

async fn store_uploaded_image(
    services: &AppServices,
    image: Option<(String, axum::body::Bytes)>,
) -> Result<Option<String>, Response> {
    match image {
        None => Ok(None),
        Some((file_name, bytes)) => services
            .save_image(&file_name, &bytes)
            .await
            .map(Some)
            .map_err(errors::app_error_to_response),
    }
}

pub async fn create_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    multipart: Multipart,
) -> Response {
    let form = match read_listing_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let price = match parse_price(form.price.as_deref()) {
        Ok(price) => price.unwrap_or(0),
        Err(response) => return response,
    };
    let image = match store_uploaded_image(&services, form.image).await {
        Ok(image) => image.unwrap_or_default(),
        Err(response) => return response,
    };

    let new = NewListing {
        title: form.title.unwrap_or_default(),
        price,
        description: form.description.unwrap_or_default(),
        image,
    };
    let listing = match Listing::new(new, current.user_id(), Utc::now()) {
        Ok(listing) => listing,
        Err(e) => return errors::domain_error_to_response(&e),
    };

    if let Err(e) = services.products().insert_listing(&listing).await {
        return errors::store_error_to_response(&e);
    }

    (StatusCode::CREATED, Json(dto::listing_to_json(&listing))).into_response()
}

pub async fn update_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };
    let form = match read_listing_form(multipart).await {
        Ok(form) => form,
        Err(response) => return response,
    };
    let price = match parse_price(form.price.as_deref()) {
        Ok(price) => price,
        Err(response) => return response,
    };
    let image = match store_uploaded_image(&services, form.image).await {
        Ok(image) => image,
        Err(response) => return response,
    };

    let update = ListingUpdate {
        title: form.title,
        price,
        description: form.description,
        image,
    };
    if let Err(e) = update.validate() {
        return errors::domain_error_to_response(&e);
    }

    match services
        .products()
        .update_owned(id, current.user_id(), update, Utc::now())
        .await
    {
        Ok(Some(listing)) => Json(dto::listing_to_json(&listing)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, NOT_OWNED),
        Err(e) => errors::store_error_to_response(&e),
    }
}

pub async fn delete_product(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match services.products().delete_owned(id, current.user_id()).await {
        Ok(true) => Json(serde_json::json!({ "message": "Product deleted" })).into_response(),
        Ok(false) => errors::json_error(StatusCode::NOT_FOUND, NOT_OWNED),
        Err(e) => errors::store_error_to_response(&e),
    }
}

pub async fn get_product(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> Response {
    let id = match parse_product_id(&id) {
        Ok(id) => id,
        Err(response) => return response,
    };

    match services.products().listing(id).await {
        Ok(Some(listing)) => Json(dto::listing_to_json(&listing)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, "Product not found"),
        Err(e) => errors::store_error_to_response(&e),
    }
}

pub async fn list_products(
    Extension(services): Extension<Arc<AppServices>>,
    Query(params): Query<dto::CatalogParams>,
) -> Response {
    let query = CatalogQuery::new(params.search, params.page, params.limit);

    let page = match services.products().search_unsold(&query).await {
        Ok(page) => page,
        Err(e) => return errors::store_error_to_response(&e),
    };
    let total = match services.products().count_unsold(&query).await {
        Ok(total) => total,
        Err(e) => return errors::store_error_to_response(&e),
    };

    let products: Vec<_> = page.iter().map(dto::listing_to_json).collect();
    Json(serde_json::json!({
        "products": products,
        "totalPages": query.page.total_pages(total),
        "currentPage": query.page.number(),
    }))
    .into_response()
}

pub async fn my_products(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(current): Extension<CurrentUser>,
) -> Response {
    match services.products().listings_by_owner(current.user_id()).await {
        Ok(listings) => {
            let products: Vec<_> = listings.iter().map(dto::listing_to_json).collect();
            Json(products).into_response()
        }
        Err(e) => errors::store_error_to_response(&e),
    }
}
