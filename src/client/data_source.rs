use async_trait::async_trait;
use std::future::Future;
use uuid::Uuid;

use crate::book::TourDataSource;
use crate::client::{ClientError, Listing, TourbookClient};
use crate::features::ads::dtos::{AdQueryParams, AdResponseDto};
use crate::features::categories::dtos::{CategoryQueryParams, CategoryResponseDto};
use crate::features::destinations::dtos::{DestinationQueryParams, DestinationResponseDto};
use crate::features::places::dtos::{PlaceQueryParams, PlaceResponseDto};
use crate::shared::constants::MAX_PAGE_SIZE;

/// Walk every page of a list endpoint
async fn all_pages<T, F, Fut>(mut fetch: F) -> Result<Vec<T>, ClientError>
where
    F: FnMut(i64) -> Fut,
    Fut: Future<Output = Result<Listing<T>, ClientError>>,
{
    let mut items = Vec::new();
    let mut page = 1;
    loop {
        let listing = fetch(page).await?;
        let fetched = listing.items.len();
        items.extend(listing.items);
        if fetched == 0 || items.len() as i64 >= listing.total {
            return Ok(items);
        }
        page += 1;
    }
}

#[async_trait]
impl TourDataSource for TourbookClient {
    type Error = ClientError;

    async fn enabled_categories(&self) -> Result<Vec<CategoryResponseDto>, ClientError> {
        all_pages(|page| {
            let query = CategoryQueryParams {
                page,
                page_size: MAX_PAGE_SIZE,
                enabled: Some(true),
                search: None,
            };
            async move { self.list_categories(&query).await }
        })
        .await
    }

    async fn enabled_destinations(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<DestinationResponseDto>, ClientError> {
        all_pages(|page| {
            let query = DestinationQueryParams {
                page,
                page_size: MAX_PAGE_SIZE,
                category_id: Some(category_id),
                enabled: Some(true),
                search: None,
            };
            async move { self.list_destinations(&query).await }
        })
        .await
    }

    async fn enabled_places(&self, category_id: Uuid) -> Result<Vec<PlaceResponseDto>, ClientError> {
        all_pages(|page| {
            let query = PlaceQueryParams {
                page,
                page_size: MAX_PAGE_SIZE,
                destination_id: None,
                category_id: Some(category_id),
                enabled: Some(true),
                search: None,
            };
            async move { self.list_places(&query).await }
        })
        .await
    }

    async fn place(&self, place_id: Uuid) -> Result<PlaceResponseDto, ClientError> {
        self.get_place(place_id).await
    }

    async fn enabled_ads(&self, place_id: Uuid) -> Result<Vec<AdResponseDto>, ClientError> {
        all_pages(|page| {
            let query = AdQueryParams {
                page,
                page_size: MAX_PAGE_SIZE,
                place_id: Some(place_id),
                enabled: Some(true),
            };
            async move { self.list_ads(&query).await }
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::{BookSession, Page};
    use crate::shared::types::{ApiResponse, Meta};
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;

    #[tokio::test]
    async fn test_all_pages_follows_total() {
        let pages = all_pages(|page| async move {
            let items = match page {
                1 => vec![1, 2],
                2 => vec![3],
                _ => panic!("fetched past the last page"),
            };
            Ok::<_, ClientError>(Listing { items, total: 3 })
        })
        .await
        .unwrap();
        assert_eq!(pages, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_all_pages_stops_on_empty_page() {
        let pages: Vec<i32> = all_pages(|_| async {
            Ok::<_, ClientError>(Listing {
                items: vec![],
                total: 10,
            })
        })
        .await
        .unwrap();
        assert!(pages.is_empty());
    }

    #[tokio::test]
    async fn test_book_session_opens_through_client() {
        let router = Router::new().route(
            "/api/categories",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert_eq!(params.get("enabled").map(String::as_str), Some("true"));
                Json(ApiResponse::success(
                    Some(vec![serde_json::json!({
                        "id": Uuid::new_v4(),
                        "title": "Mountains",
                        "description": "Cool air",
                        "image": "https://cdn.tourbook.test/categories/m.jpg",
                        "icon": "mountain",
                        "color": "#16a34a",
                        "display_order": 1,
                        "enabled": true,
                        "created_at": "2026-01-01T00:00:00Z",
                        "updated_at": "2026-01-01T00:00:00Z"
                    })]),
                    None,
                    Some(Meta { total: 1 }),
                ))
            }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });

        let client = TourbookClient::new(&format!("http://{}", addr)).unwrap();
        let mut book = BookSession::new(client);

        assert!(book.open().await.moved());
        assert_eq!(book.page(), Page::Categories);
        assert_eq!(book.categories()[0].title, "Mountains");
    }

    #[tokio::test]
    async fn test_unreachable_server_becomes_notice() {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let client = TourbookClient::new(&format!("http://{}", addr)).unwrap();
        let mut book = BookSession::new(client);

        let outcome = book.open().await;
        assert!(outcome.notice().is_some());
        assert_eq!(book.page(), Page::Cover);
    }
}
