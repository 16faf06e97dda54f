use async_trait::async_trait;
use uuid::Uuid;

use crate::book::navigator::{BookNavigator, Navigation, Notice, Page};
use crate::features::ads::dtos::AdResponseDto;
use crate::features::categories::dtos::CategoryResponseDto;
use crate::features::destinations::dtos::DestinationResponseDto;
use crate::features::places::dtos::PlaceResponseDto;

/// Where the book loads its content from; only enabled records are expected
#[async_trait]
pub trait TourDataSource: Send + Sync {
    type Error: std::fmt::Display + Send;

    async fn enabled_categories(&self) -> Result<Vec<CategoryResponseDto>, Self::Error>;

    async fn enabled_destinations(
        &self,
        category_id: Uuid,
    ) -> Result<Vec<DestinationResponseDto>, Self::Error>;

    /// Enabled places of every destination in the category
    async fn enabled_places(&self, category_id: Uuid) -> Result<Vec<PlaceResponseDto>, Self::Error>;

    async fn place(&self, place_id: Uuid) -> Result<PlaceResponseDto, Self::Error>;

    async fn enabled_ads(&self, place_id: Uuid) -> Result<Vec<AdResponseDto>, Self::Error>;
}

/// The navigator plus the content each page shows.
///
/// Data is fetched before the navigator moves, so a failed load leaves both
/// the page and the loaded content untouched and surfaces as a notice.
pub struct BookSession<S: TourDataSource> {
    source: S,
    navigator: BookNavigator,
    categories: Vec<CategoryResponseDto>,
    destinations: Vec<DestinationResponseDto>,
    places: Vec<PlaceResponseDto>,
    place: Option<PlaceResponseDto>,
    ads: Vec<AdResponseDto>,
}

impl<S: TourDataSource> BookSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            navigator: BookNavigator::new(),
            categories: Vec::new(),
            destinations: Vec::new(),
            places: Vec::new(),
            place: None,
            ads: Vec::new(),
        }
    }

    pub fn navigator(&self) -> &BookNavigator {
        &self.navigator
    }

    pub fn page(&self) -> Page {
        self.navigator.page()
    }

    pub fn categories(&self) -> &[CategoryResponseDto] {
        &self.categories
    }

    pub fn destinations(&self) -> &[DestinationResponseDto] {
        &self.destinations
    }

    pub fn places(&self) -> &[PlaceResponseDto] {
        &self.places
    }

    pub fn place(&self) -> Option<&PlaceResponseDto> {
        self.place.as_ref()
    }

    pub fn ads(&self) -> &[AdResponseDto] {
        &self.ads
    }

    /// Open the cover: load the categories and turn to their page
    pub async fn open(&mut self) -> Navigation {
        match self.source.enabled_categories().await {
            Ok(categories) => {
                self.categories = categories;
                self.navigator.go_to(Page::Categories.index())
            }
            Err(e) => load_failed("categories", e),
        }
    }

    /// Load a category's destinations and places, then show the places page
    pub async fn choose_category(&mut self, category_id: Uuid) -> Navigation {
        let loaded = futures::try_join!(
            self.source.enabled_destinations(category_id),
            self.source.enabled_places(category_id),
        );
        match loaded {
            Ok((destinations, places)) => {
                self.destinations = destinations;
                self.places = places;
                self.place = None;
                self.ads.clear();
                self.navigator.select_category(category_id)
            }
            Err(e) => load_failed("places", e),
        }
    }

    /// Load a place and its ads, then show the map page
    pub async fn choose_place(&mut self, place_id: Uuid) -> Navigation {
        if self.navigator.selection().category.is_none() {
            // Let the navigator produce its refusal without fetching anything
            return self.navigator.select_place(place_id);
        }

        let loaded = futures::try_join!(
            self.source.place(place_id),
            self.source.enabled_ads(place_id),
        );
        match loaded {
            Ok((place, ads)) => {
                self.place = Some(place);
                self.ads = ads;
                self.navigator.select_place(place_id)
            }
            Err(e) => load_failed("the place", e),
        }
    }

    pub fn go_to(&mut self, index: usize) -> Navigation {
        self.navigator.go_to(index)
    }

    pub fn paginate(&mut self, step: isize) -> Navigation {
        self.navigator.paginate(step)
    }

    /// Close the book; loaded categories are kept for the next opening
    pub fn reset(&mut self) {
        self.navigator.reset();
        self.destinations.clear();
        self.places.clear();
        self.place = None;
        self.ads.clear();
    }
}

fn load_failed(what: &str, error: impl std::fmt::Display) -> Navigation {
    tracing::warn!("Book failed to load {}: {}", what, error);
    Navigation::Refused(Notice::error(format!("Could not load {}: {}", what, error)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::book::navigator::{FlipDirection, NoticeLevel, CHOOSE_CATEGORY_FIRST};
    use crate::features::places::dtos::LocationDto;
    use chrono::Utc;
    use rust_decimal::Decimal;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    #[derive(Default)]
    struct FakeSource {
        fail: AtomicBool,
        calls: AtomicUsize,
    }

    impl FakeSource {
        fn check(&self) -> Result<(), String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail.load(Ordering::SeqCst) {
                Err("connection refused".to_string())
            } else {
                Ok(())
            }
        }
    }

    fn category(id: Uuid) -> CategoryResponseDto {
        CategoryResponseDto {
            id,
            title: "Beaches".to_string(),
            description: "Sun and sand".to_string(),
            image: "https://cdn.tourbook.test/categories/beach.jpg".to_string(),
            icon: "tree-palm".to_string(),
            color: "#0ea5e9".to_string(),
            display_order: 0,
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn destination(category_id: Uuid) -> DestinationResponseDto {
        DestinationResponseDto {
            id: Uuid::new_v4(),
            category_id,
            title: "Kuta".to_string(),
            description: "Surf".to_string(),
            rating: Decimal::new(45, 1),
            duration: "2 hours".to_string(),
            highlights: vec![],
            images: vec![],
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn place(id: Uuid) -> PlaceResponseDto {
        PlaceResponseDto {
            id,
            destination_id: Uuid::new_v4(),
            name: "Pier".to_string(),
            description: "Boats".to_string(),
            address: None,
            location: LocationDto { lat: -8.7, lng: 115.1 },
            images: vec![],
            enabled: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[async_trait]
    impl TourDataSource for FakeSource {
        type Error = String;

        async fn enabled_categories(&self) -> Result<Vec<CategoryResponseDto>, String> {
            self.check()?;
            Ok(vec![category(Uuid::new_v4())])
        }

        async fn enabled_destinations(
            &self,
            category_id: Uuid,
        ) -> Result<Vec<DestinationResponseDto>, String> {
            self.check()?;
            Ok(vec![destination(category_id)])
        }

        async fn enabled_places(&self, _category_id: Uuid) -> Result<Vec<PlaceResponseDto>, String> {
            self.check()?;
            Ok(vec![place(Uuid::new_v4()), place(Uuid::new_v4())])
        }

        async fn place(&self, place_id: Uuid) -> Result<PlaceResponseDto, String> {
            self.check()?;
            Ok(place(place_id))
        }

        async fn enabled_ads(&self, _place_id: Uuid) -> Result<Vec<AdResponseDto>, String> {
            self.check()?;
            Ok(vec![])
        }
    }

    #[test]
    fn test_full_walkthrough() {
        tokio_test::block_on(async {
            let mut book = BookSession::new(FakeSource::default());

            assert!(book.open().await.moved());
            assert_eq!(book.page(), Page::Categories);
            assert_eq!(book.categories().len(), 1);

            let category_id = book.categories()[0].id;
            assert!(book.choose_category(category_id).await.moved());
            assert_eq!(book.page(), Page::Places);
            assert_eq!(book.destinations()[0].category_id, category_id);
            assert_eq!(book.places().len(), 2);

            let place_id = book.places()[1].id;
            assert!(book.choose_place(place_id).await.moved());
            assert_eq!(book.page(), Page::Map);
            assert_eq!(book.place().map(|p| p.id), Some(place_id));

            book.reset();
            assert_eq!(book.page(), Page::Cover);
            assert!(book.places().is_empty());
            assert_eq!(book.categories().len(), 1);
        });
    }

    #[test]
    fn test_load_failure_becomes_notice_and_keeps_state() {
        tokio_test::block_on(async {
            let mut book = BookSession::new(FakeSource::default());
            book.open().await;
            let category_id = book.categories()[0].id;

            book.source.fail.store(true, Ordering::SeqCst);
            let outcome = book.choose_category(category_id).await;

            let notice = outcome.notice().expect("refused with a notice");
            assert_eq!(notice.level, NoticeLevel::Error);
            assert!(notice.message.contains("connection refused"));
            assert_eq!(book.page(), Page::Categories);
            assert_eq!(book.navigator().selection().category, None);
            assert!(book.places().is_empty());
        });
    }

    #[tokio::test]
    async fn test_choose_place_without_category_skips_fetch() {
        let mut book = BookSession::new(FakeSource::default());

        let outcome = book.choose_place(Uuid::new_v4()).await;

        assert_eq!(outcome.notice().unwrap().message, CHOOSE_CATEGORY_FIRST);
        assert_eq!(book.source.calls.load(Ordering::SeqCst), 0);
        assert_eq!(book.page(), Page::Cover);
    }

    #[tokio::test]
    async fn test_paginate_past_map_without_place_is_refused() {
        let mut book = BookSession::new(FakeSource::default());
        book.open().await;
        let category_id = book.categories()[0].id;
        book.choose_category(category_id).await;

        let outcome = book.paginate(1);
        assert!(outcome.notice().is_some());
        assert_eq!(book.page(), Page::Places);
        assert_eq!(
            book.go_to(0),
            Navigation::Moved {
                from: Page::Places,
                to: Page::Cover,
                direction: FlipDirection::Backward,
            }
        );
    }
}
