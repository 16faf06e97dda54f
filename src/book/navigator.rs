use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Number of pages in the book
pub const TOTAL_PAGES: usize = 4;

/// Pages of the book, in reading order
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Page {
    #[default]
    Cover,
    Categories,
    Places,
    Map,
}

impl Page {
    pub const ALL: [Page; TOTAL_PAGES] = [Page::Cover, Page::Categories, Page::Places, Page::Map];

    pub fn index(self) -> usize {
        self as usize
    }

    pub fn from_index(index: usize) -> Option<Page> {
        Self::ALL.get(index).copied()
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Page::Cover => "cover",
            Page::Categories => "categories",
            Page::Places => "places",
            Page::Map => "map",
        };
        f.write_str(name)
    }
}

/// Which way the page-flip animation turns
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlipDirection {
    Forward,
    Backward,
    #[default]
    None,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Info,
    Warning,
    Error,
}

/// Transient toast shown instead of failing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    pub message: String,
    pub level: NoticeLevel,
}

impl Notice {
    pub fn warning(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Warning,
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            level: NoticeLevel::Error,
        }
    }
}

/// What the user has picked so far
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Selection {
    pub category: Option<Uuid>,
    pub place: Option<Uuid>,
}

/// Outcome of a navigation request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Navigation {
    Moved {
        from: Page,
        to: Page,
        direction: FlipDirection,
    },
    /// Already there, or a paginate step past either end
    Unchanged,
    /// Prerequisite missing or page does not exist; state untouched
    Refused(Notice),
}

impl Navigation {
    pub fn moved(&self) -> bool {
        matches!(self, Navigation::Moved { .. })
    }

    pub fn notice(&self) -> Option<&Notice> {
        match self {
            Navigation::Refused(notice) => Some(notice),
            _ => None,
        }
    }
}

pub const CHOOSE_CATEGORY_FIRST: &str = "Please choose a category first";
pub const CHOOSE_PLACE_FIRST: &str = "Please choose a place first";

/// Page index plus selection state, gating pages on their prerequisites.
///
/// Places needs a selected category; Map needs a selected place. A refused
/// request leaves every field as it was.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookNavigator {
    page: Page,
    selection: Selection,
    direction: FlipDirection,
}

impl BookNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn page(&self) -> Page {
        self.page
    }

    pub fn index(&self) -> usize {
        self.page.index()
    }

    pub fn selection(&self) -> Selection {
        self.selection
    }

    /// Direction of the most recent move
    pub fn direction(&self) -> FlipDirection {
        self.direction
    }

    /// Jump to a page by index
    pub fn go_to(&mut self, index: usize) -> Navigation {
        let Some(target) = Page::from_index(index) else {
            return Navigation::Refused(Notice::warning(format!(
                "Page {} does not exist",
                index
            )));
        };
        if target == self.page {
            return Navigation::Unchanged;
        }
        if let Err(notice) = self.check_prerequisite(target) {
            return Navigation::Refused(notice);
        }

        let from = self.page;
        let direction = if target.index() > from.index() {
            FlipDirection::Forward
        } else {
            FlipDirection::Backward
        };
        self.page = target;
        self.direction = direction;
        Navigation::Moved {
            from,
            to: target,
            direction,
        }
    }

    /// Move by `step` pages (normally +1 or -1).
    ///
    /// Stepping past either end is a silent no-op; otherwise the same
    /// prerequisites as [`BookNavigator::go_to`] apply.
    pub fn paginate(&mut self, step: isize) -> Navigation {
        match self.index().checked_add_signed(step) {
            Some(target) if target < TOTAL_PAGES => self.go_to(target),
            _ => Navigation::Unchanged,
        }
    }

    /// Pick a category; clears any place chosen under the previous one and
    /// opens the places page.
    pub fn select_category(&mut self, category_id: Uuid) -> Navigation {
        self.selection = Selection {
            category: Some(category_id),
            place: None,
        };
        self.go_to(Page::Places.index())
    }

    /// Pick a place and open the map page
    pub fn select_place(&mut self, place_id: Uuid) -> Navigation {
        if self.selection.category.is_none() {
            return Navigation::Refused(Notice::warning(CHOOSE_CATEGORY_FIRST));
        }
        self.selection.place = Some(place_id);
        self.go_to(Page::Map.index())
    }

    /// Back to the cover with nothing selected
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn check_prerequisite(&self, target: Page) -> Result<(), Notice> {
        match target {
            Page::Places if self.selection.category.is_none() => {
                Err(Notice::warning(CHOOSE_CATEGORY_FIRST))
            }
            Page::Map if self.selection.place.is_none() => Err(Notice::warning(CHOOSE_PLACE_FIRST)),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(page: Page, category: bool, place: bool) -> BookNavigator {
        BookNavigator {
            page,
            selection: Selection {
                category: category.then(Uuid::new_v4),
                place: place.then(Uuid::new_v4),
            },
            direction: FlipDirection::None,
        }
    }

    #[test]
    fn test_starts_on_cover() {
        let nav = BookNavigator::new();
        assert_eq!(nav.page(), Page::Cover);
        assert_eq!(nav.index(), 0);
        assert_eq!(nav.selection(), Selection::default());
        assert_eq!(nav.direction(), FlipDirection::None);
    }

    #[test]
    fn test_places_without_category_never_moves() {
        for start in [Page::Cover, Page::Categories] {
            let mut nav = at(start, false, false);
            let before = nav.clone();

            let outcome = nav.go_to(Page::Places.index());

            assert_eq!(
                outcome,
                Navigation::Refused(Notice::warning(CHOOSE_CATEGORY_FIRST))
            );
            assert_eq!(nav, before);
        }
    }

    #[test]
    fn test_map_without_place_never_moves() {
        for (start, category) in [
            (Page::Cover, false),
            (Page::Categories, true),
            (Page::Places, true),
        ] {
            let mut nav = at(start, category, false);
            let before = nav.clone();

            let outcome = nav.go_to(Page::Map.index());

            assert_eq!(outcome.notice().unwrap().message, CHOOSE_PLACE_FIRST);
            assert_eq!(nav, before);
        }
    }

    #[test]
    fn test_paginate_is_bounded() {
        let mut nav = at(Page::Map, true, true);
        assert_eq!(nav.paginate(1), Navigation::Unchanged);
        assert_eq!(nav.page(), Page::Map);

        let mut nav = BookNavigator::new();
        assert_eq!(nav.paginate(-1), Navigation::Unchanged);
        assert_eq!(nav.page(), Page::Cover);
        assert_eq!(nav.direction(), FlipDirection::None);
    }

    #[test]
    fn test_paginate_respects_prerequisites() {
        let mut nav = at(Page::Categories, false, false);
        let outcome = nav.paginate(1);
        assert_eq!(outcome.notice().unwrap().message, CHOOSE_CATEGORY_FIRST);
        assert_eq!(nav.page(), Page::Categories);
    }

    #[test]
    fn test_forward_and_backward_moves_record_direction() {
        let mut nav = BookNavigator::new();
        assert_eq!(
            nav.paginate(1),
            Navigation::Moved {
                from: Page::Cover,
                to: Page::Categories,
                direction: FlipDirection::Forward,
            }
        );
        assert_eq!(nav.direction(), FlipDirection::Forward);

        assert!(nav.paginate(-1).moved());
        assert_eq!(nav.page(), Page::Cover);
        assert_eq!(nav.direction(), FlipDirection::Backward);
    }

    #[test]
    fn test_go_to_current_page_is_unchanged() {
        let mut nav = at(Page::Categories, false, false);
        assert_eq!(nav.go_to(1), Navigation::Unchanged);
    }

    #[test]
    fn test_go_to_missing_page_is_refused() {
        let mut nav = BookNavigator::new();
        let before = nav.clone();
        let outcome = nav.go_to(TOTAL_PAGES);
        assert_eq!(outcome.notice().unwrap().message, "Page 4 does not exist");
        assert_eq!(nav, before);
    }

    #[test]
    fn test_select_category_then_place() {
        let mut nav = BookNavigator::new();
        let category = Uuid::new_v4();
        let place = Uuid::new_v4();

        assert!(nav.select_category(category).moved());
        assert_eq!(nav.page(), Page::Places);
        assert_eq!(nav.selection().category, Some(category));

        assert!(nav.select_place(place).moved());
        assert_eq!(nav.page(), Page::Map);
        assert_eq!(nav.selection().place, Some(place));

        // Back to places and the map page stays reachable
        assert!(nav.paginate(-1).moved());
        assert!(nav.paginate(1).moved());
    }

    #[test]
    fn test_new_category_clears_place() {
        let mut nav = at(Page::Map, true, true);
        let category = Uuid::new_v4();

        nav.select_category(category);

        assert_eq!(nav.page(), Page::Places);
        assert_eq!(
            nav.selection(),
            Selection {
                category: Some(category),
                place: None
            }
        );
        assert!(nav.paginate(1).notice().is_some());
    }

    #[test]
    fn test_select_place_requires_category() {
        let mut nav = at(Page::Categories, false, false);
        let before = nav.clone();
        let outcome = nav.select_place(Uuid::new_v4());
        assert_eq!(outcome.notice().unwrap().message, CHOOSE_CATEGORY_FIRST);
        assert_eq!(nav, before);
    }

    #[test]
    fn test_reset() {
        let mut nav = at(Page::Map, true, true);
        nav.reset();
        assert_eq!(nav, BookNavigator::new());
    }

    #[test]
    fn test_page_index_round_trip() {
        for page in Page::ALL {
            assert_eq!(Page::from_index(page.index()), Some(page));
        }
        assert_eq!(Page::from_index(TOTAL_PAGES), None);
        assert_eq!(Page::Places.to_string(), "places");
    }
}
