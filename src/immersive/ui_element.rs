use std::fmt;

/// Browser chrome elements the window host can show or hide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UiElement {
    /// Address bar and navigation buttons
    Toolbar,
    TabStrip,
    BookmarksBar,
    DownloadShelf,
    InfoBarContainer,
}

impl UiElement {
    /// Elements driven by immersive show/hide.
    ///
    /// The download shelf and the info-bar container keep their own
    /// visibility policy and are never touched in bulk.
    pub const AUTO_MANAGED: [UiElement; 3] =
        [UiElement::Toolbar, UiElement::TabStrip, UiElement::BookmarksBar];

    pub const ALL: [UiElement; 5] = [
        UiElement::Toolbar,
        UiElement::TabStrip,
        UiElement::BookmarksBar,
        UiElement::DownloadShelf,
        UiElement::InfoBarContainer,
    ];

    pub fn is_auto_managed(&self) -> bool {
        Self::AUTO_MANAGED.contains(self)
    }
}

impl fmt::Display for UiElement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiElement::Toolbar => write!(f, "Toolbar"),
            UiElement::TabStrip => write!(f, "TabStrip"),
            UiElement::BookmarksBar => write!(f, "BookmarksBar"),
            UiElement::DownloadShelf => write!(f, "DownloadShelf"),
            UiElement::InfoBarContainer => write!(f, "InfoBarContainer"),
        }
    }
}
