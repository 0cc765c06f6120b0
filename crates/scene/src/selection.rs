use std::collections::HashSet;

/// How a country polygon should be drawn. Colours are the renderer's concern.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum PolygonStyle {
    Selected,
    Hovered,
    HasMarkers,
    Plain,
}

/// Selected / focused / hovered country names for one globe.
///
/// Owned by the UI layer and passed by reference; nothing here is global.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobeSelection {
    selected: Option<String>,
    focused: Option<String>,
    hovered: Option<String>,
}

impl GlobeSelection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn focused(&self) -> Option<&str> {
        self.focused.as_deref()
    }

    pub fn hovered(&self) -> Option<&str> {
        self.hovered.as_deref()
    }

    /// Selecting a country also moves the camera focus to it.
    pub fn select_country(&mut self, name: impl Into<String>) {
        let name = name.into();
        self.focused = Some(name.clone());
        self.selected = Some(name);
    }

    pub fn set_focus(&mut self, name: Option<String>) {
        self.focused = name;
    }

    /// Returns `true` when the hovered country changed.
    pub fn set_hovered(&mut self, name: Option<&str>) -> bool {
        if self.hovered.as_deref() == name {
            return false;
        }
        self.hovered = name.map(str::to_string);
        true
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Priority: selected, then hovered, then marker countries.
    pub fn style_for(&self, name: &str, has_markers: bool) -> PolygonStyle {
        if self.selected() == Some(name) {
            PolygonStyle::Selected
        } else if self.hovered() == Some(name) {
            PolygonStyle::Hovered
        } else if has_markers {
            PolygonStyle::HasMarkers
        } else {
            PolygonStyle::Plain
        }
    }

    /// Snapshot of the current state as a renderer style callback.
    pub fn style_fn(&self, marker_countries: HashSet<String>) -> crate::renderer::PolygonStyleFn {
        let snapshot = self.clone();
        Box::new(move |name: &str| snapshot.style_for(name, marker_countries.contains(name)))
    }
}
