/// A placeholder picture shown on the gallery screen
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GalleryItem {
    pub url: String,
    pub alt: String,
}

const PLACEHOLDER_COUNT: usize = 3;

pub fn gallery_items() -> Vec<GalleryItem> {
    (1..=PLACEHOLDER_COUNT)
        .map(|n| GalleryItem {
            url: format!("https://via.placeholder.com/200x150?text=Image+{}", n),
            alt: format!("Gallery image {}", n),
        })
        .collect()
}
