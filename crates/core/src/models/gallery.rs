//! Gallery image model

use serde::{Deserialize, Serialize};

use super::{check_patch_text, next_id, require, Entity};
use crate::error::Result;

const REQUIRED_FIELDS: &str = "Please fill in all required fields";

/// A photo shown in the gallery
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GalleryImage {
    pub id: String,
    pub url: String,
    pub alt: String,
    pub title: String,
}

/// Gallery form input, before an id is assigned
#[derive(Debug, Clone, Default)]
pub struct NewGalleryImage {
    pub url: String,
    pub alt: String,
    pub title: String,
}

impl NewGalleryImage {
    pub fn validate(&self) -> Result<()> {
        require("url", &self.url, REQUIRED_FIELDS)?;
        require("alt", &self.alt, REQUIRED_FIELDS)?;
        require("title", &self.title, REQUIRED_FIELDS)?;
        Ok(())
    }

    pub fn into_entity(self) -> Result<GalleryImage> {
        self.validate()?;
        Ok(GalleryImage {
            id: next_id(),
            url: self.url,
            alt: self.alt,
            title: self.title,
        })
    }
}

/// Partial update for a gallery image.
///
/// Replacing a photo is a patch with a new `url`; `alt` and `title` keep
/// their old values unless supplied.
#[derive(Debug, Clone, Default)]
pub struct GalleryImagePatch {
    pub url: Option<String>,
    pub alt: Option<String>,
    pub title: Option<String>,
}

impl GalleryImagePatch {
    pub fn replace_url(url: impl Into<String>) -> Self {
        Self {
            url: Some(url.into()),
            ..Default::default()
        }
    }
}

impl Entity for GalleryImage {
    type Patch = GalleryImagePatch;

    const COLLECTION_KEY: &'static str = "gallery_images";

    fn id(&self) -> &str {
        &self.id
    }

    fn validate_patch(patch: &GalleryImagePatch) -> Result<()> {
        check_patch_text("url", patch.url.as_ref())?;
        check_patch_text("alt", patch.alt.as_ref())?;
        check_patch_text("title", patch.title.as_ref())?;
        Ok(())
    }

    fn apply_patch(&mut self, patch: GalleryImagePatch) {
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(alt) = patch.alt {
            self.alt = alt;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
    }
}
