//! Query-string contract of the image hosting service.
//!
//! Stored image references are plain URLs; the host resizes and crops them
//! according to `height`, `width`, `quality` and `fit` parameters.

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Fit {
    Crop,
    Clip,
    Scale,
}

impl Fit {
    fn as_str(self) -> &'static str {
        match self {
            Self::Crop => "crop",
            Self::Clip => "clip",
            Self::Scale => "scale",
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct ImageTransform {
    pub height: u32,
    pub width: u32,
    pub quality: u8,
    pub fit: Fit,
}

impl ImageTransform {
    /// Large avatar on the profile card.
    pub const PROFILE_AVATAR: Self = Self::square(200);

    /// Small avatar in follower/following lists.
    pub const LIST_AVATAR: Self = Self::square(32);

    pub const fn square(size: u32) -> Self {
        Self {
            height: size,
            width: size,
            quality: 100,
            fit: Fit::Crop,
        }
    }

    pub fn query_string(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .append_pair("height", &self.height.to_string())
            .append_pair("width", &self.width.to_string())
            .append_pair("quality", &self.quality.to_string())
            .append_pair("fit", self.fit.as_str())
            .finish()
    }

    /// Append the transform to a stored image reference.
    ///
    /// An empty reference stays empty so that callers can keep treating it as "no image".
    pub fn apply(&self, image: &str) -> String {
        if image.is_empty() {
            return String::new();
        }
        let separator = if image.contains('?') { '&' } else { '?' };
        format!("{image}{separator}{}", self.query_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn profile_avatar_query_string() {
        assert_eq!(
            "https://img.example/u/1?height=200&width=200&quality=100&fit=crop",
            ImageTransform::PROFILE_AVATAR.apply("https://img.example/u/1")
        );
    }

    #[test]
    fn appends_to_existing_query() {
        assert_eq!(
            "https://img.example/u/1?v=2&height=32&width=32&quality=100&fit=crop",
            ImageTransform::LIST_AVATAR.apply("https://img.example/u/1?v=2")
        );
    }

    #[test]
    fn empty_image_stays_empty() {
        assert_eq!("", ImageTransform::LIST_AVATAR.apply(""));
    }
}
