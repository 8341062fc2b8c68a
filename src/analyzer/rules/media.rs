//! Image alt-text coverage

use crate::page::StaticSelector;
use crate::{CheckKey, CheckResult, ImageStats, Page, Status};

static IMAGES: StaticSelector = StaticSelector::new("img");

pub fn images(page: &Page) -> CheckResult {
    let images = page.select(&IMAGES);
    let stats = ImageStats {
        total: images.len(),
        missing_alt: images
            .iter()
            .filter(|img| img.value().attr("alt").map_or(true, |alt| alt.trim().is_empty()))
            .count(),
    };

    if stats.total == 0 {
        CheckResult::fail(CheckKey::Images, Status::NeedsWork, "No images found.", stats)
    } else if stats.missing_alt > 0 {
        let message = format!("{} images missing alt text.", stats.missing_alt);
        CheckResult::fail(CheckKey::Images, Status::NeedsWork, message, stats)
    } else {
        CheckResult::pass(CheckKey::Images, "All images have alt text.", stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::CheckValue;

    #[test]
    fn test_no_images_fails() {
        let result = images(&Page::parse("<p>text</p>", None));
        assert!(!result.passed);
        assert_eq!(result.message, "No images found.");
    }

    #[test]
    fn test_blank_alt_counts_as_missing() {
        let result = images(&Page::parse(
            r#"<img src="a.png" alt="A"><img src="b.png" alt="  "><img src="c.png">"#,
            None,
        ));
        assert!(!result.passed);
        assert_eq!(result.message, "2 images missing alt text.");
        assert_eq!(
            result.value,
            CheckValue::Images(ImageStats {
                total: 3,
                missing_alt: 2
            })
        );
    }

    #[test]
    fn test_all_alt_present() {
        let result = images(&Page::parse(r#"<img src="a.png" alt="A">"#, None));
        assert!(result.passed);
        assert_eq!(result.status, Status::Excellent);
    }
}
