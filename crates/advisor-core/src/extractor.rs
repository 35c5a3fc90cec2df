//! Product mention extraction.
//!
//! Generated text is matched against catalog names after normalization,
//! which strips whitespace and the `**` bold marker from both sides.
//! The first catalog entry that matches wins, regardless of where in the
//! text it appears.

use std::sync::Arc;

pub use advisor_types::normalize;
use advisor_types::{Product, ProductCatalog, NO_PRODUCT};

/// A "learn more" button under an assistant message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductAffordance {
    pub product: String,
    pub url: String,

    /// The "open page" link shows only for the clicked product
    pub open_page_visible: bool,
}

/// Finds catalog products mentioned in generated text.
#[derive(Debug, Clone)]
pub struct ProductExtractor {
    catalog: Arc<ProductCatalog>,
    normalized: Vec<String>,
}

impl ProductExtractor {
    pub fn new(catalog: Arc<ProductCatalog>) -> Self {
        let normalized = catalog.iter().map(|p| normalize(&p.name)).collect();
        Self { catalog, normalized }
    }

    pub fn catalog(&self) -> &ProductCatalog {
        &self.catalog
    }

    /// First product mentioned in `text`, in catalog order.
    pub fn find(&self, text: &str) -> Option<&Product> {
        let text = normalize(text);
        self.catalog
            .iter()
            .zip(&self.normalized)
            .find(|(_, name)| !name.is_empty() && text.contains(name.as_str()))
            .map(|(product, _)| product)
    }

    /// Name of the first mentioned product, or `해당 없음`.
    pub fn extract(&self, text: &str) -> String {
        self.find(text)
            .map(|p| p.name.clone())
            .unwrap_or_else(|| NO_PRODUCT.to_string())
    }

    /// Every mentioned product, in catalog order.
    pub fn mentions(&self, text: &str) -> Vec<&Product> {
        let text = normalize(text);
        self.catalog
            .iter()
            .zip(&self.normalized)
            .filter(|(_, name)| !name.is_empty() && text.contains(name.as_str()))
            .map(|(product, _)| product)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn extractor() -> ProductExtractor {
        ProductExtractor::new(Arc::new(ProductCatalog::builtin()))
    }

    #[test]
    fn test_normalize() {
        assert_eq!(normalize("**두배받는 암보험**"), "두배받는암보험");
        assert_eq!(normalize(" a\tb\nc "), "abc");
        assert_eq!(normalize("** a * *"), "a");
    }

    #[test]
    fn test_normalize_is_idempotent() {
        for text in ["**골든타임 수술종합보험**", "* * x", "plain", "", "***"] {
            let once = normalize(text);
            assert_eq!(normalize(&once), once, "input: {text:?}");
        }
    }

    #[test]
    fn test_extract_with_bold_and_spacing() {
        let extractor = extractor();
        let text = "## 💡 추천 상품\n### 🏥 **두배받는  암보험**\n약관에 따르면...";
        assert_eq!(extractor.extract(text), "두배받는 암보험");
    }

    #[test]
    fn test_extract_first_match_by_catalog_order() {
        let extractor = extractor();
        // The cancer product appears first in the text, but the surgery
        // product comes first in the catalog.
        let text = "두배받는 암보험과 골든타임 수술종합보험을 비교해 보세요.";
        assert_eq!(extractor.extract(text), "골든타임 수술종합보험");
    }

    #[test]
    fn test_extract_none_found() {
        assert_eq!(extractor().extract("관련 상품이 없습니다."), NO_PRODUCT);
        assert_eq!(extractor().extract(""), NO_PRODUCT);
    }

    #[test]
    fn test_extract_is_stable_under_normalization() {
        let extractor = extractor();
        for text in [
            "**굿앤굿 우리펫보험** 추천드려요",
            "뉴하이카 운전자상해보험",
            "아무 상품도 없음",
        ] {
            assert_eq!(extractor.extract(&normalize(text)), extractor.extract(text));
        }
    }

    #[test]
    fn test_mentions_in_catalog_order() {
        let extractor = extractor();
        let text = "두배받는 암보험, 그리고 개인용 자동차보험도 있어요.";
        let names: Vec<&str> = extractor
            .mentions(text)
            .into_iter()
            .map(|p| p.name.as_str())
            .collect();
        assert_eq!(names, vec!["개인용 자동차보험", "두배받는 암보험"]);
    }
}
